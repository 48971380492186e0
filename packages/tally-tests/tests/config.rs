use std::{fs, path::Path};
use tally_lib::config::{DatabaseConfig, TallyConfig};
use tally_tests::WORKSPACE_ROOT;

#[test]
fn test_default_config_file_is_same_as_default_tally_config() {
    let default_config = TallyConfig::default();
    let path = Path::new(WORKSPACE_ROOT).join("../../config.yaml");
    let yaml_config = TallyConfig::from_file(path).unwrap();
    assert_eq!(
        serde_yaml::to_string(&default_config).unwrap(),
        serde_yaml::to_string(&yaml_config).unwrap()
    );
}

#[test]
fn test_config_file_injects_env_vars() {
    std::env::set_var("TALLY_TESTS_DATABASE_PATH", "/tmp/tally-tests.db");
    let path = std::env::temp_dir().join("tally-tests-env-config.yaml");
    fs::write(
        &path,
        "database:\n  sqlite:\n    path: ${TALLY_TESTS_DATABASE_PATH}\n",
    )
    .unwrap();

    let config = TallyConfig::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(
        config.database,
        DatabaseConfig::Sqlite {
            path: "/tmp/tally-tests.db".to_string()
        }
    );
    assert_eq!(config.database.to_string(), "sqlite:///tmp/tally-tests.db");
    assert_eq!(config.web_api, TallyConfig::default().web_api);
}
