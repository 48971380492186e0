use crate::api::WebApi;
use tally_database::TallyConnectionPool;
use tally_lib::{
    config::{ApiServerArgs, TallyConfig},
    utils::init_logging,
};
use tracing::info;

pub async fn exec(args: ApiServerArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => TallyConfig::from_file(path)?,
        None => TallyConfig::try_from(args)?,
    };

    init_logging(&config)?;

    info!("Configuration: {:?}", config);

    let pool = TallyConnectionPool::connect(&config.database.to_string()).await?;

    WebApi::run(config, pool).await?;

    Ok(())
}
