use crate::{config::TallyConfig, defaults};
use serde::{Deserialize, Serialize};
use std::{
    env,
    future::Future,
    net::{SocketAddr, ToSocketAddrs},
    str::FromStr,
};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
pub fn trim_opt_env_key(key: &str) -> &str {
    // Ambiguous key: $FOO, non-ambiguous key: ${FOO}
    match key.strip_prefix("${") {
        Some(rest) => rest.strip_suffix('}').unwrap_or(rest),
        None => key.strip_prefix('$').unwrap_or(key),
    }
}

/// Determine whether a given key is an environment variable.
///
/// The variable name must be non-empty, so `$` and `${}` are not keys.
pub fn is_opt_env_var(k: &str) -> bool {
    match k.strip_prefix("${") {
        Some(rest) => rest.len() > 1 && rest.ends_with('}'),
        None => k.len() > 1 && k.starts_with('$'),
    }
}

/// Derive the [`std::net::SocketAddr`] from a given host and port, falling back
/// to a DNS lookup using [`std::net::ToSocketAddrs`] if the host is not a valid IP address.
pub fn derive_socket_addr(host: &str, port: &str) -> SocketAddr {
    let host = format!("{host}:{port}");
    match SocketAddr::from_str(&host) {
        Ok(v) => v,
        Err(e) => {
            debug!("Failed to parse '{host}': {e}. Retrying...");
            let mut addrs: Vec<_> = host
                .to_socket_addrs()
                .unwrap_or_else(|e| panic!("Unable to resolve domain: {e}"))
                .collect();

            let addr = addrs
                .pop()
                .unwrap_or_else(|| panic!("Could not derive SocketAddr from '{host}'"));

            info!("Parsed SocketAddr '{addr:?}' from '{host}'");

            addr
        }
    }
}

/// Attempt to connect to a database, with retries.
///
/// This function takes a closure with a database connection
/// function as an argument; said function should return a future that
/// resolves to a final value of type `Result<T, sqlx::Error>`. Once the
/// retry budget is spent, the last error is returned.
pub async fn attempt_database_connection<F, Fut, T, U>(mut fut: F) -> Result<T, U>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, U>>,
    U: std::error::Error,
{
    let mut remaining_retries = defaults::MAX_DATABASE_CONNECTION_ATTEMPTS;
    let mut delay = defaults::INITIAL_RETRY_DELAY_SECS;
    loop {
        match fut().await {
            Ok(t) => break Ok(t),
            Err(e) => {
                if remaining_retries > 0 {
                    warn!(
                        "Could not connect to database: {e}. Retrying in {delay} seconds...",
                    );
                    remaining_retries -= 1;
                    sleep(Duration::from_secs(delay)).await;
                    delay *= 2;
                } else {
                    break Err(e);
                }
            }
        }
    }
}

/// Denotes the status of a service for the service health check.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceStatus {
    /// The service is healthy.
    OK,

    /// The service is not healthy.
    NotOk,
}

/// Initialize the logging context for the Tally service.
pub fn init_logging(config: &TallyConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());

    // We manually suppress some of the more verbose crate logging.
    let directives = if config.verbose {
        level
    } else {
        format!("{level},sqlx=warn,hyper=warn")
    };

    let filter = EnvFilter::try_new(directives)?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(s) => bool::from_str(&s)?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// Format a SQL query for logging.
pub fn format_sql_query(s: String) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
