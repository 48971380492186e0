pub const WEB_API_HOST: &str = "127.0.0.1";
pub const WEB_API_PORT: &str = "29987";
pub const MAX_BODY_SIZE: usize = 5242880; // 5MB in bytes

pub const DATABASE: &str = "sqlite";
pub const SQLITE_DATABASE_PATH: &str = "tally.db";
pub const SQLITE_MAX_CONNECTIONS: u32 = 10;
pub const SQLITE_IDLE_TIMEOUT_SECS: u64 = 2;

pub const LOG_LEVEL: &str = "info";
pub const VERBOSE_LOGGING: bool = false;

pub const MAX_DATABASE_CONNECTION_ATTEMPTS: usize = 5;
pub const INITIAL_RETRY_DELAY_SECS: u64 = 2;
