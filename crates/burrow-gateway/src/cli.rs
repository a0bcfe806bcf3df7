use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

use burrow_core::{EngineConfig, RetryPolicy};
use burrow_telemetry::LogFormat;
use clap::{Parser, ValueEnum};

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "BURROW_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BURROW_MYSQL_DSN";
pub const GENERATOR_ENV: &str = "BURROW_GENERATOR";
pub const COUNTER_OFFSET_ENV: &str = "BURROW_COUNTER_OFFSET";
pub const COUNTER_BLOCK_SIZE_ENV: &str = "BURROW_COUNTER_BLOCK_SIZE";
pub const CODE_LENGTH_ENV: &str = "BURROW_CODE_LENGTH";
pub const MAX_ALLOCATION_ATTEMPTS_ENV: &str = "BURROW_MAX_ALLOCATION_ATTEMPTS";
pub const STORE_TIMEOUT_MS_ENV: &str = "BURROW_STORE_TIMEOUT_MS";
pub const TRANSIENT_RETRIES_ENV: &str = "BURROW_TRANSIENT_RETRIES";
pub const RETRY_BASE_DELAY_MS_ENV: &str = "BURROW_RETRY_BASE_DELAY_MS";
pub const RETRY_MAX_DELAY_MS_ENV: &str = "BURROW_RETRY_MAX_DELAY_MS";
pub const CACHE_MAX_ENTRIES_ENV: &str = "BURROW_CACHE_MAX_ENTRIES";
pub const CACHE_TTL_SECS_ENV: &str = "BURROW_CACHE_TTL_SECS";
pub const MAX_DESTINATION_LENGTH_ENV: &str = "BURROW_MAX_DESTINATION_LENGTH";
pub const SWEEP_INTERVAL_SECS_ENV: &str = "BURROW_SWEEP_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeneratorArg {
    Sequential,
    Random,
}

impl Display for GeneratorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorArg::Sequential => write!(f, "sequential"),
            GeneratorArg::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public base URL short links are served under.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = GENERATOR_ENV, value_enum, default_value_t = GeneratorArg::Sequential)]
    pub generator: GeneratorArg,

    /// Added to every value of the sequential generator's counter.
    #[arg(long, env = COUNTER_OFFSET_ENV, default_value_t = 0)]
    pub counter_offset: u64,

    /// Counter values leased from the store at a time. Unused values of a
    /// lease are skipped after a restart.
    #[arg(long, env = COUNTER_BLOCK_SIZE_ENV, default_value_t = 1_000)]
    pub counter_block_size: u64,

    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = 7)]
    pub code_length: usize,

    #[arg(long, env = MAX_ALLOCATION_ATTEMPTS_ENV, default_value_t = 5)]
    pub max_allocation_attempts: u32,

    #[arg(long, env = STORE_TIMEOUT_MS_ENV, default_value_t = 2_000)]
    pub store_timeout_ms: u64,

    #[arg(long, env = TRANSIENT_RETRIES_ENV, default_value_t = 3)]
    pub transient_retries: u32,

    #[arg(long, env = RETRY_BASE_DELAY_MS_ENV, default_value_t = 50)]
    pub retry_base_delay_ms: u64,

    #[arg(long, env = RETRY_MAX_DELAY_MS_ENV, default_value_t = 1_000)]
    pub retry_max_delay_ms: u64,

    /// Zero disables the resolution cache.
    #[arg(long, env = CACHE_MAX_ENTRIES_ENV, default_value_t = 10_000)]
    pub cache_max_entries: u64,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = 300)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = MAX_DESTINATION_LENGTH_ENV, default_value_t = 2048)]
    pub max_destination_length: usize,

    /// Seconds between expiry sweeps. Zero disables sweeping.
    #[arg(long, env = SWEEP_INTERVAL_SECS_ENV, default_value_t = 0)]
    pub sweep_interval_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::builder()
            .code_length(self.code_length)
            .max_allocation_attempts(self.max_allocation_attempts)
            .store_timeout(Duration::from_millis(self.store_timeout_ms))
            .transient_retry(
                RetryPolicy::builder()
                    .max_retries(self.transient_retries)
                    .base_delay(Duration::from_millis(self.retry_base_delay_ms))
                    .max_delay(Duration::from_millis(self.retry_max_delay_ms))
                    .build(),
            )
            .cache_max_entries(self.cache_max_entries)
            .cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .max_destination_length(self.max_destination_length)
            .build()
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let cli = CLI::try_parse_from(["burrow-gateway"]).unwrap();
        let config = cli.engine_config();
        let defaults = EngineConfig::default();

        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.generator, GeneratorArg::Sequential);
        assert_eq!(config.code_length, defaults.code_length);
        assert_eq!(config.max_allocation_attempts, defaults.max_allocation_attempts);
        assert_eq!(config.store_timeout, defaults.store_timeout);
        assert_eq!(config.transient_retry, defaults.transient_retry);
        assert_eq!(config.cache_max_entries, defaults.cache_max_entries);
        assert_eq!(config.cache_ttl, defaults.cache_ttl);
        assert_eq!(config.max_destination_length, defaults.max_destination_length);
        assert_eq!(cli.sweep_interval(), None);
        assert_eq!(cli.counter_offset, 0);
        assert_eq!(cli.counter_block_size, 1_000);
    }

    #[test]
    fn mysql_requires_a_dsn() {
        assert!(CLI::try_parse_from(["burrow-gateway", "--storage", "mysql"]).is_err());

        let cli = CLI::try_parse_from([
            "burrow-gateway",
            "--storage",
            "mysql",
            "--mysql-dsn",
            "mysql://burrow@localhost/burrow",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Mysql);
    }

    #[test]
    fn flags_override_engine_config() {
        let cli = CLI::try_parse_from([
            "burrow-gateway",
            "--generator",
            "random",
            "--code-length",
            "9",
            "--cache-max-entries",
            "0",
            "--sweep-interval-secs",
            "60",
            "--log-format",
            "json",
            "--counter-block-size",
            "50",
        ])
        .unwrap();

        assert_eq!(cli.counter_block_size, 50);

        assert_eq!(cli.generator, GeneratorArg::Random);
        assert_eq!(cli.engine_config().code_length, 9);
        assert_eq!(cli.engine_config().cache_max_entries, 0);
        assert_eq!(cli.sweep_interval(), Some(Duration::from_secs(60)));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
