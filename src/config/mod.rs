// Configuration module entry point
// Loads configuration once at startup; request handling never reads the environment

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when `GZSERVE_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "gzserve";

impl Config {
    /// Load configuration from the process environment
    ///
    /// `PORT` sets the listen port and the first command-line argument sets
    /// the root directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_args(std::env::args())
    }

    /// Same as [`Config::load`] with an explicit argument list (program name
    /// first); `PORT` and `GZSERVE_CONFIG` still come from the environment.
    pub fn load_with_args<I>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let config_file =
            std::env::var("GZSERVE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let port = std::env::var("PORT").ok();
        let root_dir = args.into_iter().nth(1);
        Self::load_from(&config_file, port.as_deref(), root_dir.as_deref())
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: defaults, config file, `GZSERVE__*`
    /// environment variables, then the explicit `port` and `root_dir`.
    pub fn load_from(
        config_path: &str,
        port: Option<&str>,
        root_dir: Option<&str>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GZSERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("root_dir", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_override_option("server.port", port)?
            .set_override_option("root_dir", root_dir)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::Address { addr, source })
    }
}
