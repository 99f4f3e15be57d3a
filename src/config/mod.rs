// Configuration module entry point
// Builds the immutable startup configuration from defaults, file, environment and CLI

mod state;
mod types;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServeError};

// Re-export public types
pub use state::AppState;
pub use types::{
    AccessLogFormat, Config, LoggingConfig, PerformanceConfig, ServeConfig, ServerConfig,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ROOT_DIR: &str = "target/makepad-wasm-app/release/component-zoo";
pub const DEFAULT_INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];
pub const DEFAULT_CONNECTION_TIMEOUT: u64 = 30;

/// Config file name (without extension) looked up in the base directory
pub const CONFIG_FILE_NAME: &str = "wasm-serve";
/// Prefix for environment overrides, e.g. `WASM_SERVE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "WASM_SERVE";

/// Directory the server treats as its own location.
///
/// Fixed at compile time so the serving root does not depend on the
/// working directory the binary is launched from.
pub fn base_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

impl Config {
    /// Load configuration relative to [`base_dir`]
    pub fn load(port_override: Option<u16>) -> Result<Self> {
        Self::load_from(base_dir(), port_override)
    }

    /// Load configuration with `base` as the program location.
    ///
    /// Precedence, lowest first: defaults, `<base>/wasm-serve.toml`,
    /// `WASM_SERVE_*` environment, `port_override`.
    pub fn load_from(base: &Path, port_override: Option<u16>) -> Result<Self> {
        let config_file = base.join(CONFIG_FILE_NAME);
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&config_file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("serve.root_dir", DEFAULT_ROOT_DIR)?
            .set_default("serve.index_files", DEFAULT_INDEX_FILES.to_vec())?
            .set_default("serve.directory_listing", true)?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", DEFAULT_CONNECTION_TIMEOUT)?
            .set_override_option("server.port", port_override.map(i64::from))?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.serve.root_dir = resolve_against(base, &cfg.serve.root_dir);
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ServeError::InvalidArgument(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(ServeError::InvalidArgument(
                "server.workers must be at least 1".to_string(),
            ));
        }
        self.get_socket_addr().map(|_| ())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ServeError::InvalidArgument(format!(
                    "invalid address {}:{}: {e}",
                    self.server.host, self.server.port
                ))
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                workers: None,
            },
            serve: ServeConfig {
                root_dir: base_dir().join(DEFAULT_ROOT_DIR),
                index_files: DEFAULT_INDEX_FILES.iter().map(ToString::to_string).collect(),
                directory_listing: true,
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: AccessLogFormat::default(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            },
        }
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
