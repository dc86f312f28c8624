//! Server configuration
//!
//! Settings are resolved from three layers: built-in defaults, an
//! optional `dropftp.toml` in the working directory, and `DROPFTP_*`
//! environment variables. Environment wins over file, file over
//! defaults.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::storage::StorageLayout;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8005;
const DEFAULT_FTP_DIR: &str = "/var/tmp/ftp";
const DEFAULT_LAYOUT: &str = "user-date";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the control listener binds.
    pub host: String,
    /// Port the control listener binds.
    pub port: u16,
    /// Base directory uploads are stored under.
    pub ftp_dir: String,
    /// Storage layout name: `flat`, `date`, or `user-date`.
    pub layout: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ftp_dir: DEFAULT_FTP_DIR.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from defaults, `dropftp.toml`, and the
    /// `DROPFTP_*` environment.
    pub fn load() -> Result<ServerConfig, ConfigError> {
        let settings = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("ftp_dir", DEFAULT_FTP_DIR)?
            .set_default("layout", DEFAULT_LAYOUT)?
            .add_source(File::with_name("dropftp").required(false))
            .add_source(Environment::with_prefix("DROPFTP"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Message("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Message("port must be non-zero".into()));
        }
        if self.ftp_dir.is_empty() {
            return Err(ConfigError::Message("ftp_dir must not be empty".into()));
        }
        self.storage_layout().map_err(ConfigError::Message)?;
        Ok(())
    }

    /// `host:port` for the control listener.
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ftp_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.ftp_dir)
    }

    /// Parses the configured layout name.
    ///
    /// `load()` rejects unknown names, but the struct can also be built
    /// directly, so the parse stays fallible here.
    pub fn storage_layout(&self) -> Result<StorageLayout, String> {
        self.layout.parse()
    }
}
