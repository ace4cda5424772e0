use std::env;
use std::path::PathBuf;

use tracing::warn;

const DEV_SECRET_KEY: &str = "hisab-kitab-dev-key";

/// Runtime configuration read from the environment.
///
/// Call `dotenv().ok()` before [`Config::from_env`] so a local `.env`
/// file is honoured during development.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key used to sign session tokens
    pub secret_key: String,

    /// Writable directory holding the SQLite database and uploaded logos
    pub data_dir: PathBuf,

    /// Interface to bind
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Lifetime of a login session in hours
    pub session_hours: i64,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `HK_SESSION_HOURS` is set to a value
    /// that does not parse as a number.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let secret_key = match env::var("HK_SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                warn!("HK_SECRET_KEY not set, using the development key");
                DEV_SECRET_KEY.to_string()
            }
        };

        let data_dir = env::var("HK_DATA_DIR")
            .or_else(|_| env::var("RENDER_DISK_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"));

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid PORT"))?;

        let session_hours = env::var("HK_SESSION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid HK_SESSION_HOURS"))?;

        Ok(Self {
            secret_key,
            data_dir,
            host,
            port,
            session_hours,
        })
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("hisabkitab.db")
    }

    /// Directory where uploaded logos are written.
    pub fn logo_dir(&self) -> PathBuf {
        self.data_dir.join("logos")
    }

    /// Configuration for tests: development key, the given data directory.
    pub fn for_tests(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            data_dir: data_dir.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            session_hours: 1,
        }
    }
}
