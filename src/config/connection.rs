use serde::Deserialize;
use std::{path::Path, time::Duration};
use thiserror::Error;
use tokio::fs;

// -----------------------------------------------------------------------------
// ----- Defaults --------------------------------------------------------------

const DEFAULT_BUFFER_CAPACITY: usize = 4 * 1024;

// -----------------------------------------------------------------------------
// ----- ConnectionConfig ------------------------------------------------------

/// Tunables applied whenever a `Connection` gets a live stream.
///
/// ```toml
/// nodelay = true
/// read_buffer_capacity = 8192
/// write_buffer_capacity = 1024
/// connect_timeout = 5_000 # milliseconds
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub nodelay: bool,
    pub read_buffer_capacity: usize,
    pub write_buffer_capacity: usize,

    #[serde(deserialize_with = "de_ms")]
    pub connect_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            nodelay: true,
            read_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            write_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            connect_timeout: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionConfig: Static ----------------------------------------------

impl ConnectionConfig {
    pub async fn from_file(path: &Path) -> Result<ConnectionConfig, ConfigError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<ConnectionConfig, ConfigError> {
        let cfg: ConnectionConfig =
            toml::from_str(raw).map_err(|e| ConfigError::Toml { source: e })?;
        cfg.validate()?;
        Ok(cfg)
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionConfig: Builder ---------------------------------------------

impl ConnectionConfig {
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionConfig: Private ---------------------------------------------

impl ConnectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.read_buffer_capacity == 0 {
            return Err(ConfigError::InvalidField("read_buffer_capacity".into()));
        }
        if self.write_buffer_capacity == 0 {
            return Err(ConfigError::InvalidField("write_buffer_capacity".into()));
        }
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidField("connect_timeout".into()));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn de_ms<'de, D>(d: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct MsVisitor;

    impl<'de> Visitor<'de> for MsVisitor {
        type Value = Option<Duration>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("integer milliseconds (e.g., 5000)")
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
            if v < 0 {
                return Err(E::invalid_value(Unexpected::Signed(v), &self));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    d.deserialize_any(MsVisitor)
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid field '{0}'")]
    InvalidField(String),

    #[error("read error for {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
