//! Startup configuration resolution.
//!
//! # Responsibilities
//! - Read the config file, or start from defaults when none is given
//! - Apply command-line overrides
//! - Validate the final configuration
//!
//! # Design Decisions
//! - Validation runs once, after overrides, so a flag can fix a bad file value

use std::path::Path;

use crate::config::{read_config, validate_config, AppConfig, ConfigError};

/// Values given on the command line. `None`/`false` keep the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub debug: bool,
    pub public_dir: Option<String>,
    pub index_fallback: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(addr) = &self.bind_address {
            config.listener.bind_address = addr.clone();
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(dir) = &self.public_dir {
            config.static_files.public_dir = Some(dir.clone());
        }
        if self.index_fallback {
            config.static_files.index_fallback = true;
        }
    }
}

/// Build the validated configuration the server runs with.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
