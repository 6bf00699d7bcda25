mod basic;
mod gitlab;

pub use basic::BasicConfig;
pub use gitlab::GitlabConfig;

use crate::error::GlsyncError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
///
/// Built once at startup and threaded through the components; nothing
/// reads process-wide state after this point.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Local storage and logging (see `basic` table in glsync.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Remote API settings (see `gitlab` table in glsync.toml).
    #[serde(default)]
    pub gitlab: GitlabConfig,
}

const DEFAULT_CONFIG_FILE: &str = "glsync.toml";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file
    /// and `GLSYNC_*` environment variables (`__` as the table separator,
    /// e.g. `GLSYNC_GITLAB__TOKEN`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed("GLSYNC_").split("__"))
    }

    /// Loads configuration from defaults, `glsync.toml` if present and the
    /// environment. Does not validate `gitlab.token`; commands that talk to
    /// the remote check it when building the client.
    pub fn load() -> Result<Self, GlsyncError> {
        Self::figment()
            .extract()
            .map_err(|err| GlsyncError::Config(err.to_string()))
    }
}
