use std::path::{Path, PathBuf};

use anyhow::Context;
use rosr_types::{Role, Uri, UserMetadata};
use serde::{Deserialize, Serialize};

/// Contents of `rosr.toml`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory of the named-graph store.
    pub graph_dir: PathBuf,
    /// Directory of the content store.
    pub content_dir: PathBuf,
    pub use_transactions: bool,
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
    pub user: UserConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            graph_dir: PathBuf::from(".rosr/graphs"),
            content_dir: PathBuf::from(".rosr/content"),
            use_transactions: true,
            log_level: "warn".into(),
            user: UserConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub login: String,
    pub name: String,
    pub uri: String,
    pub role: Role,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            login: "rosr".into(),
            name: "rosr".into(),
            uri: "http://localhost/users/rosr".into(),
            role: Role::Authenticated,
        }
    }
}

impl CliConfig {
    /// Read `path`, or fall back to the defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// The user operations run on behalf of.
    pub fn user(&self) -> anyhow::Result<UserMetadata> {
        let uri = Uri::parse(&self.user.uri)
            .with_context(|| format!("invalid user URI {}", self.user.uri))?;
        Ok(UserMetadata::new(&self.user.login, &self.user.name, self.user.role, uri))
    }
}
