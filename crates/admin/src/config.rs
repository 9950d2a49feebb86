use std::path::PathBuf;

use anyhow::{anyhow, Context};

/// Default blob store root when `STORAGE_ROOT` is unset.
pub const DEFAULT_STORAGE_ROOT: &str = "./media";

/// Default pool size for one-off admin commands.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Admin command configuration loaded from environment variables.
///
/// | Env Var              | Default   |
/// |----------------------|-----------|
/// | `DATABASE_URL`       | required  |
/// | `STORAGE_ROOT`       | `./media` |
/// | `DB_MAX_CONNECTIONS` | `5`       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub database_url: String,
    pub storage_root: PathBuf,
    pub db_max_connections: u32,
}

impl AdminConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let storage_root = lookup("STORAGE_ROOT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_ROOT.into())
            .into();

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a valid u32, got '{v}'"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            storage_root,
            db_max_connections,
        })
    }
}
