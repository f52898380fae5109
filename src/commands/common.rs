//! Resources shared by most commands.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::core::config::Settings;
use crate::season::SeasonRegistry;
use crate::storage::GameDatabase;
use crate::{Result, Season};

/// Settings, season plans and database for one command invocation
pub struct CommandContext {
    pub settings: Settings,
    pub registry: SeasonRegistry,
    pub db_path: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Load settings and season plans; fails with a configuration error
    /// before anything touches the network.
    pub fn new(config_path: Option<&Path>, db_path: Option<&Path>) -> Result<Self> {
        let settings = Settings::load(config_path)?;
        let registry = settings.registry()?;
        let db_path = db_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| settings.db_path());
        debug!(db = %db_path.display(), seasons = ?registry.seasons(), "command context ready");

        Ok(Self {
            settings,
            registry,
            db_path,
            config_path: config_path.map(Path::to_path_buf),
        })
    }

    pub fn open_db(&self) -> Result<GameDatabase> {
        GameDatabase::open(&self.db_path)
    }

    /// The requested seasons, or every registered one when none were given.
    /// Each must have a plan.
    pub fn resolve_seasons(&self, requested: &[Season]) -> Result<Vec<Season>> {
        resolve_seasons(&self.registry, requested)
    }
}

pub fn resolve_seasons(registry: &SeasonRegistry, requested: &[Season]) -> Result<Vec<Season>> {
    if requested.is_empty() {
        return Ok(registry.seasons());
    }
    let mut seasons = Vec::with_capacity(requested.len());
    for season in requested {
        registry.require(*season)?;
        if !seasons.contains(season) {
            seasons.push(*season);
        }
    }
    Ok(seasons)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
