use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hoverlex_config::Config;
use serde::{Deserialize, Serialize};

pub const MAIN_PROFILE: &str = "main";

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

impl Profile {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        Self::parse(&data, path)
    }

    /// `path` only labels the error
    pub fn parse(data: &str, path: &Path) -> anyhow::Result<Self> {
        serde_json::from_str(data)
            .with_context(|| format!("Failed to parse profile {}", path.display()))
    }
}

/// Directory of `<name>.json` profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/Hoverlex/profiles`
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find the user config directory")?;
        Ok(config_dir.join("Hoverlex").join("profiles"))
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Create the directory and the main profile if missing
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let main = self.path(MAIN_PROFILE);
        if !main.exists() {
            self.save(MAIN_PROFILE, &Config::default())?;
            tracing::info!("Created main profile at {}", main.display());
        }
        Ok(())
    }

    /// File backing `name`: the profile itself, else `main`
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        if path.exists() {
            path
        } else {
            self.path(MAIN_PROFILE)
        }
    }

    /// Load a profile by name, falling back to main, then to defaults
    pub fn load(&self, name: &str) -> anyhow::Result<Config> {
        let path = self.path(name);
        if path.exists() {
            return Ok(Profile::read(&path)?.value);
        }

        tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
        let main = self.path(MAIN_PROFILE);
        if main.exists() {
            Ok(Profile::read(&main)?.value)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, name: &str, config: &Config) -> anyhow::Result<PathBuf> {
        let profile = Profile {
            name: name.into(),
            value: config.clone(),
        };
        let file = self.path(name);
        fs::write(&file, serde_json::to_string_pretty(&profile)?)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        Ok(file)
    }

    /// Add a new profile cloned from main (or defaults if main is missing)
    pub fn add_from_main(&self, new_name: &str) -> anyhow::Result<PathBuf> {
        let config = self.load(MAIN_PROFILE)?;
        let file = self.save(new_name, &config)?;
        tracing::info!("Created new profile: {new_name}");
        Ok(file)
    }
}
