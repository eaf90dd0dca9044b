use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use lexicard_lib::config::CoreConfig;
use lexicard_lib::storage::FileStore;
use lexicard_lib::Lexicon;

const CONFIG_FILE: &str = "lexicard.toml";

/// Shared application state for CLI commands
pub struct App {
    pub lexicon: Lexicon,
    pub data_dir: PathBuf,
}

impl App {
    pub fn new(data_dir: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => FileStore::default_data_dir().context("Failed to get data directory")?,
        };

        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE));
        if config.is_some() && !config_path.exists() {
            bail!("Config file {} does not exist", config_path.display());
        }
        let config = CoreConfig::load(&config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;

        let store = FileStore::new(data_dir.clone());
        store
            .init()
            .with_context(|| format!("Failed to initialize data directory {}", data_dir.display()))?;

        let lexicon = Lexicon::with_system_clock(Arc::new(store), &config);
        Ok(Self { lexicon, data_dir })
    }

    /// The given language, or the active one from settings
    pub fn language(&self, language: Option<&str>) -> String {
        match language {
            Some(lang) => lang.to_string(),
            None => self.lexicon.settings.load().active_language,
        }
    }
}
