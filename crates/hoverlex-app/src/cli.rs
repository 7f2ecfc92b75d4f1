use std::path::PathBuf;

use clap::Parser;
use hoverlex_config::Config;
use hoverlex_types::EngineKind;

#[derive(Debug, Parser)]
#[command(name = "hoverlex", version, about = "Hold a key, point at a word, read its translation")]
pub struct Cli {
    /// Profile to load from the profiles directory
    #[arg(long, default_value = "main")]
    pub profile: String,

    #[arg(long)]
    pub profiles_dir: Option<PathBuf>,

    /// Create a profile from `main` and exit
    #[arg(long, value_name = "NAME")]
    pub new_profile: Option<String>,

    /// google, bing, baidu, youdao or system
    #[arg(long)]
    pub engine: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub target: Option<String>,

    /// One lookup per key press instead of following the pointer
    #[arg(long = "static")]
    pub static_mode: bool,

    /// Draw the capture region and report misses
    #[arg(long)]
    pub verbose: bool,

    /// JSON word list used for phonetics and definitions
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            engine: self.engine.as_deref().and_then(|name| {
                let kind = EngineKind::parse(name);
                if kind.is_none() {
                    tracing::warn!("Ignoring unknown engine '{name}'");
                }
                kind
            }),
            source: self.source.clone(),
            target: self.target.clone(),
            static_mode: self.static_mode,
            verbose: self.verbose,
            dictionary: self.dictionary.clone(),
        }
    }
}

/// Command-line settings, re-applied on top of every profile reload
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub engine: Option<EngineKind>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub static_mode: bool,
    pub verbose: bool,
    pub dictionary: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(engine) = self.engine {
            config.translator.engine = engine;
        }
        if let Some(source) = &self.source {
            config.lookup.source_language = source.clone();
        }
        if let Some(target) = &self.target {
            config.lookup.target_language = target.clone();
        }
        if self.static_mode {
            config.lookup.continuous = false;
        }
        if self.verbose {
            config.ui.debug_show_region = true;
        }
        if let Some(path) = &self.dictionary {
            config.dictionary.path = Some(path.clone());
        }
    }
}
