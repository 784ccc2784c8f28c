//! Layered configuration: defaults, then the TOML file named by
//! `KLONDIKE_CONFIG`, then `KLONDIKE_*` environment variables. Command-line
//! flags are applied last by the commands themselves.

use klondike_engine::rules::{PassLimit, RuleProfile};
use serde::{Deserialize, Serialize};
use std::fs;

pub const ENV_CONFIG: &str = "KLONDIKE_CONFIG";
pub const ENV_SEED: &str = "KLONDIKE_SEED";
pub const ENV_DRAW: &str = "KLONDIKE_DRAW";
pub const ENV_PASSES: &str = "KLONDIKE_PASSES";
pub const ENV_PROFILE: &str = "KLONDIKE_PROFILE";
pub const ENV_LOG_PATH: &str = "KLONDIKE_LOG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub profile: String,
    /// Overrides the profile's draw count when set
    pub draw: Option<u8>,
    /// Overrides the profile's pass limit when set
    pub passes: Option<PassLimit>,
    pub seed: Option<u32>,
    /// Default attempt log for `play`
    pub log_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: "classic".into(),
            draw: None,
            passes: None,
            seed: None,
            log_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub profile: ValueSource,
    pub draw: ValueSource,
    pub passes: ValueSource,
    pub seed: ValueSource,
    pub log_path: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            profile: ValueSource::Default,
            draw: ValueSource::Default,
            passes: ValueSource::Default,
            seed: ValueSource::Default,
            log_path: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl Config {
    /// The named profile with the draw and pass overrides applied.
    pub fn rule_profile(&self) -> Result<RuleProfile, ConfigError> {
        let mut profile = RuleProfile::by_name(&self.profile)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(draw) = self.draw {
            profile = profile
                .with_draw(draw)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if let Some(passes) = self.passes {
            profile = profile.with_passes(passes);
        }
        Ok(profile)
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(ENV_CONFIG)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.profile {
            cfg.profile = v;
            sources.profile = ValueSource::File;
        }
        if let Some(v) = f.draw {
            cfg.draw = Some(v);
            sources.draw = ValueSource::File;
        }
        if let Some(v) = f.passes {
            cfg.passes = Some(v);
            sources.passes = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.log_path {
            cfg.log_path = Some(v);
            sources.log_path = ValueSource::File;
        }
    }

    if let Ok(profile) = std::env::var(ENV_PROFILE)
        && !profile.is_empty()
    {
        cfg.profile = profile;
        sources.profile = ValueSource::Env;
    }
    if let Ok(draw) = std::env::var(ENV_DRAW)
        && !draw.is_empty()
    {
        cfg.draw = Some(
            draw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid draw '{}'", draw)))?,
        );
        sources.draw = ValueSource::Env;
    }
    if let Ok(passes) = std::env::var(ENV_PASSES)
        && !passes.is_empty()
    {
        cfg.passes = Some(
            passes
                .parse::<PassLimit>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        );
        sources.passes = ValueSource::Env;
    }
    if let Ok(seed) = std::env::var(ENV_SEED)
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed '{}'", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(path) = std::env::var(ENV_LOG_PATH)
        && !path.is_empty()
    {
        cfg.log_path = Some(path);
        sources.log_path = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    draw: Option<u8>,
    #[serde(default)]
    passes: Option<PassLimit>,
    #[serde(default)]
    seed: Option<u32>,
    #[serde(default)]
    log_path: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.rule_profile()
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))
}
