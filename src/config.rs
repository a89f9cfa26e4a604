use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};

use crate::classifiers::naive_bayes::DEFAULT_MAX_VOCAB_SIZE;


#[derive(Debug, Clone, Deserialize)]
pub struct ConfigHeader {
    #[serde(default = "default_msg")]
    msg: String,
}

impl Default for ConfigHeader {
    fn default() -> Self {
        Self { msg: default_msg() }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_vocab_size: usize,
    pub nb_threshold: f32,
    pub rule_threshold: f32,
    pub external_threshold: f32,
    pub agreement_nb_weight: f32,
    /// Pre-trained Naive Bayes model; trained from the built-in corpus when absent.
    pub model_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: DEFAULT_MAX_VOCAB_SIZE,
            nb_threshold: 0.20,
            rule_threshold: 0.30,
            external_threshold: 0.40,
            agreement_nb_weight: 0.6,
            model_path: None,
        }
    }
}

/// Artifacts of the optional linear external model.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalModelConfig {
    pub vocab_path: PathBuf,
    pub labels_path: PathBuf,
    pub weights_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub workers: usize,
    pub max_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 2, max_size: 16 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub header: ConfigHeader,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub external: Option<ExternalModelConfig>,
    #[serde(default)]
    pub batch: BatchConfig,
}
impl Config {
    /// Load `config.*` from the working directory, then `APPCAT__*` env overrides.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        let mut builder: ConfigBuilder<DefaultState> = ConfigBuilder::default();

        // A missing file means defaults
        builder = builder.add_source(File::with_name(name).required(false));
        builder = builder.add_source(
            Environment::with_prefix("APPCAT")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header.msg)
    }
}

fn default_msg() -> String {
    "appcat".to_string()
}

fn default_level() -> String {
    "info".to_string()
}
