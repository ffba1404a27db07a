use serde::Deserialize;
use std::env;

/// Env var naming the configuration file (without extension is fine).
pub const CONFIG_PATH_ENV: &str = "ADAPTIVE_INTS_CONFIG";
pub const ENV_PREFIX: &str = "ADAPTIVE_INTS";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub codec: CodecConfig,
    pub logging: LoggingConfig,
}

/// Column writer settings. Enum-like fields are kept as names here and
/// resolved by `SerializerOptions::from_config`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub log_values_per_chunk: u8,
    /// "smaller_size" or "faster_decode"
    pub optimization_target: String,
    /// "none", "lz4" or "zstd"
    pub compression: String,
    pub compression_level: i32,
    pub decode_strategy: String,
    pub byte_order: String,
    pub max_values: u32,
    /// Enabled codec names; empty selects the default set.
    pub codecs: Vec<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            log_values_per_chunk: 13,
            optimization_target: "smaller_size".to_string(),
            compression: "lz4".to_string(),
            compression_level: 3,
            decode_strategy: "buffer".to_string(),
            byte_order: "little".to_string(),
            max_values: u32::MAX,
            codecs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

/// Defaults, then the optional file at `config_path`, then
/// `ADAPTIVE_INTS__SECTION__KEY` environment overrides.
pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("codec.codecs"),
        )
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
