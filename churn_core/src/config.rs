use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigOutputMode {
    #[default]
    SeparateBuffer,
    InPlace,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    pub seed: Option<i64>,
    #[serde(default)]
    pub output_mode: ConfigOutputMode,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    // 0 emits every iteration's result.
    #[serde(default)]
    pub target_iteration: u64,
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,
    #[serde(default)]
    pub verbose: bool,
}

pub fn default_iterations() -> u64 {
    1
}
pub fn default_output_capacity() -> usize {
    8192
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            target_iteration: 0,
            output_capacity: default_output_capacity(),
            verbose: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ChurnConfig {
    #[serde(default)]
    pub session: Option<SessionSettings>,
    #[serde(default)]
    pub run: Option<RunSettings>,
}

impl ChurnConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: ChurnConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            session: Some(SessionSettings::default()),
            run: Some(RunSettings::default()),
        }
    }
}
