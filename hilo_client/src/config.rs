use hilo_core::{CURRENT_GAME_SLOT, ConfigError, EngineConfig};
use std::path::PathBuf;

pub const SAVE_PATH_VAR: &str = "HILO_SAVE_PATH";
pub const DISPLAY_MS_VAR: &str = "HILO_DISPLAY_MS";
pub const BUFFER_MS_VAR: &str = "HILO_BUFFER_MS";
pub const COOLDOWN_MS_VAR: &str = "HILO_COOLDOWN_MS";

/// 客户端配置，全部来自环境变量，缺省时使用引擎默认值
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 存档文件路径，默认是当前目录下的 currentGame.json
    pub save_path: PathBuf,
    pub engine: EngineConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let save_path = lookup(SAVE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.json", CURRENT_GAME_SLOT)));

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            display_duration_ms: parse_ms(&lookup, DISPLAY_MS_VAR, defaults.display_duration_ms)?,
            correct_guess_buffer_ms: parse_ms(&lookup, BUFFER_MS_VAR, defaults.correct_guess_buffer_ms)?,
            draw_cooldown_ms: parse_ms(&lookup, COOLDOWN_MS_VAR, defaults.draw_cooldown_ms)?,
        };
        engine.validate()?;

        Ok(ClientConfig { save_path, engine })
    }
}

fn parse_ms(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> Result<u64, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}
