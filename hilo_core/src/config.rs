use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 猜测结果提示的展示时间
pub const DEFAULT_DISPLAY_DURATION_MS: u64 = 1000;
/// 猜对时在展示时间之外额外等待的缓冲
pub const DEFAULT_CORRECT_GUESS_BUFFER_MS: u64 = 100;
/// 两次摸牌之间的最短间隔，必须比结算延迟长
pub const DEFAULT_DRAW_COOLDOWN_MS: u64 = 1500;

/// 引擎的时间参数，单位都是毫秒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display_duration_ms: u64,
    pub correct_guess_buffer_ms: u64,
    pub draw_cooldown_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            display_duration_ms: DEFAULT_DISPLAY_DURATION_MS,
            correct_guess_buffer_ms: DEFAULT_CORRECT_GUESS_BUFFER_MS,
            draw_cooldown_ms: DEFAULT_DRAW_COOLDOWN_MS,
        }
    }
}

impl EngineConfig {
    /// 猜对时结算的总延迟，溢出时取 u64::MAX
    pub fn correct_delay_ms(&self) -> u64 {
        self.display_duration_ms.saturating_add(self.correct_guess_buffer_ms)
    }

    pub fn incorrect_delay_ms(&self) -> u64 {
        self.display_duration_ms
    }

    /// 冷却时间必须严格长于任意一个结算延迟，保证同一时间最多只有一个挂起的结算
    pub fn validate(&self) -> Result<(), ConfigError> {
        let display_ms = self
            .display_duration_ms
            .checked_add(self.correct_guess_buffer_ms)
            .ok_or(ConfigError::DelayOverflow {
                display_ms: self.display_duration_ms,
                buffer_ms: self.correct_guess_buffer_ms,
            })?;
        if self.draw_cooldown_ms <= display_ms {
            return Err(ConfigError::CooldownTooShort { cooldown_ms: self.draw_cooldown_ms, display_ms });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.correct_delay_ms(), 1100);
        assert_eq!(config.incorrect_delay_ms(), 1000);
    }

    #[test]
    fn test_cooldown_must_exceed_delay() {
        let config = EngineConfig { draw_cooldown_ms: 1100, ..EngineConfig::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CooldownTooShort { cooldown_ms: 1100, display_ms: 1100 })
        );
    }

    #[test]
    fn test_overflowing_delay_is_rejected() {
        let config = EngineConfig { display_duration_ms: u64::MAX, correct_guess_buffer_ms: 1, ..EngineConfig::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayOverflow { display_ms: u64::MAX, buffer_ms: 1 })
        );
        assert_eq!(config.correct_delay_ms(), u64::MAX);

        let config = EngineConfig { display_duration_ms: u64::MAX - 1, correct_guess_buffer_ms: 1, draw_cooldown_ms: u64::MAX };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"display_duration_ms": 20}"#).unwrap();
        assert_eq!(config.display_duration_ms, 20);
        assert_eq!(config.draw_cooldown_ms, DEFAULT_DRAW_COOLDOWN_MS);
    }
}
