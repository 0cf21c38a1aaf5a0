use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 在错误的时机收到的指令。只拒绝，不改动任何状态。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InvalidMove {
    #[error("{name}，还没轮到你摸牌，先猜一下吧。")]
    NotYourTurnToDraw { name: String },
    #[error("{name}，现在该你摸牌，不能猜。")]
    NotYourTurnToGuess { name: String },
    #[error("已经连续猜了 {guess_count} 次，不能再过牌")]
    PassUnavailable { guess_count: u8 },
    #[error("上一次猜测还在结算中")]
    ResolutionPending,
    #[error("摸牌太快了，请 {remaining_ms} 毫秒后再试")]
    DrawCoolingDown { remaining_ms: u64 },
    #[error("游戏已经结束")]
    GameOver,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),
    /// 存档无法解析或不满足不变量，只能由用户确认后重开
    #[error("存档已损坏: {0}")]
    StaleOrCorruptState(String),
    #[error("牌堆已经摸完")]
    DeckExhausted,
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("摸牌冷却 {cooldown_ms}ms 必须大于结算展示时间 {display_ms}ms")]
    CooldownTooShort { cooldown_ms: u64, display_ms: u64 },
    #[error("结算展示时间 {display_ms}ms 加缓冲 {buffer_ms}ms 超出范围")]
    DelayOverflow { display_ms: u64, buffer_ms: u64 },
    #[error("环境变量 {name} 的值无效: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("存档读写失败: {0}")]
    Io(#[from] std::io::Error),
}
