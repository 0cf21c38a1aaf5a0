//! # Hi-Lo 猜大小核心逻辑库
//!
//! 这个 `core` crate 包含了双人 Hi-Lo 猜牌游戏的全部状态管理、
//! 回合状态机、猜测结算、奖池计分，以及表现层与引擎之间的指令/通知定义。
//! 它不依赖任何异步运行时，也不关心界面和存档介质，
//! 可以被终端客户端或任何其他上层应用复用。

mod card;
mod config;
mod error;
mod logic;
mod message;
mod persistence;
mod state;

pub use card::*;

pub use config::*;

pub use error::*;

pub use logic::*;

pub use message::*;

pub use persistence::*;

pub use state::*;
