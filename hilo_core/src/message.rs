use crate::card::Card;
use crate::error::InvalidMove;
use crate::state::{GameId, GameState, Guess, Phase, PlayerId, PlayerState, Role};
use serde::{Deserialize, Serialize};

// --- 表现层 -> 引擎 的指令 ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 庄家请求摸牌
    Draw,
    /// 猜牌者猜大或猜小
    Guess(Guess),
    /// 猜牌者放弃本轮猜测，与庄家交换角色
    Pass,
    /// 用户确认重开：清空存档并开始新的一局
    Reset,
}

// --- 引擎 -> 表现层/存档层 的通知 ---
// 每个订阅者只关心自己的那几类通知。

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Notification {
    /// 状态变了，请表现层重绘
    Render(GameView),
    /// 请立即存档，内容为序列化后的 GameState
    Save(String),
    /// 短暂的猜测结果提示
    Flash(FlashKind),
    /// 指令被拒绝，通知发出指令的玩家
    InvalidMove { player: PlayerId, reason: InvalidMove },
    /// 无法恢复的错误，表现层应弹出确认框让用户选择重开
    Error { message: String },
    /// 只剩最后一张牌，游戏结束
    GameOver { scores: Vec<PlayerScore> },
    /// 存档应被清空
    Cleared,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Correct,
    Wrong,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerScore {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// 表现层需要的一切，由 GameState 生成，不含未摸的牌序
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameView {
    pub game_id: GameId,
    pub phase: Phase,
    pub pot: u32,
    pub cards_left: usize,
    pub active_card: Option<Card>,
    pub players: Vec<PlayerState>,
    pub active_player: PlayerId,
    /// 当前玩家是猜牌者且还能过牌
    pub can_pass: bool,
    /// 庄家行动且有翻开的牌时，展示猜牌者的名字和他的猜测
    pub guess_on_table: Option<(String, Guess)>,
}

impl GameView {
    pub fn from_state(state: &GameState) -> Self {
        let active = state.active_player();
        let inactive = state.inactive_player();

        let can_pass = active.role == Role::Guesser && active.can_pass();
        let guess_on_table = match (active.role, state.deck.active_card(), inactive.guess) {
            (Role::Dealer, Some(_), Some(guess)) => Some((inactive.name.clone(), guess)),
            _ => None,
        };

        GameView {
            game_id: state.game_id,
            phase: state.phase(),
            pot: state.pot,
            cards_left: state.deck.remaining(),
            active_card: state.deck.active_card(),
            players: state.players.to_vec(),
            active_player: active.id.clone(),
            can_pass,
            guess_on_table,
        }
    }

    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }
}

impl PlayerScore {
    pub fn from_state(state: &GameState) -> Vec<PlayerScore> {
        state
            .players
            .iter()
            .map(|p| PlayerScore { id: p.id.clone(), name: p.name.clone(), score: p.score })
            .collect()
    }
}

