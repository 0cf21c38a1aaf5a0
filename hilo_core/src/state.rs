use crate::card::Deck;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GameId = Uuid;
pub type PlayerId = String;

/// 连续猜测达到这个次数后不能再过牌
pub const PASS_LIMIT: u8 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 庄家：负责摸牌
    Dealer,
    /// 猜牌者：猜下一张比当前牌大还是小
    Guesser,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Dealer => Role::Guesser,
            Role::Guesser => Role::Dealer,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Guess {
    #[serde(rename = "hi")]
    Higher,
    #[serde(rename = "lo")]
    Lower,
}

/// 挂起的结算：提示已经展示，状态变更要等展示时间过去后才执行
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PendingResolution {
    Correct,
    Incorrect,
}

/// 当前阶段，完全由 GameState 推导出来，不单独存储
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    /// 当前玩家是猜牌者，需要猜大小或过牌
    AwaitingGuess,
    /// 当前玩家是庄家，需要摸牌
    AwaitingDraw,
    /// 猜测结果正在展示，等待延迟结算
    Resolving,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub guess: Option<Guess>,
    pub guess_count: u8,  // 连续猜测次数，见 record_guess
    pub score: u32,
}

impl PlayerState {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, role: Role, active: bool) -> Self {
        PlayerState {
            id: id.into(),
            name: name.into(),
            role,
            active,
            guess: None,
            guess_count: 0,
            score: 0,
        }
    }

    pub fn set_guess(&mut self, guess: Guess) {
        self.guess = Some(guess);
    }

    pub fn clear_guess(&mut self) {
        self.guess = None;
    }

    pub fn increment_score(&mut self, amount: u32) {
        self.score += amount;
    }

    /// 切换 active 标记
    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn switch_role(&mut self) {
        self.role = self.role.other();
    }

    /// 记录一次猜测。计数在第 4 次连续猜测时归零，而不是一直累加。
    pub fn record_guess(&mut self, guess: Guess) {
        self.set_guess(guess);
        self.guess_count = if self.guess_count > 2 { 0 } else { self.guess_count + 1 };
    }

    pub fn can_pass(&self) -> bool {
        self.guess_count < PASS_LIMIT
    }
}

/// 一局游戏的完整状态，也就是存档的内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: GameId,
    pub pot: u32,  // 场上积分 (points on the line)
    pub players: [PlayerState; 2],
    pub deck: Deck,
    #[serde(default)]
    pub pending: Option<PendingResolution>,
    #[serde(default)]
    pub game_over: bool,
}

// --- GameState 的实现方法 ---

impl GameState {
    /// 新开一局：玩家 1 是庄家并先行动，玩家 2 是猜牌者
    pub fn new(deck: Deck) -> Self {
        GameState {
            game_id: Uuid::new_v4(),
            pot: 0,
            players: [
                PlayerState::new("player1", "Player 1", Role::Dealer, true),
                PlayerState::new("player2", "Player 2", Role::Guesser, false),
            ],
            deck,
            pending: None,
            game_over: false,
        }
    }

    /// 当前行动玩家在 players 中的索引。不变量保证恰好一个玩家 active。
    pub fn active_idx(&self) -> usize {
        if self.players[0].active { 0 } else { 1 }
    }

    pub fn inactive_idx(&self) -> usize {
        1 - self.active_idx()
    }

    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.active_idx()]
    }

    pub fn inactive_player(&self) -> &PlayerState {
        &self.players[self.inactive_idx()]
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.pending.is_some() {
            Phase::Resolving
        } else {
            match self.active_player().role {
                Role::Guesser => Phase::AwaitingGuess,
                Role::Dealer => Phase::AwaitingDraw,
            }
        }
    }

    /// 检查从存档恢复的状态是否满足所有不变量
    pub fn validate(&self) -> Result<(), GameError> {
        let [p0, p1] = &self.players;
        if p0.id == p1.id {
            return Err(corrupt(format!("两个玩家的 id 相同: {}", p0.id)));
        }
        if p0.active == p1.active {
            return Err(corrupt("必须恰好有一个玩家处于行动状态"));
        }
        if p0.role == p1.role {
            return Err(corrupt(format!("两个玩家的角色相同: {:?}", p0.role)));
        }
        if let Some(p) = self.players.iter().find(|p| p.guess_count > PASS_LIMIT) {
            return Err(corrupt(format!("{} 的猜测次数 {} 超出范围", p.id, p.guess_count)));
        }

        let inactive = self.inactive_player();
        let guess_waiting = inactive.role == Role::Guesser && inactive.guess.is_some();
        if (guess_waiting || self.pending.is_some()) && self.deck.active_card().is_none() {
            return Err(corrupt("存在待结算的猜测，但没有翻开的牌"));
        }
        if self.game_over && self.pending.is_some() {
            return Err(corrupt("游戏已经结束，却还有挂起的结算"));
        }
        // 牌堆剩最后一张时游戏必然已结束
        if !self.game_over && self.deck.remaining() <= 1 {
            return Err(corrupt(format!("牌堆只剩 {} 张，但游戏没有结束", self.deck.remaining())));
        }
        Ok(())
    }
}

fn corrupt(detail: impl Into<String>) -> GameError {
    GameError::StaleOrCorruptState(detail.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};

    #[test]
    fn test_guess_count_wraps_on_fourth_guess() {
        let mut p = PlayerState::new("p", "P", Role::Guesser, true);
        let counts: Vec<u8> = (0..8)
            .map(|_| {
                p.record_guess(Guess::Higher);
                p.guess_count
            })
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 0, 1, 2, 3, 0]);
        assert_eq!(p.guess, Some(Guess::Higher));
    }

    #[test]
    fn test_can_pass_below_limit() {
        let mut p = PlayerState::new("p", "P", Role::Guesser, true);
        for expected in [true, true, false] {
            p.record_guess(Guess::Lower);
            assert_eq!(p.can_pass(), expected, "guess_count = {}", p.guess_count);
        }
        p.record_guess(Guess::Lower);
        assert!(p.can_pass(), "第 4 次猜测后计数归零，应当又能过牌");
    }

    #[test]
    fn test_player_mutators() {
        let mut p = PlayerState::new("p", "P", Role::Dealer, false);
        p.toggle();
        assert!(p.active);
        p.switch_role();
        assert_eq!(p.role, Role::Guesser);
        p.increment_score(4);
        p.increment_score(3);
        assert_eq!(p.score, 7);
        p.set_guess(Guess::Lower);
        p.clear_guess();
        assert_eq!(p.guess, None);
    }

    #[test]
    fn test_new_game_phase() {
        let state = GameState::new(Deck::shuffled());
        assert_eq!(state.phase(), Phase::AwaitingDraw);
        assert_eq!(state.active_player().id, "player1");
        assert_eq!(state.inactive_player().role, Role::Guesser);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_persisted_field_names() {
        let state = GameState::new(Deck::from_cards([Card::new(Rank::Two, Suit::Club)]));
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();

        assert_eq!(json["pot"], 0);
        assert_eq!(json["players"].as_array().unwrap().len(), 2);
        let p = &json["players"][1];
        assert_eq!(p["role"], "guesser");
        assert_eq!(p["guessCount"], 0);
        assert!(p["guess"].is_null());
        assert_eq!(json["deck"]["cards"].as_array().unwrap().len(), 1);
        assert!(json["deck"]["activeCard"].is_null());
        assert_eq!(json["gameOver"], false);
    }

    #[test]
    fn test_validate_rejects_broken_invariants() {
        let mut same_role = GameState::new(Deck::shuffled());
        same_role.players[1].role = Role::Dealer;
        assert!(matches!(same_role.validate(), Err(GameError::StaleOrCorruptState(_))));

        let mut both_active = GameState::new(Deck::shuffled());
        both_active.players[1].active = true;
        assert!(both_active.validate().is_err());

        let mut bad_count = GameState::new(Deck::shuffled());
        bad_count.players[0].guess_count = 4;
        assert!(bad_count.validate().is_err());

        let mut dangling_guess = GameState::new(Deck::shuffled());
        dangling_guess.players[1].guess = Some(Guess::Higher);
        assert!(dangling_guess.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inconsistent_game_over() {
        let mut deck = Deck::from_cards([Card::new(Rank::Five, Suit::Club), Card::new(Rank::Nine, Suit::Club)]);
        deck.draw().unwrap();

        let mut pending_after_end = GameState::new(deck.clone());
        pending_after_end.game_over = true;
        assert!(pending_after_end.validate().is_ok());
        pending_after_end.pending = Some(PendingResolution::Correct);
        assert!(matches!(pending_after_end.validate(), Err(GameError::StaleOrCorruptState(_))));

        // 只剩一张牌却没有结束
        let still_running = GameState::new(deck);
        assert!(still_running.validate().is_err());
        assert!(GameState::new(Deck::from_cards(Vec::<Card>::new())).validate().is_err());
    }
}
