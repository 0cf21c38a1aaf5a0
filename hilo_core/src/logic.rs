use crate::card::Deck;
use crate::config::EngineConfig;
use crate::error::{GameError, InvalidMove};
use crate::message::{Command, FlashKind, GameView, Notification, PlayerScore};
use crate::state::*;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// 判断一次猜测是否正确。平局怎么算由牌堆决定，这里只看"是否更大"。
pub fn is_correct_guess(guess: Guess, is_higher: bool) -> bool {
    if is_higher { guess == Guess::Higher } else { guess == Guess::Lower }
}

/// Hi-Lo 游戏引擎
///
/// 引擎独占 GameState，是唯一能修改玩家、奖池和牌堆的地方。
/// - 指令通过 [`GameEngine::handle`] 进入，被拒绝的指令也会产生通知。
/// - 所有状态变化都以 [`Notification`] 的形式放进发件箱，由上层取走分发。
/// - 猜测结算的延迟部分用挂起状态 + 虚拟时钟表示，调用 [`GameEngine::advance_to`] 推进。
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    config: EngineConfig,
    now_ms: u64,
    due_at_ms: u64,  // 挂起结算的到期时间，仅在 state.pending 存在时有意义
    last_draw_at_ms: Option<u64>,
    outbox: VecDeque<Notification>,
}

// --- 创建与恢复 ---

impl GameEngine {
    /// 用一副洗好的新牌开始新的一局
    pub fn new(config: EngineConfig) -> Self {
        Self::with_deck(config, Deck::shuffled())
    }

    pub fn with_deck(config: EngineConfig, deck: Deck) -> Self {
        let engine = Self::from_state(config, GameState::new(deck));
        info!(game_id = %engine.state.game_id, "开始新的一局");
        engine
    }

    /// 从存档恢复。解析失败或不满足不变量都视为存档损坏。
    ///
    /// 存档中如果有挂起的结算，它会在第一次推进时钟时立即执行。
    pub fn restore(config: EngineConfig, saved: &str) -> Result<Self, GameError> {
        let state: GameState = serde_json::from_str(saved)
            .map_err(|e| GameError::StaleOrCorruptState(e.to_string()))?;
        state.validate()?;
        info!(game_id = %state.game_id, pot = state.pot, "从存档恢复游戏");
        Ok(Self::from_state(config, state))
    }

    fn from_state(config: EngineConfig, state: GameState) -> Self {
        GameEngine {
            state,
            config,
            now_ms: 0,
            due_at_ms: 0,
            last_draw_at_ms: None,
            outbox: VecDeque::new(),
        }
    }

    /// 丢弃当前这一局，用新牌重开，并通知存档层清空存档
    pub fn reset(&mut self) {
        self.reset_with_deck(Deck::shuffled());
    }

    pub fn reset_with_deck(&mut self, deck: Deck) {
        self.state = GameState::new(deck);
        self.last_draw_at_ms = None;
        info!(game_id = %self.state.game_id, "重开游戏");
        self.outbox.push_back(Notification::Cleared);
        self.render();
    }
}

// --- 只读访问 ---

impl GameEngine {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn pot(&self) -> u32 {
        self.state.pot
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.state.players
    }

    pub fn deck(&self) -> &Deck {
        &self.state.deck
    }

    pub fn view(&self) -> GameView {
        GameView::from_state(&self.state)
    }

    /// 挂起结算的到期时间，没有挂起的结算时为 None
    pub fn next_due_ms(&self) -> Option<u64> {
        self.state.pending.map(|_| self.due_at_ms)
    }

    pub fn serialize(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// 取走发件箱中的全部通知
    pub fn drain_notifications(&mut self) -> VecDeque<Notification> {
        std::mem::take(&mut self.outbox)
    }
}

// --- 核心游戏流程函数 ---

impl GameEngine {
    /// 处理一条指令。被拒绝的指令会发出 InvalidMove 或 Error 通知，同时把错误返回给调用方。
    pub fn handle(&mut self, command: Command) -> Result<(), GameError> {
        let result = match command {
            Command::Draw => self.request_draw(),
            Command::Guess(guess) => self.submit_guess(guess),
            Command::Pass => self.pass(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
        };
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// 猜牌者提交猜测，然后轮到庄家
    pub fn submit_guess(&mut self, guess: Guess) -> Result<(), GameError> {
        self.ensure_idle()?;
        let idx = self.state.active_idx();
        let player = &mut self.state.players[idx];
        if player.role != Role::Guesser {
            return Err(InvalidMove::NotYourTurnToGuess { name: player.name.clone() }.into());
        }

        player.record_guess(guess);
        debug!(player = %player.id, ?guess, guess_count = player.guess_count, "提交猜测");
        self.switch_players();
        Ok(())
    }

    /// 猜牌者过牌：清掉自己的猜测，双方交换角色，再交换行动权
    pub fn pass(&mut self) -> Result<(), GameError> {
        self.ensure_idle()?;
        let player = self.state.active_player();
        if player.role != Role::Guesser {
            return Err(InvalidMove::NotYourTurnToGuess { name: player.name.clone() }.into());
        }
        if !player.can_pass() {
            return Err(InvalidMove::PassUnavailable { guess_count: player.guess_count }.into());
        }

        let idx = self.state.active_idx();
        self.state.players[idx].clear_guess();
        debug!(player = %self.state.players[idx].id, "过牌");
        self.switch_roles();
        self.switch_players();
        Ok(())
    }

    /// 庄家请求摸牌
    ///
    /// 冷却时间内的重复请求直接拒绝，冷却只在真正摸到牌时开始计算。
    pub fn request_draw(&mut self) -> Result<(), GameError> {
        self.ensure_idle()?;
        let player = self.state.active_player();
        if player.role != Role::Dealer {
            return Err(InvalidMove::NotYourTurnToDraw { name: player.name.clone() }.into());
        }
        if let Some(last) = self.last_draw_at_ms {
            let elapsed = self.now_ms.saturating_sub(last);
            if elapsed < self.config.draw_cooldown_ms {
                let remaining_ms = self.config.draw_cooldown_ms - elapsed;
                return Err(InvalidMove::DrawCoolingDown { remaining_ms }.into());
            }
        }

        let card = self.state.deck.draw()?;
        self.last_draw_at_ms = Some(self.now_ms);
        debug!(%card, remaining = self.state.deck.remaining(), "摸牌");
        self.on_card_drawn();
        Ok(())
    }

    /// 推进虚拟时钟，执行已到期的挂起结算。时钟不会倒退。
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);

        let Some(pending) = self.state.pending else { return };
        if self.now_ms < self.due_at_ms {
            return;
        }
        self.state.pending = None;
        match pending {
            PendingResolution::Correct => {
                self.state.pot += 1;
                self.switch_players();
            }
            PendingResolution::Incorrect => self.clear_discard_pile(),
        }
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        self.advance_to(self.now_ms.saturating_add(elapsed_ms));
    }

    /// 把当前状态序列化后交给存档层
    pub fn save(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => self.outbox.push_back(Notification::Save(json)),
            Err(e) => {
                error!("序列化游戏状态失败: {}", e);
                self.error(Some(&e.to_string()));
            }
        }
    }

    /// 发出无法恢复的错误，表现层据此询问用户是否重开
    pub fn error(&mut self, detail: Option<&str>) {
        let message = match detail {
            Some(detail) => format!("{} 要开始新游戏吗？", detail),
            None => "糟糕！游戏出了点问题。要开始新游戏吗？".to_string(),
        };
        self.outbox.push_back(Notification::Error { message });
    }
}

// --- 辅助逻辑函数 ---

impl GameEngine {
    fn ensure_idle(&self) -> Result<(), InvalidMove> {
        if self.state.game_over {
            return Err(InvalidMove::GameOver);
        }
        if self.state.pending.is_some() {
            return Err(InvalidMove::ResolutionPending);
        }
        Ok(())
    }

    fn report(&mut self, err: &GameError) {
        match err {
            GameError::InvalidMove(reason) => {
                let player = self.state.active_player().id.clone();
                warn!(%player, "拒绝指令: {}", reason);
                self.outbox.push_back(Notification::InvalidMove { player, reason: reason.clone() });
            }
            other => {
                error!("指令执行失败: {}", other);
                self.error(Some(&other.to_string()));
            }
        }
    }

    /// 摸到新牌之后：最后一张牌、结算猜测、或者只是累加奖池并换人
    fn on_card_drawn(&mut self) {
        if self.state.deck.remaining() == 1 {
            self.on_last_card_draw();
        } else if let Some(guess) = self.state.inactive_player().guess {
            self.check_guess(guess);
        } else {
            self.state.pot += 1;
            self.switch_players();
        }
    }

    /// 牌堆只剩最后一张时游戏结束。
    /// 不结算最后一次猜测，也不判定胜负，只公布当前分数。
    fn on_last_card_draw(&mut self) {
        self.state.game_over = true;
        let scores = PlayerScore::from_state(&self.state);
        info!(game_id = %self.state.game_id, ?scores, "牌堆只剩最后一张，游戏结束");
        self.outbox.push_back(Notification::GameOver { scores });
        self.render();
        self.save();
    }

    fn check_guess(&mut self, guess: Guess) {
        let is_higher = self.state.deck.is_active_card_higher_than_prev();
        if is_correct_guess(guess, is_higher) {
            self.on_correct_guess();
        } else {
            self.on_incorrect_guess();
        }
    }

    /// 猜对：先展示结果，延迟后奖池 +1 并换人。奖池不归任何人，继续累积。
    fn on_correct_guess(&mut self) {
        self.render();
        self.flash(FlashKind::Correct);
        self.schedule(PendingResolution::Correct, self.config.correct_delay_ms());
        self.save();
    }

    /// 猜错：猜牌者立即拿走奖池的分数，延迟后清空奖池和弃牌堆，行动权不变
    fn on_incorrect_guess(&mut self) {
        self.render();
        self.flash(FlashKind::Wrong);

        let pot = self.state.pot;
        let idx = self.state.inactive_idx();
        let guesser = &mut self.state.players[idx];
        guesser.increment_score(pot);
        guesser.clear_guess();
        debug!(player = %guesser.id, pot, score = guesser.score, "猜错，猜牌者得分");
        self.render();

        self.schedule(PendingResolution::Incorrect, self.config.incorrect_delay_ms());
        self.save();
    }

    fn clear_discard_pile(&mut self) {
        self.state.pot = 0;
        self.state.deck.clear_active_card();
        self.render();
        self.save();
    }

    fn schedule(&mut self, pending: PendingResolution, delay_ms: u64) {
        self.state.pending = Some(pending);
        self.due_at_ms = self.now_ms.saturating_add(delay_ms);
    }

    /// 交换行动权。两人游戏，所以两个玩家各自翻转即可。每次换人都会存档。
    fn switch_players(&mut self) {
        self.state.players.iter_mut().for_each(|p| p.toggle());
        self.render();
        self.save();
    }

    fn switch_roles(&mut self) {
        self.state.players.iter_mut().for_each(|p| p.switch_role());
    }

    fn flash(&mut self, kind: FlashKind) {
        self.outbox.push_back(Notification::Flash(kind));
    }

    fn render(&mut self) {
        self.outbox.push_back(Notification::Render(self.view()));
    }
}

// --- 单元测试 ---
