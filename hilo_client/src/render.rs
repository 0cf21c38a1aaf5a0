use crossterm::style::Stylize;
use hilo_core::{FlashKind, GameView, Guess, Notification, Phase, PlayerState, Role};

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Dealer => "庄家",
        Role::Guesser => "猜牌者",
    }
}

fn guess_label(guess: Guess) -> &'static str {
    match guess {
        Guess::Higher => "更大",
        Guess::Lower => "更小",
    }
}

/// 标题：当前行动的玩家和他的角色
pub fn headline(view: &GameView) -> String {
    match view.player(&view.active_player) {
        Some(p) => format!("轮到 {}（{}）", p.name, role_label(p.role)),
        None => "轮到 ?".to_string(),
    }
}

/// 副标题：当前玩家能做什么
pub fn instruction(view: &GameView) -> String {
    match view.phase {
        Phase::AwaitingGuess if view.can_pass => "猜下一张牌更大(hi)还是更小(lo)，或者过牌(pass)".to_string(),
        Phase::AwaitingGuess => "猜下一张牌更大(hi)还是更小(lo)（已连续猜了 3 次，不能过牌）".to_string(),
        Phase::AwaitingDraw => "摸一张牌(draw)".to_string(),
        Phase::Resolving => "结算中……".to_string(),
        Phase::GameOver => "游戏结束，输入 reset 重新开始".to_string(),
    }
}

fn player_line(p: &PlayerState) -> String {
    format!("{} {} 分（{}）", p.name, p.score, role_label(p.role))
}

/// 把一个 GameView 渲染成终端里的几行文字
pub fn render_view(view: &GameView) -> String {
    let mut lines = vec![
        format!("==== {} ====", headline(view)),
        instruction(view),
        format!("场上积分: {} 分 | 剩余 {} 张牌", view.pot, view.cards_left),
        match view.active_card {
            Some(card) => format!("翻开的牌: {}", card),
            None => "翻开的牌: （空）".to_string(),
        },
    ];
    if let Some((name, guess)) = &view.guess_on_table {
        lines.push(format!("{} 猜下一张牌{}", name, guess_label(*guess)));
    }
    lines.push(view.players.iter().map(player_line).collect::<Vec<_>>().join(" | "));
    lines.join("\n")
}

/// 存档相关的通知不会在终端上输出任何内容
pub fn is_visible(notification: &Notification) -> bool {
    !matches!(notification, Notification::Save(_) | Notification::Cleared)
}

/// 表现层订阅者：存档相关的通知直接忽略
pub fn print_notification(notification: &Notification) {
    match notification {
        Notification::Render(view) => println!("\n{}", render_view(view)),
        Notification::Flash(FlashKind::Correct) => println!("{}", "猜对了！".green().bold()),
        Notification::Flash(FlashKind::Wrong) => println!("{}", "猜错了！".red().bold()),
        Notification::InvalidMove { reason, .. } => println!("{}", reason.to_string().yellow()),
        Notification::Error { message } => {
            println!("{}", message.as_str().red());
            println!("输入 reset 开始新游戏，exit 退出");
        }
        Notification::GameOver { scores } => {
            println!("{}", "牌堆只剩最后一张，游戏结束！".bold());
            for s in scores {
                println!("  {}: {} 分", s.name, s.score);
            }
        }
        Notification::Save(_) | Notification::Cleared => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilo_core::{Card, Deck, EngineConfig, GameEngine, Rank, Suit};

    fn engine() -> GameEngine {
        let cards = vec![Card::new(Rank::Queen, Suit::Diamond); 5];
        GameEngine::with_deck(EngineConfig::default(), Deck::from_cards(cards))
    }

    #[test]
    fn test_fresh_game_view() {
        let text = render_view(&engine().view());
        assert!(text.contains("轮到 Player 1（庄家）"));
        assert!(text.contains("摸一张牌(draw)"));
        assert!(text.contains("场上积分: 0 分 | 剩余 5 张牌"));
        assert!(text.contains("翻开的牌: （空）"));
    }

    #[test]
    fn test_dealer_sees_guess_on_table() {
        let mut engine = engine();
        engine.request_draw().unwrap();
        assert!(instruction(&engine.view()).contains("过牌(pass)"));

        engine.submit_guess(Guess::Lower).unwrap();
        let text = render_view(&engine.view());
        assert!(text.contains("轮到 Player 1（庄家）"));
        assert!(text.contains("Player 2 猜下一张牌更小"));
        assert!(text.contains(&format!("翻开的牌: {}", Card::new(Rank::Queen, Suit::Diamond))));
    }

    #[test]
    fn test_only_board_notifications_are_visible() {
        let mut engine = engine();
        engine.request_draw().unwrap();
        let notes = engine.drain_notifications();
        let visible: Vec<bool> = notes.iter().map(is_visible).collect();
        assert_eq!(visible, vec![true, false]);

        assert!(!is_visible(&Notification::Cleared));
        assert!(is_visible(&Notification::Flash(FlashKind::Wrong)));
    }
}
