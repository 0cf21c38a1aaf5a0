use crate::error::GameError;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
// --- 核心数据结构定义 ---

/// 花色 (Suit)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,   // 黑桃 ♠️
    Heart,   // 红心 ♥️
    Club,    // 梅花 ♣️
    Diamond, // 方块 ♦️
}

/// 点数 (Rank)
/// Hi-Lo 中 Ace 固定为最大，Ord 的派生顺序即比大小的顺序
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// 单张扑克牌 (Card)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Spade => "♠️",
            Suit::Heart => "♥️",
            Suit::Club => "♣️",
            Suit::Diamond => "♦️",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

// --- 牌堆 ---

/// 一副牌堆：未摸的牌、当前翻开的牌(弃牌堆顶)以及上一张翻开的牌。
///
/// 牌堆本身不关心轮次和角色，只负责摸牌与比较大小。
/// 点数相同时 `is_active_card_higher_than_prev` 返回 false，
/// 也就是说平局按"猜小"算对。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    cards: VecDeque<Card>,  // 下一张要摸的牌在队首
    active_card: Option<Card>,
    prev_card: Option<Card>,
}

/// 创建一副完整的 52 张扑克牌
fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

impl Deck {
    /// 洗好的一副新牌
    pub fn shuffled() -> Deck {
        let mut cards = create_deck();
        let mut rng = rand::rng();
        cards.shuffle(&mut rng);
        Deck::from_cards(cards)
    }

    /// 按给定顺序摸牌的牌堆，第一个元素最先被摸到
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Deck {
        Deck {
            cards: cards.into_iter().collect(),
            active_card: None,
            prev_card: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn active_card(&self) -> Option<Card> {
        self.active_card
    }

    pub fn prev_card(&self) -> Option<Card> {
        self.prev_card
    }

    /// 摸一张牌：当前翻开的牌变成"上一张"，新牌翻开
    pub fn draw(&mut self) -> Result<Card, GameError> {
        let card = self.cards.pop_front().ok_or(GameError::DeckExhausted)?;
        self.prev_card = self.active_card.replace(card);
        Ok(card)
    }

    /// 清空弃牌堆
    pub fn clear_active_card(&mut self) {
        self.active_card = None;
    }

    pub fn is_active_card_higher_than_prev(&self) -> bool {
        match (self.active_card, self.prev_card) {
            (Some(active), Some(prev)) => active.rank > prev.rank,
            _ => false,
        }
    }
}

// --- 单元测试 ---
