// Playing-card primitives shared by blackjack and high-low.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suit {
    Spades,
    Clubs,
    Diamonds,
    Hearts,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts];

    fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    fn label(self) -> &'static str {
        match self {
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
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Base value: aces count 11 here; blackjack hand valuation demotes them
    /// as needed, and high-low compares these values directly (so a 10 ties
    /// with any face card).
    pub fn value(self) -> u32 {
        match self.rank {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    pub fn is_ace(self) -> bool {
        self.rank == Rank::Ace
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// A consumable 52-card deck. Lives only as long as one game; reshuffles a
/// fresh 52 when it runs dry.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffled() -> Self {
        let mut cards = Self::fresh_cards();
        // thread_rng isn't Send; decks are held inside async state.
        cards.shuffle(&mut StdRng::from_entropy());
        Self { cards }
    }

    /// A deck that yields the given cards in order. Used to stack decks in
    /// tests.
    pub fn stacked(mut cards_in_draw_order: Vec<Card>) -> Self {
        cards_in_draw_order.reverse();
        Self {
            cards: cards_in_draw_order,
        }
    }

    fn fresh_cards() -> Vec<Card> {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
        cards
    }

    pub fn draw(&mut self) -> Card {
        if let Some(card) = self.cards.pop() {
            return card;
        }
        let mut fresh = Self::fresh_cards();
        fresh.shuffle(&mut StdRng::from_entropy());
        self.cards = fresh;
        // Refilled with 52 cards just above.
        match self.cards.pop() {
            Some(card) => card,
            None => unreachable!("deck refilled when empty"),
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fresh_deck_has_52_unique_cards() {
        let mut deck = Deck::shuffled();
        let mut seen = HashSet::new();
        for _ in 0..52 {
            let card = deck.draw();
            assert!(seen.insert((card.suit as u8, card.rank as u8)));
        }
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn exhausted_deck_reshuffles() {
        let mut deck = Deck::shuffled();
        for _ in 0..52 {
            deck.draw();
        }
        // 53rd draw comes from a fresh shuffle instead of panicking.
        deck.draw();
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn stacked_deck_draws_in_order() {
        let mut deck = Deck::stacked(vec![
            Card::new(Suit::Spades, Rank::Ace),
            Card::new(Suit::Hearts, Rank::King),
        ]);
        assert_eq!(deck.draw().rank, Rank::Ace);
        assert_eq!(deck.draw().rank, Rank::King);
    }

    #[test]
    fn card_values() {
        assert_eq!(Card::new(Suit::Spades, Rank::Two).value(), 2);
        assert_eq!(Card::new(Suit::Spades, Rank::Ten).value(), 10);
        assert_eq!(Card::new(Suit::Spades, Rank::King).value(), 10);
        assert_eq!(Card::new(Suit::Spades, Rank::Ace).value(), 11);
    }

    #[test]
    fn display_format() {
        assert_eq!(Card::new(Suit::Hearts, Rank::Queen).to_string(), "Q♥");
        assert_eq!(Card::new(Suit::Clubs, Rank::Ten).to_string(), "10♣");
    }
}
