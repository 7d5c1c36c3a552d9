// Blackjack rules: hand valuation, the per-hand turn machine and the dealer
// play-out with settlement. Credits never move in this module - the game
// reports payouts and the gambling service applies them to the ledger.

use super::cards::{Card, Deck};
use std::fmt;
use thiserror::Error;

pub const DEALER_STAND_VALUE: u32 = 17;

/// Floor(bet * 2.5): the original bet back plus 3:2 winnings.
pub fn natural_payout(bet: i64) -> i64 {
    bet * 5 / 2
}

#[derive(Debug, Error)]
pub enum BlackjackMoveError {
    #[error("double down is only allowed on a fresh two-card hand")]
    CannotDouble,
    #[error("the game is already over")]
    GameOver,
}

// ============================================================================
// HAND
// ============================================================================

/// One blackjack hand. `split` exists for forward compatibility with a future
/// split action; nothing creates a second hand today.
#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<Card>,
    pub bet: i64,
    pub doubled: bool,
    pub split: bool,
}

impl Hand {
    pub fn new(bet: i64) -> Self {
        Self {
            cards: Vec::with_capacity(4),
            bet,
            doubled: false,
            split: false,
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Best value: aces start at 11 and are demoted to 1 one at a time while
    /// the total is over 21.
    pub fn value(&self) -> u32 {
        let mut total: u32 = self.cards.iter().map(|c| c.value()).sum();
        let mut soft_aces = self.cards.iter().filter(|c| c.is_ace()).count();
        while total > 21 && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        total
    }

    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// A natural: exactly two cards valuing 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    pub fn can_double(&self) -> bool {
        self.cards.len() == 2 && !self.doubled
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for card in &self.cards {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// SETTLEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOutcome {
    Bust { lost: i64 },
    Win { payout: i64 },
    BlackjackWin { payout: i64 },
    Push { returned: i64 },
    Lose { lost: i64 },
}

impl HandOutcome {
    /// Credits owed back to the player for this hand (bets were collected at
    /// deal time, so losses pay nothing here).
    pub fn payout(&self) -> i64 {
        match self {
            HandOutcome::Win { payout } | HandOutcome::BlackjackWin { payout } => *payout,
            HandOutcome::Push { returned } => *returned,
            HandOutcome::Bust { .. } | HandOutcome::Lose { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub outcomes: Vec<HandOutcome>,
    pub dealer_value: u32,
    pub total_payout: i64,
}

/// What happened after a player action.
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// Same or next hand still awaits a decision.
    Continue,
    /// Dealer has played out and the game is settled.
    Finished(Settlement),
}

/// Outcome of the opening deal when the sole hand is a natural.
#[derive(Debug, Clone)]
pub enum OpeningBlackjack {
    /// Dealer also has a natural; the bet comes straight back.
    Push { returned: i64 },
    /// Player natural wins 3:2 immediately.
    PlayerWins { payout: i64 },
}

// ============================================================================
// GAME
// ============================================================================

/// One player's blackjack round. Multiple hands are only reachable through a
/// future split action, but settlement already iterates all of them.
#[derive(Debug, Clone)]
pub struct BlackjackGame {
    deck: Deck,
    player_hands: Vec<Hand>,
    dealer_hand: Hand,
    current_hand: usize,
    game_over: bool,
}

impl BlackjackGame {
    /// Deal a new round: two cards each, alternating player/dealer. The bet
    /// must already have been collected by the caller.
    pub fn deal(mut deck: Deck, bet: i64) -> Self {
        let mut player = Hand::new(bet);
        let mut dealer = Hand::new(0);
        player.add_card(deck.draw());
        dealer.add_card(deck.draw());
        player.add_card(deck.draw());
        dealer.add_card(deck.draw());
        Self {
            deck,
            player_hands: vec![player],
            dealer_hand: dealer,
            current_hand: 0,
            game_over: false,
        }
    }

    pub fn player_hands(&self) -> &[Hand] {
        &self.player_hands
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn current_hand_index(&self) -> usize {
        self.current_hand
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    fn active_hand(&mut self) -> &mut Hand {
        // current_hand is only ever advanced while in range.
        &mut self.player_hands[self.current_hand]
    }

    /// Check the opening deal for a natural on the player's sole hand. Only
    /// meaningful before any action was taken.
    pub fn opening_blackjack(&mut self) -> Option<OpeningBlackjack> {
        if self.player_hands.len() != 1 || !self.player_hands[0].is_blackjack() {
            return None;
        }
        self.game_over = true;
        let bet = self.player_hands[0].bet;
        if self.dealer_hand.is_blackjack() {
            Some(OpeningBlackjack::Push { returned: bet })
        } else {
            Some(OpeningBlackjack::PlayerWins {
                payout: natural_payout(bet),
            })
        }
    }

    /// Draw one card into the active hand. A bust forces an advance.
    pub fn hit(&mut self) -> Result<ActionResult, BlackjackMoveError> {
        if self.game_over {
            return Err(BlackjackMoveError::GameOver);
        }
        let card = self.deck.draw();
        self.active_hand().add_card(card);
        if self.active_hand().is_bust() {
            Ok(self.advance())
        } else {
            Ok(ActionResult::Continue)
        }
    }

    /// Keep the active hand and move on.
    pub fn stand(&mut self) -> Result<ActionResult, BlackjackMoveError> {
        if self.game_over {
            return Err(BlackjackMoveError::GameOver);
        }
        Ok(self.advance())
    }

    /// Double the bet, draw exactly one card and force an advance. The
    /// caller is responsible for having collected the additional bet first.
    pub fn double_down(&mut self) -> Result<ActionResult, BlackjackMoveError> {
        if self.game_over {
            return Err(BlackjackMoveError::GameOver);
        }
        if !self.active_hand().can_double() {
            return Err(BlackjackMoveError::CannotDouble);
        }
        let hand = self.active_hand();
        hand.bet *= 2;
        hand.doubled = true;
        let card = self.deck.draw();
        self.active_hand().add_card(card);
        Ok(self.advance())
    }

    /// The additional stake required to double the active hand.
    pub fn double_down_cost(&self) -> Option<i64> {
        let hand = self.player_hands.get(self.current_hand)?;
        hand.can_double().then_some(hand.bet)
    }

    /// Resolve an abandoned game as if the player stood on every remaining
    /// hand.
    pub fn stand_all(&mut self) -> Settlement {
        loop {
            match self.advance() {
                ActionResult::Continue => continue,
                ActionResult::Finished(settlement) => return settlement,
            }
        }
    }

    fn advance(&mut self) -> ActionResult {
        if self.current_hand + 1 < self.player_hands.len() {
            self.current_hand += 1;
            ActionResult::Continue
        } else {
            ActionResult::Finished(self.finish())
        }
    }

    /// Dealer plays out (hits below 17, stands on all 17s) and every hand is
    /// settled against the dealer's final value.
    fn finish(&mut self) -> Settlement {
        while self.dealer_hand.value() < DEALER_STAND_VALUE {
            let card = self.deck.draw();
            self.dealer_hand.add_card(card);
        }
        self.game_over = true;

        let dealer_value = self.dealer_hand.value();
        let dealer_bust = self.dealer_hand.is_bust();

        let outcomes: Vec<HandOutcome> = self
            .player_hands
            .iter()
            .map(|hand| {
                if hand.is_bust() {
                    return HandOutcome::Bust { lost: hand.bet };
                }
                let player_value = hand.value();
                if dealer_bust || player_value > dealer_value {
                    if hand.is_blackjack() {
                        HandOutcome::BlackjackWin {
                            payout: natural_payout(hand.bet),
                        }
                    } else {
                        HandOutcome::Win {
                            payout: hand.bet * 2,
                        }
                    }
                } else if player_value == dealer_value {
                    HandOutcome::Push { returned: hand.bet }
                } else {
                    HandOutcome::Lose { lost: hand.bet }
                }
            })
            .collect();

        let total_payout = outcomes.iter().map(HandOutcome::payout).sum();
        Settlement {
            outcomes,
            dealer_value,
            total_payout,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gambling::cards::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Spades, rank)
    }

    fn hand_of(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new(100);
        for &rank in ranks {
            hand.add_card(card(rank));
        }
        hand
    }

    #[test]
    fn ace_demotion() {
        // A + A + 9: one ace stays 11, one drops to 1.
        assert_eq!(hand_of(&[Rank::Ace, Rank::Ace, Rank::Nine]).value(), 21);
        assert_eq!(hand_of(&[Rank::Ace, Rank::Ace]).value(), 12);
        assert_eq!(
            hand_of(&[Rank::Ace, Rank::Ace, Rank::Ace, Rank::Ten]).value(),
            13
        );
    }

    #[test]
    fn king_queen_is_twenty_not_natural() {
        let hand = hand_of(&[Rank::King, Rank::Queen]);
        assert_eq!(hand.value(), 20);
        assert!(!hand.is_blackjack());
    }

    #[test]
    fn natural_is_two_card_21() {
        assert!(hand_of(&[Rank::Ace, Rank::King]).is_blackjack());
        // Three-card 21 is not a natural.
        assert!(!hand_of(&[Rank::Seven, Rank::Seven, Rank::Seven]).is_blackjack());
    }

    #[test]
    fn bust_detection() {
        let hand = hand_of(&[Rank::Ten, Rank::Nine, Rank::Five]);
        assert_eq!(hand.value(), 24);
        assert!(hand.is_bust());
    }

    #[test]
    fn natural_payout_floors() {
        assert_eq!(natural_payout(100), 250);
        assert_eq!(natural_payout(15), 37); // floor(37.5)
    }

    // Deal order is player, dealer, player, dealer.
    fn stacked_game(bet: i64, cards: Vec<Card>) -> BlackjackGame {
        BlackjackGame::deal(Deck::stacked(cards), bet)
    }

    #[test]
    fn opening_natural_wins_immediately() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ace),
                card(Rank::Nine),
                card(Rank::King),
                card(Rank::Seven),
            ],
        );
        match game.opening_blackjack() {
            Some(OpeningBlackjack::PlayerWins { payout }) => assert_eq!(payout, 250),
            other => panic!("expected immediate win, got {:?}", other),
        }
        assert!(game.is_over());
    }

    #[test]
    fn opening_double_natural_pushes() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ace),
                Card::new(Suit::Hearts, Rank::Ace),
                card(Rank::King),
                Card::new(Suit::Hearts, Rank::King),
            ],
        );
        match game.opening_blackjack() {
            Some(OpeningBlackjack::Push { returned }) => assert_eq!(returned, 100),
            other => panic!("expected push, got {:?}", other),
        }
    }

    #[test]
    fn no_opening_outcome_without_natural() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::Nine),
                card(Rank::Seven),
            ],
        );
        assert!(game.opening_blackjack().is_none());
        assert!(!game.is_over());
    }

    #[test]
    fn hit_into_bust_finishes_single_hand_game() {
        // Player 10+9, dealer 9+7 (16, must draw), player hits a king -> bust.
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::Nine),
                card(Rank::Seven),
                card(Rank::King),                    // player's bust card
                Card::new(Suit::Hearts, Rank::Five), // dealer draw to 21
            ],
        );
        match game.hit().unwrap() {
            ActionResult::Finished(settlement) => {
                assert_eq!(settlement.outcomes, vec![HandOutcome::Bust { lost: 100 }]);
                assert_eq!(settlement.total_payout, 0);
            }
            ActionResult::Continue => panic!("bust should end the game"),
        }
    }

    #[test]
    fn stand_settles_against_dealer() {
        // Player 20 vs dealer 19: even-money win pays 2x the bet.
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::King),
                Card::new(Suit::Hearts, Rank::Ten), // dealer 19, stands
            ],
        );
        match game.stand().unwrap() {
            ActionResult::Finished(settlement) => {
                assert_eq!(settlement.dealer_value, 19);
                assert_eq!(settlement.outcomes, vec![HandOutcome::Win { payout: 200 }]);
                assert_eq!(settlement.total_payout, 200);
            }
            ActionResult::Continue => panic!("single hand stand must finish"),
        }
    }

    #[test]
    fn equal_values_push() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::Nine),
                Card::new(Suit::Hearts, Rank::Ten), // dealer 19 vs player 19
            ],
        );
        match game.stand().unwrap() {
            ActionResult::Finished(settlement) => {
                assert_eq!(
                    settlement.outcomes,
                    vec![HandOutcome::Push { returned: 100 }]
                );
            }
            ActionResult::Continue => panic!("expected finish"),
        }
    }

    #[test]
    fn dealer_hits_below_17_and_stands_on_soft_17() {
        // Dealer A+6 (soft 17): stands, no draw.
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Ace),
                card(Rank::Nine),
                Card::new(Suit::Hearts, Rank::Six),
            ],
        );
        match game.stand().unwrap() {
            ActionResult::Finished(settlement) => {
                assert_eq!(settlement.dealer_value, 17);
                assert_eq!(game.dealer_hand().cards().len(), 2);
                // Player 19 beats soft 17.
                assert_eq!(settlement.total_payout, 200);
            }
            ActionResult::Continue => panic!("expected finish"),
        }
    }

    #[test]
    fn double_down_draws_exactly_one_card_and_forces_advance() {
        // Player 5+6, doubles, draws a 9 (20); dealer 10+9 stands on 19.
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Five),
                card(Rank::Ten),
                card(Rank::Six),
                card(Rank::Nine),
                Card::new(Suit::Hearts, Rank::Nine),
            ],
        );
        assert_eq!(game.double_down_cost(), Some(100));
        match game.double_down().unwrap() {
            ActionResult::Finished(settlement) => {
                let hand = &game.player_hands()[0];
                assert!(hand.doubled);
                assert_eq!(hand.bet, 200);
                assert_eq!(hand.cards().len(), 3);
                // Doubled bet wins even money: 400 back.
                assert_eq!(settlement.total_payout, 400);
            }
            ActionResult::Continue => panic!("double down must force the hand to finish"),
        }
    }

    #[test]
    fn double_down_rejected_after_hit() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Five),
                card(Rank::Ten),
                card(Rank::Six),
                card(Rank::Nine),
                card(Rank::Two), // hit -> 13, three cards now
                Card::new(Suit::Hearts, Rank::Nine),
            ],
        );
        assert!(matches!(game.hit().unwrap(), ActionResult::Continue));
        assert!(matches!(
            game.double_down(),
            Err(BlackjackMoveError::CannotDouble)
        ));
        assert_eq!(game.double_down_cost(), None);
    }

    #[test]
    fn stand_all_resolves_abandoned_game() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::Five),
                Card::new(Suit::Hearts, Rank::Ten), // dealer 19 vs player 15
            ],
        );
        let settlement = game.stand_all();
        assert_eq!(settlement.outcomes, vec![HandOutcome::Lose { lost: 100 }]);
        assert!(game.is_over());
    }

    #[test]
    fn actions_rejected_after_game_over() {
        let mut game = stacked_game(
            100,
            vec![
                card(Rank::Ten),
                card(Rank::Nine),
                card(Rank::Five),
                Card::new(Suit::Hearts, Rank::Ten),
            ],
        );
        game.stand_all();
        assert!(matches!(game.hit(), Err(BlackjackMoveError::GameOver)));
        assert!(matches!(game.stand(), Err(BlackjackMoveError::GameOver)));
    }
}
