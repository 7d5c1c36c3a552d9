// High-low: guess whether the next card ranks above or below the current
// one. Ties always count as a wrong guess. The streak multiplier table is
// capped, so grinding past six correct guesses adds risk without reward.

use super::cards::{Card, Deck};
use thiserror::Error;

/// Streak -> payout multiplier. Streaks beyond the table clamp to the last
/// entry.
const STREAK_MULTIPLIERS: [(u32, f64); 6] = [
    (1, 1.1),
    (2, 1.25),
    (3, 1.5),
    (4, 2.0),
    (5, 3.0),
    (6, 5.0),
];

pub fn multiplier_for_streak(streak: u32) -> f64 {
    match STREAK_MULTIPLIERS.iter().find(|(s, _)| *s == streak) {
        Some((_, mult)) => *mult,
        None if streak > 6 => 5.0,
        None => 0.0,
    }
}

#[derive(Debug, Error)]
pub enum HighLowError {
    #[error("nothing to cash out before the first correct guess")]
    NoStreak,
    #[error("the game is already over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Higher,
    Lower,
}

/// Result of one guess.
#[derive(Debug, Clone)]
pub enum GuessOutcome {
    /// Streak extended; the game continues from the drawn card.
    Correct { drawn: Card, streak: u32 },
    /// Wrong (or tied) guess; the stake is gone and the game is over.
    Wrong { drawn: Card },
}

#[derive(Debug, Clone)]
pub struct HighLowGame {
    deck: Deck,
    current_card: Card,
    streak: u32,
    total_bet: i64,
    game_over: bool,
}

impl HighLowGame {
    pub fn start(mut deck: Deck, bet: i64) -> Self {
        let current_card = deck.draw();
        Self {
            deck,
            current_card,
            streak: 0,
            total_bet: bet,
            game_over: false,
        }
    }

    pub fn current_card(&self) -> Card {
        self.current_card
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn total_bet(&self) -> i64 {
        self.total_bet
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// What a cash-out would pay at the current streak.
    pub fn potential_payout(&self) -> i64 {
        (self.total_bet as f64 * multiplier_for_streak(self.streak)).floor() as i64
    }

    /// Draw the next card and compare values strictly. Equal values lose
    /// regardless of the guess.
    pub fn guess(&mut self, guess: Guess) -> Result<GuessOutcome, HighLowError> {
        if self.game_over {
            return Err(HighLowError::GameOver);
        }
        let drawn = self.deck.draw();
        let correct = match guess {
            Guess::Higher => drawn.value() > self.current_card.value(),
            Guess::Lower => drawn.value() < self.current_card.value(),
        };
        self.current_card = drawn;
        if correct {
            self.streak += 1;
            Ok(GuessOutcome::Correct {
                drawn,
                streak: self.streak,
            })
        } else {
            self.game_over = true;
            Ok(GuessOutcome::Wrong { drawn })
        }
    }

    /// Take the winnings and end the game. Requires at least one correct
    /// guess.
    pub fn cash_out(&mut self) -> Result<i64, HighLowError> {
        if self.game_over {
            return Err(HighLowError::GameOver);
        }
        if self.streak == 0 {
            return Err(HighLowError::NoStreak);
        }
        self.game_over = true;
        Ok(self.potential_payout())
    }
}
