// Card games and instant wagers. Rules are pure modules; the service owns
// the session tables and the ledger interaction.

pub mod blackjack;
pub mod cards;
pub mod gambling_service;
pub mod highlow;
pub mod quick_games;

pub use blackjack::{BlackjackGame, HandOutcome, OpeningBlackjack, Settlement};
pub use cards::{Card, Deck};
pub use gambling_service::{
    BlackjackProgress, BlackjackStart, GamblingError, GamblingService, GamblingStats,
    HighLowCashOut, HighLowProgress, QuickResult,
};
pub use highlow::{Guess, GuessOutcome, HighLowGame};
pub use quick_games::{CoinSide, WheelColor};
