// Gambling orchestration - session tables, bet collection and settlement.
//
// Game rules live in blackjack.rs, highlow.rs and quick_games.rs; this
// service owns the active-game tables and is the only gambling code that
// touches the credit ledger. Bets are collected in full before a game
// starts, so settlement only ever deposits.
//
// Active games are keyed by user id, which is also how the single-game
// invariant is enforced: a user with an entry in either table cannot start
// anything else. Entries are removed from the table before any await and
// re-inserted afterwards, so no DashMap guard is held across a suspension
// point.

use super::blackjack::{ActionResult, BlackjackGame, BlackjackMoveError, OpeningBlackjack, Settlement};
use super::cards::Deck;
use super::highlow::{Guess, GuessOutcome, HighLowError, HighLowGame};
use super::quick_games::{
    self, CoinSide, CoinflipOutcome, ColorWheelOutcome, DiceOutcome, LuckyNumberOutcome,
    WheelColor,
};
use crate::core::economy::{CreditLedger, LedgerError};
use crate::core::profiles::ProfileStore;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum GamblingError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("finish your current game before starting another")]
    GameInProgress,
    #[error("no active game")]
    NoActiveGame,
    #[error("pick a dice total between 2 and 12")]
    InvalidDiceCall,
    #[error("pick a number between 1 and 100")]
    InvalidLuckyCall,
    #[error(transparent)]
    Blackjack(#[from] BlackjackMoveError),
    #[error(transparent)]
    HighLow(#[from] HighLowError),
}

/// Per-user lifetime counters, kept in memory for the stats command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GamblingStats {
    pub games_played: u64,
    pub games_won: u64,
    pub credits_wagered: i64,
    pub credits_won: i64,
}

struct BlackjackSession {
    guild_id: u64,
    game: BlackjackGame,
}

struct HighLowSession {
    guild_id: u64,
    game: HighLowGame,
}

// ============================================================================
// RESULT VIEWS
// ============================================================================

/// What the opening deal produced.
#[derive(Debug)]
pub enum BlackjackStart {
    /// Player must act; the game is now in the session table.
    InPlay(BlackjackGame),
    /// The opening hand was a natural and the round settled immediately.
    Natural {
        game: BlackjackGame,
        outcome: OpeningBlackjack,
        new_balance: i64,
    },
}

/// State after a blackjack action.
#[derive(Debug)]
pub enum BlackjackProgress {
    InPlay(BlackjackGame),
    Settled {
        game: BlackjackGame,
        settlement: Settlement,
        new_balance: i64,
    },
}

pub enum HighLowProgress {
    InPlay {
        game: HighLowGame,
        outcome: GuessOutcome,
    },
    Lost {
        game: HighLowGame,
        outcome: GuessOutcome,
    },
}

#[derive(Debug)]
pub struct HighLowCashOut {
    pub payout: i64,
    pub new_balance: i64,
}

/// A quick game's outcome plus the balance after settlement.
#[derive(Debug)]
pub struct QuickResult<O> {
    pub outcome: O,
    pub new_balance: i64,
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct GamblingService<S: ProfileStore + Clone> {
    ledger: CreditLedger<S>,
    blackjack_tables: DashMap<u64, BlackjackSession>,
    highlow_tables: DashMap<u64, HighLowSession>,
    stats: DashMap<u64, GamblingStats>,
}

impl<S: ProfileStore + Clone> GamblingService<S> {
    pub fn new(ledger: CreditLedger<S>) -> Self {
        Self {
            ledger,
            blackjack_tables: DashMap::new(),
            highlow_tables: DashMap::new(),
            stats: DashMap::new(),
        }
    }

    pub fn ledger(&self) -> &CreditLedger<S> {
        &self.ledger
    }

    pub fn stats_of(&self, user_id: u64) -> GamblingStats {
        self.stats
            .get(&user_id)
            .map(|s| *s)
            .unwrap_or_default()
    }

    pub fn has_active_game(&self, user_id: u64) -> bool {
        self.blackjack_tables.contains_key(&user_id) || self.highlow_tables.contains_key(&user_id)
    }

    fn ensure_idle(&self, user_id: u64) -> Result<(), GamblingError> {
        if self.has_active_game(user_id) {
            return Err(GamblingError::GameInProgress);
        }
        Ok(())
    }

    /// Bounds and balance are checked before any credits move; only then is
    /// the stake collected.
    async fn collect_bet(&self, user_id: u64, guild_id: u64, bet: i64) -> Result<(), GamblingError> {
        self.ledger.validate_bet(user_id, guild_id, bet).await?;
        self.ledger.withdraw(user_id, guild_id, bet).await?;
        Ok(())
    }

    fn record_result(&self, user_id: u64, wagered: i64, payout: i64) {
        let mut entry = self.stats.entry(user_id).or_default();
        entry.games_played += 1;
        entry.credits_wagered += wagered;
        if payout > wagered {
            entry.games_won += 1;
        }
        entry.credits_won += payout;
    }

    async fn settle(&self, user_id: u64, guild_id: u64, wagered: i64, payout: i64) -> i64 {
        self.record_result(user_id, wagered, payout);
        if payout <= 0 {
            return match self.ledger.balance(user_id, guild_id).await {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(user_id, error = %e, "failed to read balance after loss");
                    0
                }
            };
        }
        match self.ledger.deposit(user_id, guild_id, payout).await {
            Ok(balance) => balance,
            Err(e) => {
                // The stake is already gone; losing the payout too would be
                // worse, so log loudly rather than swallow silently.
                warn!(user_id, payout, error = %e, "failed to deposit payout");
                0
            }
        }
    }

    // ------------------------------------------------------------------------
    // Blackjack
    // ------------------------------------------------------------------------

    pub async fn start_blackjack(
        &self,
        user_id: u64,
        guild_id: u64,
        bet: i64,
    ) -> Result<BlackjackStart, GamblingError> {
        self.start_blackjack_with_deck(user_id, guild_id, bet, Deck::shuffled())
            .await
    }

    /// Start from a prepared deck. Split out so tests can stack the deal.
    pub async fn start_blackjack_with_deck(
        &self,
        user_id: u64,
        guild_id: u64,
        bet: i64,
        deck: Deck,
    ) -> Result<BlackjackStart, GamblingError> {
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;

        let mut game = BlackjackGame::deal(deck, bet);
        if let Some(outcome) = game.opening_blackjack() {
            let payout = match &outcome {
                OpeningBlackjack::Push { returned } => *returned,
                OpeningBlackjack::PlayerWins { payout } => *payout,
            };
            let new_balance = self.settle(user_id, guild_id, bet, payout).await;
            return Ok(BlackjackStart::Natural {
                game,
                outcome,
                new_balance,
            });
        }

        self.blackjack_tables
            .insert(user_id, BlackjackSession { guild_id, game: game.clone() });
        Ok(BlackjackStart::InPlay(game))
    }

    pub async fn blackjack_hit(&self, user_id: u64) -> Result<BlackjackProgress, GamblingError> {
        let mut session = self.take_blackjack(user_id)?;
        let result = session.game.hit()?;
        self.resume_or_settle(user_id, session, result).await
    }

    pub async fn blackjack_stand(&self, user_id: u64) -> Result<BlackjackProgress, GamblingError> {
        let mut session = self.take_blackjack(user_id)?;
        let result = session.game.stand()?;
        self.resume_or_settle(user_id, session, result).await
    }

    /// Double down: the extra stake is collected before the card is drawn,
    /// and the game is left untouched if the player cannot cover it.
    pub async fn blackjack_double(&self, user_id: u64) -> Result<BlackjackProgress, GamblingError> {
        let mut session = self.take_blackjack(user_id)?;
        let cost = match session.game.double_down_cost() {
            Some(cost) => cost,
            None => {
                self.blackjack_tables.insert(user_id, session);
                return Err(BlackjackMoveError::CannotDouble.into());
            }
        };
        if let Err(e) = self.collect_bet_unbounded(user_id, session.guild_id, cost).await {
            self.blackjack_tables.insert(user_id, session);
            return Err(e);
        }
        let result = match session.game.double_down() {
            Ok(result) => result,
            Err(e) => {
                // Refund the extra stake if the move is somehow rejected.
                let _ = self
                    .ledger
                    .deposit(user_id, session.guild_id, cost)
                    .await;
                self.blackjack_tables.insert(user_id, session);
                return Err(e.into());
            }
        };
        self.resume_or_settle(user_id, session, result).await
    }

    /// Resolve an idle blackjack game as a stand on every remaining hand.
    /// Used when the player walks away from the table.
    pub async fn blackjack_timeout(&self, user_id: u64) -> Result<BlackjackProgress, GamblingError> {
        let mut session = self.take_blackjack(user_id)?;
        let settlement = session.game.stand_all();
        let wagered = total_wagered(&session.game);
        let new_balance = self
            .settle(user_id, session.guild_id, wagered, settlement.total_payout)
            .await;
        Ok(BlackjackProgress::Settled {
            game: session.game,
            settlement,
            new_balance,
        })
    }

    fn take_blackjack(&self, user_id: u64) -> Result<BlackjackSession, GamblingError> {
        self.blackjack_tables
            .remove(&user_id)
            .map(|(_, session)| session)
            .ok_or(GamblingError::NoActiveGame)
    }

    /// Doubling is exempt from the bet bounds (the original stake already
    /// passed them) but still must be affordable.
    async fn collect_bet_unbounded(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: i64,
    ) -> Result<(), GamblingError> {
        self.ledger.withdraw(user_id, guild_id, amount).await?;
        Ok(())
    }

    async fn resume_or_settle(
        &self,
        user_id: u64,
        session: BlackjackSession,
        result: ActionResult,
    ) -> Result<BlackjackProgress, GamblingError> {
        match result {
            ActionResult::Continue => {
                let game = session.game.clone();
                self.blackjack_tables.insert(user_id, session);
                Ok(BlackjackProgress::InPlay(game))
            }
            ActionResult::Finished(settlement) => {
                let wagered = total_wagered(&session.game);
                let new_balance = self
                    .settle(user_id, session.guild_id, wagered, settlement.total_payout)
                    .await;
                Ok(BlackjackProgress::Settled {
                    game: session.game,
                    settlement,
                    new_balance,
                })
            }
        }
    }

    // ------------------------------------------------------------------------
    // High-low
    // ------------------------------------------------------------------------

    pub async fn start_highlow(
        &self,
        user_id: u64,
        guild_id: u64,
        bet: i64,
    ) -> Result<HighLowGame, GamblingError> {
        self.start_highlow_with_deck(user_id, guild_id, bet, Deck::shuffled())
            .await
    }

    pub async fn start_highlow_with_deck(
        &self,
        user_id: u64,
        guild_id: u64,
        bet: i64,
        deck: Deck,
    ) -> Result<HighLowGame, GamblingError> {
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;
        let game = HighLowGame::start(deck, bet);
        self.highlow_tables
            .insert(user_id, HighLowSession { guild_id, game: game.clone() });
        Ok(game)
    }

    pub async fn highlow_guess(
        &self,
        user_id: u64,
        guess: Guess,
    ) -> Result<HighLowProgress, GamblingError> {
        let mut session = self.take_highlow(user_id)?;
        let outcome = session.game.guess(guess)?;
        match outcome {
            GuessOutcome::Correct { .. } => {
                let game = session.game.clone();
                self.highlow_tables.insert(user_id, session);
                Ok(HighLowProgress::InPlay { game, outcome })
            }
            GuessOutcome::Wrong { .. } => {
                self.settle(user_id, session.guild_id, session.game.total_bet(), 0)
                    .await;
                Ok(HighLowProgress::Lost {
                    game: session.game,
                    outcome,
                })
            }
        }
    }

    /// Cash out the streak. Rejected before the first correct guess, in
    /// which case the game stays live.
    pub async fn highlow_cash_out(&self, user_id: u64) -> Result<HighLowCashOut, GamblingError> {
        let mut session = self.take_highlow(user_id)?;
        let payout = match session.game.cash_out() {
            Ok(payout) => payout,
            Err(e) => {
                self.highlow_tables.insert(user_id, session);
                return Err(e.into());
            }
        };
        let new_balance = self
            .settle(user_id, session.guild_id, session.game.total_bet(), payout)
            .await;
        Ok(HighLowCashOut { payout, new_balance })
    }

    /// Drop an abandoned high-low game. The stake is forfeited.
    pub async fn highlow_timeout(&self, user_id: u64) -> Result<(), GamblingError> {
        let session = self.take_highlow(user_id)?;
        self.settle(user_id, session.guild_id, session.game.total_bet(), 0)
            .await;
        Ok(())
    }

    fn take_highlow(&self, user_id: u64) -> Result<HighLowSession, GamblingError> {
        self.highlow_tables
            .remove(&user_id)
            .map(|(_, session)| session)
            .ok_or(GamblingError::NoActiveGame)
    }

    // ------------------------------------------------------------------------
    // Quick games
    // ------------------------------------------------------------------------

    pub async fn coinflip(
        &self,
        user_id: u64,
        guild_id: u64,
        call: CoinSide,
        bet: i64,
    ) -> Result<QuickResult<CoinflipOutcome>, GamblingError> {
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;
        let outcome = quick_games::coinflip(&mut StdRng::from_entropy(), call, bet);
        let new_balance = self.settle(user_id, guild_id, bet, outcome.payout).await;
        Ok(QuickResult { outcome, new_balance })
    }

    pub async fn dice(
        &self,
        user_id: u64,
        guild_id: u64,
        call: u32,
        bet: i64,
    ) -> Result<QuickResult<DiceOutcome>, GamblingError> {
        if !(2..=12).contains(&call) {
            return Err(GamblingError::InvalidDiceCall);
        }
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;
        let outcome = quick_games::dice_roll(&mut StdRng::from_entropy(), call, bet);
        let new_balance = self.settle(user_id, guild_id, bet, outcome.payout).await;
        Ok(QuickResult { outcome, new_balance })
    }

    pub async fn lucky_number(
        &self,
        user_id: u64,
        guild_id: u64,
        call: u32,
        bet: i64,
    ) -> Result<QuickResult<LuckyNumberOutcome>, GamblingError> {
        if !(1..=100).contains(&call) {
            return Err(GamblingError::InvalidLuckyCall);
        }
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;
        let outcome = quick_games::lucky_number(&mut StdRng::from_entropy(), call, bet);
        let new_balance = self.settle(user_id, guild_id, bet, outcome.payout).await;
        Ok(QuickResult { outcome, new_balance })
    }

    pub async fn color_wheel(
        &self,
        user_id: u64,
        guild_id: u64,
        call: WheelColor,
        bet: i64,
    ) -> Result<QuickResult<ColorWheelOutcome>, GamblingError> {
        self.ensure_idle(user_id)?;
        self.collect_bet(user_id, guild_id, bet).await?;
        let outcome = quick_games::color_wheel(&mut StdRng::from_entropy(), call, bet);
        let new_balance = self.settle(user_id, guild_id, bet, outcome.payout).await;
        Ok(QuickResult { outcome, new_balance })
    }
}

fn total_wagered(game: &BlackjackGame) -> i64 {
    game.player_hands().iter().map(|h| h.bet).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::economy::BetLimits;
    use crate::core::gambling::cards::{Card, Rank, Suit};
    use crate::infra::profiles::InMemoryProfileStore;
    use std::sync::Arc;

    fn card(rank: Rank) -> Card {
        Card::new(Suit::Spades, rank)
    }

    fn service() -> GamblingService<Arc<InMemoryProfileStore>> {
        let store = Arc::new(InMemoryProfileStore::new());
        GamblingService::new(CreditLedger::new(store, BetLimits::default()))
    }

    async fn fund(service: &GamblingService<Arc<InMemoryProfileStore>>, user: u64, amount: i64) {
        // Profiles start at 100; top up to the requested balance.
        service.ledger().deposit(user, 1, amount - 100).await.unwrap();
    }

    #[tokio::test]
    async fn natural_blackjack_pays_three_to_two() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![
            card(Rank::Ace),
            card(Rank::Nine),
            card(Rank::King),
            card(Rank::Seven),
        ]);
        match svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap() {
            BlackjackStart::Natural { new_balance, .. } => {
                // 1000 - 100 + floor(100 * 2.5)
                assert_eq!(new_balance, 1150);
            }
            BlackjackStart::InPlay(_) => panic!("expected an opening natural"),
        }
        assert!(!svc.has_active_game(1));
    }

    #[tokio::test]
    async fn second_game_rejected_without_deduction() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![
            card(Rank::Ten),
            card(Rank::Nine),
            card(Rank::Nine),
            card(Rank::Seven),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 900);

        let err = svc.start_highlow(1, 1, 100).await.unwrap_err();
        assert!(matches!(err, GamblingError::GameInProgress));
        // Balance untouched by the rejected start.
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 900);
    }

    #[tokio::test]
    async fn bet_rejected_before_collection() {
        let svc = service();
        // Starting balance 100, bet over the max.
        let err = svc.start_blackjack(1, 1, 20_000).await.unwrap_err();
        assert!(matches!(
            err,
            GamblingError::Ledger(LedgerError::BetTooLarge(10_000))
        ));
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 100);
        assert!(!svc.has_active_game(1));
    }

    #[tokio::test]
    async fn blackjack_stand_settles_and_frees_the_table() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        // Player 20, dealer 19: win pays 200 back.
        let deck = Deck::stacked(vec![
            card(Rank::Ten),
            card(Rank::Nine),
            card(Rank::King),
            Card::new(Suit::Hearts, Rank::Ten),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        match svc.blackjack_stand(1).await.unwrap() {
            BlackjackProgress::Settled { new_balance, .. } => {
                assert_eq!(new_balance, 1100);
            }
            BlackjackProgress::InPlay(_) => panic!("expected settlement"),
        }
        assert!(!svc.has_active_game(1));
        assert!(matches!(
            svc.blackjack_stand(1).await.unwrap_err(),
            GamblingError::NoActiveGame
        ));
    }

    #[tokio::test]
    async fn double_down_collects_extra_stake() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        // Player 5+6 doubles into a 9 (20); dealer 10+9 stands on 19.
        let deck = Deck::stacked(vec![
            card(Rank::Five),
            card(Rank::Ten),
            card(Rank::Six),
            card(Rank::Nine),
            Card::new(Suit::Hearts, Rank::Nine),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 900);
        match svc.blackjack_double(1).await.unwrap() {
            BlackjackProgress::Settled { new_balance, settlement, .. } => {
                assert_eq!(settlement.total_payout, 400);
                // 900 - 100 extra stake + 400 payout.
                assert_eq!(new_balance, 1200);
            }
            BlackjackProgress::InPlay(_) => panic!("double down must finish the hand"),
        }
    }

    #[tokio::test]
    async fn double_down_without_credits_leaves_game_live() {
        let svc = service();
        fund(&svc, 1, 110).await;
        let deck = Deck::stacked(vec![
            card(Rank::Five),
            card(Rank::Ten),
            card(Rank::Six),
            card(Rank::Nine),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        // 10 credits left; doubling needs another 100.
        let err = svc.blackjack_double(1).await.unwrap_err();
        assert!(matches!(
            err,
            GamblingError::Ledger(LedgerError::InsufficientCredits { .. })
        ));
        assert!(svc.has_active_game(1));
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn blackjack_timeout_stands_remaining_hands() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        // Player 15 vs dealer 19: timeout stands and loses.
        let deck = Deck::stacked(vec![
            card(Rank::Ten),
            card(Rank::Nine),
            card(Rank::Five),
            Card::new(Suit::Hearts, Rank::Ten),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        match svc.blackjack_timeout(1).await.unwrap() {
            BlackjackProgress::Settled { new_balance, .. } => assert_eq!(new_balance, 900),
            BlackjackProgress::InPlay(_) => panic!("timeout must settle"),
        }
        assert!(!svc.has_active_game(1));
    }

    #[tokio::test]
    async fn highlow_cash_out_deposits_winnings() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![
            card(Rank::Two),
            card(Rank::Five),
            card(Rank::Nine),
            card(Rank::King),
        ]);
        svc.start_highlow_with_deck(1, 1, 100, deck).await.unwrap();
        for _ in 0..3 {
            assert!(matches!(
                svc.highlow_guess(1, Guess::Higher).await.unwrap(),
                HighLowProgress::InPlay { .. }
            ));
        }
        let result = svc.highlow_cash_out(1).await.unwrap();
        // floor(100 * 1.5) on a streak of three.
        assert_eq!(result.payout, 150);
        assert_eq!(result.new_balance, 1050);
        assert!(!svc.has_active_game(1));
    }

    #[tokio::test]
    async fn highlow_cash_out_without_streak_keeps_game_live() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![card(Rank::Seven)]);
        svc.start_highlow_with_deck(1, 1, 100, deck).await.unwrap();
        assert!(matches!(
            svc.highlow_cash_out(1).await.unwrap_err(),
            GamblingError::HighLow(HighLowError::NoStreak)
        ));
        assert!(svc.has_active_game(1));
    }

    #[tokio::test]
    async fn highlow_wrong_guess_forfeits_stake() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![card(Rank::Nine), card(Rank::Five)]);
        svc.start_highlow_with_deck(1, 1, 100, deck).await.unwrap();
        assert!(matches!(
            svc.highlow_guess(1, Guess::Higher).await.unwrap(),
            HighLowProgress::Lost { .. }
        ));
        assert!(!svc.has_active_game(1));
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 900);
    }

    #[tokio::test]
    async fn dice_rejects_impossible_calls() {
        let svc = service();
        assert!(matches!(
            svc.dice(1, 1, 13, 10).await.unwrap_err(),
            GamblingError::InvalidDiceCall
        ));
        assert!(matches!(
            svc.lucky_number(1, 1, 0, 10).await.unwrap_err(),
            GamblingError::InvalidLuckyCall
        ));
        // Nothing was collected for the rejected calls.
        assert_eq!(svc.ledger().balance(1, 1).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn stats_track_plays_and_wins() {
        let svc = service();
        fund(&svc, 1, 1000).await;
        let deck = Deck::stacked(vec![
            card(Rank::Ten),
            card(Rank::Nine),
            card(Rank::King),
            Card::new(Suit::Hearts, Rank::Ten),
        ]);
        svc.start_blackjack_with_deck(1, 1, 100, deck).await.unwrap();
        svc.blackjack_stand(1).await.unwrap();
        let stats = svc.stats_of(1);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.credits_wagered, 100);
        assert_eq!(stats.credits_won, 200);
    }
}
