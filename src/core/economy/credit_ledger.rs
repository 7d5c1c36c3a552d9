// Credit ledger - the single authority over credit balances.
//
// Both the leveling engine (daily credits) and the gambling engine (bets and
// payouts) mutate balances exclusively through this type, which enforces the
// zero floor: no code path may take a balance negative.

use crate::core::profiles::{ProfileStore, ProfileStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("minimum bet is {0} credits")]
    BetTooSmall(i64),
    #[error("maximum bet is {0} credits")]
    BetTooLarge(i64),
    #[error("insufficient credits: balance is {balance}")]
    InsufficientCredits { balance: i64 },
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ProfileStoreError> for LedgerError {
    fn from(e: ProfileStoreError) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

/// Wager bounds applied by `validate_bet`.
#[derive(Debug, Clone, Copy)]
pub struct BetLimits {
    pub min: i64,
    pub max: i64,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min: 10,
            max: 10_000,
        }
    }
}

#[derive(Clone)]
pub struct CreditLedger<S: ProfileStore + Clone> {
    store: S,
    limits: BetLimits,
}

impl<S: ProfileStore + Clone> CreditLedger<S> {
    pub fn new(store: S, limits: BetLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> BetLimits {
        self.limits
    }

    pub async fn balance(&self, user_id: u64, guild_id: u64) -> Result<i64, LedgerError> {
        Ok(self.store.get(user_id, guild_id).await?.credits)
    }

    /// Add credits and return the new balance.
    pub async fn deposit(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: i64,
    ) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.credits = profile.credits.saturating_add(amount);
        let new_balance = profile.credits;
        self.store.put(profile).await?;
        Ok(new_balance)
    }

    /// Remove credits; rejected outright if the balance would go below zero.
    pub async fn withdraw(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: i64,
    ) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let mut profile = self.store.get(user_id, guild_id).await?;
        if profile.credits < amount {
            return Err(LedgerError::InsufficientCredits {
                balance: profile.credits,
            });
        }
        profile.credits -= amount;
        let new_balance = profile.credits;
        self.store.put(profile).await?;
        Ok(new_balance)
    }

    /// Shared precondition for every wager: bounds first, then affordability.
    /// Performs no mutation.
    pub async fn validate_bet(
        &self,
        user_id: u64,
        guild_id: u64,
        bet: i64,
    ) -> Result<(), LedgerError> {
        if bet < self.limits.min {
            return Err(LedgerError::BetTooSmall(self.limits.min));
        }
        if bet > self.limits.max {
            return Err(LedgerError::BetTooLarge(self.limits.max));
        }
        let balance = self.balance(user_id, guild_id).await?;
        if bet > balance {
            return Err(LedgerError::InsufficientCredits { balance });
        }
        Ok(())
    }
}
