// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "economy/credit_ledger.rs"]
pub mod economy;

#[path = "gambling/mod.rs"]
pub mod gambling;

#[path = "leveling/leveling_service.rs"]
pub mod leveling;

#[path = "profiles/profile_store.rs"]
pub mod profiles;
