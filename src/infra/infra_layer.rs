// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "profiles/profile_stores.rs"]
pub mod profiles;
