// Implementations of the profile storage port.

pub mod in_memory;
pub mod json_store;

// Re-export for convenience
pub use in_memory::InMemoryProfileStore;
pub use json_store::JsonProfileStore;
