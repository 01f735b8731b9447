//! Repository traits for account storage
//!
//! The gate never owns long-term storage. It reads and writes account records
//! through an [`AccountRepository`]; [`InMemoryAccountRepository`] is a
//! process-local implementation for tests and embedded use.

pub mod account;
pub mod memory;

pub use account::AccountRepository;
pub use memory::InMemoryAccountRepository;
