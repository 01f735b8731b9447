//! Service layer for login policy
//!
//! This module contains the services that encapsulate the gate's decision
//! logic: lockout interpretation and the authorization state machine.

mod account_lock;
pub mod authorization;
pub mod lockout;

pub use authorization::{AuthorizationGate, Collaborators};
pub use lockout::{LockoutConfig, LockoutPolicy, LockoutStatus};
