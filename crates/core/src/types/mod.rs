//! Core types for EasyTech.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod telephone;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use telephone::{Telephone, TelephoneError};
