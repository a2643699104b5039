//! Authentication module for filevault.
//!
//! This module provides password hashing, user registration,
//! and session token management.

mod password;
mod registration;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use session::{JwtClaims, SessionAuthority, DEFAULT_SESSION_DURATION_SECS};
