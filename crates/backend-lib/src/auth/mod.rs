// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication and account-protection core.

pub mod audit;
pub mod lockout;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use audit::{AuditEventType, AuditLog};
pub use lockout::AccountLockout;
pub use password::{hash_password, hash_password_secure, verify_password};
pub use token::TokenService;
