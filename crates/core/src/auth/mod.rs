//! Password hashing for stored user records.
//!
//! Login and session handling live outside this system; what remains here
//! is the at-rest format for `users.password_hash`.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
