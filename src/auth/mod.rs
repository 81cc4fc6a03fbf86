//! Accounts, password hashing and login sessions.

pub mod model;
pub mod password;
pub mod routes;
pub mod session;

pub use session::{Session, SessionStore};
