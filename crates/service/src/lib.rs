//! Business layer for the personal finance API.
//! - `entry`: validation and lifecycle of income/expense entries.
//! - `auth`: user registration and credential checks.
//! - `token`: signed session tokens.
//!
//! Storage is reached only through the repository traits each module
//! declares; SeaORM adapters live under `repo`, in-memory mocks under
//! `repository::mock`.

pub mod auth;
pub mod entry;
pub mod token;
