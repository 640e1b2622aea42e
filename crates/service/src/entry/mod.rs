//! Entry module: income/expense records and their lifecycle.
//!
//! Same layering as `auth`: domain types, validation rules, a storage port
//! with an in-memory mock, the application service and a SeaORM adapter.

pub mod domain;
pub mod errors;
pub mod validation;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::EntryService;
