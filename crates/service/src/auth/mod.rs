//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration with unique email and credential checks. Session tokens live
//! in [`crate::token`].

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
