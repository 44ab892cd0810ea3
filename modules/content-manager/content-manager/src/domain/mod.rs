//! Domain layer for the content manager.

pub mod error;
pub mod local_client;
pub mod permission;
pub mod populate;
pub mod sanitize;
pub mod service;
pub mod validation;

pub use error::DomainError;
pub use local_client::ContentManagerLocalClient;
pub use service::Service;
