//! Domain layer for the static ability plugin.

pub mod ability;
pub mod service;

pub use ability::StaticAbility;
pub use service::Service;
