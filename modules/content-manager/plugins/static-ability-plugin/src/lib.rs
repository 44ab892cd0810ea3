#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Ability Plugin
//!
//! Ability engine for the content manager backed by a configured grant list.
//! Intended for development and testing.
//!
//! Conditions are content manager filters evaluated against the record. The
//! string `"$subject_id"` anywhere in a condition value is replaced with the
//! caller's id when the ability is built.
//!
//! ## Configuration
//!
//! ```yaml
//! modules:
//!   static_ability_plugin:
//!     config:
//!       grants:
//!         - action: read
//!           subject: "api::article.article"
//!           fields: ["title", "author.name"]
//!         - action: update
//!           subject: "api::article.article"
//!           condition:
//!             leaf: { path: "createdBy", op: eq, value: "$subject_id" }
//! ```

pub mod config;
pub mod domain;

pub use config::StaticAbilityPluginConfig;
pub use domain::{Service, StaticAbility};
