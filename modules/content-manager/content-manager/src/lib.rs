//! Content Manager Module
//!
//! Permission-aware access layer over dynamically defined content types.
//! Queries, outputs and write inputs are reduced to the caller's grants before
//! they reach the entity manager or leave the module.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::ContentManagerConfig;
pub use domain::{ContentManagerLocalClient, DomainError, Service};

#[cfg(test)]
mod test_support;
