//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelDescriptor`]: identity and capacity of a language model
//! - [`error::DomainError`]: domain-level validation errors

pub mod error;
pub mod model;
