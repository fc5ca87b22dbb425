//! Contact directory domain: persistence, caching and orchestration.
//!
//! The module composes in layers: [`repository`] owns storage, [`cache`]
//! optionally decorates it with a read-through accelerator, and [`service`]
//! orchestrates validation, merging and persistence for the HTTP layer.

pub mod cache;
pub mod repository;
pub mod service;

pub const CONTACT_NOT_FOUND_ERROR: &str = "Contact not found with id: ";
