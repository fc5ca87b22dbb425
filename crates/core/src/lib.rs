//! Core library for the phonebook service
//!
//! This crate implements the **Functional Core** of the phonebook
//! application, following the Functional Core - Imperative Shell
//! architectural pattern.
//!
//! # Architecture Overview
//!
//! The phonebook project uses a two-crate architecture to enforce separation
//! of concerns:
//!
//! - **`phonebook_core`** (this crate): Pure validation and transformation
//!   functions with zero I/O
//! - **`phonebook`**: HTTP serving, persistence and orchestration (the
//!   Imperative Shell)
//!
//! All functions in this crate are pure: same input, same output, no side
//! effects, no persistence access. They are tested with simple fixture data,
//! no mocking required.
//!
//! # Module Organization
//!
//! - [`contact`]: Domain models (contact records, create/update requests) and
//!   create-request validation
//! - [`country`]: The closed set of supported country codes
//! - [`phone`]: Phone number validation against a country's numbering plan
//! - [`merge`]: Partial-update merging with per-field blank/absent rules
//! - [`pagination`]: Page/size bounds checking and page construction
//! - [`search`]: Substring matching and the store-side LIKE pattern builder
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use phonebook_core::contact::ContactUpdate;
//! use phonebook_core::merge::merge_contact;
//! use phonebook_core::phone::validate_phone;
//!
//! // Merge a sparse update onto a stored contact (no I/O involved)
//! let merged = merge_contact(&existing, &update);
//!
//! // The merged pair must still be a valid number before persisting
//! validate_phone(&merged.phone, merged.country_code)?;
//! ```

pub mod contact;
pub mod country;
pub mod merge;
pub mod pagination;
pub mod phone;
pub mod search;
