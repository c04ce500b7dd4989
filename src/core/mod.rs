//! core
//!
//! Core domain types, naming, and configuration for Branchwright.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RefName, RefKind, MergeItem
//! - [`naming`] - Name derivation and collision-free suffix resolution
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing in this module touches the repository

pub mod config;
pub mod naming;
pub mod types;
