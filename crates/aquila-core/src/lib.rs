//! aquila-core - Resource models for the Aquila platform
//!
//! This crate provides the payload types exchanged with an Aquila server
//! (data sources, data points, users, event detectors, point values) and
//! the default-property generators used when creating fresh resources.

pub mod models;

pub use models::*;
