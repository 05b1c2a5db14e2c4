//! # dissoc-core
//!
//! Core types, traits, and the dissociation engine for neurodissoc.
//!
//! This crate provides the domain model (studies, points, study queries),
//! the repository traits that store implementations satisfy, parsing of
//! coordinate path segments, and the engine that turns two study queries
//! into a dissociation.

pub mod coords;
pub mod dissociation;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use coords::{parse_integer_triple, parse_radius, COORDINATE_FORMAT_MSG};
pub use dissociation::{dissociate, DissociationEngine};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
