//! Ampel Core - Fundamental types and primitives
//!
//! This crate defines the types shared across the ampel workspace:
//! - Identities and election priority (NodeId, Rank, PriorityOrder)
//! - Phase case identifiers and deployment topology
//! - Wrapping millisecond time with deadline arithmetic
//! - Deployment configuration and the workspace error type

pub mod case;
pub mod config;
pub mod error;
pub mod id;
pub mod time;

pub use case::*;
pub use config::*;
pub use error::*;
pub use id::*;
pub use time::*;
