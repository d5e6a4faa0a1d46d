//! Client for the remote long-running video generation API.
//!
//! Provides the wire types, a thin REST wrapper, bounded polling, and
//! [`VeoClient`], the [`SegmentGenerator`] implementation the pipeline
//! drives one segment at a time.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod messages;
pub mod poll;

pub use client::VeoClient;
pub use config::{ConfigError, VeoConfig};
pub use error::GenerationError;
pub use generator::SegmentGenerator;
pub use poll::PollConfig;
