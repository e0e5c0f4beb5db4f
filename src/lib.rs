//! transit-planner route recommendation engine
//!
//! Recommends transit routes between two addresses, ranked by three
//! competing criteria: safety, reliability and travel-time efficiency.
//! The transit graph is built once from reference data and read-only
//! afterwards; baseline statistics hot-swap atomically; results are
//! memoized with a short TTL.

pub mod baseline;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod graph;
pub mod network;
pub mod pathfind;
pub mod resolver;
pub mod score;
pub mod traits;
