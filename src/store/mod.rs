//! Data access layer
//!
//! Thin transactional accessors over the clinic's durable entities:
//! availability slots and claims. Each operation is a single round-trip;
//! no caching, no state carried across calls.

pub mod gateway;
pub mod models;

pub use gateway::DataGateway;
pub use models::{AvailabilitySlot, Claim};
