//! Durable entity models
//!
//! Row structures for the tables the data gateway reads. Row contents are
//! produced by external seeding jobs; this crate only reads them and flips
//! `booked` on confirm.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An appointment slot offered by a tenant.
///
/// Invariant: a slot is bookable only while `booked` is false. Once booked
/// it is immutable (no release operation exists in the current scope).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailabilitySlot {
    /// Row identifier
    pub id: i64,
    /// Owning tenant; slots are never visible across tenants
    pub tenant_id: String,
    /// Start of the slot (UTC)
    pub start_time: DateTime<Utc>,
    /// End of the slot (UTC)
    pub end_time: DateTime<Utc>,
    /// Whether the slot has been confirmed for a patient
    pub booked: bool,
    /// Patient the slot was booked for, if any
    pub patient_name: Option<String>,
}

/// An insurance claim, read-only to the orchestration core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Claim {
    /// Claim identifier
    pub claim_id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Patient the claim belongs to, when known
    pub patient_id: Option<String>,
    /// Processing status (e.g., "submitted", "approved", "denied")
    pub status: String,
    /// Covered percentage of the claimed amount
    pub coverage_pct: f64,
}
