//! Data gateway
//!
//! SQLite-backed accessor for availability slots and claims. Every
//! operation acquires a connection from the pool for exactly one statement
//! and releases it on every exit path, so no state leaks across steps or
//! requests.

use crate::error::AppError;
use crate::store::models::{AvailabilitySlot, Claim};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Transactional accessor for the clinic's durable entities
#[derive(Clone)]
pub struct DataGateway {
    pool: SqlitePool,
}

impl DataGateway {
    /// Connect to the SQLite database and apply migrations.
    ///
    /// An unreachable or uncreatable store here is a configuration-level
    /// fault and propagates to the caller; this is the only fatal error
    /// path in the crate.
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Connectivity(format!("Failed to create db directory: {}", e))
            })?;
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Connectivity(format!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Connectivity(format!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let gateway = Self { pool };
        gateway.run_migrations().await?;

        Ok(gateway)
    }

    /// Apply the bundled schema migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        debug!("Running database migrations");

        let migration_sql = include_str!("../../migrations/001_create_clinic.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Connectivity(format!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(80).collect::<String>()
                    ))
                })?;
        }

        debug!("Database migrations completed");
        Ok(())
    }

    /// List up to `limit` unbooked slots for a tenant, earliest first
    pub async fn list_open_slots(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<AvailabilitySlot>, AppError> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT id, tenant_id, start_time, end_time, booked, patient_name \
             FROM availability \
             WHERE tenant_id = ? AND booked = 0 \
             ORDER BY start_time ASC \
             LIMIT ?",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Connectivity(format!("Failed to fetch open slots: {}", e)))?;

        Ok(slots)
    }

    /// Atomically book a slot for a patient.
    ///
    /// The update is conditional on the slot still being unbooked, so two
    /// near-simultaneous confirmations of the same slot cannot both
    /// succeed: the loser sees `AppError::SlotConflict`. A slot id that
    /// does not exist for the tenant reports the same conflict, since the
    /// caller cannot distinguish the two without another read.
    pub async fn book_slot(
        &self,
        slot_id: i64,
        tenant_id: &str,
        patient_name: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE availability SET booked = 1, patient_name = ? \
             WHERE id = ? AND tenant_id = ? AND booked = 0",
        )
        .bind(patient_name)
        .bind(slot_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Connectivity(format!("Failed to book slot: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::SlotConflict(slot_id));
        }

        debug!(slot_id = slot_id, tenant_id = %tenant_id, "Booked slot");
        Ok(())
    }

    /// List up to `limit` claims for a tenant, optionally filtered by patient
    pub async fn list_claims(
        &self,
        tenant_id: &str,
        patient_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Claim>, AppError> {
        let claims = match patient_id {
            Some(patient_id) => {
                sqlx::query_as::<_, Claim>(
                    "SELECT claim_id, tenant_id, patient_id, status, coverage_pct \
                     FROM claims \
                     WHERE tenant_id = ? AND patient_id = ? \
                     LIMIT ?",
                )
                .bind(tenant_id)
                .bind(patient_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Claim>(
                    "SELECT claim_id, tenant_id, patient_id, status, coverage_pct \
                     FROM claims \
                     WHERE tenant_id = ? \
                     LIMIT ?",
                )
                .bind(tenant_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Connectivity(format!("Failed to fetch claims: {}", e)))?;

        Ok(claims)
    }

    /// Get the database pool (for seeding in tests and batch tooling)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Split a migration file into executable statements, dropping comments
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .map(|line| match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    async fn test_gateway() -> (tempfile::TempDir, DataGateway) {
        let dir = tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("clinic.db");
        let gateway = DataGateway::new(db_path.to_str().unwrap())
            .await
            .expect("Failed to open test database");
        (dir, gateway)
    }

    async fn seed_slot(gateway: &DataGateway, tenant: &str, offset_hours: i64, booked: bool) -> i64 {
        let start = Utc::now() + Duration::hours(offset_hours);
        let end = start + Duration::minutes(30);
        let result = sqlx::query(
            "INSERT INTO availability (tenant_id, start_time, end_time, booked) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(tenant)
        .bind(start)
        .bind(end)
        .bind(booked)
        .execute(gateway.pool())
        .await
        .expect("Failed to seed slot");
        result.last_insert_rowid()
    }

    async fn seed_claim(gateway: &DataGateway, claim_id: &str, tenant: &str, patient: Option<&str>) {
        sqlx::query(
            "INSERT INTO claims (claim_id, tenant_id, patient_id, status, coverage_pct) \
             VALUES (?, ?, ?, 'approved', 80.0)",
        )
        .bind(claim_id)
        .bind(tenant)
        .bind(patient)
        .execute(gateway.pool())
        .await
        .expect("Failed to seed claim");
    }

    #[test]
    fn test_split_statements_drops_comments() {
        let sql = "-- header\nCREATE TABLE a (x INTEGER); -- trailing\n\nCREATE INDEX i ON a (x);";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE"));
        assert!(statements[1].starts_with("CREATE INDEX"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (_dir, gateway) = test_gateway().await;
        // Second run must not fail on existing tables
        gateway.run_migrations().await.expect("re-running migrations failed");
    }

    #[tokio::test]
    async fn test_list_open_slots_orders_by_start_time() {
        let (_dir, gateway) = test_gateway().await;
        let later = seed_slot(&gateway, "tenant-a", 48, false).await;
        let earlier = seed_slot(&gateway, "tenant-a", 24, false).await;

        let slots = gateway.list_open_slots("tenant-a", 10).await.unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].id, earlier);
        assert_eq!(slots[1].id, later);
        assert!(slots[0].start_time < slots[1].start_time);
    }

    #[tokio::test]
    async fn test_list_open_slots_excludes_booked_and_other_tenants() {
        let (_dir, gateway) = test_gateway().await;
        let open = seed_slot(&gateway, "tenant-a", 24, false).await;
        seed_slot(&gateway, "tenant-a", 25, true).await;
        seed_slot(&gateway, "tenant-b", 26, false).await;

        let slots = gateway.list_open_slots("tenant-a", 10).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, open);
        assert!(!slots[0].booked);
    }

    #[tokio::test]
    async fn test_list_open_slots_honors_limit() {
        let (_dir, gateway) = test_gateway().await;
        for hour in 0..15 {
            seed_slot(&gateway, "tenant-a", hour, false).await;
        }

        let slots = gateway.list_open_slots("tenant-a", 10).await.unwrap();
        assert_eq!(slots.len(), 10);
    }

    #[tokio::test]
    async fn test_book_slot_flips_booked_and_sets_patient() {
        let (_dir, gateway) = test_gateway().await;
        let slot_id = seed_slot(&gateway, "tenant-a", 24, false).await;

        gateway
            .book_slot(slot_id, "tenant-a", "Jordan Lee")
            .await
            .unwrap();

        let open = gateway.list_open_slots("tenant-a", 10).await.unwrap();
        assert!(open.is_empty());

        let row = sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT id, tenant_id, start_time, end_time, booked, patient_name \
             FROM availability WHERE id = ?",
        )
        .bind(slot_id)
        .fetch_one(gateway.pool())
        .await
        .unwrap();
        assert!(row.booked);
        assert_eq!(row.patient_name.as_deref(), Some("Jordan Lee"));
    }

    #[tokio::test]
    async fn test_book_slot_already_booked_is_conflict() {
        let (_dir, gateway) = test_gateway().await;
        let slot_id = seed_slot(&gateway, "tenant-a", 24, false).await;

        gateway.book_slot(slot_id, "tenant-a", "first").await.unwrap();
        let second = gateway.book_slot(slot_id, "tenant-a", "second").await;

        assert!(matches!(second, Err(AppError::SlotConflict(id)) if id == slot_id));

        // The winner's patient name must not be overwritten
        let row = sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT id, tenant_id, start_time, end_time, booked, patient_name \
             FROM availability WHERE id = ?",
        )
        .bind(slot_id)
        .fetch_one(gateway.pool())
        .await
        .unwrap();
        assert_eq!(row.patient_name.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_book_slot_wrong_tenant_is_conflict() {
        let (_dir, gateway) = test_gateway().await;
        let slot_id = seed_slot(&gateway, "tenant-a", 24, false).await;

        let result = gateway.book_slot(slot_id, "tenant-b", "intruder").await;
        assert!(matches!(result, Err(AppError::SlotConflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_bookings_exactly_one_succeeds() {
        let (_dir, gateway) = test_gateway().await;
        let slot_id = seed_slot(&gateway, "tenant-a", 24, false).await;

        let g1 = gateway.clone();
        let g2 = gateway.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { g1.book_slot(slot_id, "tenant-a", "alice").await }),
            tokio::spawn(async move { g2.book_slot(slot_id, "tenant-a", "bob").await }),
        );
        let r1 = r1.unwrap();
        let r2 = r2.unwrap();

        let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one booking may win: {:?} {:?}", r1, r2);
        let conflicts = [&r1, &r2]
            .iter()
            .filter(|r| matches!(r, Err(AppError::SlotConflict(_))))
            .count();
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn test_list_claims_by_tenant() {
        let (_dir, gateway) = test_gateway().await;
        seed_claim(&gateway, "c-1", "tenant-a", Some("p-1")).await;
        seed_claim(&gateway, "c-2", "tenant-a", None).await;
        seed_claim(&gateway, "c-3", "tenant-b", None).await;

        let claims = gateway.list_claims("tenant-a", None, 10).await.unwrap();
        assert_eq!(claims.len(), 2);
        assert!(claims.iter().all(|c| c.tenant_id == "tenant-a"));
    }

    #[tokio::test]
    async fn test_list_claims_filtered_by_patient() {
        let (_dir, gateway) = test_gateway().await;
        seed_claim(&gateway, "c-1", "tenant-a", Some("p-1")).await;
        seed_claim(&gateway, "c-2", "tenant-a", Some("p-2")).await;

        let claims = gateway
            .list_claims("tenant-a", Some("p-1"), 10)
            .await
            .unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].claim_id, "c-1");
        assert_eq!(claims[0].coverage_pct, 80.0);
    }

    #[tokio::test]
    async fn test_list_claims_empty_is_not_an_error() {
        let (_dir, gateway) = test_gateway().await;
        let claims = gateway.list_claims("tenant-a", None, 10).await.unwrap();
        assert!(claims.is_empty());
    }
}
