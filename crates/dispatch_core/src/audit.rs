//! Best-effort audit trail for exclusions.
//!
//! Recording an exclusion must never block or fail a match. Sinks that talk to slow storage
//! should hand the record off (queue, channel) and return immediately.

use crate::error::AuditError;
use crate::matching::ExclusionReason;
use crate::model::{DriverId, OrgId, RideId};

/// Receives one "match failure recorded" event per excluded driver.
pub trait AuditSink: Send + Sync {
    fn record_exclusion(
        &self,
        organization: &OrgId,
        ride: &RideId,
        driver: &DriverId,
        reason: ExclusionReason,
    ) -> Result<(), AuditError>;
}

/// Writes exclusions as structured `tracing` events under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_exclusion(
        &self,
        organization: &OrgId,
        ride: &RideId,
        driver: &DriverId,
        reason: ExclusionReason,
    ) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            action = "ride_match_failure",
            org_id = %organization,
            ride_id = %ride,
            driver_id = %driver,
            reason = reason.as_str(),
        );
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_exclusion(
        &self,
        _organization: &OrgId,
        _ride: &RideId,
        _driver: &DriverId,
        _reason: ExclusionReason,
    ) -> Result<(), AuditError> {
        Ok(())
    }
}
