use chrono::NaiveDateTime;
use tracing::warn;

use crate::audit::AuditSink;
use crate::config::MatchConfig;
use crate::directory::SnapshotSource;
use crate::error::MatchError;
use crate::matching::{MatchEngine, MatchReport, RideContext};
use crate::model::RideRequest;

/// Validates a ride, fetches the snapshot from the collaborators, matches, and records
/// exclusions for audit.
///
/// The dispatcher only ranks. Assigning the ride and updating rotation stats is the
/// acceptance step's job and must be a conditional write (see [`crate::rotation`]).
pub struct Dispatcher<S, A> {
    source: S,
    audit: A,
    engine: MatchEngine,
    fairness_window_days: u32,
}

impl<S: SnapshotSource, A: AuditSink> Dispatcher<S, A> {
    pub fn new(source: S, audit: A, config: &MatchConfig) -> Self {
        Self {
            source,
            audit,
            engine: MatchEngine::from_config(config),
            fairness_window_days: config.fairness_window_days,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Run one match. Returns the full report or a single error; never a partial report.
    pub fn run(&self, request: &RideRequest, now: NaiveDateTime) -> Result<MatchReport, MatchError> {
        // Reject bad requests, including unkeyable locations, before touching any collaborator.
        RideContext::prepare(request, self.engine.keyer())?;
        let org = &request.organization_id;

        let candidates = self.source.candidates(org)?;
        let unavailability = self.source.unavailability(org, &request.window)?;
        let rotation = self
            .source
            .rotation(org, now, self.fairness_window_days)?;

        let report = self
            .engine
            .match_ride(request, &candidates, &unavailability, &rotation, now)?;

        for outcome in &report.excluded {
            let Some(reason) = outcome.exclusion_reason() else {
                continue;
            };
            if let Err(err) = self
                .audit
                .record_exclusion(org, &request.id, &outcome.driver_id, reason)
            {
                warn!(error = %err, "failed to record match exclusion");
            }
        }

        Ok(report)
    }
}
