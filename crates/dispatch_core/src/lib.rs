//! Ride-to-driver matching for volunteer ride dispatch.
//!
//! Given a ride request and a snapshot of an organization's drivers, the engine
//!
//! 1. excludes drivers who cannot take the ride (time off, coverage area, seats, service
//!    animals, vehicle height, allergens), recording one reason per driver, and
//! 2. ranks the rest by a fairness score dominated by how long ago each driver last drove.
//!
//! Matching is a pure, synchronous computation over an immutable snapshot. The evaluation
//! instant is always passed in explicitly.
//!
//! ```
//! use std::collections::HashMap;
//! use dispatch_core::matching::MatchEngine;
//! use dispatch_core::test_helpers::{test_now, DriverBuilder, RideBuilder};
//!
//! let ride = RideBuilder::new().riders(2).build();
//! let drivers = vec![
//!     DriverBuilder::new("a").vehicle(4).build(),
//!     DriverBuilder::new("b").vehicle(1).build(),
//! ];
//! let report = MatchEngine::default()
//!     .match_ride(&ride, &drivers, &HashMap::new(), &HashMap::new(), test_now())
//!     .unwrap();
//!
//! assert_eq!(report.available.len(), 1);
//! assert_eq!(report.excluded[0].exclusion_reason().unwrap().as_str(), "Capacity too small");
//! ```

pub mod area;
pub mod audit;
pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod matching;
pub mod model;
pub mod rotation;
pub mod schedule;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::MatchConfig;
pub use dispatcher::Dispatcher;
pub use error::MatchError;
pub use matching::{MatchEngine, MatchOutcome, MatchReport};
