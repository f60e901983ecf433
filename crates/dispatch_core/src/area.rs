//! Coarse area keys for the geography heuristic.
//!
//! Two locations are "in the same area" when their keys are equal. That is the whole model:
//! no distances, no routing. Postal codes reduce to a leading prefix; H3 cells reduce to
//! their parent at a coarse resolution (resolution 5 is roughly 250 km² per cell).

use std::fmt;

use h3o::{CellIndex, Resolution};
use serde::Serialize;

use crate::error::AreaError;
use crate::model::LocationDescriptor;

pub const DEFAULT_POSTAL_PREFIX_LEN: usize = 3;
pub const DEFAULT_AREA_RESOLUTION: Resolution = Resolution::Five;

/// Opaque area identifier. Only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AreaKey(String);

impl AreaKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces location descriptors to area keys.
#[derive(Debug, Clone, Copy)]
pub struct AreaKeyer {
    postal_prefix_len: usize,
    resolution: Resolution,
}

impl Default for AreaKeyer {
    fn default() -> Self {
        Self::new(DEFAULT_POSTAL_PREFIX_LEN, DEFAULT_AREA_RESOLUTION)
    }
}

impl AreaKeyer {
    pub fn new(postal_prefix_len: usize, resolution: Resolution) -> Self {
        debug_assert!(postal_prefix_len > 0, "postal prefix must be non-empty");
        Self {
            postal_prefix_len,
            resolution,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn key_for(&self, location: &LocationDescriptor) -> Result<AreaKey, AreaError> {
        match location {
            LocationDescriptor::Postal { code } => self.postal_key(code),
            LocationDescriptor::Cell { index } => self.cell_key(*index),
        }
    }

    fn postal_key(&self, code: &str) -> Result<AreaKey, AreaError> {
        // Spaces and dashes are formatting, not part of the code ("SW1A 1AA", "12345-6789").
        let prefix: String = code
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(self.postal_prefix_len)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if prefix.len() < self.postal_prefix_len {
            return Err(AreaError::PostalTooShort {
                code: code.to_string(),
                required: self.postal_prefix_len,
            });
        }
        Ok(AreaKey(format!("zip:{prefix}")))
    }

    fn cell_key(&self, index: u64) -> Result<AreaKey, AreaError> {
        let cell = CellIndex::try_from(index).map_err(|_| AreaError::InvalidCell(index))?;
        // Cells already coarser than the target resolution are their own area.
        let area = cell.parent(self.resolution).unwrap_or(cell);
        Ok(AreaKey(format!("h3:{area}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_cell, TEST_CELL};

    #[test]
    fn postal_codes_share_prefix_key() {
        let keyer = AreaKeyer::default();
        let a = keyer.key_for(&LocationDescriptor::postal("04101")).expect("key");
        let b = keyer.key_for(&LocationDescriptor::postal("041-09")).expect("key");
        let c = keyer.key_for(&LocationDescriptor::postal("04210")).expect("key");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "zip:041");
    }

    #[test]
    fn short_postal_code_is_rejected() {
        let keyer = AreaKeyer::default();
        let err = keyer
            .key_for(&LocationDescriptor::postal("0 4"))
            .expect_err("too short");
        assert!(matches!(err, AreaError::PostalTooShort { required: 3, .. }));
    }

    #[test]
    fn neighbouring_cells_share_coarse_parent() {
        let keyer = AreaKeyer::default();
        let origin = test_cell();
        let neighbor = origin
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .find(|c| *c != origin && c.parent(keyer.resolution()) == origin.parent(keyer.resolution()))
            .expect("neighbor in same parent");

        let a = keyer
            .key_for(&LocationDescriptor::Cell { index: TEST_CELL })
            .expect("key");
        let b = keyer
            .key_for(&LocationDescriptor::Cell {
                index: u64::from(neighbor),
            })
            .expect("key");
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_cell_is_rejected() {
        let keyer = AreaKeyer::default();
        assert!(matches!(
            keyer.key_for(&LocationDescriptor::Cell { index: 0 }),
            Err(AreaError::InvalidCell(0))
        ));
    }

    #[test]
    fn postal_and_cell_keys_never_collide() {
        let keyer = AreaKeyer::new(3, Resolution::Zero);
        let postal = keyer.key_for(&LocationDescriptor::postal("801")).expect("key");
        let cell = keyer
            .key_for(&LocationDescriptor::Cell { index: TEST_CELL })
            .expect("key");
        assert_ne!(postal, cell);
    }
}
