//! Multi-position switch.

use tracing::debug;

use super::relations::{build_relations, RelationKey, RelationType};
use super::{DeviceCore, PinKind};
use crate::error::{PatchbayError, Result};

/// Rung relations of the two ladders 0-2-4-6 and 1-3-5-7.
const RUNGS: [(usize, usize); 6] = [(0, 2), (2, 4), (4, 6), (1, 3), (3, 5), (5, 7)];

/// One rung from each ladder per switch position.
const MODE_GROUPS: [[RelationKey; 2]; 3] = [
    [RelationKey::new(0, 2), RelationKey::new(1, 3)],
    [RelationKey::new(2, 4), RelationKey::new(3, 5)],
    [RelationKey::new(4, 6), RelationKey::new(5, 7)],
];

/// A three-position, two-pole switch.
///
/// Modeled as two parallel ladders of DIRECT rungs. Exactly one mode group
/// is active at a time; all other rungs are open.
#[derive(Debug, Clone)]
pub struct Switcher {
    pub core: DeviceCore,
    mode_groups: Vec<Vec<RelationKey>>,
    mode: usize,
}

impl Switcher {
    /// Number of pins.
    pub const PINS: usize = 8;

    /// Create a switcher in mode 0.
    pub fn new() -> Self {
        let spec: Vec<_> = RUNGS
            .iter()
            .map(|&(from, to)| (from, to, RelationType::Direct))
            .collect();

        let mut switcher = Self {
            core: DeviceCore::new(vec![PinKind::Point; Self::PINS], build_relations(&spec)),
            mode_groups: MODE_GROUPS.iter().map(|group| group.to_vec()).collect(),
            mode: 0,
        };
        switcher.apply_mode(0);
        switcher
    }

    /// Create a switcher already set to `mode`.
    pub fn with_mode(mode: usize) -> Result<Self> {
        let mut switcher = Self::new();
        switcher.set_mode(mode)?;
        Ok(switcher)
    }

    /// Select a switch position.
    ///
    /// Deactivates every relation, then activates the chosen group and the
    /// reverses of its relations.
    pub fn set_mode(&mut self, mode: usize) -> Result<()> {
        if mode >= self.mode_groups.len() {
            return Err(PatchbayError::InvalidModeIndex {
                mode,
                modes: self.mode_groups.len(),
            });
        }
        self.apply_mode(mode);
        debug!(mode, "switcher mode set");
        Ok(())
    }

    fn apply_mode(&mut self, mode: usize) {
        self.core.relations_mut().deactivate_all();
        for &key in &self.mode_groups[mode] {
            self.core.relations_mut().set_active(key, true);
        }
        self.mode = mode;
    }

    /// The selected position.
    pub fn mode(&self) -> usize {
        self.mode
    }

    /// Number of positions.
    pub fn mode_count(&self) -> usize {
        self.mode_groups.len()
    }

    /// Relation keys switched by `mode`, without their reverses.
    pub fn mode_group(&self, mode: usize) -> Option<&[RelationKey]> {
        self.mode_groups.get(mode).map(Vec::as_slice)
    }
}

impl Default for Switcher {
    fn default() -> Self {
        Self::new()
    }
}
