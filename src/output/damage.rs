//! Per-output damage accumulation
//!
//! Damage arrives in output-local coordinates and accumulates until the repaint
//! driver drains it. Rectangles are clipped to the output on arrival. Once more
//! than the configured number of rectangles pile up, the output is coalesced to
//! full damage; repainting everything is cheaper than tracking that many
//! fragments.

use crate::config::DamageConfig;
use crate::geometry::{Rectangle, Size};
use crate::region::Region;

/// Distance in pixels under which drained rectangles are merged
const MERGE_THRESHOLD: u32 = 10;

/// Damage accumulator owned by one output
#[derive(Debug, Clone)]
pub struct OutputDamage {
    /// Output-local bounds (origin at 0,0)
    bounds: Rectangle,

    /// Damaged rectangles in output-local coordinates
    regions: Region,

    /// Is the entire output damaged?
    full_damage: bool,

    max_rects: usize,
    merge_on_drain: bool,
}

impl OutputDamage {
    pub fn new(size: Size, config: &DamageConfig) -> Self {
        Self {
            bounds: Rectangle::from_loc_and_size(Default::default(), size),
            regions: Region::new(),
            full_damage: false,
            max_rects: config.max_rects_per_output,
            merge_on_drain: config.merge_on_drain,
        }
    }

    /// Adds output-local damage
    ///
    /// Parts outside the output are discarded. If the output is already fully
    /// damaged this is a no-op.
    pub fn add_region(&mut self, damage: &Region) {
        if self.full_damage {
            return;
        }

        self.regions.extend(&damage.clipped(&self.bounds));

        if self.regions.len() > self.max_rects {
            self.mark_full();
        }
    }

    /// Marks the entire output as damaged
    pub fn mark_full(&mut self) {
        self.full_damage = true;
        self.regions.clear();
    }

    pub fn is_full(&self) -> bool {
        self.full_damage
    }

    pub fn has_damage(&self) -> bool {
        self.full_damage || !self.regions.is_empty()
    }

    /// Accumulated rectangles, unmerged and in arrival order
    pub fn pending(&self) -> &[Rectangle] {
        self.regions.rects()
    }

    /// Takes the accumulated damage and resets the accumulator
    pub fn drain(&mut self) -> Vec<Rectangle> {
        let damage = if self.full_damage {
            vec![self.bounds]
        } else {
            let mut regions = std::mem::take(&mut self.regions);
            if self.merge_on_drain {
                regions.merge(MERGE_THRESHOLD);
            }
            regions.into_rects()
        };

        self.full_damage = false;
        self.regions.clear();
        damage
    }
}
