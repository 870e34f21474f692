//! Physical outputs and the global output layout
//!
//! Each [`Output`] has a placement rectangle in the global coordinate space and
//! owns a damage accumulator in its own output-local space. The repaint driver
//! drains that damage when it renders a frame.

use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::DamageConfig;
use crate::error::{CoreError, Result};
use crate::geometry::Rectangle;
use crate::region::Region;

mod damage;

pub use damage::OutputDamage;

/// Identity of an output inside an [`OutputLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(pub u32);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// One physical display
#[derive(Debug, Clone)]
pub struct Output {
    id: OutputId,
    name: String,
    layout_box: Rectangle,
    damage: OutputDamage,
    frame_pending: bool,
}

impl Output {
    fn new(id: OutputId, name: String, layout_box: Rectangle, config: &DamageConfig) -> Self {
        Self {
            id,
            name,
            layout_box,
            damage: OutputDamage::new(layout_box.size(), config),
            frame_pending: false,
        }
    }

    pub fn id(&self) -> OutputId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placement in global coordinates
    pub fn layout_box(&self) -> Rectangle {
        self.layout_box
    }

    /// Whether damage arrived since the last drain
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn damage(&self) -> &OutputDamage {
        &self.damage
    }

    /// Accumulates output-local damage and schedules a repaint
    pub fn add_damage(&mut self, damage: &Region) {
        if damage.is_empty() {
            return;
        }
        self.damage.add_region(damage);
        self.frame_pending = true;
    }

    /// Takes all accumulated damage for a repaint
    pub fn drain_damage(&mut self) -> Vec<Rectangle> {
        self.frame_pending = false;
        self.damage.drain()
    }
}

/// Global arrangement of outputs
#[derive(Debug, Clone)]
pub struct OutputLayout {
    outputs: Vec<Output>,
    next_output_id: u32,
    damage_config: DamageConfig,
}

impl OutputLayout {
    pub fn new(damage_config: &DamageConfig) -> Self {
        Self {
            outputs: Vec::new(),
            next_output_id: 1,
            damage_config: damage_config.clone(),
        }
    }

    /// Places a new output at `layout_box` in global coordinates
    pub fn add_output(&mut self, name: impl Into<String>, layout_box: Rectangle) -> OutputId {
        let id = OutputId(self.next_output_id);
        self.next_output_id += 1;

        let output = Output::new(id, name.into(), layout_box, &self.damage_config);
        debug!("Added {} '{}' at {:?}", id, output.name, layout_box);
        self.outputs.push(output);
        id
    }

    /// Removes an output together with its pending damage
    pub fn remove_output(&mut self, id: OutputId) -> Option<Output> {
        let index = self.outputs.iter().position(|o| o.id == id)?;
        debug!("Removed {}", id);
        Some(self.outputs.remove(index))
    }

    /// Output whose layout box contains the global point
    pub fn output_at(&self, x: i32, y: i32) -> Option<OutputId> {
        self.outputs
            .iter()
            .find(|o| o.layout_box.contains_point(x, y))
            .map(|o| o.id)
    }

    /// Layout box of an output in global coordinates
    pub fn output_box(&self, id: OutputId) -> Option<Rectangle> {
        self.output(id).map(|o| o.layout_box)
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn output_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.iter_mut().find(|o| o.id == id)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Forwards output-local damage to one output's accumulator
    pub fn damage_output(&mut self, id: OutputId, damage: &Region) -> Result<()> {
        let output = self.output_mut(id).ok_or(CoreError::UnknownOutput(id))?;
        trace!("Damaging {} with {} rect(s)", id, damage.len());
        output.add_damage(damage);
        Ok(())
    }

    /// Drains one output's damage for a repaint
    pub fn drain_damage(&mut self, id: OutputId) -> Result<Vec<Rectangle>> {
        let output = self.output_mut(id).ok_or(CoreError::UnknownOutput(id))?;
        Ok(output.drain_damage())
    }
}
