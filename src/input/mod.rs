//! Interactive move/resize
//!
//! A client asks for a move or resize (usually from a click on its own
//! decorations). The request is only honoured while the requesting surface
//! holds pointer focus; anything else is a stale request racing the pointer
//! and is ignored. While a grab is active, pointer motion turns into geometry
//! requests for the grabbed view; the grab never writes the view's geometry
//! itself.

use std::ops::BitOr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::InteractionConfig;
use crate::geometry::Rectangle;
use crate::policy::WindowId;
use crate::surface::SurfaceId;

/// Edge mask of an interactive resize, with the Xdg wire values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResizeEdges(u32);

impl ResizeEdges {
    pub const NONE: ResizeEdges = ResizeEdges(0);
    pub const TOP: ResizeEdges = ResizeEdges(1);
    pub const BOTTOM: ResizeEdges = ResizeEdges(2);
    pub const LEFT: ResizeEdges = ResizeEdges(4);
    pub const RIGHT: ResizeEdges = ResizeEdges(8);

    pub fn from_bits(bits: u32) -> Self {
        ResizeEdges(bits & 0xf)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: ResizeEdges) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ResizeEdges {
    type Output = ResizeEdges;

    fn bitor(self, rhs: Self) -> Self::Output {
        ResizeEdges(self.0 | rhs.0)
    }
}

/// Kind of interactive grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    Move,
    Resize(ResizeEdges),
}

/// Snapshot taken when a grab starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    /// Grabbed view; resolved through the registry on every use
    pub view: WindowId,
    pub mode: GrabMode,
    /// Move: pointer offset from the view origin. Resize: absolute pointer position.
    pub origin: (f64, f64),
    /// View geometry when the grab started
    pub original_geo: Rectangle,
}

/// Interaction state machine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Moving(Grab),
    Resizing(Grab),
}

impl InteractionState {
    pub fn grab(&self) -> Option<&Grab> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Moving(grab) | InteractionState::Resizing(grab) => Some(grab),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

/// Drives interactive move/resize from pointer input
#[derive(Debug, Clone)]
pub struct Interaction {
    state: InteractionState,
    /// Last known pointer position in global coordinates
    cursor: (f64, f64),
    min_width: u32,
    min_height: u32,
}

impl Interaction {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            cursor: (0.0, 0.0),
            min_width: config.min_width.max(1),
            min_height: config.min_height.max(1),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Starts moving `view` if `surface` holds pointer focus
    ///
    /// `geo` is the view's current position with the size the client reports
    /// for itself. Returns whether the grab started.
    pub fn begin_move(
        &mut self,
        view: WindowId,
        surface: Option<SurfaceId>,
        pointer_focus: Option<SurfaceId>,
        geo: Rectangle,
    ) -> bool {
        if !Self::holds_pointer_focus(surface, pointer_focus) {
            debug!("Ignoring move request from unfocused view {}", view);
            return false;
        }

        let (x, y) = self.cursor;
        self.state = InteractionState::Moving(Grab {
            view,
            mode: GrabMode::Move,
            origin: (x - geo.x as f64, y - geo.y as f64),
            original_geo: geo,
        });
        debug!("Started move grab on view {}", view);
        true
    }

    /// Starts resizing `view` along `edges` if `surface` holds pointer focus
    pub fn begin_resize(
        &mut self,
        view: WindowId,
        surface: Option<SurfaceId>,
        pointer_focus: Option<SurfaceId>,
        geo: Rectangle,
        edges: ResizeEdges,
    ) -> bool {
        if !Self::holds_pointer_focus(surface, pointer_focus) {
            debug!("Ignoring resize request from unfocused view {}", view);
            return false;
        }

        self.state = InteractionState::Resizing(Grab {
            view,
            mode: GrabMode::Resize(edges),
            origin: self.cursor,
            original_geo: geo,
        });
        debug!("Started resize grab on view {} (edges {:#x})", view, edges.bits());
        true
    }

    fn holds_pointer_focus(surface: Option<SurfaceId>, pointer_focus: Option<SurfaceId>) -> bool {
        surface.is_some() && surface == pointer_focus
    }

    /// Records pointer motion and returns the geometry the grabbed view should get
    pub fn motion(&mut self, x: f64, y: f64) -> Option<(WindowId, Rectangle)> {
        self.cursor = (x, y);

        match self.state {
            InteractionState::Idle => None,
            InteractionState::Moving(grab) => Some((grab.view, Self::move_target(&grab, x, y))),
            InteractionState::Resizing(grab) => {
                Some((grab.view, self.resize_target(&grab, x, y)))
            }
        }
    }

    fn move_target(grab: &Grab, x: f64, y: f64) -> Rectangle {
        let new_x = (x - grab.origin.0).round() as i32;
        let new_y = (y - grab.origin.1).round() as i32;
        grab.original_geo.with_loc(crate::geometry::Point::new(new_x, new_y))
    }

    fn resize_target(&self, grab: &Grab, x: f64, y: f64) -> Rectangle {
        let GrabMode::Resize(edges) = grab.mode else {
            return grab.original_geo;
        };

        let dx = (x - grab.origin.0).round() as i32;
        let dy = (y - grab.origin.1).round() as i32;
        let geo = grab.original_geo;
        let min_w = i32::try_from(self.min_width).unwrap_or(i32::MAX);
        let min_h = i32::try_from(self.min_height).unwrap_or(i32::MAX);

        let mut left = geo.x;
        let mut right = geo.right();
        let mut top = geo.y;
        let mut bottom = geo.bottom();

        if edges.contains(ResizeEdges::TOP) {
            top = top.saturating_add(dy).min(bottom.saturating_sub(min_h));
        } else if edges.contains(ResizeEdges::BOTTOM) {
            bottom = bottom.saturating_add(dy).max(top.saturating_add(min_h));
        }

        if edges.contains(ResizeEdges::LEFT) {
            left = left.saturating_add(dx).min(right.saturating_sub(min_w));
        } else if edges.contains(ResizeEdges::RIGHT) {
            right = right.saturating_add(dx).max(left.saturating_add(min_w));
        }

        Rectangle::from_corners(left, top, right, bottom)
    }

    /// Ends any grab on pointer-button release
    pub fn release(&mut self) {
        if let Some(grab) = self.state.grab() {
            debug!("Ended grab on view {}", grab.view);
        }
        self.state = InteractionState::Idle;
    }

    /// Drops the grab if it references `view`
    pub fn invalidate(&mut self, view: WindowId) {
        if self.state.grab().is_some_and(|grab| grab.view == view) {
            debug!("Grabbed view {} went away, ending grab", view);
            self.state = InteractionState::Idle;
        }
    }
}
