//! Interface to the external window-management policy engine
//!
//! The policy engine owns placement, tiling and view identity allocation. The
//! core calls into it synchronously and only ever hands it a [`WindowId`],
//! never the view itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Rectangle;

/// Opaque view identity allocated by the policy engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placement answer returned by [`WindowPolicy::configure_window`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilingDecision {
    /// Whether the policy engine manages this window as tiled
    pub tiled: bool,
    /// Geometry the policy wants applied before the next commit, if any
    pub geometry: Option<Rectangle>,
}

impl TilingDecision {
    pub fn floating() -> Self {
        Self::default()
    }

    pub fn tiled(geometry: Rectangle) -> Self {
        Self {
            tiled: true,
            geometry: Some(geometry),
        }
    }
}

/// Calls the core makes into the policy engine
///
/// Every call is side-effect only from the core's point of view, except for
/// the optional [`TilingDecision`] returned when an Xdg view is configured.
#[cfg_attr(test, mockall::automock)]
pub trait WindowPolicy {
    /// Allocates an identity for a new toplevel before the view is registered
    fn create_window(&mut self) -> WindowId;

    /// Releases an identity; the view is gone from the core once this is called
    fn destroy_window(&mut self, id: WindowId);

    /// Asks for placement of a freshly mapped Xdg view
    fn configure_window(
        &mut self,
        id: WindowId,
        geometry: Rectangle,
        app_id: &str,
        fullscreen: bool,
    ) -> TilingDecision;

    /// No-return variant of `configure_window` used by the XWayland backend
    fn handle_window_ready(&mut self, id: WindowId);

    /// The view's applied geometry changed after a commit
    fn updated_window(&mut self, id: WindowId);

    fn advise_focus_gained(&mut self, id: WindowId);

    /// The view is about to be destroyed
    fn advise_delete_window(&mut self, id: WindowId);
}
