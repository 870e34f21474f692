//! Seat primitives consumed from the input library

use crate::geometry::Point;
use crate::surface::SurfaceId;

/// Pointer and keyboard focus state owned by the input library
#[cfg_attr(test, mockall::automock)]
pub trait Seat {
    /// Surface currently under pointer focus, if any
    fn pointer_focus(&self) -> Option<SurfaceId>;

    /// Gives pointer focus to `surface` at surface-local `local` coordinates
    fn pointer_enter(&mut self, surface: SurfaceId, local: Point);

    fn pointer_clear_focus(&mut self);

    /// Surface currently holding keyboard focus, if any
    fn keyboard_focus(&self) -> Option<SurfaceId>;

    /// Transfers keyboard focus to `surface`
    fn keyboard_enter(&mut self, surface: SurfaceId);
}
