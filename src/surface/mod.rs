//! Surface adapter
//!
//! Normalizes the two supported backend surface kinds (Xdg toplevels and
//! XWayland surfaces) into one [`ViewSurface`] with a uniform capability set:
//! hit testing, current surface/size queries, effective damage, sized
//! requests with an acknowledgement token, activation and surface-tree
//! iteration.
//!
//! The two backends differ in who is authoritative for a resize. An Xdg client
//! acknowledges a configure serial and commits a buffer of the new size; an
//! XWayland surface is configured by the server directly. Both are expressed
//! through [`AckToken`] so the handshake and damage code never branch on the
//! backend kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rectangle, Size};
use crate::region::Region;

mod subscription;

pub use subscription::Subscription;

/// Identity of a pixel-bearing backend surface (a `wl_surface`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Handshake identifier correlating a size request with the client's commit
///
/// For Xdg this is the configure serial. XWayland uses the synthetic
/// [`AckToken::SYNTHETIC`] value, which any later commit satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AckToken(pub u32);

impl AckToken {
    pub const SYNTHETIC: AckToken = AckToken(1);
}

/// Result of a successful hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHit {
    pub surface: SurfaceId,
    /// Coordinates local to `surface`
    pub local: Point,
}

/// Backend surface kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    Xdg,
    #[serde(rename = "xwayland")]
    XWayland,
}

/// Operations the Xdg shell backend provides for a toplevel
pub trait XdgToplevelHandle {
    /// The backing `wl_surface`, `None` once the backend has torn it down
    fn surface(&self) -> Option<SurfaceId>;

    /// Hit test in surface-local coordinates across the surface and its sub-surfaces
    fn surface_at(&self, local: Point) -> Option<SurfaceHit>;

    /// Window geometry the client declared for itself
    fn geometry(&self) -> Rectangle;

    /// Size of the currently committed buffer
    fn current_size(&self) -> Size;

    /// Damage accumulated by the latest commit, surface-local
    fn effective_damage(&self) -> Region;

    /// Latest configure serial the client has acknowledged
    fn configure_serial(&self) -> u32;

    /// Sends a configure with the given size and returns its serial
    fn set_size(&mut self, size: Size) -> u32;

    fn set_activated(&mut self, activated: bool);

    /// Visits the surface and each sub-surface with its offset in surface-local coordinates
    fn for_each_surface(&self, visitor: &mut dyn FnMut(SurfaceId, Point));

    fn app_id(&self) -> String;

    fn fullscreen_requested(&self) -> bool;

    /// Starts delivering map/unmap/commit/move/resize/destroy for this toplevel
    fn subscribe(&mut self) -> Subscription;
}

/// Operations the XWayland backend provides for an X11 window
pub trait XwaylandSurfaceHandle {
    /// `None` until the X11 window has been associated with a `wl_surface`
    fn surface(&self) -> Option<SurfaceId>;

    fn surface_at(&self, local: Point) -> Option<SurfaceHit>;

    fn geometry(&self) -> Rectangle;

    fn current_size(&self) -> Size;

    fn effective_damage(&self) -> Region;

    /// Server-authoritative configure of position and size
    fn configure(&mut self, geometry: Rectangle);

    fn activate(&mut self, activated: bool);

    fn class(&self) -> String;

    fn subscribe(&mut self) -> Subscription;
}

/// One backend surface behind a uniform interface
pub enum ViewSurface {
    Xdg(Box<dyn XdgToplevelHandle>),
    XWayland(Box<dyn XwaylandSurfaceHandle>),
}

impl ViewSurface {
    pub fn xdg(handle: impl XdgToplevelHandle + 'static) -> Self {
        ViewSurface::Xdg(Box::new(handle))
    }

    pub fn xwayland(handle: impl XwaylandSurfaceHandle + 'static) -> Self {
        ViewSurface::XWayland(Box::new(handle))
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            ViewSurface::Xdg(_) => SurfaceKind::Xdg,
            ViewSurface::XWayland(_) => SurfaceKind::XWayland,
        }
    }

    /// The live backend surface, `None` until one exists
    pub fn current_surface(&self) -> Option<SurfaceId> {
        match self {
            ViewSurface::Xdg(xdg) => xdg.surface(),
            ViewSurface::XWayland(xwayland) => xwayland.surface(),
        }
    }

    /// Hit test at view-local coordinates
    ///
    /// Returns `None` when nothing is hit or when the backend has no surface
    /// yet (an XWayland window that was never associated).
    pub fn surface_at(&self, local: Point) -> Option<SurfaceHit> {
        match self {
            ViewSurface::Xdg(xdg) => xdg.surface_at(local),
            ViewSurface::XWayland(xwayland) => {
                xwayland.surface()?;
                xwayland.surface_at(local)
            }
        }
    }

    pub fn geometry(&self) -> Rectangle {
        match self {
            ViewSurface::Xdg(xdg) => xdg.geometry(),
            ViewSurface::XWayland(xwayland) => xwayland.geometry(),
        }
    }

    /// Authoritative size of what the client has committed
    pub fn current_size(&self) -> Size {
        match self {
            ViewSurface::Xdg(xdg) => xdg.current_size(),
            ViewSurface::XWayland(xwayland) => xwayland.current_size(),
        }
    }

    pub fn effective_damage(&self) -> Region {
        match self {
            ViewSurface::Xdg(xdg) => xdg.effective_damage(),
            ViewSurface::XWayland(xwayland) => xwayland.effective_damage(),
        }
    }

    /// Requests a new geometry from the backend
    ///
    /// Xdg only carries the size to the client; the returned token is the
    /// configure serial the client must acknowledge. XWayland is configured
    /// with position and size at once and returns [`AckToken::SYNTHETIC`].
    pub fn request_size(&mut self, geometry: Rectangle) -> AckToken {
        match self {
            ViewSurface::Xdg(xdg) => AckToken(xdg.set_size(geometry.size())),
            ViewSurface::XWayland(xwayland) => {
                xwayland.configure(geometry);
                AckToken::SYNTHETIC
            }
        }
    }

    /// Whether a commit happening now satisfies `token`
    ///
    /// Serials are compared monotonically: acknowledging a newer configure
    /// also satisfies every older one.
    pub fn is_acknowledged(&self, token: AckToken) -> bool {
        match self {
            ViewSurface::Xdg(xdg) => xdg.configure_serial() >= token.0,
            ViewSurface::XWayland(_) => true,
        }
    }

    pub fn activate(&mut self, activated: bool) {
        match self {
            ViewSurface::Xdg(xdg) => xdg.set_activated(activated),
            ViewSurface::XWayland(xwayland) => xwayland.activate(activated),
        }
    }

    /// Visits every surface making up the view with its view-local offset
    ///
    /// Xdg views yield the toplevel surface and its sub-surfaces; XWayland
    /// views yield their single surface, or nothing if it doesn't exist yet.
    /// Each call starts a fresh traversal.
    pub fn for_each_surface(&self, mut visitor: impl FnMut(SurfaceId, Point)) {
        match self {
            ViewSurface::Xdg(xdg) => xdg.for_each_surface(&mut visitor),
            ViewSurface::XWayland(xwayland) => {
                if let Some(surface) = xwayland.surface() {
                    visitor(surface, Point::default());
                }
            }
        }
    }

    /// Application identifier (Xdg app id, X11 class)
    pub fn app_id(&self) -> String {
        match self {
            ViewSurface::Xdg(xdg) => xdg.app_id(),
            ViewSurface::XWayland(xwayland) => xwayland.class(),
        }
    }

    pub fn fullscreen_requested(&self) -> bool {
        match self {
            ViewSurface::Xdg(xdg) => xdg.fullscreen_requested(),
            ViewSurface::XWayland(_) => false,
        }
    }

    pub fn subscribe(&mut self) -> Subscription {
        match self {
            ViewSurface::Xdg(xdg) => xdg.subscribe(),
            ViewSurface::XWayland(xwayland) => xwayland.subscribe(),
        }
    }
}

impl fmt::Debug for ViewSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSurface")
            .field("kind", &self.kind())
            .field("surface", &self.current_surface())
            .finish()
    }
}
