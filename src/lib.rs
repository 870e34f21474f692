//! # Wayview
//!
//! View management and damage synchronization core for a Wayland compositor.
//!
//! Wayview sits between a protocol library (surfaces, outputs, seat) and an
//! external window-management policy engine. It tracks every managed client
//! window as a view, negotiates geometry changes with clients through a
//! configure/acknowledge handshake, routes damage to the outputs a view
//! touches, and drives interactive move/resize.
//!
//! ## Architecture
//!
//! - `surface`: Surface adapter over the Xdg and XWayland backends
//! - `view`: View registry, geometry handshake and damage propagation
//! - `output`: Output layout and per-output damage accumulation
//! - `input`: Interactive move/resize state machine
//! - `compositor`: The owned context tying everything together
//! - `policy` / `seat`: Interfaces to the policy engine and input library
//! - `headless`: In-memory collaborators for tests and replay
//! - `config`: Configuration parsing and management
//!
//! ## Usage
//!
//! ```rust
//! use wayview::headless::{HeadlessSeat, HeadlessXdgToplevel, RecordingPolicy};
//! use wayview::{Compositor, CoreConfig, Rectangle, Size, SurfaceId, ViewSurface};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut compositor = Compositor::new(
//!         CoreConfig::default(),
//!         Box::new(HeadlessSeat::new()),
//!         Box::new(RecordingPolicy::new()),
//!     )?;
//!     let output = compositor.add_output("HDMI-A-1", Rectangle::new(0, 0, 1920, 1080));
//!
//!     let toplevel = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(640, 480));
//!     let view = compositor.new_toplevel(ViewSurface::xdg(toplevel))?;
//!     compositor.map(view)?;
//!
//!     let damage = compositor.drain_damage(output)?;
//!     assert_eq!(damage, vec![Rectangle::new(0, 0, 640, 480)]);
//!     Ok(())
//! }
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod input;
pub mod output;
pub mod policy;
pub mod region;
pub mod seat;
pub mod surface;
pub mod view;

// Re-export main types for easy access
pub use compositor::{Compositor, SurfaceEvent};
pub use config::CoreConfig;
pub use error::CoreError;
pub use geometry::{Point, Rectangle, Size};
pub use input::{InteractionState, ResizeEdges};
pub use output::{OutputId, OutputLayout};
pub use policy::{TilingDecision, WindowId, WindowPolicy};
pub use region::Region;
pub use seat::Seat;
pub use surface::{AckToken, SurfaceId, SurfaceKind, ViewSurface};
pub use view::{CommitOutcome, View, ViewRegistry};

/// Version information for Wayview
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
