//! Shared fixtures for integration tests

#![allow(dead_code)]

use wayview::headless::{HeadlessSeat, HeadlessXdgToplevel, RecordingPolicy};
use wayview::{Compositor, CoreConfig, Rectangle, Size, SurfaceId, ViewSurface, WindowId};

/// A compositor core wired to headless collaborators
pub struct Harness {
    pub compositor: Compositor,
    pub policy: RecordingPolicy,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        let policy = RecordingPolicy::new();
        let compositor = Compositor::new(
            config,
            Box::new(HeadlessSeat::new()),
            Box::new(policy.clone()),
        )
        .expect("valid configuration");
        Self { compositor, policy }
    }

    /// Creates and maps an Xdg view of `size` at the origin
    pub fn map_xdg(&mut self, surface: u64, size: Size) -> (WindowId, HeadlessXdgToplevel) {
        let xdg = HeadlessXdgToplevel::new(SurfaceId(surface), size);
        let id = self
            .compositor
            .new_toplevel(ViewSurface::xdg(xdg.clone()))
            .expect("fresh identity");
        self.compositor.map(id).expect("view exists");
        (id, xdg)
    }

    /// Moves a mapped Xdg view to `geo` through a full request/ack/commit cycle
    pub fn place(&mut self, id: WindowId, xdg: &HeadlessXdgToplevel, geo: Rectangle) {
        let token = self
            .compositor
            .request_geometry(id, geo)
            .expect("view exists");
        xdg.ack_configure(token.0);
        xdg.commit(geo.size(), None);
        self.compositor.commit(id).expect("view exists");
    }

    /// Drains every output, discarding the damage
    pub fn settle(&mut self) {
        let outputs: Vec<_> = self.compositor.outputs().outputs().map(|o| o.id()).collect();
        for output in outputs {
            self.compositor.drain_damage(output).expect("output exists");
        }
    }
}

/// Config that keeps drained damage exactly as it was added
pub fn unmerged_config() -> CoreConfig {
    let mut config = CoreConfig::default();
    config.damage.merge_on_drain = false;
    config
}
