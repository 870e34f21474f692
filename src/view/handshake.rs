//! Geometry/serial handshake
//!
//! A view is either idle or awaiting the acknowledgement of exactly one
//! geometry request. Requests never touch the applied geometry; it only
//! changes on commit, once the client actually has content of the new size.

use log::debug;

use crate::geometry::Rectangle;
use crate::output::OutputLayout;
use crate::surface::AckToken;

use super::{PendingAck, View};

/// What a commit changed about a view's applied geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    /// Applied size changed to the backend's current size
    pub resized: bool,
    /// A satisfied request moved the view
    pub moved: bool,
    /// An outstanding request was acknowledged by this commit
    pub acknowledged: bool,
}

impl CommitOutcome {
    pub fn geometry_changed(&self) -> bool {
        self.resized || self.moved
    }
}

impl View {
    /// Asks the backend for a new geometry
    ///
    /// Supersedes any outstanding request: only the latest token is kept. The
    /// applied geometry is left alone until a commit confirms the change.
    pub fn request_geometry(&mut self, geo: Rectangle) -> AckToken {
        let token = self.surface.request_size(geo);

        if let Some(previous) = self.pending_ack {
            debug!(
                "View {} request {:?} supersedes {:?}",
                self.id, token, previous.token
            );
        }
        debug!("View {} requested geometry {:?} ({:?})", self.id, geo, token);

        self.pending_ack = Some(PendingAck {
            token,
            requested: geo,
        });
        token
    }

    /// Processes a backend commit
    ///
    /// Forwards the commit's effective damage, adopts the backend's current
    /// size if it differs from the applied one (whether or not it was
    /// requested), and settles the pending request once its token is
    /// satisfied. Unmapped or surfaceless views are ignored.
    pub fn commit(&mut self, layout: &mut OutputLayout) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        if !self.mapped || self.surface.current_surface().is_none() {
            return outcome;
        }

        let damage = self.surface.effective_damage();
        self.damage(layout, Some(&damage));

        let size = self.surface.current_size();
        if size != self.geo.size() {
            self.damage_whole(layout);
            debug!(
                "View {} size changed {:?} -> {:?}",
                self.id,
                self.geo.size(),
                size
            );
            self.geo = self.geo.with_size(size);
            self.damage_whole(layout);
            outcome.resized = true;
        }

        if let Some(pending) = self.pending_ack {
            if self.surface.is_acknowledged(pending.token) {
                if pending.requested.loc() != self.geo.loc() {
                    self.damage_whole(layout);
                    self.geo = self.geo.with_loc(pending.requested.loc());
                    outcome.moved = true;
                }

                // The last frame may have been clipped by partial damage
                self.damage_whole(layout);
                self.pending_ack = None;
                outcome.acknowledged = true;
                debug!("View {} acknowledged {:?}", self.id, pending.token);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DamageConfig;
    use crate::geometry::Size;
    use crate::headless::{HeadlessXdgToplevel, HeadlessXwaylandSurface};
    use crate::policy::WindowId;
    use crate::surface::{SurfaceId, ViewSurface};

    fn layout() -> OutputLayout {
        let config = DamageConfig {
            merge_on_drain: false,
            ..DamageConfig::default()
        };
        let mut layout = OutputLayout::new(&config);
        layout.add_output("HDMI-A-1", Rectangle::new(0, 0, 1920, 1080));
        layout
    }

    fn mapped(surface: ViewSurface, geo: Rectangle) -> View {
        let mut view = View::new(WindowId(1), surface);
        view.adopt_geometry(geo);
        view.set_mapped(true);
        view
    }

    #[test]
    fn test_request_does_not_touch_geometry() {
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg), Rectangle::new(0, 0, 100, 100));

        let token = view.request_geometry(Rectangle::new(0, 0, 200, 150));

        assert_eq!(view.geometry(), Rectangle::new(0, 0, 100, 100));
        assert_eq!(view.pending_ack().map(|p| p.token), Some(token));
    }

    #[test]
    fn test_second_request_replaces_first() {
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg), Rectangle::new(0, 0, 100, 100));

        let first = view.request_geometry(Rectangle::new(0, 0, 200, 150));
        let second = view.request_geometry(Rectangle::new(0, 0, 300, 150));

        assert_ne!(first, second);
        let pending = view.pending_ack().unwrap();
        assert_eq!(pending.token, second);
        assert_eq!(pending.requested, Rectangle::new(0, 0, 300, 150));
    }

    #[test]
    fn test_older_ack_keeps_request_pending() {
        let mut layout = layout();
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg.clone()), Rectangle::new(0, 0, 100, 100));

        let first = view.request_geometry(Rectangle::new(0, 0, 200, 150));
        let second = view.request_geometry(Rectangle::new(0, 0, 300, 150));

        xdg.ack_configure(first.0);
        xdg.commit(Size::new(200, 150), None);
        let outcome = view.commit(&mut layout);

        assert!(outcome.resized);
        assert!(!outcome.acknowledged);
        assert_eq!(view.pending_ack().map(|p| p.token), Some(second));

        xdg.ack_configure(second.0);
        xdg.commit(Size::new(300, 150), None);
        let outcome = view.commit(&mut layout);

        assert!(outcome.acknowledged);
        assert!(view.pending_ack().is_none());
        assert_eq!(view.geometry(), Rectangle::new(0, 0, 300, 150));
    }

    #[test]
    fn test_unrequested_resize_is_adopted() {
        let mut layout = layout();
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg.clone()), Rectangle::new(10, 10, 100, 100));

        xdg.commit(Size::new(120, 80), None);
        let outcome = view.commit(&mut layout);

        assert!(outcome.resized);
        assert!(!outcome.moved);
        assert_eq!(view.geometry(), Rectangle::new(10, 10, 120, 80));

        let pending = layout.outputs().next().unwrap().damage().pending().to_vec();
        assert!(pending.contains(&Rectangle::new(10, 10, 100, 100)));
        assert!(pending.contains(&Rectangle::new(10, 10, 120, 80)));
    }

    #[test]
    fn test_pure_repaint_commit_changes_nothing() {
        let mut layout = layout();
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg.clone()), Rectangle::new(10, 10, 100, 100));

        xdg.commit(Size::new(100, 100), Some(Rectangle::new(5, 5, 10, 10)));
        let outcome = view.commit(&mut layout);

        assert_eq!(outcome, CommitOutcome::default());
        let pending = layout.outputs().next().unwrap().damage().pending().to_vec();
        assert_eq!(pending, vec![Rectangle::new(15, 15, 10, 10)]);
    }

    #[test]
    fn test_unmapped_commit_is_ignored() {
        let mut layout = layout();
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = View::new(WindowId(1), ViewSurface::xdg(xdg.clone()));

        xdg.commit(Size::new(300, 300), Some(Rectangle::new(0, 0, 300, 300)));
        let outcome = view.commit(&mut layout);

        assert_eq!(outcome, CommitOutcome::default());
        assert_eq!(view.geometry(), Rectangle::default());
        assert!(!layout.outputs().next().unwrap().frame_pending());
    }

    #[test]
    fn test_acknowledged_request_applies_position() {
        let mut layout = layout();
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(100, 100));
        let mut view = mapped(ViewSurface::xdg(xdg.clone()), Rectangle::new(0, 0, 100, 100));

        let token = view.request_geometry(Rectangle::new(40, 50, 100, 100));
        xdg.ack_configure(token.0);
        xdg.commit(Size::new(100, 100), None);
        let outcome = view.commit(&mut layout);

        assert!(outcome.moved);
        assert!(!outcome.resized);
        assert_eq!(view.geometry(), Rectangle::new(40, 50, 100, 100));
    }

    #[test]
    fn test_xwayland_token_cleared_by_any_commit() {
        let mut layout = layout();
        let x11 = HeadlessXwaylandSurface::new(Some(SurfaceId(3)), Rectangle::new(0, 0, 100, 100));
        let mut view = mapped(ViewSurface::xwayland(x11.clone()), Rectangle::new(0, 0, 100, 100));

        let token = view.request_geometry(Rectangle::new(0, 0, 640, 480));
        assert_eq!(token, AckToken::SYNTHETIC);

        x11.commit(Size::new(640, 480), None);
        let outcome = view.commit(&mut layout);

        assert!(outcome.acknowledged);
        assert!(outcome.resized);
        assert!(view.pending_ack().is_none());
        assert_eq!(view.geometry(), Rectangle::new(0, 0, 640, 480));
    }
}
