//! Core compositor context
//!
//! [`Compositor`] owns the view registry, the output layout and the
//! interaction state, and holds the seat and policy engine it talks to. The
//! caller's event loop feeds it backend notifications and pointer events one
//! at a time; every operation runs to completion before the next one starts.

use log::{debug, info, trace};

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::geometry::Rectangle;
use crate::input::{Interaction, InteractionState, ResizeEdges};
use crate::output::{OutputId, OutputLayout};
use crate::policy::{WindowId, WindowPolicy};
use crate::region::Region;
use crate::seat::Seat;
use crate::surface::{AckToken, SurfaceKind, ViewSurface};
use crate::view::{CommitOutcome, ViewHit, ViewRegistry};

/// Notification delivered by a surface backend for one view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Map,
    Unmap,
    Commit,
    RequestMove,
    RequestResize { edges: ResizeEdges },
    Destroy,
}

/// The single owned context every core operation runs against
pub struct Compositor {
    config: CoreConfig,
    views: ViewRegistry,
    outputs: OutputLayout,
    interaction: Interaction,
    seat: Box<dyn Seat>,
    policy: Box<dyn WindowPolicy>,
}

impl Compositor {
    /// Creates a compositor core with no outputs and no views
    pub fn new(
        config: CoreConfig,
        seat: Box<dyn Seat>,
        policy: Box<dyn WindowPolicy>,
    ) -> Result<Self> {
        config.validate()?;

        info!("🏗️ Initializing view core...");
        let outputs = OutputLayout::new(&config.damage);
        let interaction = Interaction::new(&config.interaction);

        Ok(Self {
            config,
            views: ViewRegistry::new(),
            outputs,
            interaction,
            seat,
            policy,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn outputs(&self) -> &OutputLayout {
        &self.outputs
    }

    pub fn interaction(&self) -> &InteractionState {
        self.interaction.state()
    }

    pub fn seat(&self) -> &dyn Seat {
        self.seat.as_ref()
    }

    pub fn add_output(&mut self, name: impl Into<String>, layout_box: Rectangle) -> OutputId {
        let name = name.into();
        info!("🖥️ Adding output {} at {:?}", name, layout_box);
        self.outputs.add_output(name, layout_box)
    }

    /// Removes an output; its undrained damage is dropped with it
    pub fn remove_output(&mut self, id: OutputId) -> Result<()> {
        let output = self
            .outputs
            .remove_output(id)
            .ok_or(CoreError::UnknownOutput(id))?;
        info!("🖥️ Removed output {}", output.name());
        Ok(())
    }

    /// Registers a new toplevel under an identity allocated by the policy engine
    pub fn new_toplevel(&mut self, surface: ViewSurface) -> Result<WindowId> {
        let id = self.policy.create_window();
        self.views.create(id, surface)
    }

    /// Dispatches one backend notification
    pub fn handle_surface_event(&mut self, id: WindowId, event: SurfaceEvent) -> Result<()> {
        trace!("View {} event {:?}", id, event);
        match event {
            SurfaceEvent::Map => self.map(id),
            SurfaceEvent::Unmap => self.unmap(id),
            SurfaceEvent::Commit => self.commit(id).map(|_| ()),
            SurfaceEvent::RequestMove => self.request_move(id).map(|_| ()),
            SurfaceEvent::RequestResize { edges } => self.request_resize(id, edges).map(|_| ()),
            SurfaceEvent::Destroy => self.destroy(id),
        }
    }

    /// Makes a view visible and hands it to the policy engine for placement
    pub fn map(&mut self, id: WindowId) -> Result<()> {
        let view = self.views.view_mut(id)?;
        if view.is_mapped() {
            return Ok(());
        }
        if view.surface().current_surface().is_none() {
            trace!("View {} has no surface yet, not mapping", id);
            return Ok(());
        }

        let surface = view.surface();
        let loc = match surface.kind() {
            SurfaceKind::Xdg => view.geometry().loc(),
            // X11 windows place themselves
            SurfaceKind::XWayland => surface.geometry().loc(),
        };
        let geo = Rectangle::from_loc_and_size(loc, surface.current_size());
        let kind = surface.kind();
        let app_id = surface.app_id();
        let fullscreen = surface.fullscreen_requested();

        view.adopt_geometry(geo);
        view.set_mapped(true);
        view.damage_whole(&mut self.outputs);
        debug!("Mapped {:?} view {} at {:?}", kind, id, geo);

        self.focus(id)?;

        match kind {
            SurfaceKind::Xdg => {
                let decision = self.policy.configure_window(id, geo, &app_id, fullscreen);
                if let Some(target) = decision.geometry.filter(|&target| target != geo) {
                    debug!(
                        "Policy placed view {} at {:?} (tiled: {})",
                        id, target, decision.tiled
                    );
                    self.request_geometry(id, target)?;
                }
            }
            SurfaceKind::XWayland => self.policy.handle_window_ready(id),
        }

        Ok(())
    }

    /// Hides a view, repainting the area it vacated
    pub fn unmap(&mut self, id: WindowId) -> Result<()> {
        let view = self.views.view_mut(id)?;
        if !view.is_mapped() {
            return Ok(());
        }

        view.damage_whole(&mut self.outputs);
        view.set_mapped(false);
        self.interaction.invalidate(id);
        debug!("Unmapped view {}", id);
        Ok(())
    }

    /// Processes a backend commit and notifies the policy engine of geometry changes
    pub fn commit(&mut self, id: WindowId) -> Result<CommitOutcome> {
        let outcome = self.views.view_mut(id)?.commit(&mut self.outputs);

        let notify = outcome.resized
            || (outcome.moved && self.config.handshake.notify_on_position_change);
        if notify {
            self.policy.updated_window(id);
        }
        Ok(outcome)
    }

    /// Asks a view's backend for a new geometry
    ///
    /// The applied geometry only follows once the client commits.
    pub fn request_geometry(&mut self, id: WindowId, geo: Rectangle) -> Result<AckToken> {
        Ok(self.views.view_mut(id)?.request_geometry(geo))
    }

    /// Starts an interactive move; returns whether a grab began
    pub fn request_move(&mut self, id: WindowId) -> Result<bool> {
        let view = self.views.view(id)?;
        if !view.is_mapped() {
            trace!("Move request from unmapped view {}", id);
            return Ok(false);
        }

        let snapshot = Rectangle::from_loc_and_size(
            view.geometry().loc(),
            view.surface().geometry().size(),
        );
        Ok(self.interaction.begin_move(
            id,
            view.surface().current_surface(),
            self.seat.pointer_focus(),
            snapshot,
        ))
    }

    /// Starts an interactive resize along `edges`; returns whether a grab began
    pub fn request_resize(&mut self, id: WindowId, edges: ResizeEdges) -> Result<bool> {
        let view = self.views.view(id)?;
        if !view.is_mapped() {
            trace!("Resize request from unmapped view {}", id);
            return Ok(false);
        }

        Ok(self.interaction.begin_resize(
            id,
            view.surface().current_surface(),
            self.seat.pointer_focus(),
            view.geometry(),
            edges,
        ))
    }

    /// Destroys a view; unknown identities are ignored
    pub fn destroy(&mut self, id: WindowId) -> Result<()> {
        let Some(view) = self.views.get(id) else {
            trace!("View {} already destroyed", id);
            return Ok(());
        };

        if view.is_mapped() {
            view.damage_whole(&mut self.outputs);
        }
        self.interaction.invalidate(id);

        self.policy.advise_delete_window(id);
        self.views.destroy(id);
        self.policy.destroy_window(id);
        Ok(())
    }

    /// Raises and activates a view and gives it keyboard focus
    pub fn focus(&mut self, id: WindowId) -> Result<()> {
        if self.views.focus(id, self.seat.as_mut())? {
            self.policy.advise_focus_gained(id);
        }
        Ok(())
    }

    /// Damages part of a view (view-local), or all of it when `region` is `None`
    pub fn damage(&mut self, id: WindowId, region: Option<&Region>) -> Result<()> {
        let view = self.views.view(id)?;
        if !view.is_mapped() {
            return Ok(());
        }
        view.damage(&mut self.outputs, region);
        Ok(())
    }

    /// Handles pointer motion in global coordinates
    ///
    /// During a grab the motion becomes a geometry request for the grabbed
    /// view. Otherwise pointer focus follows the view under the cursor.
    pub fn pointer_motion(&mut self, x: f64, y: f64) -> Result<()> {
        let stale = self
            .interaction
            .state()
            .grab()
            .map(|grab| grab.view)
            .filter(|&view| !self.views.contains(view));
        if let Some(view) = stale {
            self.interaction.invalidate(view);
        }

        if let Some((id, target)) = self.interaction.motion(x, y) {
            self.request_geometry(id, target)?;
            return Ok(());
        }

        match self.hit_test(x.floor() as i32, y.floor() as i32) {
            Some(ViewHit { hit, .. }) => self.seat.pointer_enter(hit.surface, hit.local),
            None => {
                if self.seat.pointer_focus().is_some() {
                    self.seat.pointer_clear_focus();
                }
            }
        }
        Ok(())
    }

    /// Handles a pointer button press or release
    pub fn pointer_button(&mut self, pressed: bool) -> Result<()> {
        if !pressed {
            self.interaction.release();
            return Ok(());
        }

        if !self.config.interaction.focus_on_click || !self.interaction.state().is_idle() {
            return Ok(());
        }

        let (x, y) = self.interaction.cursor();
        if let Some(hit) = self.hit_test(x.floor() as i32, y.floor() as i32) {
            self.focus(hit.view)?;
        }
        Ok(())
    }

    /// Front-most mapped view under a global point
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ViewHit> {
        self.views.hit_test(x, y)
    }

    pub fn affected_outputs(&self, id: WindowId) -> Result<Vec<OutputId>> {
        self.views.affected_outputs(id, &self.outputs)
    }

    /// Takes an output's accumulated damage for a repaint
    pub fn drain_damage(&mut self, output: OutputId) -> Result<Vec<Rectangle>> {
        self.outputs.drain_damage(output)
    }
}
