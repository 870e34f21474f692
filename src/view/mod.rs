//! Views and the view registry
//!
//! A [`View`] is one managed client window. The [`ViewRegistry`] exclusively
//! owns every view, keeps the front-to-back stacking order and resolves
//! identities. Everything outside the registry (the policy engine, grabs)
//! refers to views by [`WindowId`] only, so a destroyed view simply stops
//! resolving.

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::error::{CoreError, Result};
use crate::geometry::{Point, Rectangle};
use crate::output::{OutputId, OutputLayout};
use crate::policy::WindowId;
use crate::seat::Seat;
use crate::surface::{AckToken, SurfaceHit, SurfaceKind, Subscription, ViewSurface};

pub mod damage;
pub mod handshake;

pub use handshake::CommitOutcome;

/// An outstanding geometry request awaiting the client's acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAck {
    pub token: AckToken,
    /// Geometry that was requested; only its position is ever applied directly
    pub requested: Rectangle,
}

/// One managed client window
#[derive(Debug)]
pub struct View {
    id: WindowId,
    surface: ViewSurface,
    geo: Rectangle,
    mapped: bool,
    pending_ack: Option<PendingAck>,
    subscription: Option<Subscription>,
}

impl View {
    fn new(id: WindowId, mut surface: ViewSurface) -> Self {
        let subscription = surface.subscribe();
        Self {
            id,
            geo: Rectangle::default(),
            surface,
            mapped: false,
            pending_ack: None,
            subscription: Some(subscription),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> SurfaceKind {
        self.surface.kind()
    }

    pub fn surface(&self) -> &ViewSurface {
        &self.surface
    }

    /// Last applied geometry in global coordinates
    pub fn geometry(&self) -> Rectangle {
        self.geo
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn pending_ack(&self) -> Option<PendingAck> {
        self.pending_ack
    }

    /// Whether backend events are still subscribed
    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    pub(crate) fn set_mapped(&mut self, mapped: bool) {
        self.mapped = mapped;
    }

    /// Adopts a geometry without a handshake; only used while the view is
    /// being mapped and nothing of it has been shown yet
    pub(crate) fn adopt_geometry(&mut self, geo: Rectangle) {
        self.geo = geo;
    }

    /// Hit test at global coordinates
    fn surface_at(&self, x: i32, y: i32) -> Option<SurfaceHit> {
        let local = Point::new(x - self.geo.x, y - self.geo.y);
        self.surface.surface_at(local)
    }

    /// Detaches backend listeners; later calls are no-ops
    fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}

/// A view found under a global point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewHit {
    pub view: WindowId,
    pub hit: SurfaceHit,
}

/// Owner of every view and of the stacking order
#[derive(Debug, Default)]
pub struct ViewRegistry {
    /// View tracking by ID
    views: HashMap<WindowId, View>,

    /// Stacking order, front first
    stacking: VecDeque<WindowId>,

    /// View whose surface was last activated
    focused: Option<WindowId>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view for an identity the policy engine already allocated
    ///
    /// The view starts unmapped and outside the stacking order, and its
    /// backend events are subscribed until it is destroyed.
    pub fn create(&mut self, id: WindowId, surface: ViewSurface) -> Result<WindowId> {
        if self.views.contains_key(&id) {
            return Err(CoreError::DuplicateView(id));
        }

        let view = View::new(id, surface);
        debug!("Created {:?} view {}", view.kind(), id);
        self.views.insert(id, view);
        Ok(id)
    }

    /// Removes a view and detaches its subscriptions
    ///
    /// Returns `None` if the view is already gone.
    pub fn destroy(&mut self, id: WindowId) -> Option<View> {
        let mut view = self.views.remove(&id)?;
        view.unsubscribe();

        self.stacking.retain(|&stacked| stacked != id);
        if self.focused == Some(id) {
            self.focused = None;
        }

        debug!("Destroyed view {}", id);
        Some(view)
    }

    pub fn get(&self, id: WindowId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    /// Looks up a view that must exist
    pub fn view(&self, id: WindowId) -> Result<&View> {
        self.views.get(&id).ok_or(CoreError::UnknownView(id))
    }

    pub fn view_mut(&mut self, id: WindowId) -> Result<&mut View> {
        self.views.get_mut(&id).ok_or(CoreError::UnknownView(id))
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// Stacked views, front first
    pub fn stacking_order(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.stacking.iter().copied()
    }

    fn raise(&mut self, id: WindowId) {
        self.stacking.retain(|&stacked| stacked != id);
        self.stacking.push_front(id);
    }

    /// Focuses a view
    ///
    /// Raises it to the front, deactivates the previously focused view,
    /// activates this one and hands it keyboard focus. Returns `false` without
    /// touching anything if its surface already holds keyboard focus.
    pub fn focus(&mut self, id: WindowId, seat: &mut dyn Seat) -> Result<bool> {
        let surface = self.view(id)?.surface.current_surface();
        if surface.is_some() && seat.keyboard_focus() == surface {
            return Ok(false);
        }

        if let Some(previous) = self.focused.filter(|&previous| previous != id) {
            if let Some(view) = self.views.get_mut(&previous) {
                view.surface.activate(false);
            }
        }

        self.raise(id);
        self.view_mut(id)?.surface.activate(true);
        if let Some(surface) = surface {
            seat.keyboard_enter(surface);
        }
        self.focused = Some(id);

        debug!("Focused view {}", id);
        Ok(true)
    }

    /// Finds the front-most mapped view with a surface under the global point
    ///
    /// Stacking order decides occlusion: a view further back is never
    /// returned while a view in front of it reports a hit.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ViewHit> {
        self.stacking
            .iter()
            .filter_map(|id| self.views.get(id))
            .filter(|view| view.mapped)
            .find_map(|view| {
                view.surface_at(x, y).map(|hit| ViewHit {
                    view: view.id,
                    hit,
                })
            })
    }

    /// Outputs touched by a view's corners, without duplicates
    pub fn affected_outputs(&self, id: WindowId, layout: &OutputLayout) -> Result<Vec<OutputId>> {
        Ok(damage::affected_outputs(self.view(id)?.geo, layout))
    }

    pub fn for_each_affected_output(
        &self,
        id: WindowId,
        layout: &OutputLayout,
        mut f: impl FnMut(OutputId),
    ) -> Result<()> {
        for output in self.affected_outputs(id, layout)? {
            f(output);
        }
        Ok(())
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }
}
