//! Headless backend
//!
//! In-memory stand-ins for the protocol library, the input library and the
//! policy engine. Handles are cheap clones over shared state, so a test (or the
//! replay tool) keeps one copy to play the client's part while the core owns
//! the other.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::geometry::{Point, Rectangle, Size};
use crate::policy::{TilingDecision, WindowId, WindowPolicy};
use crate::region::Region;
use crate::seat::Seat;
use crate::surface::{
    SurfaceHit, SurfaceId, Subscription, XdgToplevelHandle, XwaylandSurfaceHandle,
};

#[derive(Debug)]
struct XdgState {
    surface: Option<SurfaceId>,
    size: Size,
    geometry: Rectangle,
    damage: Region,
    last_serial: u32,
    acked_serial: u32,
    last_configured: Option<Size>,
    subsurfaces: Vec<(SurfaceId, Rectangle)>,
    activated: bool,
    subscribed: bool,
    app_id: String,
    fullscreen: bool,
}

/// Xdg toplevel driven by hand
#[derive(Debug, Clone)]
pub struct HeadlessXdgToplevel {
    state: Rc<RefCell<XdgState>>,
}

impl HeadlessXdgToplevel {
    pub fn new(surface: SurfaceId, size: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(XdgState {
                surface: Some(surface),
                size,
                geometry: Rectangle::from_loc_and_size(Point::default(), size),
                damage: Region::new(),
                last_serial: 0,
                acked_serial: 0,
                last_configured: None,
                subsurfaces: Vec::new(),
                activated: false,
                subscribed: false,
                app_id: String::new(),
                fullscreen: false,
            })),
        }
    }

    /// Client acknowledges a configure serial
    pub fn ack_configure(&self, serial: u32) {
        let mut state = self.state.borrow_mut();
        state.acked_serial = state.acked_serial.max(serial);
    }

    /// Client commits a buffer of `size`, damaging `damage` (surface-local)
    pub fn commit(&self, size: Size, damage: Option<Rectangle>) {
        let mut state = self.state.borrow_mut();
        state.size = size;
        state.geometry = state.geometry.with_size(size);
        state.damage = damage.map(Region::from_rect).unwrap_or_default();
        trace!("Headless xdg commit {:?} damage {:?}", size, damage);
    }

    /// Size carried by the most recent configure
    pub fn last_configured_size(&self) -> Option<Size> {
        self.state.borrow().last_configured
    }

    /// Latest configure serial sent
    pub fn last_serial(&self) -> u32 {
        self.state.borrow().last_serial
    }

    /// Adds a sub-surface at `rect`, relative to the toplevel surface
    pub fn add_subsurface(&self, surface: SurfaceId, rect: Rectangle) {
        self.state.borrow_mut().subsurfaces.push((surface, rect));
    }

    pub fn set_app_id(&self, app_id: impl Into<String>) {
        self.state.borrow_mut().app_id = app_id.into();
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    /// Tears down the `wl_surface` while the toplevel object lives on
    pub fn destroy_surface(&self) {
        self.state.borrow_mut().surface = None;
    }

    pub fn is_activated(&self) -> bool {
        self.state.borrow().activated
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().subscribed
    }
}

impl XdgToplevelHandle for HeadlessXdgToplevel {
    fn surface(&self) -> Option<SurfaceId> {
        self.state.borrow().surface
    }

    fn surface_at(&self, local: Point) -> Option<SurfaceHit> {
        let state = self.state.borrow();
        let surface = state.surface?;

        // Sub-surfaces stack above the toplevel, newest on top
        for (sub, rect) in state.subsurfaces.iter().rev() {
            if rect.contains_point(local.x, local.y) {
                return Some(SurfaceHit {
                    surface: *sub,
                    local: Point::new(local.x - rect.x, local.y - rect.y),
                });
            }
        }

        Rectangle::from_loc_and_size(Point::default(), state.size)
            .contains_point(local.x, local.y)
            .then_some(SurfaceHit { surface, local })
    }

    fn geometry(&self) -> Rectangle {
        self.state.borrow().geometry
    }

    fn current_size(&self) -> Size {
        self.state.borrow().size
    }

    fn effective_damage(&self) -> Region {
        self.state.borrow().damage.clone()
    }

    fn configure_serial(&self) -> u32 {
        self.state.borrow().acked_serial
    }

    fn set_size(&mut self, size: Size) -> u32 {
        let mut state = self.state.borrow_mut();
        state.last_serial += 1;
        state.last_configured = Some(size);
        state.last_serial
    }

    fn set_activated(&mut self, activated: bool) {
        self.state.borrow_mut().activated = activated;
    }

    fn for_each_surface(&self, visitor: &mut dyn FnMut(SurfaceId, Point)) {
        let state = self.state.borrow();
        let Some(surface) = state.surface else {
            return;
        };
        visitor(surface, Point::default());
        for (sub, rect) in &state.subsurfaces {
            visitor(*sub, rect.loc());
        }
    }

    fn app_id(&self) -> String {
        self.state.borrow().app_id.clone()
    }

    fn fullscreen_requested(&self) -> bool {
        self.state.borrow().fullscreen
    }

    fn subscribe(&mut self) -> Subscription {
        self.state.borrow_mut().subscribed = true;
        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().subscribed = false;
            }
        })
    }
}

#[derive(Debug)]
struct XwaylandState {
    surface: Option<SurfaceId>,
    geometry: Rectangle,
    size: Size,
    damage: Region,
    last_configure: Option<Rectangle>,
    activated: bool,
    subscribed: bool,
    class: String,
}

/// X11 window driven by hand
#[derive(Debug, Clone)]
pub struct HeadlessXwaylandSurface {
    state: Rc<RefCell<XwaylandState>>,
}

impl HeadlessXwaylandSurface {
    pub fn new(surface: Option<SurfaceId>, geometry: Rectangle) -> Self {
        Self {
            state: Rc::new(RefCell::new(XwaylandState {
                surface,
                geometry,
                size: geometry.size(),
                damage: Region::new(),
                last_configure: None,
                activated: false,
                subscribed: false,
                class: String::new(),
            })),
        }
    }

    /// Associates the X11 window with a `wl_surface`
    pub fn associate(&self, surface: SurfaceId) {
        self.state.borrow_mut().surface = Some(surface);
    }

    pub fn dissociate(&self) {
        self.state.borrow_mut().surface = None;
    }

    pub fn commit(&self, size: Size, damage: Option<Rectangle>) {
        let mut state = self.state.borrow_mut();
        state.size = size;
        state.geometry = state.geometry.with_size(size);
        state.damage = damage.map(Region::from_rect).unwrap_or_default();
        trace!("Headless xwayland commit {:?} damage {:?}", size, damage);
    }

    pub fn last_configure(&self) -> Option<Rectangle> {
        self.state.borrow().last_configure
    }

    pub fn set_class(&self, class: impl Into<String>) {
        self.state.borrow_mut().class = class.into();
    }

    pub fn is_activated(&self) -> bool {
        self.state.borrow().activated
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().subscribed
    }
}

impl XwaylandSurfaceHandle for HeadlessXwaylandSurface {
    fn surface(&self) -> Option<SurfaceId> {
        self.state.borrow().surface
    }

    fn surface_at(&self, local: Point) -> Option<SurfaceHit> {
        let state = self.state.borrow();
        let surface = state.surface?;
        Rectangle::from_loc_and_size(Point::default(), state.size)
            .contains_point(local.x, local.y)
            .then_some(SurfaceHit { surface, local })
    }

    fn geometry(&self) -> Rectangle {
        self.state.borrow().geometry
    }

    fn current_size(&self) -> Size {
        self.state.borrow().size
    }

    fn effective_damage(&self) -> Region {
        self.state.borrow().damage.clone()
    }

    fn configure(&mut self, geometry: Rectangle) {
        let mut state = self.state.borrow_mut();
        state.last_configure = Some(geometry);
        state.geometry = state.geometry.with_loc(geometry.loc());
    }

    fn activate(&mut self, activated: bool) {
        self.state.borrow_mut().activated = activated;
    }

    fn class(&self) -> String {
        self.state.borrow().class.clone()
    }

    fn subscribe(&mut self) -> Subscription {
        self.state.borrow_mut().subscribed = true;
        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().subscribed = false;
            }
        })
    }
}

/// Seat with no input devices behind it
#[derive(Debug, Clone, Default)]
pub struct HeadlessSeat {
    pointer_focus: Option<(SurfaceId, Point)>,
    keyboard_focus: Option<SurfaceId>,
}

impl HeadlessSeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface-local pointer position on the focused surface
    pub fn pointer_local(&self) -> Option<Point> {
        self.pointer_focus.map(|(_, local)| local)
    }
}

impl Seat for HeadlessSeat {
    fn pointer_focus(&self) -> Option<SurfaceId> {
        self.pointer_focus.map(|(surface, _)| surface)
    }

    fn pointer_enter(&mut self, surface: SurfaceId, local: Point) {
        self.pointer_focus = Some((surface, local));
    }

    fn pointer_clear_focus(&mut self) {
        self.pointer_focus = None;
    }

    fn keyboard_focus(&self) -> Option<SurfaceId> {
        self.keyboard_focus
    }

    fn keyboard_enter(&mut self, surface: SurfaceId) {
        self.keyboard_focus = Some(surface);
    }
}

/// One call made into the policy engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCall {
    CreateWindow(WindowId),
    DestroyWindow(WindowId),
    ConfigureWindow {
        id: WindowId,
        geometry: Rectangle,
        app_id: String,
        fullscreen: bool,
    },
    HandleWindowReady(WindowId),
    UpdatedWindow(WindowId),
    AdviseFocusGained(WindowId),
    AdviseDeleteWindow(WindowId),
}

#[derive(Debug, Default)]
struct PolicyState {
    next_id: u64,
    decision: TilingDecision,
    calls: Vec<PolicyCall>,
}

/// Policy engine that floats every window and records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingPolicy {
    state: Rc<RefCell<PolicyState>>,
}

impl RecordingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every later `configure_window` with `decision`
    pub fn set_decision(&self, decision: TilingDecision) {
        self.state.borrow_mut().decision = decision;
    }

    pub fn calls(&self) -> Vec<PolicyCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: PolicyCall) {
        trace!("Policy call {:?}", call);
        self.state.borrow_mut().calls.push(call);
    }
}

impl WindowPolicy for RecordingPolicy {
    fn create_window(&mut self) -> WindowId {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            WindowId(state.next_id)
        };
        self.record(PolicyCall::CreateWindow(id));
        id
    }

    fn destroy_window(&mut self, id: WindowId) {
        self.record(PolicyCall::DestroyWindow(id));
    }

    fn configure_window(
        &mut self,
        id: WindowId,
        geometry: Rectangle,
        app_id: &str,
        fullscreen: bool,
    ) -> TilingDecision {
        self.record(PolicyCall::ConfigureWindow {
            id,
            geometry,
            app_id: app_id.to_string(),
            fullscreen,
        });
        self.state.borrow().decision
    }

    fn handle_window_ready(&mut self, id: WindowId) {
        self.record(PolicyCall::HandleWindowReady(id));
    }

    fn updated_window(&mut self, id: WindowId) {
        self.record(PolicyCall::UpdatedWindow(id));
    }

    fn advise_focus_gained(&mut self, id: WindowId) {
        self.record(PolicyCall::AdviseFocusGained(id));
    }

    fn advise_delete_window(&mut self, id: WindowId) {
        self.record(PolicyCall::AdviseDeleteWindow(id));
    }
}
