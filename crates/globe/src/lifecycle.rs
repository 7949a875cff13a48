//! Owner of the globe: gates rendering on the surface capability, drives
//! acquisition, and tears everything down in a fixed order.

use std::cell::RefCell;
use std::rc::Rc;

use emissions::{AggregateError, CountryCode, CountryLookup, EmissionRecord, RenderPoint, aggregate, encode};
use foundation::math::Vec2;
use foundation::time::Millis;
use gpu::{GpuError, GraphicsBackend, GraphicsContext, SceneGraph};
use runtime::{EventBus, LoopMetrics, Stamped};
use scene::{
    CameraState, Gesture, InteractionController, InteractionEvent, PickScene, Projector, Viewport,
};
use tracing::{debug, info, trace, warn};

use crate::capability::RenderingCapability;
use crate::config::GlobeConfig;
use crate::error::AcquisitionError;
use crate::host::{Host, ListenerId, ObserverId};
use crate::render_loop::{RenderLoop, TickInputs, TickOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No drawing surface. Nothing will ever be acquired; counts as ready.
    Disabled,
    Loading,
    Ready,
    Error(AcquisitionError),
    TornDown,
}

impl Status {
    /// Whether a host UI should stop showing a spinner.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Disabled | Self::Ready)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobeEvent {
    CountrySelected(CountryCode),
    CountryHovered(Option<CountryCode>),
    SelectionCleared,
    StatusChanged(Status),
}

impl From<InteractionEvent> for GlobeEvent {
    fn from(event: InteractionEvent) -> Self {
        match event {
            InteractionEvent::CountrySelected(c) => Self::CountrySelected(c),
            InteractionEvent::CountryHovered(c) => Self::CountryHovered(c),
            InteractionEvent::SelectionCleared => Self::SelectionCleared,
        }
    }
}

/// Proof that an acquisition was started by this view.
///
/// A completion carrying a stale ticket is released instead of attached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AcquisitionTicket(u64);

pub struct GlobeView<H, C> {
    config: GlobeConfig,
    capability: RenderingCapability,
    host: H,
    status: Status,
    lookup: CountryLookup,
    camera: CameraState,
    controller: InteractionController,
    points: Vec<RenderPoint>,
    viewport: Viewport,
    scene: Option<SceneGraph<C>>,
    render_loop: RenderLoop,
    observer: Option<ObserverId>,
    listeners: Option<ListenerId>,
    tickets_issued: u64,
    in_flight: Option<AcquisitionTicket>,
    pending_focus: Option<CountryCode>,
    events: EventBus<GlobeEvent>,
}

impl<H: Host, C: GraphicsContext> GlobeView<H, C> {
    /// Builds the view. With a surface, resize and pointer listeners are
    /// registered and the view waits in `Loading` for [`GlobeView::begin`].
    pub fn new(
        capability: RenderingCapability,
        config: GlobeConfig,
        lookup: CountryLookup,
        mut host: H,
    ) -> Self {
        let (status, observer, listeners) = match capability {
            RenderingCapability::Available => {
                let observer = host.observe_resize();
                let listeners = host.attach_pointer_listeners();
                (Status::Loading, Some(observer), Some(listeners))
            }
            RenderingCapability::Unavailable => {
                info!("no rendering surface, globe disabled");
                (Status::Disabled, None, None)
            }
        };

        Self {
            camera: CameraState::new(config.camera_distance),
            controller: InteractionController::new(config.interaction()),
            viewport: config.initial_viewport(),
            render_loop: RenderLoop::new(config.damping_factor, config.auto_rotate_step),
            config,
            capability,
            host,
            status,
            lookup,
            points: Vec::new(),
            scene: None,
            observer,
            listeners,
            tickets_issued: 0,
            in_flight: None,
            pending_focus: None,
            events: EventBus::new(),
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn capability(&self) -> RenderingCapability {
        self.capability
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn points(&self) -> &[RenderPoint] {
        &self.points
    }

    pub fn scene(&self) -> Option<&SceneGraph<C>> {
        self.scene.as_ref()
    }

    pub fn selected(&self) -> Option<&CountryCode> {
        self.controller.selection().selected()
    }

    pub fn hovered(&self) -> Option<&CountryCode> {
        self.controller.selection().hovered()
    }

    pub fn metrics(&self) -> LoopMetrics {
        self.render_loop.metrics()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<GlobeEvent>> {
        self.events.drain()
    }

    /// Starts the one acquisition this view will ever make.
    ///
    /// Returns `None` without a surface, after a previous attempt, or once
    /// torn down.
    pub fn begin(&mut self) -> Option<AcquisitionTicket> {
        if self.status != Status::Loading || self.in_flight.is_some() || self.tickets_issued > 0 {
            return None;
        }
        self.tickets_issued += 1;
        let ticket = AcquisitionTicket(self.tickets_issued);
        self.in_flight = Some(ticket);
        debug!(ticket = ticket.0, "acquisition started");
        Some(ticket)
    }

    /// Delivers the outcome of an acquisition.
    ///
    /// Returns `true` if the context was attached. A context that arrives for a
    /// view that is no longer waiting for it is released on the spot.
    pub fn complete(&mut self, ticket: AcquisitionTicket, result: Result<C, GpuError>) -> bool {
        let current = self.status == Status::Loading && self.in_flight == Some(ticket);
        if !current {
            match result {
                Ok(context) => {
                    trace!(ticket = ticket.0, status = ?self.status, "releasing late context");
                    context.release();
                }
                Err(err) => trace!(ticket = ticket.0, %err, "late acquisition failure ignored"),
            }
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(context) => {
                let mut scene = SceneGraph::new(context, self.viewport);
                scene.upload(&self.points, self.config.point_altitude);
                self.scene = Some(scene);
                self.set_status(Status::Ready);

                if let Some(code) = self.pending_focus.take() {
                    self.apply_focus(&code);
                }
                self.render_loop.start(&mut self.host);
                true
            }
            Err(err) => {
                warn!(%err, "globe resource acquisition failed");
                self.set_status(Status::Error(err.into()));
                false
            }
        }
    }

    /// Replaces the record batch. Rollups and points are rebuilt wholesale.
    pub fn set_records(&mut self, records: &[EmissionRecord]) -> Result<(), AggregateError> {
        if self.status == Status::TornDown {
            trace!("records delivered after teardown, ignoring");
            return Ok(());
        }
        let rollups = aggregate(records)?;
        self.points = encode(&rollups, &self.lookup);
        self.controller.points_replaced(&self.points);
        if let Some(scene) = self.scene.as_mut() {
            scene.upload(&self.points, self.config.point_altitude);
        }
        self.forward_interaction_events();
        Ok(())
    }

    /// Turns the globe towards `code`. While loading the request is held
    /// (latest wins) and applied once the scene is ready.
    pub fn focus_country(&mut self, code: &CountryCode) {
        match self.status {
            Status::Ready => self.apply_focus(code),
            Status::Loading => {
                debug!(%code, "focus buffered until ready");
                self.pending_focus = Some(code.clone());
            }
            _ => trace!(%code, status = ?self.status, "focus ignored"),
        }
    }

    pub fn clear_selection(&mut self) {
        if self.status == Status::TornDown {
            return;
        }
        self.controller.clear_selection();
        self.forward_interaction_events();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if self.status == Status::TornDown {
            return;
        }
        self.viewport = Viewport::new(width, height);
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(self.viewport);
        }
    }

    pub fn pointer_down(&mut self, pos: Vec2, now: Millis) {
        if self.accepts_pointer() {
            self.controller.pointer_down(pos, now);
        }
    }

    pub fn pointer_move(&mut self, pos: Vec2, movement: Vec2, primary_down: bool) {
        if !self.accepts_pointer() {
            return;
        }
        let projector = self.projector();
        let scene = PickScene {
            points: &self.points,
            projector: &projector,
        };
        self.controller
            .pointer_move(&mut self.camera, scene, pos, movement, primary_down);
        self.forward_interaction_events();
    }

    pub fn pointer_up(&mut self, now: Millis) -> Gesture {
        if !self.accepts_pointer() {
            return Gesture::None;
        }
        let projector = self.projector();
        let scene = PickScene {
            points: &self.points,
            projector: &projector,
        };
        let gesture = self.controller.pointer_up(&self.camera, scene, now);
        self.forward_interaction_events();
        gesture
    }

    pub fn pointer_leave(&mut self) {
        if self.accepts_pointer() {
            self.controller.pointer_leave();
            self.forward_interaction_events();
        }
    }

    /// Host callback for a due frame.
    ///
    /// Only a `Ready` view runs the loop; any other status leaves the camera
    /// and the host untouched.
    pub fn tick(&mut self, now: Millis) -> TickOutcome {
        match self.status {
            Status::Ready => {}
            Status::TornDown => return TickOutcome::Stopped,
            _ => {
                trace!(status = ?self.status, "tick before the view is ready, ignoring");
                return TickOutcome::Inactive;
            }
        }
        let projector = self.projector();
        let inputs = TickInputs {
            camera: &mut self.camera,
            controller: &mut self.controller,
            points: &self.points,
            projector,
            scene: self.scene.as_mut(),
        };
        let outcome = self.render_loop.tick(&mut self.host, now, inputs);
        self.forward_interaction_events();
        outcome
    }

    /// Releases everything, in order: pending frame, resize observer, graphics
    /// context and buffers, pointer listeners, cached scene state.
    ///
    /// Safe to call repeatedly and before acquisition finished.
    pub fn teardown(&mut self) {
        if self.status == Status::TornDown {
            trace!("teardown already done");
            return;
        }

        self.render_loop.stop(&mut self.host);
        if let Some(id) = self.observer.take() {
            self.host.disconnect_resize(id);
        }
        if let Some(scene) = self.scene.take() {
            scene.release();
        }
        if let Some(id) = self.listeners.take() {
            self.host.detach_pointer_listeners(id);
        }

        self.points.clear();
        self.pending_focus = None;
        self.in_flight = None;
        self.controller = InteractionController::new(self.config.interaction());
        self.set_status(Status::TornDown);
    }

    fn accepts_pointer(&self) -> bool {
        self.status == Status::Ready && self.listeners.is_some()
    }

    fn projector(&self) -> Projector {
        self.config.projector(self.viewport)
    }

    fn apply_focus(&mut self, code: &CountryCode) {
        let coord = self.lookup.resolve(code);
        debug!(%code, lat = coord.lat, lng = coord.lng, "focusing country");
        self.controller.focus(&mut self.camera, coord.lat_lng());
    }

    fn set_status(&mut self, status: Status) {
        info!(from = ?self.status, to = ?status, "globe status changed");
        self.status = status.clone();
        self.events
            .emit(self.render_loop.frame_index(), GlobeEvent::StatusChanged(status));
    }

    fn forward_interaction_events(&mut self) {
        let frame = self.render_loop.frame_index();
        for event in self.controller.take_events() {
            self.events.emit(frame, event.into());
        }
    }
}

/// Drives one acquisition against `backend` without holding a borrow of the
/// view across the await, so a teardown may land while it is in flight.
pub async fn acquire<H, B>(view: &Rc<RefCell<GlobeView<H, B::Context>>>, backend: &B) -> bool
where
    H: Host,
    B: GraphicsBackend,
{
    let ticket = view.borrow_mut().begin();
    let Some(ticket) = ticket else {
        return false;
    };
    let result = backend.acquire().await;
    view.borrow_mut().complete(ticket, result)
}

#[cfg(test)]
mod tests {
    use super::{GlobeEvent, GlobeView, Status};
    use crate::capability::RenderingCapability;
    use crate::config::GlobeConfig;
    use crate::host::ManualHost;
    use emissions::{
        ActivitySector, CountryCode, CountryLookup, EmissionRecord, EmissionType, GeoCoordinate,
    };
    use foundation::math::Vec2;
    use foundation::time::Millis;
    use gpu::{GraphicsBackend, RecordingBackend, RecordingContext};
    use pretty_assertions::assert_eq;
    use scene::{Gesture, Rotation};

    type View = GlobeView<ManualHost, RecordingContext>;

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn lookup() -> CountryLookup {
        CountryLookup::from_entries([
            (code("AA"), GeoCoordinate::new(0.0, 0.0, "Alpha")),
            (code("EE"), GeoCoordinate::new(0.0, 90.0, "East")),
        ])
        .unwrap()
    }

    fn records() -> Vec<EmissionRecord> {
        vec![
            EmissionRecord::new(code("AA"), 10.0, 2020, EmissionType::Co2, ActivitySector::Energy),
            EmissionRecord::new(code("EE"), 30.0, 2021, EmissionType::Ch4, ActivitySector::Waste),
            EmissionRecord::new(code("aa"), 5.0, 2021, EmissionType::N2o, ActivitySector::Transport),
        ]
    }

    fn ready_view() -> (View, RecordingBackend) {
        let backend = RecordingBackend::new();
        let mut view = View::new(
            RenderingCapability::Available,
            GlobeConfig::default(),
            lookup(),
            ManualHost::new(),
        );
        let ticket = view.begin().unwrap();
        let ctx = pollster::block_on(backend.acquire());
        assert!(view.complete(ticket, ctx));
        (view, backend)
    }

    fn events(view: &mut View) -> Vec<GlobeEvent> {
        view.drain_events().into_iter().map(|s| s.event).collect()
    }

    #[test]
    fn records_become_points_and_upload() {
        let (mut view, _) = ready_view();
        view.set_records(&records()).unwrap();
        assert_eq!(view.points().len(), 2);
        assert_eq!(view.points()[0].total_emissions, 15.0);
        let scene = view.scene().unwrap();
        assert_eq!(scene.generation(), 2);
        assert_eq!(scene.context().instances().len(), 2);
    }

    #[test]
    fn negative_emissions_are_surfaced() {
        let (mut view, _) = ready_view();
        let mut bad = records();
        bad[1].emissions = -1.0;
        assert!(view.set_records(&bad).is_err());
    }

    #[test]
    fn second_begin_is_refused() {
        let (mut view, _) = ready_view();
        assert!(view.begin().is_none());
    }

    #[test]
    fn click_selects_country_under_pointer() {
        let (mut view, _) = ready_view();
        view.set_records(&records()).unwrap();
        events(&mut view);

        view.pointer_down(Vec2::new(400.0, 300.0), Millis(0.0));
        assert_eq!(view.pointer_up(Millis(80.0)), Gesture::Click);
        assert_eq!(
            events(&mut view),
            vec![
                GlobeEvent::CountryHovered(Some(code("AA"))),
                GlobeEvent::CountrySelected(code("AA")),
            ]
        );
        assert_eq!(view.selected(), Some(&code("AA")));

        view.clear_selection();
        assert_eq!(events(&mut view), vec![GlobeEvent::SelectionCleared]);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn pointer_input_ignored_while_loading() {
        let mut view = View::new(
            RenderingCapability::Available,
            GlobeConfig::default(),
            lookup(),
            ManualHost::new(),
        );
        view.pointer_down(Vec2::new(0.0, 0.0), Millis(0.0));
        view.pointer_move(Vec2::new(50.0, 0.0), Vec2::new(50.0, 0.0), true);
        assert_eq!(view.pointer_up(Millis(10.0)), Gesture::None);
        assert_eq!(view.camera().target(), Rotation::default());
    }

    #[test]
    fn focus_applies_immediately_when_ready() {
        let (mut view, _) = ready_view();
        view.focus_country(&code("EE"));
        assert_eq!(view.camera().target(), Rotation::new(0.0, -std::f64::consts::FRAC_PI_2));
        // current is approached by damping, not set.
        assert_eq!(view.camera().current(), Rotation::default());
    }

    #[test]
    fn resize_reaches_context() {
        let (mut view, _) = ready_view();
        view.resize(1024.0, 512.0);
        assert_eq!(
            view.scene().unwrap().context().viewport(),
            Some(scene::Viewport::new(1024.0, 512.0))
        );
    }

    #[test]
    fn ready_emits_status_event() {
        let (mut view, _) = ready_view();
        assert_eq!(events(&mut view), vec![GlobeEvent::StatusChanged(Status::Ready)]);
        assert!(view.status().is_ready());
        assert_eq!(view.host().frames().requested(), 1);
    }
}
