use std::cell::RefCell;
use std::rc::Rc;

use emissions::{ActivitySector, CountryCode, CountryLookup, EmissionRecord, EmissionType};
use foundation::time::Millis;
use globe::{
    GlobeConfig, GlobeEvent, GlobeView, ManualHost, RenderingCapability, Status, TickOutcome,
    acquire,
};
use gpu::{GpuError, GraphicsBackend, RecordingBackend, RecordingContext};
use runtime::Journal;
use scene::Rotation;

type View = GlobeView<ManualHost, RecordingContext>;

fn code(s: &str) -> CountryCode {
    CountryCode::parse(s).unwrap()
}

fn records() -> Vec<EmissionRecord> {
    ["US", "CN", "IN", "ZZ"]
        .iter()
        .enumerate()
        .map(|(i, c)| {
            EmissionRecord::new(
                code(c),
                (i as f64 + 1.0) * 1000.0,
                2022,
                EmissionType::Co2,
                ActivitySector::Energy,
            )
        })
        .collect()
}

fn view_with(capability: RenderingCapability, journal: &Journal) -> View {
    GlobeView::new(
        capability,
        GlobeConfig::default(),
        CountryLookup::builtin(),
        ManualHost::with_journal(journal.clone()),
    )
}

/// Runs every frame that is due right now, at 16 ms spacing.
fn pump(view: &mut View, start_ms: f64, frames: usize) -> Vec<TickOutcome> {
    let mut out = Vec::new();
    for i in 0..frames {
        if view.host_mut().take_due().is_none() {
            break;
        }
        out.push(view.tick(Millis(start_ms + i as f64 * 16.0)));
    }
    out
}

#[test]
fn unavailable_surface_never_acquires_and_reports_ready() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let view = Rc::new(RefCell::new(view_with(RenderingCapability::Unavailable, &journal)));

    assert!(!pollster::block_on(acquire(&view, &backend)));
    assert_eq!(backend.acquisitions(), 0);

    let mut view = view.borrow_mut();
    assert_eq!(view.status(), &Status::Disabled);
    assert!(view.status().is_ready());
    assert_eq!(view.host().frames().requested(), 0);
    assert!(view.host().active_listeners().is_empty());
    assert!(view.host().active_observers().is_empty());

    // Aggregation and encoding still run; rendering does not.
    view.set_records(&records()).unwrap();
    assert_eq!(view.points().len(), 4);
    assert!(view.scene().is_none());

    view.teardown();
    assert!(journal.entries().is_empty());
}

#[test]
fn acquisition_then_frames_then_teardown_twice() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let view = Rc::new(RefCell::new(view_with(RenderingCapability::Available, &journal)));
    view.borrow_mut().set_records(&records()).unwrap();

    assert!(pollster::block_on(acquire(&view, &backend)));
    let mut view = view.borrow_mut();
    assert_eq!(view.status(), &Status::Ready);

    let outcomes = pump(&mut view, 0.0, 10);
    assert_eq!(outcomes, vec![TickOutcome::Drawn; 10]);
    assert_eq!(view.scene().unwrap().context().draws(), 10);
    assert!(view.camera().current().y > 0.0);

    view.teardown();
    view.teardown();
    assert_eq!(view.status(), &Status::TornDown);
    let scheduled = view.metrics().scheduled;
    let requested = view.host().frames().requested();

    assert!(pump(&mut view, 1000.0, 10).is_empty());
    assert_eq!(view.tick(Millis(2000.0)), TickOutcome::Stopped);
    assert_eq!(view.metrics().scheduled, scheduled);
    assert_eq!(view.host().frames().requested(), requested);
    assert_eq!(view.metrics().cancelled, 1);

    assert_eq!(journal.count("gpu.release"), 1);
    assert_eq!(journal.count("host.disconnect_resize"), 1);
    assert_eq!(journal.count("host.detach_pointer"), 1);
    assert!(view.points().is_empty());
    assert!(view.scene().is_none());
}

#[test]
fn teardown_releases_in_order() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let mut view = view_with(RenderingCapability::Available, &journal);
    let ticket = view.begin().unwrap();
    assert!(view.complete(ticket, pollster::block_on(backend.acquire())));

    view.teardown();
    let pos = |p: &str| journal.position(p).unwrap();
    assert!(pos("host.cancel_frame") < pos("host.disconnect_resize"));
    assert!(pos("host.disconnect_resize") < pos("gpu.release"));
    assert!(pos("gpu.release") < pos("host.detach_pointer"));
}

#[test]
fn teardown_before_acquisition_is_safe() {
    let journal = Journal::new();
    let mut view = view_with(RenderingCapability::Available, &journal);
    view.teardown();
    view.teardown();
    assert_eq!(view.status(), &Status::TornDown);
    assert_eq!(journal.count("host.cancel_frame"), 0);
    assert_eq!(journal.count("gpu.release"), 0);
    assert!(view.begin().is_none());
}

#[test]
fn acquisition_resolving_after_teardown_is_released() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let mut view = view_with(RenderingCapability::Available, &journal);

    let ticket = view.begin().unwrap();
    view.teardown();
    let late = pollster::block_on(backend.acquire());
    assert!(!view.complete(ticket, late));

    assert_eq!(view.status(), &Status::TornDown);
    assert!(view.scene().is_none());
    assert_eq!(journal.count("gpu.release"), 1);
    assert_eq!(view.host().frames().requested(), 0);
}

#[test]
fn acquisition_failure_becomes_error_state() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone())
        .failing(GpuError::AdapterUnavailable("no webgl".into()));
    let view = Rc::new(RefCell::new(view_with(RenderingCapability::Available, &journal)));

    assert!(!pollster::block_on(acquire(&view, &backend)));
    // No retry.
    assert!(!pollster::block_on(acquire(&view, &backend)));
    assert_eq!(backend.acquisitions(), 1);

    let mut view = view.borrow_mut();
    let Status::Error(err) = view.status().clone() else {
        panic!("expected error status, got {:?}", view.status());
    };
    assert!(err.to_string().contains("no webgl"));
    assert!(!view.status().is_ready());
    assert_eq!(view.host().frames().requested(), 0);

    let events: Vec<GlobeEvent> = view.drain_events().into_iter().map(|s| s.event).collect();
    assert_eq!(events, vec![GlobeEvent::StatusChanged(Status::Error(err))]);

    view.teardown();
    assert_eq!(journal.count("host.detach_pointer"), 1);
}

#[test]
fn focus_during_loading_is_buffered_latest_wins() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let view = Rc::new(RefCell::new(view_with(RenderingCapability::Available, &journal)));

    {
        let mut v = view.borrow_mut();
        v.focus_country(&code("US"));
        v.focus_country(&code("JP"));
        assert_eq!(v.camera().target(), Rotation::default());
    }

    assert!(pollster::block_on(acquire(&view, &backend)));
    let view = view.borrow();
    let jp = CountryLookup::builtin().resolve(&code("JP"));
    let expected = Rotation::new(jp.lat.to_radians(), -jp.lng.to_radians());
    assert!((view.camera().target().x - expected.x).abs() < 1e-12);
    assert!((view.camera().target().y - expected.y).abs() < 1e-12);
}

#[test]
fn late_tick_after_teardown_is_silent() {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let mut view = view_with(RenderingCapability::Available, &journal);
    let ticket = view.begin().unwrap();
    view.complete(ticket, pollster::block_on(backend.acquire()));

    // The host already handed this frame out when teardown ran.
    assert!(view.host_mut().take_due().is_some());
    view.teardown();
    assert_eq!(view.tick(Millis(16.0)), TickOutcome::Stopped);
    assert_eq!(view.metrics().ticks, 0);
    assert_eq!(journal.count("gpu.draw"), 0);
}

#[test]
fn ticks_are_inert_until_ready() {
    let journal = Journal::new();

    let mut disabled = view_with(RenderingCapability::Unavailable, &journal);
    assert_eq!(disabled.tick(Millis(0.0)), TickOutcome::Inactive);
    assert_eq!(disabled.camera().target(), Rotation::default());
    assert_eq!(disabled.host().frames().requested(), 0);
    assert_eq!(disabled.metrics().ticks, 0);

    let backend = RecordingBackend::with_journal(journal.clone());
    let mut loading = view_with(RenderingCapability::Available, &journal);
    assert_eq!(loading.tick(Millis(0.0)), TickOutcome::Inactive);
    assert_eq!(loading.camera().target(), Rotation::default());
    assert_eq!(loading.host().frames().requested(), 0);

    // Once ready the loop starts exactly once.
    let ticket = loading.begin().unwrap();
    assert!(loading.complete(ticket, pollster::block_on(backend.acquire())));
    assert_eq!(loading.host().frames().requested(), 1);
    assert!(loading.host_mut().take_due().is_some());
    assert_eq!(loading.tick(Millis(16.0)), TickOutcome::Drawn);
    assert_eq!(loading.metrics().scheduled, 2);
}
