//! File-backed entry points for the `emissions-globe` binary.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use emissions::{
    CountryCode, CountryLookup, EmissionRecord, RecordFilter, RecordOrdering, RenderPoint, aggregate, decode_records,
    encode,
};
use foundation::time::Millis;
use globe::{GlobeConfig, GlobeView, ManualHost, RenderingCapability, Status, acquire};
use gpu::RecordingBackend;
use runtime::Journal;
use serde::Serialize;
use tracing::info;

/// Simulated display refresh interval.
const FRAME_MS: f64 = 1000.0 / 60.0;

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<GlobeConfig, String> {
    match path {
        Some(path) => GlobeConfig::from_json_str(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(GlobeConfig::default()),
    }
}

pub fn load_records(path: &Path) -> Result<Vec<EmissionRecord>, String> {
    decode_records(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

pub fn load_lookup(path: Option<&Path>) -> Result<CountryLookup, String> {
    match path {
        Some(path) => CountryLookup::from_json_str(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display())),
        None => Ok(CountryLookup::builtin()),
    }
}

pub fn encode_points(
    records: &[EmissionRecord],
    filter: &RecordFilter,
    lookup: &CountryLookup,
) -> Result<Vec<RenderPoint>, String> {
    let rollups = aggregate(filter.apply(records)).map_err(|e| e.to_string())?;
    Ok(encode(&rollups, lookup))
}

/// Filtered and ordered records, one display line each.
pub fn list_records(records: &[EmissionRecord], filter: &RecordFilter, ordering: &RecordOrdering) -> Vec<String> {
    let mut kept = filter.apply_owned(records);
    ordering.sort(&mut kept);
    kept.iter().map(ToString::to_string).collect()
}

/// Newest year present in the batch, used as the reference for `--recent`.
pub fn latest_year(records: &[EmissionRecord]) -> Option<u16> {
    records.iter().map(|r| r.year).max()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraReport {
    pub target_x: f64,
    pub target_y: f64,
    pub current_x: f64,
    pub current_y: f64,
    pub facing_lat: f64,
    pub facing_lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub status: String,
    pub points: usize,
    pub camera: CameraReport,
    pub scheduled: u64,
    pub ticks: u64,
    pub draws: u64,
    pub skipped: u64,
    /// Contexts released by the final teardown.
    pub released: usize,
}

/// Runs a headless globe for `frames` refreshes and tears it down.
///
/// With `has_surface == false` the view stays disabled: nothing is acquired
/// and no frame is ever scheduled.
pub fn simulate(
    records: &[EmissionRecord],
    lookup: CountryLookup,
    config: GlobeConfig,
    frames: usize,
    focus: Option<&CountryCode>,
    has_surface: bool,
) -> Result<SimulationReport, String> {
    let journal = Journal::new();
    let backend = RecordingBackend::with_journal(journal.clone());
    let view = Rc::new(RefCell::new(GlobeView::new(
        RenderingCapability::from_surface(has_surface),
        config,
        lookup,
        ManualHost::with_journal(journal.clone()),
    )));

    view.borrow_mut().set_records(records).map_err(|e| e.to_string())?;
    if let Some(code) = focus {
        view.borrow_mut().focus_country(code);
    }

    pollster::block_on(acquire(&view, &backend));
    let mut view = view.borrow_mut();
    if let Status::Error(err) = view.status() {
        return Err(err.to_string());
    }

    for i in 0..frames {
        if view.host_mut().take_due().is_none() {
            break;
        }
        view.tick(Millis(i as f64 * FRAME_MS));
    }

    let camera = view.camera();
    let facing = camera.facing();
    let camera = CameraReport {
        target_x: camera.target().x,
        target_y: camera.target().y,
        current_x: camera.current().x,
        current_y: camera.current().y,
        facing_lat: facing.lat_deg,
        facing_lng: facing.lng_deg,
    };
    let points = view.points().len();
    let status = format!("{:?}", view.status());
    let metrics = view.metrics();

    view.teardown();
    info!(frames, draws = metrics.draws, "simulation finished");

    Ok(SimulationReport {
        status,
        points,
        camera,
        scheduled: metrics.scheduled,
        ticks: metrics.ticks,
        draws: metrics.draws,
        skipped: metrics.skipped,
        released: journal.count("gpu.release"),
    })
}
