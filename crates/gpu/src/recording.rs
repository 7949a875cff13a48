//! Headless backend that records what it is asked to do.

use std::cell::Cell;
use std::future::{Future, ready};
use std::rc::Rc;

use runtime::Journal;
use scene::Viewport;

use crate::backend::{GraphicsBackend, GraphicsContext};
use crate::error::GpuError;
use crate::renderer::{DrawCall, PointInstance};

#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    journal: Journal,
    failure: Option<GpuError>,
    next_id: Rc<Cell<u64>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records into an existing journal shared with other test doubles.
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    /// Every acquisition resolves to `error`.
    pub fn failing(mut self, error: GpuError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn acquisitions(&self) -> u64 {
        self.next_id.get()
    }
}

impl GraphicsBackend for RecordingBackend {
    type Context = RecordingContext;

    fn acquire(&self) -> impl Future<Output = Result<RecordingContext, GpuError>> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let result = match &self.failure {
            Some(err) => {
                self.journal.record(format!("gpu.acquire_failed #{id}"));
                Err(err.clone())
            }
            None => {
                self.journal.record(format!("gpu.acquire #{id}"));
                Ok(RecordingContext {
                    id,
                    journal: self.journal.clone(),
                    instances: Vec::new(),
                    viewport: None,
                    draws: 0,
                })
            }
        };
        ready(result)
    }
}

#[derive(Debug)]
pub struct RecordingContext {
    id: u64,
    journal: Journal,
    instances: Vec<PointInstance>,
    viewport: Option<Viewport>,
    draws: u64,
}

impl RecordingContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn instances(&self) -> &[PointInstance] {
        &self.instances
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl GraphicsContext for RecordingContext {
    fn upload_points(&mut self, instances: &[PointInstance]) {
        self.instances = instances.to_vec();
        self.journal
            .record(format!("gpu.upload #{} {}", self.id, instances.len()));
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.journal.record(format!(
            "gpu.resize #{} {}x{}",
            self.id, viewport.width, viewport.height
        ));
    }

    fn draw(&mut self, call: &DrawCall) {
        self.draws += 1;
        self.journal.record(format!(
            "gpu.draw #{} markers={}",
            self.id,
            call.marker_count()
        ));
    }

    fn release(self) {
        self.journal.record(format!("gpu.release #{}", self.id));
    }
}
