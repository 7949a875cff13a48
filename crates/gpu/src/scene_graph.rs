use emissions::RenderPoint;
use scene::Viewport;
use tracing::debug;

use crate::backend::GraphicsContext;
use crate::renderer::{DrawCall, build_instances};

/// Every graphics handle the globe holds, in one place.
///
/// Owned by the lifecycle manager; the render loop borrows it per tick. There
/// is no way to get the context back out except [`SceneGraph::release`].
#[derive(Debug)]
pub struct SceneGraph<C> {
    context: C,
    viewport: Viewport,
    /// Bumped on every marker upload; 0 means nothing uploaded yet.
    generation: u64,
    instance_count: usize,
    last_draw: Option<DrawCall>,
}

impl<C: GraphicsContext> SceneGraph<C> {
    pub fn new(mut context: C, viewport: Viewport) -> Self {
        context.resize(viewport);
        Self {
            context,
            viewport,
            generation: 0,
            instance_count: 0,
            last_draw: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn last_draw(&self) -> Option<&DrawCall> {
        self.last_draw.as_ref()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Replaces the marker buffer with `points`.
    pub fn upload(&mut self, points: &[RenderPoint], altitude: f64) -> u64 {
        let instances = build_instances(points, altitude);
        self.context.upload_points(&instances);
        self.generation += 1;
        self.instance_count = instances.len();
        debug!(
            generation = self.generation,
            instances = self.instance_count,
            "uploaded marker buffer"
        );
        self.generation
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.context.resize(viewport);
    }

    pub fn draw(&mut self, call: DrawCall) {
        self.context.draw(&call);
        self.last_draw = Some(call);
    }

    /// Releases the context together with its buffers.
    pub fn release(self) {
        self.context.release();
    }
}
