use std::future::Future;

use scene::Viewport;

use crate::error::GpuError;
use crate::renderer::{DrawCall, PointInstance};

/// A live rendering context. Dropped resources are not implied: callers must
/// `release` explicitly, exactly once.
pub trait GraphicsContext {
    /// Replaces the marker instance buffer wholesale.
    fn upload_points(&mut self, instances: &[PointInstance]);
    fn resize(&mut self, viewport: Viewport);
    fn draw(&mut self, call: &DrawCall);
    /// Frees the context and every buffer it owns.
    fn release(self)
    where
        Self: Sized;
}

/// Source of rendering contexts. Acquisition is the only suspending step in the
/// globe's lifecycle.
pub trait GraphicsBackend {
    type Context: GraphicsContext;

    fn acquire(&self) -> impl Future<Output = Result<Self::Context, GpuError>>;
}
