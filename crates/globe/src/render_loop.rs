use emissions::RenderPoint;
use foundation::time::Millis;
use gpu::{GraphicsContext, Renderer, SceneGraph};
use runtime::{Frame, FrameScheduler, LoopMetrics, RepeatingTask};
use scene::{CameraState, InteractionController, Projector};
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    /// Context or scene missing at tick time; nothing was drawn.
    Skipped,
    /// The loop was stopped before this tick was delivered.
    Stopped,
    /// The owning view has no scene to drive yet, or never will.
    Inactive,
}

/// Everything one tick reads or writes, borrowed from the lifecycle owner.
pub struct TickInputs<'a, C> {
    pub camera: &'a mut CameraState,
    pub controller: &'a mut InteractionController,
    pub points: &'a [RenderPoint],
    pub projector: Projector,
    pub scene: Option<&'a mut SceneGraph<C>>,
}

/// Self-rescheduling step function driving damping, auto-rotation and drawing.
#[derive(Debug)]
pub struct RenderLoop {
    task: RepeatingTask,
    metrics: LoopMetrics,
    frame: Option<Frame>,
    damping_factor: f64,
    auto_rotate_step: f64,
}

impl RenderLoop {
    pub fn new(damping_factor: f64, auto_rotate_step: f64) -> Self {
        Self {
            task: RepeatingTask::new(),
            metrics: LoopMetrics::new(),
            frame: None,
            damping_factor,
            auto_rotate_step,
        }
    }

    pub fn metrics(&self) -> LoopMetrics {
        self.metrics
    }

    /// Index of the last tick run, 0 before the first.
    pub fn frame_index(&self) -> u64 {
        self.frame.map_or(0, |f| f.index)
    }

    pub fn is_running(&self) -> bool {
        self.task.pending().is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_stopped()
    }

    /// Requests the first tick. No-op if already scheduled or stopped.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        self.schedule(scheduler)
    }

    pub fn tick<S, C>(&mut self, scheduler: &mut S, now: Millis, inputs: TickInputs<'_, C>) -> TickOutcome
    where
        S: FrameScheduler + ?Sized,
        C: GraphicsContext,
    {
        if !self.task.begin_tick() {
            return TickOutcome::Stopped;
        }
        self.frame = Some(match self.frame {
            Some(prev) => prev.next(now),
            None => Frame::first(now),
        });

        let TickInputs {
            camera,
            controller,
            points,
            projector,
            scene,
        } = inputs;

        camera.damp(self.damping_factor);
        controller.auto_rotate(camera, self.auto_rotate_step);

        let outcome = match scene {
            Some(scene) => {
                scene.draw(Renderer::collect(camera, &projector, points, controller.selection()));
                TickOutcome::Drawn
            }
            None => {
                debug!(frame = self.frame_index(), "no scene at tick time, skipping draw");
                TickOutcome::Skipped
            }
        };
        self.metrics.record_tick(outcome == TickOutcome::Drawn);

        self.schedule(scheduler);
        outcome
    }

    /// Cancels the pending tick and latches. Idempotent.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.task.stop(scheduler) {
            self.metrics.record_cancelled();
        } else {
            trace!("render loop stop with no pending tick");
        }
    }

    fn schedule<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        let issued = self.task.schedule(scheduler);
        if issued {
            self.metrics.record_scheduled();
        }
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderLoop, TickInputs, TickOutcome};
    use foundation::time::Millis;
    use gpu::{GraphicsBackend, RecordingBackend, RecordingContext, SceneGraph};
    use runtime::ManualFrameScheduler;
    use scene::{CameraState, InteractionConfig, InteractionController, Projector, Viewport};

    struct Rig {
        sched: ManualFrameScheduler,
        camera: CameraState,
        controller: InteractionController,
        projector: Projector,
        scene: Option<SceneGraph<RecordingContext>>,
        rl: RenderLoop,
    }

    impl Rig {
        fn new(with_scene: bool) -> Self {
            let viewport = Viewport::new(800.0, 600.0);
            let scene = with_scene.then(|| {
                let ctx = pollster::block_on(RecordingBackend::new().acquire()).unwrap();
                SceneGraph::new(ctx, viewport)
            });
            Self {
                sched: ManualFrameScheduler::new(),
                camera: CameraState::new(3.0),
                controller: InteractionController::new(InteractionConfig::default()),
                projector: Projector::new(viewport, 3.0, 45f64.to_radians()),
                scene,
                rl: RenderLoop::new(0.1, 0.001),
            }
        }

        fn tick(&mut self, t: f64) -> TickOutcome {
            let inputs = TickInputs {
                camera: &mut self.camera,
                controller: &mut self.controller,
                points: &[],
                projector: self.projector,
                scene: self.scene.as_mut(),
            };
            self.rl.tick(&mut self.sched, Millis(t), inputs)
        }
    }

    #[test]
    fn tick_damps_then_auto_rotates_and_reschedules() {
        let mut rig = Rig::new(true);
        assert!(rig.rl.start(&mut rig.sched));
        rig.sched.take_due().unwrap();

        assert_eq!(rig.tick(0.0), TickOutcome::Drawn);
        // Damping ran against the old target, then auto-rotate advanced it.
        assert_eq!(rig.camera.current().y, 0.0);
        assert_eq!(rig.camera.target().y, 0.001);
        assert_eq!(rig.sched.queued(), 1);

        rig.sched.take_due().unwrap();
        rig.tick(16.0);
        assert!((rig.camera.current().y - 0.0001).abs() < 1e-15);
        assert_eq!(rig.rl.frame_index(), 1);

        let m = rig.rl.metrics();
        assert_eq!((m.scheduled, m.ticks, m.draws), (3, 2, 2));
    }

    #[test]
    fn missing_scene_skips_silently() {
        let mut rig = Rig::new(false);
        rig.rl.start(&mut rig.sched);
        assert_eq!(rig.tick(0.0), TickOutcome::Skipped);
        assert_eq!(rig.rl.metrics().skipped, 1);
        // Still rescheduled.
        assert!(rig.rl.is_running());
    }

    #[test]
    fn stopped_loop_ignores_late_tick() {
        let mut rig = Rig::new(true);
        rig.rl.start(&mut rig.sched);
        rig.rl.stop(&mut rig.sched);
        rig.rl.stop(&mut rig.sched);

        assert_eq!(rig.tick(0.0), TickOutcome::Stopped);
        assert_eq!(rig.camera.target().y, 0.0);
        let m = rig.rl.metrics();
        assert_eq!((m.scheduled, m.ticks, m.cancelled), (1, 0, 1));
        assert!(rig.rl.is_stopped());
    }
}
