use tracing::trace;

/// Opaque id for a frame request issued to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// The host's "call me on the next display refresh" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A self-rescheduling task that keeps the handle of its pending request.
///
/// Stopping is explicit: `stop` cancels the pending request with the host and
/// latches, so a late tick that was already queued is recognised and ignored.
#[derive(Debug, Default)]
pub struct RepeatingTask {
    pending: Option<FrameHandle>,
    stopped: bool,
}

impl RepeatingTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Requests the next tick unless one is already pending or the task stopped.
    ///
    /// Returns `true` if a new request was issued.
    pub fn schedule<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if self.stopped || self.pending.is_some() {
            return false;
        }
        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Marks the pending request as delivered.
    ///
    /// Returns `false` when the task has been stopped; the tick must not run.
    pub fn begin_tick(&mut self) -> bool {
        self.pending = None;
        if self.stopped {
            trace!("tick delivered after stop, ignoring");
            return false;
        }
        true
    }

    /// Cancels any pending request and stops for good. Idempotent.
    ///
    /// Returns `true` if a pending request was cancelled.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        self.stopped = true;
        match self.pending.take() {
            Some(handle) => {
                scheduler.cancel_frame(handle);
                true
            }
            None => false,
        }
    }
}

/// Deterministic scheduler for headless runs and tests.
///
/// Requests queue up until `take_due` hands them out, one per simulated refresh.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_id: u64,
    queue: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    requested: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests ever issued.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Pops the oldest outstanding request, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        if self.queue.is_empty() {
            None
        } else {
            Some(self.queue.remove(0))
        }
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.queue.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queue.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}
