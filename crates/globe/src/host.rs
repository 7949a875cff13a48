use runtime::{FrameHandle, FrameScheduler, Journal, ManualFrameScheduler};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// What the globe needs from its embedding environment.
///
/// Every registration returns an id that the globe keeps and hands back on
/// teardown; nothing is released implicitly.
pub trait Host: FrameScheduler {
    fn observe_resize(&mut self) -> ObserverId;
    fn disconnect_resize(&mut self, id: ObserverId);
    /// Registers pointer, touch and leave listeners as one group.
    fn attach_pointer_listeners(&mut self) -> ListenerId;
    fn detach_pointer_listeners(&mut self, id: ListenerId);
}

/// Deterministic host for headless runs and tests.
#[derive(Debug, Default)]
pub struct ManualHost {
    frames: ManualFrameScheduler,
    journal: Journal,
    next_id: u64,
    observers: Vec<ObserverId>,
    listeners: Vec<ListenerId>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn frames(&self) -> &ManualFrameScheduler {
        &self.frames
    }

    /// Next refresh the globe asked for, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.frames.take_due()
    }

    pub fn active_observers(&self) -> &[ObserverId] {
        &self.observers
    }

    pub fn active_listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameScheduler for ManualHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.frames.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.journal.record(format!("host.cancel_frame {}", handle.0));
        self.frames.cancel_frame(handle);
    }
}

impl Host for ManualHost {
    fn observe_resize(&mut self) -> ObserverId {
        let id = ObserverId(self.next());
        self.journal.record(format!("host.observe_resize {}", id.0));
        self.observers.push(id);
        id
    }

    fn disconnect_resize(&mut self, id: ObserverId) {
        self.journal.record(format!("host.disconnect_resize {}", id.0));
        self.observers.retain(|o| *o != id);
    }

    fn attach_pointer_listeners(&mut self) -> ListenerId {
        let id = ListenerId(self.next());
        self.journal.record(format!("host.attach_pointer {}", id.0));
        self.listeners.push(id);
        id
    }

    fn detach_pointer_listeners(&mut self, id: ListenerId) {
        self.journal.record(format!("host.detach_pointer {}", id.0));
        self.listeners.retain(|l| *l != id);
    }
}
