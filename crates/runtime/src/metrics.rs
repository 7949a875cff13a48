/// Counters for the render loop.
///
/// `scheduled` is the number of frame requests issued to the host; once the
/// loop is torn down it must stop increasing.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LoopMetrics {
    pub scheduled: u64,
    pub ticks: u64,
    pub draws: u64,
    pub skipped: u64,
    pub cancelled: u64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scheduled(&mut self) {
        self.scheduled += 1;
    }

    pub fn record_tick(&mut self, drew: bool) {
        self.ticks += 1;
        if drew {
            self.draws += 1;
        } else {
            self.skipped += 1;
        }
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled += 1;
    }
}
