use foundation::time::Millis;

/// Metadata for one render-loop tick.
///
/// Built from host timestamps; `dt_ms` is zero for the first tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Host time at the start of the frame.
    pub time: Millis,
    /// Milliseconds since the previous frame.
    pub dt_ms: f64,
}

impl Frame {
    pub fn first(time: Millis) -> Self {
        Self {
            index: 0,
            time,
            dt_ms: 0.0,
        }
    }

    pub fn next(self, time: Millis) -> Self {
        Self {
            index: self.index + 1,
            time,
            dt_ms: time.since(self.time),
        }
    }
}
