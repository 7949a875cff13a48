/// Whether a real drawing surface exists. Decided once, at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderingCapability {
    Available,
    /// Server-side or headless execution: nothing graphical may be created.
    Unavailable,
}

impl RenderingCapability {
    pub fn from_surface(has_surface: bool) -> Self {
        if has_surface {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}
