use emissions::{CountryCode, RenderPoint};

/// Hover candidate and current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    hovered: Option<CountryCode>,
    selected: Option<CountryCode>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&CountryCode> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&CountryCode> {
        self.selected.as_ref()
    }

    /// Returns `true` if the hover candidate changed.
    pub fn set_hovered(&mut self, hovered: Option<CountryCode>) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        true
    }

    pub fn select(&mut self, country: CountryCode) {
        self.selected = Some(country);
    }

    /// Returns `true` if something was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Drops a hover candidate whose marker is no longer rendered.
    ///
    /// Returns `true` if the hover candidate changed.
    pub fn retain_rendered(&mut self, points: &[RenderPoint]) -> bool {
        let stale = self
            .hovered
            .as_ref()
            .is_some_and(|h| !points.iter().any(|p| &p.country == h));
        if stale {
            self.hovered = None;
        }
        stale
    }
}
