/// Host timestamp in milliseconds (monotonic clock, arbitrary epoch).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Millis(pub f64);

impl Millis {
    /// Milliseconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Millis) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Millis;

    #[test]
    fn since_clamps_clock_skew() {
        assert_eq!(Millis(150.0).since(Millis(100.0)), 50.0);
        assert_eq!(Millis(90.0).since(Millis(100.0)), 0.0);
    }
}
