// Progress Indicator
// Indeterminate progress: advances while jobs are in flight, wraps at max

/// Activity indicator, not tied to bytes or files processed
#[derive(Debug, Clone)]
pub struct ProgressIndicator {
    value: u16,
    max: u16,
    increment: u16,
}

impl ProgressIndicator {
    pub fn new(max: u16, increment: u16) -> Self {
        Self {
            value: 0,
            max: max.max(1),
            increment: increment.max(1),
        }
    }

    /// Advance one tick. Resets to zero when nothing is in flight.
    pub fn tick(&mut self, active: bool) {
        if !active {
            self.value = 0;
            return;
        }

        self.value = self.value.saturating_add(self.increment);
        if self.value >= self.max {
            self.value = 0;
        }
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    /// Fraction in `0.0..1.0` for gauge widgets
    pub fn ratio(&self) -> f64 {
        f64::from(self.value) / f64::from(self.max)
    }
}
