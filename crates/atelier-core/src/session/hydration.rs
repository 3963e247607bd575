//! Daily hydration counter, in litres.

/// Starting intake shown before anything is logged.
pub const HYDRATION_START: f64 = 1.25;
/// Amount added per log (one 250 ml glass).
pub const HYDRATION_STEP: f64 = 0.25;
/// Daily target; the counter never exceeds it.
pub const HYDRATION_TARGET: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hydration {
    litres: f64,
}

impl Hydration {
    pub fn new() -> Self {
        Self {
            litres: HYDRATION_START,
        }
    }

    pub fn litres(&self) -> f64 {
        self.litres
    }

    /// Add one glass, saturating at the target. Returns the new total.
    pub fn log(&mut self) -> f64 {
        self.litres = (self.litres + HYDRATION_STEP).min(HYDRATION_TARGET);
        self.litres
    }

    pub fn is_complete(&self) -> bool {
        self.litres >= HYDRATION_TARGET
    }

    /// Progress toward the target, 0 to 100.
    pub fn progress_percent(&self) -> f64 {
        (self.litres / HYDRATION_TARGET * 100.0).min(100.0)
    }
}

impl Default for Hydration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_and_a_quarter() {
        let h = Hydration::new();
        assert_eq!(h.litres(), 1.25);
        assert!(!h.is_complete());
    }

    #[test]
    fn each_log_adds_a_glass() {
        let mut h = Hydration::new();
        assert_eq!(h.log(), 1.5);
        assert_eq!(h.log(), 1.75);
    }

    #[test]
    fn caps_at_target() {
        let mut h = Hydration::new();
        for _ in 0..20 {
            h.log();
        }
        assert_eq!(h.litres(), HYDRATION_TARGET);
        assert!(h.is_complete());
        assert_eq!(h.progress_percent(), 100.0);
    }

    #[test]
    fn progress_is_proportional() {
        let mut h = Hydration::new();
        // 1.25 + 0.5 = 1.75, half the target
        h.log();
        h.log();
        assert!((h.progress_percent() - 50.0).abs() < 1e-9);
    }
}
