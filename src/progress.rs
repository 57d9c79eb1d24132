//! Synthetic progress for the try-on job.
//!
//! The status endpoint reports no real percentage, so the bar advances on a
//! 1 s tick by a small random amount and parks just under the finish line
//! until the terminal success signal snaps it to 100.

/// Where the bar parks while the job is still running.
pub const PROGRESS_CAP: f32 = 95.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProgress {
    value: f32,
}

impl SyntheticProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance by 1–5 % depending on `rand` in `[0, 1)`, never past the cap.
    pub fn tick(&mut self, rand: f32) -> f32 {
        self.value = (self.value + 1.0 + rand.clamp(0.0, 1.0) * 4.0).min(PROGRESS_CAP);
        self.value
    }

    pub fn complete(&mut self) -> f32 {
        self.value = 100.0;
        self.value
    }
}

/// Uniform sample in `[0, 1)` for the progress jitter.
#[cfg(target_arch = "wasm32")]
pub fn rand_unit() -> f32 {
    js_sys::Math::random() as f32
}

#[cfg(not(target_arch = "wasm32"))]
pub fn rand_unit() -> f32 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotone() {
        let mut progress = SyntheticProgress::new();
        let mut last = 0.0;
        for i in 0..50 {
            let v = progress.tick((i % 10) as f32 / 10.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn progress_parks_below_one_hundred_until_completion() {
        let mut progress = SyntheticProgress::new();
        for _ in 0..500 {
            assert!(progress.tick(0.99) <= PROGRESS_CAP);
        }
        assert_eq!(progress.value(), PROGRESS_CAP);
        assert_eq!(progress.complete(), 100.0);
    }

    #[test]
    fn increments_are_bounded() {
        let mut progress = SyntheticProgress::new();
        let before = progress.value();
        let after = progress.tick(1.0);
        assert!(after - before <= 5.0);
        assert!(after - before >= 1.0);
    }
}
