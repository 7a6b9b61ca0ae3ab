use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Minimum detector score, shared between the settings owner and every
/// detector built from it.
///
/// Clones share one value. Detectors read it on each `detect` call, so a
/// change applies to the next frame or still on every worker.
#[derive(Clone, Debug)]
pub struct ConfidenceThreshold(Arc<AtomicU64>);

impl ConfidenceThreshold {
    pub fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(clamp(value).to_bits())))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Values outside `0.0..=1.0` are clamped.
    pub fn set(&self, value: f64) {
        self.0.store(clamp(value).to_bits(), Ordering::Relaxed);
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_clones_see_later_updates() {
        let threshold = ConfidenceThreshold::new(0.5);
        let held_by_worker = threshold.clone();
        threshold.set(0.8);
        assert_relative_eq!(held_by_worker.get(), 0.8);
    }

    #[test]
    fn test_update_is_visible_across_threads() {
        let threshold = ConfidenceThreshold::new(0.5);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<()>(0);
        let (go_tx, go_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = {
            let threshold = threshold.clone();
            std::thread::spawn(move || {
                let before = threshold.get();
                ready_tx.send(()).unwrap();
                go_rx.recv().unwrap();
                (before, threshold.get())
            })
        };
        ready_rx.recv().unwrap();
        threshold.set(0.25);
        go_tx.send(()).unwrap();

        let (before, after) = worker.join().unwrap();
        assert_relative_eq!(before, 0.5);
        assert_relative_eq!(after, 0.25);
    }

    #[rstest]
    #[case::below(-0.3, 0.0)]
    #[case::above(1.7, 1.0)]
    #[case::nan(f64::NAN, 0.0)]
    fn test_out_of_range_is_clamped(#[case] input: f64, #[case] expected: f64) {
        assert_relative_eq!(ConfidenceThreshold::new(input).get(), expected);
        let threshold = ConfidenceThreshold::new(0.5);
        threshold.set(input);
        assert_relative_eq!(threshold.get(), expected);
    }
}
