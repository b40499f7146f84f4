//! Property tests for throughput statistics.

use inference_bench::benchmark::{
    INVALID_FPS, MIN_MEAN_SECONDS, TimingSamples, aggregate, fps_from_mean, mean_seconds,
};
use inference_bench::errors::StatisticsError;
use proptest::prelude::*;

fn sample_set(slots: &[Option<f64>]) -> TimingSamples {
    let mut samples = TimingSamples::new();
    for slot in slots {
        match slot {
            Some(duration) => samples.record_success(*duration),
            None => samples.record_failure(),
        }
    }
    samples
}

proptest! {
    #[test]
    fn prop_mean_is_sum_over_count_in_seconds(durations in prop::collection::vec(0.001f64..500.0, 1..64)) {
        let expected = durations.iter().sum::<f64>() / durations.len() as f64 / 1000.0;
        prop_assert!((mean_seconds(&durations) - expected).abs() <= expected * 1e-12);
    }

    #[test]
    fn prop_fps_is_reciprocal_or_sentinel(mean in 0.0f64..1.0) {
        let fps = fps_from_mean(mean);
        if mean > MIN_MEAN_SECONDS {
            prop_assert!((fps * mean - 1.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(fps, INVALID_FPS);
        }
    }

    #[test]
    fn prop_warmup_equals_dropping_the_prefix(
        slots in prop::collection::vec(prop::option::weighted(0.8, 0.01f64..100.0), 1..48),
        warmup in 0usize..56,
    ) {
        let with_warmup = aggregate(&sample_set(&slots), warmup);
        let tail: Vec<Option<f64>> = slots.iter().skip(warmup).copied().collect();
        let without_warmup = aggregate(&sample_set(&tail), 0);

        match (with_warmup, without_warmup) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.used_ms, b.used_ms);
                prop_assert_eq!(a.fps, b.fps);
                prop_assert_eq!(a.recorded, slots.len());
            }
            (Err(StatisticsError::InsufficientSamples { recorded, .. }), Err(_)) => {
                prop_assert_eq!(recorded, slots.len());
                prop_assert!(tail.iter().all(Option::is_none));
            }
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn prop_latency_bounds_contain_median(durations in prop::collection::vec(0.01f64..100.0, 1..32)) {
        let result = aggregate(&sample_set(&durations.iter().copied().map(Some).collect::<Vec<_>>()), 0).unwrap();
        let latency = result.latency;
        prop_assert!(latency.min_ms <= latency.median_ms);
        prop_assert!(latency.median_ms <= latency.max_ms);
        prop_assert!(latency.std_dev_ms >= 0.0);
    }
}
