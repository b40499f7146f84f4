//! Timing samples and the statistics derived from them.

use serde::Serialize;

use crate::errors::{StatisticsError, StatisticsResult};

/// Mean durations at or below this many seconds are treated as unmeasurable.
pub const MIN_MEAN_SECONDS: f64 = 1e-7;

/// Reported when the throughput cannot be computed.
pub const INVALID_FPS: f64 = -1.0;

/// One slot per issued forward pass, in call order. A slot holds the call's
/// duration in milliseconds, or `None` when the call failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingSamples {
    slots: Vec<Option<f64>>,
}

impl TimingSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn record_success(&mut self, duration_ms: f64) {
        self.slots.push(Some(duration_ms));
    }

    pub fn record_failure(&mut self) {
        self.slots.push(None);
    }

    pub fn slots(&self) -> &[Option<f64>] {
        &self.slots
    }

    /// Number of issued calls, failed ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
}

/// Mean duration in seconds of samples given in milliseconds.
/// An empty slice has a mean of zero.
pub fn mean_seconds(durations_ms: &[f64]) -> f64 {
    if durations_ms.is_empty() {
        return 0.0;
    }
    durations_ms.iter().sum::<f64>() / (durations_ms.len() as f64 * 1000.0)
}

/// Frames per second for a mean duration, or [`INVALID_FPS`] when the mean is
/// too small to be meaningful.
pub fn fps_from_mean(mean_seconds: f64) -> f64 {
    if mean_seconds > MIN_MEAN_SECONDS {
        1.0 / mean_seconds
    } else {
        INVALID_FPS
    }
}

/// Latency summary in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub std_dev_ms: f64,
}

impl LatencyStats {
    pub fn from_samples(durations_ms: &[f64]) -> Option<Self> {
        if durations_ms.is_empty() {
            return None;
        }
        let mut sorted = durations_ms.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mid = sorted.len() / 2;
        let median_ms = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let variance =
            sorted.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / sorted.len() as f64;

        Some(Self {
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            median_ms,
            std_dev_ms: variance.sqrt(),
        })
    }
}

/// Result of reducing a sample set after the warm-up prefix is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Calls issued, failed ones included.
    pub recorded: usize,
    /// Leading slots discarded as warm-up.
    pub warmup: usize,
    /// Failed calls among the slots kept after warm-up.
    pub failed: usize,
    /// Successful durations kept after warm-up, in call order.
    pub used_ms: Vec<f64>,
    pub mean_seconds: f64,
    pub fps: f64,
    pub latency: LatencyStats,
}

/// Drops the first `warmup` slots, then reduces the successful durations that
/// remain. Fails when nothing usable is left.
pub fn aggregate(samples: &TimingSamples, warmup: usize) -> StatisticsResult<Aggregate> {
    let recorded = samples.len();
    let kept = samples.slots().get(warmup..).unwrap_or(&[]);
    let used_ms: Vec<f64> = kept.iter().flatten().copied().collect();

    let latency = LatencyStats::from_samples(&used_ms).ok_or(
        StatisticsError::InsufficientSamples {
            recorded,
            warmup,
            valid: 0,
        },
    )?;
    let mean = mean_seconds(&used_ms);

    Ok(Aggregate {
        recorded,
        warmup,
        failed: kept.len() - used_ms.len(),
        mean_seconds: mean,
        fps: fps_from_mean(mean),
        latency,
        used_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(durations: &[f64]) -> TimingSamples {
        let mut samples = TimingSamples::new();
        for &d in durations {
            samples.record_success(d);
        }
        samples
    }

    #[test]
    fn test_mean_seconds_from_milliseconds() {
        assert!((mean_seconds(&[10.0, 20.0, 30.0]) - 0.02).abs() < 1e-12);
        assert_eq!(mean_seconds(&[]), 0.0);
    }

    #[test]
    fn test_fps_from_mean() {
        assert!((fps_from_mean(0.02) - 50.0).abs() < 1e-9);
        assert_eq!(fps_from_mean(0.0), INVALID_FPS);
        assert_eq!(fps_from_mean(1e-8), INVALID_FPS);
    }

    #[test]
    fn test_warmup_prefix_is_dropped() {
        let result = aggregate(&samples(&[100.0, 10.0, 20.0, 30.0]), 1).unwrap();
        assert_eq!(result.used_ms, vec![10.0, 20.0, 30.0]);
        assert!((result.fps - 50.0).abs() < 1e-9);
        assert_eq!(result.latency.median_ms, 20.0);
    }

    #[test]
    fn test_failed_slots_are_skipped() {
        let mut set = samples(&[5.0]);
        set.record_failure();
        set.record_success(4.0);
        let result = aggregate(&set, 0).unwrap();
        assert_eq!(result.failed, 1);
        assert_eq!(result.used_ms, vec![5.0, 4.0]);
    }

    #[test]
    fn test_warmup_consuming_everything_is_insufficient() {
        assert_eq!(
            aggregate(&samples(&[1.0, 2.0]), 2),
            Err(StatisticsError::InsufficientSamples {
                recorded: 2,
                warmup: 2,
                valid: 0
            })
        );
        assert!(aggregate(&samples(&[1.0]), 5).is_err());
        assert!(aggregate(&TimingSamples::new(), 0).is_err());
    }

    #[test]
    fn test_latency_even_median_and_spread() {
        let stats = LatencyStats::from_samples(&[4.0, 2.0, 8.0, 6.0]).unwrap();
        assert_eq!(stats.min_ms, 2.0);
        assert_eq!(stats.max_ms, 8.0);
        assert_eq!(stats.median_ms, 5.0);
        assert!((stats.std_dev_ms - 5.0f64.sqrt()).abs() < 1e-12);
    }
}
