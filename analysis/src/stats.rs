use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Invalid input: cannot reduce an empty sample sequence")]
    InvalidInput,
    #[error("Inconsistent timing: {0}")]
    Inconsistent(&'static str),
}

/// Summary of the timed samples of one scenario.
///
/// Samples are reduced in whole nanoseconds. All divisions are integer
/// divisions that discard the remainder, the millisecond accessors truncate
/// the nanosecond values and are only meant for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimingRecord")]
pub struct TimingStats {
    pub sample_count: u64,
    /// logical iterations used for the throughput, may differ from `sample_count`
    pub iterations: u64,
    pub total_ns: u64,
    pub avg_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub throughput_ops_per_sec: u64,
}

impl TimingStats {
    /// Reduce an ordered, non-empty sequence of samples.
    pub fn from_samples(samples: &[Duration], iterations: u64) -> Result<Self, StatsError> {
        let nanos = samples.iter().map(|sample| saturating_nanos(*sample));

        Self::from_nanos(nanos, iterations)
    }

    pub fn from_nanos<I: IntoIterator<Item = u64>>(
        samples: I,
        iterations: u64,
    ) -> Result<Self, StatsError> {
        let mut samples = samples.into_iter();
        let first = samples.next().ok_or(StatsError::InvalidInput)?;

        let (sample_count, total_ns, min_ns, max_ns) = samples.fold(
            (1u64, first, first, first),
            |(count, total, min, max), sample| {
                (
                    count + 1,
                    total.saturating_add(sample),
                    min.min(sample),
                    max.max(sample),
                )
            },
        );

        Ok(Self {
            sample_count,
            iterations,
            total_ns,
            avg_ns: total_ns / sample_count,
            min_ns,
            max_ns,
            throughput_ops_per_sec: throughput(iterations, total_ns),
        })
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / NANOS_PER_MILLI
    }

    pub fn avg_ms(&self) -> u64 {
        self.avg_ns / NANOS_PER_MILLI
    }

    pub fn min_ms(&self) -> u64 {
        self.min_ns / NANOS_PER_MILLI
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ns / NANOS_PER_MILLI
    }
}

/// wire shape of `TimingStats`, checked before it becomes one
#[derive(Deserialize)]
struct TimingRecord {
    sample_count: u64,
    iterations: u64,
    total_ns: u64,
    avg_ns: u64,
    min_ns: u64,
    max_ns: u64,
    throughput_ops_per_sec: u64,
}

impl TryFrom<TimingRecord> for TimingStats {
    type Error = StatsError;

    fn try_from(record: TimingRecord) -> Result<Self, Self::Error> {
        if record.sample_count == 0 {
            return Err(StatsError::Inconsistent("no samples"));
        }
        if !(record.min_ns <= record.avg_ns && record.avg_ns <= record.max_ns) {
            return Err(StatsError::Inconsistent("average outside of min and max"));
        }
        if record.max_ns > record.total_ns || record.total_ns / record.sample_count != record.avg_ns {
            return Err(StatsError::Inconsistent("total does not match the samples"));
        }
        if throughput(record.iterations, record.total_ns) != record.throughput_ops_per_sec {
            return Err(StatsError::Inconsistent("throughput does not match the total"));
        }

        Ok(Self {
            sample_count: record.sample_count,
            iterations: record.iterations,
            total_ns: record.total_ns,
            avg_ns: record.avg_ns,
            min_ns: record.min_ns,
            max_ns: record.max_ns,
            throughput_ops_per_sec: record.throughput_ops_per_sec,
        })
    }
}

/// iterations per second, `0` when no time was measured at all
fn throughput(iterations: u64, total_ns: u64) -> u64 {
    if total_ns == 0 {
        0
    } else {
        let value = u128::from(iterations) * NANOS_PER_SEC / u128::from(total_ns);

        u64::try_from(value).unwrap_or(u64::MAX)
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn millis(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn reduces_reference_example() {
        let stats = TimingStats::from_samples(&millis(&[9, 10, 11]), 3).unwrap();

        assert_eq!(stats.sample_count, 3);
        assert_eq!(stats.total_ms(), 30);
        assert_eq!(stats.avg_ms(), 10);
        assert_eq!(stats.min_ms(), 9);
        assert_eq!(stats.max_ms(), 11);
        assert_eq!(stats.throughput_ops_per_sec, 100);
    }

    #[test]
    fn empty_samples_are_rejected() {
        assert_eq!(
            TimingStats::from_samples(&[], 10),
            Err(StatsError::InvalidInput)
        );
    }

    #[test]
    fn zero_total_has_zero_throughput() {
        let stats = TimingStats::from_samples(&[Duration::ZERO; 4], 4).unwrap();

        assert_eq!(stats.total_ns, 0);
        assert_eq!(stats.throughput_ops_per_sec, 0);
    }

    #[test]
    fn average_discards_remainder() {
        let stats = TimingStats::from_nanos([1, 2], 2).unwrap();

        assert_eq!(stats.avg_ns, 1);
    }

    #[test]
    fn contradicting_timing_is_rejected() {
        let stats = TimingStats::from_nanos([9, 10, 11], 3).unwrap();
        let mut value = serde_json::to_value(stats).unwrap();

        assert_eq!(serde_json::from_value::<TimingStats>(value.clone()).unwrap(), stats);

        value["avg_ns"] = 20.into();
        let error = serde_json::from_value::<TimingStats>(value).unwrap_err();
        assert!(error.to_string().contains("average outside of min and max"));

        let mut value = serde_json::to_value(stats).unwrap();
        value["throughput_ops_per_sec"] = 1.into();
        assert!(serde_json::from_value::<TimingStats>(value).is_err());

        let mut value = serde_json::to_value(stats).unwrap();
        value["sample_count"] = 0.into();
        assert!(serde_json::from_value::<TimingStats>(value).is_err());
    }

    #[test]
    fn throughput_uses_declared_iterations() {
        // ten batches of 20ms, throughput counts batches not rows
        let stats = TimingStats::from_samples(&millis(&[20; 10]), 10).unwrap();

        assert_eq!(stats.sample_count, 10);
        assert_eq!(stats.throughput_ops_per_sec, 50);
    }

    #[test]
    fn sub_millisecond_samples_keep_precision() {
        let samples = vec![Duration::from_micros(400); 5];
        let stats = TimingStats::from_samples(&samples, 5).unwrap();

        assert_eq!(stats.total_ms(), 2);
        assert_eq!(stats.avg_ms(), 0);
        assert_eq!(stats.throughput_ops_per_sec, 2500);
    }

    proptest! {
        #[test]
        fn average_lies_between_extrema(samples in prop::collection::vec(0u64..10_000_000_000, 1..200)) {
            let stats = TimingStats::from_nanos(samples.iter().copied(), samples.len() as u64).unwrap();

            prop_assert!(stats.min_ns <= stats.avg_ns && stats.avg_ns <= stats.max_ns);
            prop_assert!(stats.min_ms() <= stats.avg_ms() && stats.avg_ms() <= stats.max_ms());
        }

        #[test]
        fn average_rounding_is_bounded(samples in prop::collection::vec(0u64..10_000_000_000, 1..200)) {
            let stats = TimingStats::from_nanos(samples.iter().copied(), 1).unwrap();
            let count = stats.sample_count;

            prop_assert!(stats.avg_ns * count <= stats.total_ns);
            prop_assert!(stats.total_ns < stats.avg_ns * count + count);
            prop_assert!(stats.avg_ms() * count <= stats.total_ms());
            prop_assert!(stats.total_ms() < stats.avg_ms() * count + count);
        }

        #[test]
        fn throughput_does_not_grow_with_total(
            iterations in 1u64..100_000,
            total in 0u64..1_000_000_000_000,
            extra in 0u64..1_000_000_000,
        ) {
            let shorter = TimingStats::from_nanos([total], iterations).unwrap();
            let longer = TimingStats::from_nanos([total + extra], iterations).unwrap();

            if total == 0 {
                prop_assert_eq!(shorter.throughput_ops_per_sec, 0);
            } else {
                prop_assert!(longer.throughput_ops_per_sec <= shorter.throughput_ops_per_sec);
            }
        }
    }
}
