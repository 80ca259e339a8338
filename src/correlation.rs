//! Matching heart-rate peaks to exercise sets

use serde::{Deserialize, Serialize};

use crate::heart_rate::window_summary;
use crate::models::{CorrelatedSet, HrPeak, HrStream, MatchMethod, SetHrData, WorkoutSet};

/// Correlation tuning. The defaults are empirical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Max distance between a set timestamp and its peak, in seconds (default: 60)
    pub timestamp_tolerance: f64,

    /// Half-width of the HR summary around a matched peak, in seconds (default: 20)
    pub summary_half_window: f64,

    /// Lowest peaks-per-set ratio for position matching (default: 0.7)
    pub position_ratio_min: f64,

    /// Highest peaks-per-set ratio for position matching (default: 1.5)
    pub position_ratio_max: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        CorrelationConfig {
            timestamp_tolerance: 60.0,
            summary_half_window: 20.0,
            position_ratio_min: 0.7,
            position_ratio_max: 1.5,
        }
    }
}

/// Attaches heart-rate data to exercise sets
pub struct SetHrCorrelator {
    config: CorrelationConfig,
}

impl SetHrCorrelator {
    pub fn new() -> Self {
        SetHrCorrelator {
            config: CorrelationConfig::default(),
        }
    }

    pub fn with_config(config: CorrelationConfig) -> Self {
        SetHrCorrelator { config }
    }

    /// Correlate sets with detected peaks.
    ///
    /// Timed sets are matched to the nearest peak in time. Otherwise sets are
    /// matched by position when there is roughly one peak per set, or by
    /// splitting the workout into one equal time segment per set.
    /// `workout_duration` defaults to the timestamp of the last HR sample.
    pub fn correlate(
        &self,
        sets: &[WorkoutSet],
        peaks: &[HrPeak],
        stream: &HrStream,
        workout_duration: Option<f64>,
    ) -> Vec<CorrelatedSet> {
        if sets.is_empty() || peaks.is_empty() {
            return sets.iter().map(unmatched).collect();
        }

        let correlated = if sets.iter().any(|s| s.timestamp.is_some()) {
            self.match_by_timestamp(sets, peaks, stream)
        } else if self.peak_count_matches(sets.len(), peaks.len()) {
            self.match_by_position(sets, peaks, stream)
        } else {
            let duration = workout_duration
                .or_else(|| stream.duration())
                .unwrap_or_else(|| peaks.iter().map(|p| p.time).fold(0.0, f64::max));
            self.match_by_segment(sets, peaks, stream, duration)
        };

        tracing::debug!(
            sets = sets.len(),
            peaks = peaks.len(),
            matched = correlated.iter().filter(|c| c.hr_data.is_some()).count(),
            "correlated sets with heart-rate peaks"
        );

        correlated
    }

    fn peak_count_matches(&self, set_count: usize, peak_count: usize) -> bool {
        let ratio = peak_count as f64 / set_count as f64;
        ratio >= self.config.position_ratio_min && ratio <= self.config.position_ratio_max
    }

    fn match_by_timestamp(
        &self,
        sets: &[WorkoutSet],
        peaks: &[HrPeak],
        stream: &HrStream,
    ) -> Vec<CorrelatedSet> {
        sets.iter()
            .map(|set| {
                let Some(timestamp) = set.timestamp else {
                    return unmatched(set);
                };

                let mut best: Option<(&HrPeak, f64)> = None;
                for peak in peaks {
                    let distance = (peak.time - timestamp).abs();
                    if distance > self.config.timestamp_tolerance {
                        continue;
                    }
                    if best.map_or(true, |(_, d)| distance < d) {
                        best = Some((peak, distance));
                    }
                }

                match best {
                    Some((peak, _)) => self.around_peak(set, peak, stream, MatchMethod::Timestamp),
                    None => unmatched(set),
                }
            })
            .collect()
    }

    fn match_by_position(
        &self,
        sets: &[WorkoutSet],
        peaks: &[HrPeak],
        stream: &HrStream,
    ) -> Vec<CorrelatedSet> {
        let total = sets.len();
        sets.iter()
            .enumerate()
            .map(|(i, set)| {
                let index = (i * peaks.len() / total).min(peaks.len() - 1);
                self.around_peak(set, &peaks[index], stream, MatchMethod::Position)
            })
            .collect()
    }

    fn match_by_segment(
        &self,
        sets: &[WorkoutSet],
        peaks: &[HrPeak],
        stream: &HrStream,
        duration: f64,
    ) -> Vec<CorrelatedSet> {
        let segment = duration / sets.len() as f64;

        sets.iter()
            .enumerate()
            .map(|(i, set)| {
                let start = i as f64 * segment;
                let end = start + segment;

                let mut highest: Option<&HrPeak> = None;
                for peak in peaks.iter().filter(|p| p.time >= start && p.time < end) {
                    if highest.map_or(true, |h| peak.hr > h.hr) {
                        highest = Some(peak);
                    }
                }

                if let Some(peak) = highest {
                    return self.around_peak(set, peak, stream, MatchMethod::Segment);
                }

                let summary = window_summary(stream, start, end);
                CorrelatedSet {
                    set: set.clone(),
                    hr_data: if summary.is_empty() {
                        None
                    } else {
                        Some(SetHrData::from_summary(summary, MatchMethod::Segment))
                    },
                }
            })
            .collect()
    }

    fn around_peak(
        &self,
        set: &WorkoutSet,
        peak: &HrPeak,
        stream: &HrStream,
        matched_by: MatchMethod,
    ) -> CorrelatedSet {
        let half = self.config.summary_half_window;
        let summary = window_summary(stream, peak.time - half, peak.time + half);
        CorrelatedSet {
            set: set.clone(),
            hr_data: Some(SetHrData::from_peak(peak, summary, matched_by)),
        }
    }
}

impl Default for SetHrCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

fn unmatched(set: &WorkoutSet) -> CorrelatedSet {
    CorrelatedSet {
        set: set.clone(),
        hr_data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(count: usize) -> Vec<WorkoutSet> {
        (0..count)
            .map(|i| WorkoutSet {
                exercise: "Squat".to_string(),
                set_number: i + 1,
                weight: 225.0,
                reps: Some(5.0),
                timestamp: None,
            })
            .collect()
    }

    fn peak(index: usize, time: f64, hr: f64) -> HrPeak {
        HrPeak {
            index,
            time,
            hr,
            avg_hr: hr - 20.0,
        }
    }

    /// 1 Hz stream of `len` seconds at a steady 120 bpm
    fn steady_stream(len: usize) -> HrStream {
        HrStream::new((0..len).map(|t| t as f64).collect(), vec![120.0; len])
    }

    #[test]
    fn test_no_peaks_or_no_sets() {
        let correlator = SetHrCorrelator::new();
        let stream = steady_stream(100);

        let result = correlator.correlate(&sets(3), &[], &stream, None);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| c.hr_data.is_none()));

        let result = correlator.correlate(&[], &[peak(10, 10.0, 150.0)], &stream, None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_timestamp_matching_picks_nearest_peak() {
        let stream = steady_stream(600);
        let peaks = vec![peak(100, 100.0, 150.0), peak(160, 160.0, 155.0), peak(400, 400.0, 170.0)];
        let timed = vec![
            sets(1)[0].clone().with_timestamp(140.0),
            sets(1)[0].clone().with_timestamp(300.0),
            sets(1)[0].clone(),
        ];

        let result = SetHrCorrelator::new().correlate(&timed, &peaks, &stream, None);

        let first = result[0].hr_data.as_ref().unwrap();
        assert_eq!(first.peak_time, Some(160.0));
        assert_eq!(first.peak_hr, Some(155.0));
        assert_eq!(first.matched_by, MatchMethod::Timestamp);
        assert_eq!(first.avg_hr, Some(120));

        // 100s from the nearest peak, outside the 60s tolerance
        assert!(result[1].hr_data.is_none());
        // untimed set in timestamp mode
        assert!(result[2].hr_data.is_none());
    }

    #[test]
    fn test_timestamp_tolerance_is_inclusive() {
        let stream = steady_stream(600);
        let peaks = vec![peak(100, 100.0, 150.0)];
        let timed = vec![
            sets(1)[0].clone().with_timestamp(160.0),
            sets(1)[0].clone().with_timestamp(160.5),
        ];

        let result = SetHrCorrelator::new().correlate(&timed, &peaks, &stream, None);
        assert_eq!(result[0].hr_data.as_ref().unwrap().peak_time, Some(100.0));
        assert!(result[1].hr_data.is_none());
    }

    #[test]
    fn test_timestamp_tie_keeps_earlier_peak() {
        let stream = steady_stream(600);
        let peaks = vec![peak(100, 100.0, 150.0), peak(160, 160.0, 170.0)];
        let timed = vec![sets(1)[0].clone().with_timestamp(130.0)];

        let result = SetHrCorrelator::new().correlate(&timed, &peaks, &stream, None);
        let data = result[0].hr_data.as_ref().unwrap();
        assert_eq!(data.peak_time, Some(100.0));
        assert_eq!(data.peak_hr, Some(150.0));
    }

    #[test]
    fn test_position_ratio_bounds_are_inclusive() {
        let stream = steady_stream(1200);
        let peaks: Vec<HrPeak> = (0..8)
            .map(|i| peak(100 * (i + 1), 100.0 * (i + 1) as f64, 150.0))
            .collect();
        let method = |set_count: usize, peak_count: usize| {
            let result = SetHrCorrelator::new().correlate(
                &sets(set_count),
                &peaks[..peak_count],
                &stream,
                None,
            );
            result[0].hr_data.as_ref().map(|d| d.matched_by)
        };

        // 7 peaks over 10 sets is exactly 0.7
        assert_eq!(method(10, 7), Some(MatchMethod::Position));
        // 3 peaks over 2 sets is exactly 1.5
        assert_eq!(method(2, 3), Some(MatchMethod::Position));

        assert_eq!(method(10, 6), Some(MatchMethod::Segment));
        assert_eq!(method(5, 8), Some(MatchMethod::Segment));
    }

    #[test]
    fn test_position_matching() {
        let stream = steady_stream(600);
        let peaks = vec![
            peak(100, 100.0, 150.0),
            peak(200, 200.0, 151.0),
            peak(300, 300.0, 152.0),
            peak(400, 400.0, 153.0),
        ];

        let result = SetHrCorrelator::new().correlate(&sets(4), &peaks, &stream, None);
        for (i, correlated) in result.iter().enumerate() {
            let data = correlated.hr_data.as_ref().unwrap();
            assert_eq!(data.matched_by, MatchMethod::Position);
            assert_eq!(data.peak_time, Some(peaks[i].time));
        }

        // 3 peaks over 4 sets (ratio 0.75) still maps by position
        let result = SetHrCorrelator::new().correlate(&sets(4), &peaks[..3], &stream, None);
        let times: Vec<Option<f64>> = result
            .iter()
            .map(|c| c.hr_data.as_ref().and_then(|d| d.peak_time))
            .collect();
        assert_eq!(times, vec![Some(100.0), Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn test_segment_matching() {
        let stream = steady_stream(600);
        // 3 peaks for 6 sets is below the position ratio
        let peaks = vec![peak(30, 30.0, 150.0), peak(50, 50.0, 165.0), peak(450, 450.0, 140.0)];

        let result = SetHrCorrelator::new().correlate(&sets(6), &peaks, &stream, Some(600.0));
        assert_eq!(result.len(), 6);

        // segment 0 = [0, 100): highest of the two peaks
        let first = result[0].hr_data.as_ref().unwrap();
        assert_eq!(first.peak_hr, Some(165.0));
        assert_eq!(first.matched_by, MatchMethod::Segment);

        // segment 1 = [100, 200): no peak, plain summary
        let second = result[1].hr_data.as_ref().unwrap();
        assert_eq!(second.peak_hr, None);
        assert_eq!(second.avg_hr, Some(120));
        assert_eq!(second.matched_by, MatchMethod::Segment);

        assert_eq!(result[4].hr_data.as_ref().unwrap().peak_time, Some(450.0));
    }

    #[test]
    fn test_segment_tie_keeps_earlier_peak() {
        let stream = steady_stream(600);
        let peaks = vec![peak(30, 30.0, 165.0), peak(60, 60.0, 165.0)];

        let result = SetHrCorrelator::new().correlate(&sets(6), &peaks, &stream, Some(600.0));
        assert_eq!(result[0].hr_data.as_ref().unwrap().peak_time, Some(30.0));
    }

    #[test]
    fn test_peak_on_segment_end_belongs_to_next_segment() {
        let stream = steady_stream(600);
        let peaks = vec![peak(100, 100.0, 160.0)];

        let result = SetHrCorrelator::new().correlate(&sets(6), &peaks, &stream, Some(600.0));

        // [0, 100) excludes the peak and falls back to a plain summary
        let first = result[0].hr_data.as_ref().unwrap();
        assert_eq!(first.peak_hr, None);
        assert_eq!(first.avg_hr, Some(120));

        let second = result[1].hr_data.as_ref().unwrap();
        assert_eq!(second.peak_time, Some(100.0));
        assert_eq!(second.matched_by, MatchMethod::Segment);
    }

    #[test]
    fn test_segment_without_data_is_none() {
        // stream only covers the first 100 seconds of a 600 second workout
        let stream = steady_stream(100);
        let peaks = vec![peak(50, 50.0, 160.0)];

        let result = SetHrCorrelator::new().correlate(&sets(6), &peaks, &stream, Some(600.0));
        assert!(result[0].hr_data.is_some());
        assert!(result[1..].iter().all(|c| c.hr_data.is_none()));
    }

    #[test]
    fn test_segment_duration_defaults_to_stream() {
        let stream = steady_stream(301);
        let peaks = vec![peak(250, 250.0, 160.0)];

        let result = SetHrCorrelator::new().correlate(&sets(3), &peaks, &stream, None);
        // 300s over 3 sets: peak lands in the last segment
        assert_eq!(result[2].hr_data.as_ref().unwrap().peak_hr, Some(160.0));
        assert_eq!(result[0].hr_data.as_ref().unwrap().peak_hr, None);
    }
}
