use serde::{Deserialize, Serialize};

use crate::models::{HrPeak, HrStream, HrWindowSummary};

/// Peak detection tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDetectionConfig {
    /// Half-width of the local window, in samples (default: 30)
    pub window_size: usize,

    /// Minimum spacing between accepted peaks, in seconds (default: 45)
    pub min_peak_distance: f64,

    /// How far a peak must rise above its rolling average, in bpm (default: 15)
    pub threshold_above_avg: f64,
}

impl Default for PeakDetectionConfig {
    fn default() -> Self {
        PeakDetectionConfig {
            window_size: 30,
            min_peak_distance: 45.0,
            threshold_above_avg: 15.0,
        }
    }
}

/// Finds local heart-rate maxima that stand out from their surroundings
pub struct PeakDetector {
    config: PeakDetectionConfig,
}

impl PeakDetector {
    /// Create new peak detector with default configuration
    pub fn new() -> Self {
        PeakDetector {
            config: PeakDetectionConfig::default(),
        }
    }

    /// Create new peak detector with custom configuration
    pub fn with_config(config: PeakDetectionConfig) -> Self {
        PeakDetector { config }
    }

    /// Detect peaks in a heart-rate stream
    pub fn detect(&self, stream: &HrStream) -> Vec<HrPeak> {
        self.detect_peaks(&stream.heartrate, &stream.time)
    }

    /// Detect peaks in parallel `hr` / `time` series.
    ///
    /// A sample is a peak when it is the maximum of its `±window_size`
    /// neighbourhood, sits more than `threshold_above_avg` above the local
    /// rolling average, and comes at least `min_peak_distance` seconds after
    /// the previously accepted peak. Selection is greedy, left to right.
    /// The first and last `window_size` samples are never candidates.
    pub fn detect_peaks(&self, hr: &[f64], time: &[f64]) -> Vec<HrPeak> {
        let len = hr.len().min(time.len());
        let window = self.config.window_size;
        let hr = &hr[..len];
        let time = &time[..len];

        if len <= 2 * window {
            return Vec::new();
        }

        let averages = rolling_average(hr, window);
        let mut peaks: Vec<HrPeak> = Vec::new();

        for i in window..len - window {
            let value = hr[i];

            let is_local_max = hr[i - window..=i + window].iter().all(|v| *v <= value);
            if !is_local_max {
                continue;
            }

            if value - averages[i] <= self.config.threshold_above_avg {
                continue;
            }

            if let Some(last) = peaks.last() {
                if time[i] - last.time < self.config.min_peak_distance {
                    continue;
                }
            }

            tracing::trace!(index = i, time = time[i], hr = value, "accepted heart-rate peak");
            peaks.push(HrPeak {
                index: i,
                time: time[i],
                hr: value,
                avg_hr: averages[i],
            });
        }

        tracing::debug!(samples = len, peaks = peaks.len(), "heart-rate peak detection");
        peaks
    }
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Centered moving average over `±window` samples, clamped at the edges
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(window);
            let end = (i + window).min(values.len() - 1);
            let slice = &values[start..=end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Rounded average, max and min heart rate for samples with
/// `start <= time <= end`
pub fn window_summary(stream: &HrStream, start: f64, end: f64) -> HrWindowSummary {
    let values: Vec<f64> = stream
        .time
        .iter()
        .zip(&stream.heartrate)
        .filter(|(t, _)| **t >= start && **t <= end)
        .map(|(_, hr)| *hr)
        .collect();

    if values.is_empty() {
        return HrWindowSummary::default();
    }

    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);

    HrWindowSummary {
        avg_hr: Some(to_bpm(avg)),
        max_hr: Some(to_bpm(max)),
        min_hr: Some(to_bpm(min)),
    }
}

/// Summary over the whole stream
pub fn stream_summary(stream: &HrStream) -> HrWindowSummary {
    match (stream.time.first(), stream.duration()) {
        (Some(start), Some(end)) => window_summary(stream, *start, end),
        _ => HrWindowSummary::default(),
    }
}

fn to_bpm(value: f64) -> u16 {
    value.round().clamp(0.0, u16::MAX as f64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(len: usize) -> Vec<f64> {
        (0..len).map(|t| t as f64).collect()
    }

    fn short_config() -> PeakDetectionConfig {
        PeakDetectionConfig {
            window_size: 1,
            min_peak_distance: 2.0,
            threshold_above_avg: 10.0,
        }
    }

    #[test]
    fn test_flat_stream_has_no_peaks() {
        let hr = vec![120.0; 200];
        let peaks = PeakDetector::new().detect_peaks(&hr, &seconds(200));
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_empty_and_short_streams() {
        let detector = PeakDetector::new();
        assert!(detector.detect_peaks(&[], &[]).is_empty());
        assert!(detector.detect(&HrStream::default()).is_empty());

        let hr = vec![100.0; 60];
        assert!(detector.detect_peaks(&hr, &seconds(60)).is_empty());
    }

    #[test]
    fn test_isolates_two_local_maxima() {
        let hr = vec![100.0, 110.0, 140.0, 120.0, 115.0, 145.0, 130.0, 110.0];
        let peaks = PeakDetector::with_config(short_config()).detect_peaks(&hr, &seconds(8));

        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].index, 2);
        assert_eq!(peaks[0].hr, 140.0);
        assert_eq!(peaks[1].index, 5);
        assert_eq!(peaks[1].hr, 145.0);
        assert!((peaks[1].avg_hr - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        // 145 sits exactly 15 above its local average of 130
        let hr = vec![100.0, 110.0, 140.0, 120.0, 115.0, 145.0, 130.0, 110.0];
        let config = PeakDetectionConfig {
            threshold_above_avg: 15.0,
            ..short_config()
        };
        let peaks = PeakDetector::with_config(config).detect_peaks(&hr, &seconds(8));
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].hr, 140.0);
    }

    #[test]
    fn test_min_peak_distance_is_greedy() {
        let hr = vec![100.0, 110.0, 140.0, 120.0, 115.0, 145.0, 130.0, 110.0];
        let config = PeakDetectionConfig {
            min_peak_distance: 5.0,
            ..short_config()
        };
        let peaks = PeakDetector::with_config(config).detect_peaks(&hr, &seconds(8));

        // 145 is higher but arrives too soon after 140
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 2);
    }

    #[test]
    fn test_edges_are_never_peaks() {
        let hr = vec![190.0, 100.0, 100.0, 100.0, 100.0, 190.0];
        let peaks = PeakDetector::with_config(short_config()).detect_peaks(&hr, &seconds(6));
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_interval_session_with_default_config() {
        // 10 minutes at 1 Hz, effort spikes every 2 minutes
        let mut hr = vec![110.0; 600];
        for center in [120usize, 240, 360, 480] {
            for offset in 0..10 {
                hr[center - offset] = 160.0 - offset as f64 * 3.0;
                hr[center + offset] = 160.0 - offset as f64 * 3.0;
            }
        }

        let peaks = PeakDetector::new().detect_peaks(&hr, &seconds(600));
        let times: Vec<f64> = peaks.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![120.0, 240.0, 360.0, 480.0]);
        assert!(peaks.iter().all(|p| p.hr - p.avg_hr > 15.0));
    }

    #[test]
    fn test_rolling_average_clamps_at_edges() {
        let averages = rolling_average(&[1.0, 2.0, 3.0, 4.0], 1);
        assert_eq!(averages, vec![1.5, 2.0, 3.0, 3.5]);
        assert!(rolling_average(&[], 3).is_empty());
    }

    #[test]
    fn test_window_summary() {
        let stream = HrStream::new(seconds(6), vec![100.0, 120.0, 131.0, 140.0, 90.0, 80.0]);

        let summary = window_summary(&stream, 1.0, 3.0);
        assert_eq!(summary.avg_hr, Some(130));
        assert_eq!(summary.max_hr, Some(140));
        assert_eq!(summary.min_hr, Some(120));

        let empty = window_summary(&stream, 10.0, 20.0);
        assert!(empty.is_empty());
        assert_eq!(empty.max_hr, None);

        let whole = stream_summary(&stream);
        assert_eq!(whole.max_hr, Some(140));
        assert_eq!(whole.min_hr, Some(80));
    }
}
