//! Duration and bitrate derivations.
//!
//! Every function returns `None` instead of dividing by zero.

/// Fixed overhead added to the raw PCM size when computing a compression
/// ratio (a canonical WAV header).
pub const RAW_HEADER_OVERHEAD: f64 = 44.0;

/// Duration in milliseconds of `bytes` of audio at a constant `kbps`.
pub fn size_based_duration(bytes: u64, kbps: u32) -> Option<f64> {
    (kbps != 0).then(|| bytes as f64 * 8.0 / kbps as f64)
}

/// Duration in milliseconds of `samples` at `sample_rate` Hz.
pub fn sample_based_duration(samples: u64, sample_rate: u32) -> Option<f64> {
    (sample_rate != 0).then(|| samples as f64 * 1000.0 / sample_rate as f64)
}

/// Average bitrate in bit/s of `bytes` played over `duration_ms`.
pub fn bitrate(bytes: u64, duration_ms: f64) -> Option<f64> {
    (duration_ms > 0.0).then(|| bytes as f64 * 8.0 * 1000.0 / duration_ms)
}

/// `file_size / (raw_pcm_bytes + 44) × 100`, or 0 when the raw size is unknown.
pub fn compression_ratio(
    file_size: u64,
    duration_ms: f64,
    sample_rate: u32,
    channels: u32,
    bit_depth: u32,
) -> f64 {
    let raw_bytes =
        duration_ms / 1000.0 * sample_rate as f64 * channels as f64 * bit_depth as f64 / 8.0;

    if raw_bytes <= 0.0 {
        return 0.0;
    }

    file_size as f64 / (raw_bytes + RAW_HEADER_OVERHEAD) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_divisors() {
        assert_eq!(size_based_duration(1000, 0), None);
        assert_eq!(sample_based_duration(1000, 0), None);
        assert_eq!(bitrate(1000, 0.0), None);
        assert_eq!(compression_ratio(1000, 0.0, 44100, 2, 16), 0.0);
        assert_eq!(compression_ratio(1000, 1000.0, 44100, 2, 0), 0.0);
    }

    #[test]
    fn formulas() {
        assert_eq!(size_based_duration(10_000, 80), Some(1000.0));
        assert_eq!(sample_based_duration(44100, 44100), Some(1000.0));
        assert_eq!(bitrate(16_000, 1000.0), Some(128_000.0));

        // one second of CD audio stored verbatim
        let ratio = compression_ratio(176_444, 1000.0, 44100, 2, 16);
        assert!((ratio - 100.0).abs() < 1e-9);
    }
}
