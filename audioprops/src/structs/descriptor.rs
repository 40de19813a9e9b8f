//! Decode results shared by every header decoder.

use std::fmt::Display;

use crate::utils::metrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecFamily {
    #[default]
    Unknown,
    Lossy,
    Lossless,
}

impl Display for CodecFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecFamily::Unknown => write!(f, "Unknown"),
            CodecFamily::Lossy => write!(f, "Lossy"),
            CodecFamily::Lossless => write!(f, "Lossless"),
        }
    }
}

/// Stream properties recovered from a container header.
///
/// `Default` is the invalid descriptor: every numeric field is 0 and must not
/// be consumed while `valid` is false.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDescriptor {
    /// Hz, 0 when unknown.
    pub sample_rate: u32,
    /// Bits per sample, 0 when not applicable.
    pub bit_depth: u32,
    /// 0 when unknown.
    pub channels: u32,
    /// Average bitrate in bit/s.
    pub bitrate: f64,
    /// Milliseconds.
    pub duration: f64,
    pub valid: bool,
    pub codec_family: CodecFamily,
    pub vbr: bool,
}

impl StreamDescriptor {
    /// Size of the file relative to its uncompressed PCM equivalent, in
    /// percent. 0 when the descriptor is invalid or lacks the fields needed.
    pub fn compression_ratio(&self, file_size: u64) -> f64 {
        if !self.valid {
            return 0.0;
        }

        metrics::compression_ratio(
            file_size,
            self.duration,
            self.sample_rate,
            self.channels,
            self.bit_depth,
        )
    }
}

/// Sizes the caller already knows about the file being decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeInfo {
    pub file_size: u64,
    /// Bytes of tag data preceding the audio stream (e.g. ID3v2).
    pub leading_tag_size: u64,
    /// Bytes of tag data following the audio stream (e.g. ID3v1, APE).
    pub trailing_tag_size: u64,
}

impl SizeInfo {
    pub fn new(file_size: u64) -> Self {
        Self {
            file_size,
            ..Default::default()
        }
    }

    pub fn total_tag_size(&self) -> u64 {
        self.leading_tag_size.saturating_add(self.trailing_tag_size)
    }

    pub fn audio_size(&self) -> u64 {
        self.file_size.saturating_sub(self.total_tag_size())
    }
}

/// Where an embedded metadata block starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataLocation {
    /// The format never carries an embedded block, nothing was looked at.
    #[default]
    Unchecked,
    /// The container was checked and holds no block; one may be inserted.
    Absent,
    /// Absolute byte offset of the block.
    At(u64),
}

impl MetadataLocation {
    /// Interprets a stored offset field: zero or negative means no block.
    pub fn from_raw(offset: i64) -> Self {
        if offset > 0 {
            MetadataLocation::At(offset as u64)
        } else {
            MetadataLocation::Absent
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            MetadataLocation::At(offset) => Some(*offset),
            _ => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        !matches!(self, MetadataLocation::Unchecked)
    }
}

impl Display for MetadataLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataLocation::Unchecked => write!(f, "Not applicable"),
            MetadataLocation::Absent => write!(f, "None"),
            MetadataLocation::At(offset) => write!(f, "At byte {offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_requires_validity() {
        let mut descriptor = StreamDescriptor {
            sample_rate: 44100,
            bit_depth: 16,
            channels: 2,
            bitrate: 1_411_200.0,
            duration: 1000.0,
            valid: false,
            codec_family: CodecFamily::Lossless,
            vbr: false,
        };
        assert_eq!(descriptor.compression_ratio(88_222), 0.0);

        descriptor.valid = true;
        assert!((descriptor.compression_ratio(88_222) - 50.0).abs() < 1e-9);

        assert_eq!(StreamDescriptor::default().compression_ratio(1000), 0.0);
    }

    #[test]
    fn size_info() {
        let size = SizeInfo {
            file_size: 1000,
            leading_tag_size: 100,
            trailing_tag_size: 128,
        };
        assert_eq!(size.total_tag_size(), 228);
        assert_eq!(size.audio_size(), 772);

        let broken = SizeInfo {
            file_size: 10,
            leading_tag_size: 100,
            trailing_tag_size: 0,
        };
        assert_eq!(broken.audio_size(), 0);
    }

    #[test]
    fn metadata_from_raw() {
        assert_eq!(MetadataLocation::from_raw(0), MetadataLocation::Absent);
        assert_eq!(MetadataLocation::from_raw(-12), MetadataLocation::Absent);
        assert_eq!(MetadataLocation::from_raw(4096), MetadataLocation::At(4096));
        assert!(!MetadataLocation::default().is_checked());
        assert_eq!(MetadataLocation::At(7).offset(), Some(7));
    }
}
