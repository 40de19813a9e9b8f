//! DSD Stream File header and its embedded ID3v2 chunk.
//!
//! ```text
//! 0   "DSD "   chunk id
//! 4   u64      DSD chunk size (28)
//! 12  u64      total file size
//! 20  u64      offset of the metadata chunk, 0 when absent
//! 28  "fmt "   chunk id
//! 32  u64      fmt chunk size (52)
//! 40  u32      format version (1)
//! 44  u32      format id (0 = DSD raw)
//! 48  u32      channel type
//! 52  u32      channel num
//! 56  u32      sampling frequency
//! 60  u32      bits per sample
//! 64  u64      sample count
//! 72  u32      block size per channel
//! ```
//!
//! All integers are little-endian. The metadata chunk sits at the end of the
//! file, so a tag write updates both the stored file size and the stored
//! metadata offset.

use std::io::{Read, Seek};

use crate::process::decode::DecodeContext;
use crate::structs::descriptor::{MetadataLocation, SizeInfo, StreamDescriptor};
use crate::structs::zone::{ZoneMap, ZoneMapBuilder};
use crate::utils::bitstream_io::BitstreamIoReader;
use crate::utils::byteorder::ByteOrder;
use crate::utils::errors::{DecodeFailure, HeaderError};
use crate::utils::metrics;

pub const DSD_CHUNK_ID: &[u8; 4] = b"DSD ";
pub const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";

pub const DSF_MAX_FORMAT_VERSION: u32 = 1;

/// Zone name of the trailing ID3v2 chunk.
pub const DSF_METADATA_ZONE: &str = "ID3v2";

/// Absolute offset of the stored total file size.
pub const DSF_FILE_SIZE_OFFSET: u64 = 12;
/// Absolute offset of the stored metadata chunk offset.
pub const DSF_METADATA_OFFSET_OFFSET: u64 = 20;
pub const DSF_PATCH_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DsfHeader {
    pub dsd_chunk_size: u64,
    pub stored_file_size: u64,
    /// Raw field, 0 or negative when there is no metadata chunk.
    pub metadata_offset: i64,
    pub fmt_chunk_size: u64,
    pub format_version: u32,
    pub format_id: u32,
    pub channel_type: u32,
    pub channels: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub sample_count: u64,
    /// `None` when the file ends before the field.
    pub block_size_per_channel: Option<u32>,
    /// Byte position right after the sample count.
    pub stream_position: u64,
}

impl DsfHeader {
    pub fn read<R: Read + Seek>(
        ctx: &mut DecodeContext,
        reader: &mut BitstreamIoReader<R>,
    ) -> Result<Self, DecodeFailure> {
        ctx.expect_signature(reader, 0, DSD_CHUNK_ID)?;

        let mut header = Self {
            dsd_chunk_size: reader.get_u64_le()?,
            stored_file_size: reader.get_u64_le()?,
            metadata_offset: reader.get_i64_le()?,
            ..Default::default()
        };

        let chunk_id: [u8; 4] = reader.get_bytes()?;
        if &chunk_id != FMT_CHUNK_ID {
            return Err(HeaderError::UnexpectedChunk {
                expected: *FMT_CHUNK_ID,
                found: chunk_id,
            }
            .into());
        }

        header.fmt_chunk_size = reader.get_u64_le()?;
        header.format_version = reader.get_u32_le()?;
        if header.format_version > DSF_MAX_FORMAT_VERSION {
            return Err(DecodeFailure::UnsupportedVersion {
                format: ctx.format,
                version: header.format_version,
                supported: DSF_MAX_FORMAT_VERSION,
            });
        }

        header.format_id = reader.get_u32_le()?;
        header.channel_type = reader.get_u32_le()?;
        header.channels = reader.get_u32_le()?;
        header.sample_rate = reader.get_u32_le()?;
        header.bits_per_sample = reader.get_u32_le()?;
        header.sample_count = reader.get_u64_le()?;
        header.stream_position = reader.byte_position()?;
        header.block_size_per_channel = reader.get_u32_le().ok();

        Ok(header)
    }

    pub fn metadata(&self) -> MetadataLocation {
        MetadataLocation::from_raw(self.metadata_offset)
    }

    pub fn descriptor(&self, ctx: &DecodeContext) -> Result<StreamDescriptor, DecodeFailure> {
        let duration = metrics::sample_based_duration(self.sample_count, self.sample_rate)
            .ok_or_else(|| ctx.degenerate("sample rate"))?;

        let remaining = ctx.size.file_size.saturating_sub(self.stream_position);
        let bitrate = metrics::bitrate(remaining, duration)
            .ok_or_else(|| ctx.degenerate("sample count"))?;

        Ok(StreamDescriptor {
            sample_rate: self.sample_rate,
            bit_depth: self.bits_per_sample,
            channels: self.channels,
            // whole kbit/s
            bitrate: (bitrate / 1000.0).round() * 1000.0,
            duration,
            valid: true,
            codec_family: ctx.format.codec_family(),
            vbr: false,
        })
    }

    /// Zone of the metadata chunk plus the two header fields tracking it.
    ///
    /// Without a chunk the zone is empty and sits at the end of the file,
    /// where a new one would be appended.
    pub fn zones(&self, size: &SizeInfo) -> ZoneMap {
        let mut builder = ZoneMapBuilder::new(ByteOrder::Little);

        match self.metadata() {
            MetadataLocation::At(offset) => builder.zone(
                DSF_METADATA_ZONE,
                offset,
                size.file_size.saturating_sub(offset),
            ),
            _ => builder.zone(DSF_METADATA_ZONE, size.file_size, 0),
        };

        builder
            .size_patch(
                DSF_METADATA_ZONE,
                DSF_FILE_SIZE_OFFSET,
                DSF_PATCH_WIDTH,
                self.stored_file_size,
            )
            .index_patch(
                DSF_METADATA_ZONE,
                DSF_METADATA_OFFSET_OFFSET,
                DSF_PATCH_WIDTH,
                // negative stored offsets mean no chunk
                self.metadata_offset.max(0) as u64,
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use audioprops_macros::ToBytes;
    use log::Level;

    use crate::process::{DecodeOptions, Decoded, Format, decode, decode_or_null};
    use crate::structs::descriptor::{CodecFamily, MetadataLocation, SizeInfo};
    use crate::structs::dsf::{DSD_CHUNK_ID, DSF_METADATA_ZONE, FMT_CHUNK_ID};
    use crate::structs::zone::{PatchKind, PatchWrite};
    use crate::utils::byteorder::WriteBytesLe;
    use crate::utils::errors::{DecodeFailure, HeaderError};

    #[derive(ToBytes)]
    struct RawDsdChunk {
        id: [u8; 4],
        chunk_size: u64,
        file_size: u64,
        metadata_offset: i64,
    }

    #[derive(ToBytes)]
    struct RawFmtChunk {
        id: [u8; 4],
        chunk_size: u64,
        format_version: u32,
        format_id: u32,
        channel_type: u32,
        channels: u32,
        sample_rate: u32,
        bits_per_sample: u32,
        sample_count: u64,
        block_size: u32,
        reserved: u32,
    }

    fn fmt_chunk(format_version: u32, sample_rate: u32, sample_count: u64) -> RawFmtChunk {
        RawFmtChunk {
            id: *FMT_CHUNK_ID,
            chunk_size: 52,
            format_version,
            format_id: 0,
            channel_type: 2,
            channels: 2,
            sample_rate,
            bits_per_sample: 24,
            sample_count,
            block_size: 4096,
            reserved: 0,
        }
    }

    fn file(file_size: u64, metadata_offset: i64, fmt: RawFmtChunk) -> Vec<u8> {
        let dsd = RawDsdChunk {
            id: *DSD_CHUNK_ID,
            chunk_size: 28,
            file_size,
            metadata_offset,
        };

        let mut bytes = Vec::new();
        dsd.write_le(&mut bytes);
        fmt.write_le(&mut bytes);
        bytes
    }

    fn decode_dsf(
        data: &[u8],
        file_size: u64,
        options: &DecodeOptions,
    ) -> Result<Decoded, DecodeFailure> {
        decode(Cursor::new(data), &SizeInfo::new(file_size), options)
    }

    #[test]
    fn without_metadata() -> Result<()> {
        let data = file(10_000_000, 0, fmt_chunk(1, 44100, 1_000_000));
        let decoded = decode_dsf(&data, 10_000_000, &DecodeOptions::for_write())?;
        let d = &decoded.descriptor;

        assert_eq!(decoded.format, Some(Format::DsdStream));
        assert!(d.valid);
        assert_eq!(d.channels, 2);
        assert_eq!(d.sample_rate, 44100);
        assert_eq!(d.bit_depth, 24);
        assert_eq!(d.codec_family, CodecFamily::Lossless);
        assert!((d.duration - 22_675.74).abs() < 0.01);

        let kbps = (9_999_928.0 * 8.0 * 1000.0 / d.duration / 1000.0).round();
        assert_eq!(d.bitrate, kbps * 1000.0);

        assert_eq!(decoded.metadata, MetadataLocation::Absent);

        let zones = decoded.zones.as_ref().unwrap();
        let zone = zones.get_zone(DSF_METADATA_ZONE).unwrap();
        assert_eq!((zone.start, zone.length), (10_000_000, 0));

        let patches = zones.patches();
        assert_eq!(patches.len(), 2);
        assert!(patches.iter().all(|p| p.width == 8));
        assert_eq!(patches[0].kind, PatchKind::Size);
        assert_eq!((patches[0].offset, patches[0].value), (12, 10_000_000));
        assert_eq!(patches[1].kind, PatchKind::Index);
        assert_eq!((patches[1].offset, patches[1].value), (20, 0));

        // appending a 4 KiB tag
        let writes = zones.plan(DSF_METADATA_ZONE, 10_000_000, 4096)?;
        assert_eq!(
            writes,
            [
                PatchWrite {
                    offset: 12,
                    bytes: 10_004_096u64.to_le_bytes().to_vec(),
                },
                PatchWrite {
                    offset: 20,
                    bytes: 10_000_000u64.to_le_bytes().to_vec(),
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn with_metadata() -> Result<()> {
        let data = file(20_000, 16_000, fmt_chunk(1, 2_822_400, 5_000));
        let decoded = decode_dsf(&data, 20_000, &DecodeOptions::for_write())?;

        assert_eq!(decoded.metadata, MetadataLocation::At(16_000));

        let zones = decoded.zones.unwrap();
        let zone = zones.get_zone(DSF_METADATA_ZONE).unwrap();
        assert_eq!((zone.start, zone.length), (16_000, 4_000));
        assert_eq!(zones.patches()[1].value, 16_000);

        let removed = zones.plan(DSF_METADATA_ZONE, 16_000, 0)?;
        assert_eq!(removed[0].bytes, 16_000u64.to_le_bytes());
        assert_eq!(removed[1].bytes, [0; 8]);

        Ok(())
    }

    #[test]
    fn negative_offset_means_absent() -> Result<()> {
        let data = file(5_000, -1, fmt_chunk(1, 44100, 44100));
        let decoded = decode_dsf(&data, 5_000, &DecodeOptions::for_write())?;

        assert_eq!(decoded.metadata, MetadataLocation::Absent);

        let zones = decoded.zones.unwrap();
        assert_eq!(zones.patches()[1].value, 0);

        // appending a tag stores its real offset over the marker
        let writes = zones.plan(DSF_METADATA_ZONE, 5_000, 100)?;
        assert_eq!(writes[0].bytes, 5_100u64.to_le_bytes());
        assert_eq!(writes[1].bytes, 5_000u64.to_le_bytes());

        Ok(())
    }

    #[test]
    fn read_only_skips_zones() -> Result<()> {
        let data = file(5_000, 0, fmt_chunk(1, 44100, 44100));
        let decoded = decode_dsf(&data, 5_000, &DecodeOptions::default())?;

        assert!(decoded.zones.is_none());
        assert_eq!(decoded.metadata, MetadataLocation::Absent);

        Ok(())
    }

    #[test]
    fn unsupported_version() {
        let data = file(5_000, 0, fmt_chunk(2, 44100, 44100));
        let result = decode_dsf(&data, 5_000, &DecodeOptions::default());

        let Err(failure) = result else {
            panic!("version 2 must be rejected");
        };
        assert!(matches!(
            failure,
            DecodeFailure::UnsupportedVersion { version: 2, .. }
        ));
        let diagnostic = failure.diagnostic().unwrap();
        assert_eq!(diagnostic.level, Level::Warn);
        assert_eq!(diagnostic.format, Some(Format::DsdStream));

        let null = decode_or_null(
            Cursor::new(&data[..]),
            &SizeInfo::new(5_000),
            &DecodeOptions::default(),
        );
        assert!(null.is_null());
        assert!(!null.descriptor.valid);
        assert_eq!(null.diagnostics.len(), 1);
        assert_eq!(null.diagnostics[0].format, Some(Format::DsdStream));
    }

    #[test]
    fn missing_fmt_chunk() {
        let mut data = file(5_000, 0, fmt_chunk(1, 44100, 44100));
        data[28..32].copy_from_slice(b"data");

        assert!(matches!(
            decode_dsf(&data, 5_000, &DecodeOptions::default()),
            Err(DecodeFailure::Header {
                source: HeaderError::UnexpectedChunk { .. },
                format: Some(Format::DsdStream),
            })
        ));
    }

    #[test]
    fn zero_sample_rate() {
        let data = file(5_000, 0, fmt_chunk(1, 0, 44100));

        assert!(matches!(
            decode_dsf(&data, 5_000, &DecodeOptions::default()),
            Err(DecodeFailure::Degenerate {
                field: "sample rate",
                ..
            })
        ));
    }

    #[test]
    fn altered_signature() {
        let mut data = file(5_000, 0, fmt_chunk(1, 44100, 44100));
        data[3] = b'_';

        assert!(matches!(
            Format::DsdStream.decode(
                Cursor::new(&data[..]),
                &SizeInfo::new(5_000),
                &DecodeOptions::for_write()
            ),
            Err(DecodeFailure::SignatureMismatch { .. })
        ));
    }
}
