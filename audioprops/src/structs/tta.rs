//! True Audio (TTA1) file header.
//!
//! The 22-byte header may follow an ID3v2 tag, so it is searched for at the
//! caller-declared leading tag size. All fields are little-endian.

use std::io::{Read, Seek};

use log::Level::{Info, Warn};

use crate::process::decode::DecodeContext;
use crate::report_or_err;
use crate::structs::descriptor::StreamDescriptor;
use crate::utils::bitstream_io::{BitstreamIoReader, BsIoSliceReader};
use crate::utils::crc::CRC_TTA_HEADER;
use crate::utils::errors::{DecodeFailure, HeaderError};
use crate::utils::metrics;

pub const TTA_SIGNATURE: &[u8; 4] = b"TTA1";

pub const TTA_FORMAT_SIMPLE: u16 = 1;
pub const TTA_FORMAT_ENCRYPTED: u16 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtaHeader {
    pub audio_format: u16,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
    pub samples: u32,
    pub crc: u32,
}

impl TtaHeader {
    pub fn read<R: Read + Seek>(
        ctx: &mut DecodeContext,
        reader: &mut BitstreamIoReader<R>,
    ) -> Result<Self, DecodeFailure> {
        ctx.expect_signature(reader, ctx.size.leading_tag_size, TTA_SIGNATURE)?;

        let fields: [u8; 14] = reader.get_bytes()?;
        let crc = reader.get_u32_le()?;

        let fields_reader = &mut BsIoSliceReader::from_slice(&fields);
        let header = Self {
            audio_format: fields_reader.get_u16_le()?,
            channels: fields_reader.get_u16_le()?,
            bits_per_sample: fields_reader.get_u16_le()?,
            sample_rate: fields_reader.get_u32_le()?,
            samples: fields_reader.get_u32_le()?,
            crc,
        };

        let calculated = CRC_TTA_HEADER.update(CRC_TTA_HEADER.init, TTA_SIGNATURE);
        let calculated = CRC_TTA_HEADER.update(calculated, &fields) ^ CRC_TTA_HEADER.xorout;
        if calculated != crc {
            report_or_err!(
                ctx,
                Warn,
                HeaderError::CrcMismatch {
                    calculated,
                    read: crc,
                }
            );
        }

        if header.audio_format == TTA_FORMAT_ENCRYPTED {
            ctx.report(Info, &HeaderError::Encrypted(header.audio_format));
        }

        Ok(header)
    }

    pub fn descriptor(&self, ctx: &DecodeContext) -> Result<StreamDescriptor, DecodeFailure> {
        let duration = metrics::sample_based_duration(self.samples as u64, self.sample_rate)
            .ok_or_else(|| ctx.degenerate("sample rate"))?;

        let bitrate = metrics::bitrate(ctx.size.audio_size(), duration)
            .ok_or_else(|| ctx.degenerate("sample count"))?;

        Ok(StreamDescriptor {
            sample_rate: self.sample_rate,
            bit_depth: self.bits_per_sample as u32,
            channels: self.channels as u32,
            bitrate,
            duration,
            valid: true,
            codec_family: ctx.format.codec_family(),
            vbr: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use audioprops_macros::ToBytes;
    use log::Level;

    use crate::process::{DecodeOptions, Decoded, Format, decode, decode_or_null};
    use crate::structs::descriptor::{CodecFamily, SizeInfo};
    use crate::structs::tta::{TTA_FORMAT_ENCRYPTED, TTA_FORMAT_SIMPLE, TTA_SIGNATURE};
    use crate::utils::byteorder::WriteBytesLe;
    use crate::utils::crc::CRC_TTA_HEADER;
    use crate::utils::errors::{DecodeFailure, HeaderError};

    #[derive(ToBytes)]
    struct RawHeader {
        signature: [u8; 4],
        audio_format: u16,
        channels: u16,
        bits_per_sample: u16,
        sample_rate: u32,
        samples: u32,
    }

    fn header(audio_format: u16, sample_rate: u32, samples: u32) -> Vec<u8> {
        let raw = RawHeader {
            signature: *TTA_SIGNATURE,
            audio_format,
            channels: 2,
            bits_per_sample: 16,
            sample_rate,
            samples,
        };

        let mut bytes = Vec::new();
        raw.write_le(&mut bytes);
        let crc = CRC_TTA_HEADER.checksum(&bytes);
        crc.write_le(&mut bytes);
        bytes
    }

    fn with_leading_tag(tag_size: usize, body: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; tag_size];
        data.extend_from_slice(body);
        data
    }

    fn decode_tta(data: &[u8], size: &SizeInfo) -> Result<Decoded, DecodeFailure> {
        decode(Cursor::new(data), size, &DecodeOptions::default())
    }

    #[test]
    fn cd_stereo() -> Result<()> {
        let data = header(TTA_FORMAT_SIMPLE, 44100, 2_000_000);
        let size = SizeInfo::new(5_000_000);

        let decoded = decode_tta(&data, &size)?;
        let d = &decoded.descriptor;

        assert_eq!(decoded.format, Some(Format::TrueAudio));
        assert!(d.valid);
        assert_eq!(d.channels, 2);
        assert_eq!(d.bit_depth, 16);
        assert_eq!(d.sample_rate, 44100);
        assert_eq!(d.codec_family, CodecFamily::Lossless);
        assert!((d.duration - 45_351.47).abs() < 0.01);

        let expected_bitrate = 5_000_000.0 * 8.0 / (d.duration / 1000.0);
        assert!((d.bitrate - expected_bitrate).abs() < 1e-3);
        assert!(decoded.diagnostics.is_empty());

        Ok(())
    }

    #[test]
    fn behind_leading_tag() -> Result<()> {
        let data = with_leading_tag(1024, &header(TTA_FORMAT_SIMPLE, 48000, 480_000));
        let size = SizeInfo {
            file_size: 1_001_024 + 128,
            leading_tag_size: 1024,
            trailing_tag_size: 128,
        };

        let decoded = decode_tta(&data, &size)?;
        assert_eq!(decoded.descriptor.duration, 10_000.0);
        assert_eq!(decoded.descriptor.bitrate, 1_000_000.0 * 8.0 / 10.0);

        // the signature is only looked for after the declared tag
        let misdeclared = SizeInfo {
            leading_tag_size: 512,
            ..size
        };
        let options = DecodeOptions::default();
        let null = decode_or_null(Cursor::new(&data[..]), &misdeclared, &options);
        assert!(null.is_null());

        Ok(())
    }

    #[test]
    fn crc_mismatch() -> Result<()> {
        let mut data = header(TTA_FORMAT_SIMPLE, 44100, 44100);
        data[18] ^= 0xFF;
        let size = SizeInfo::new(data.len() as u64);

        let decoded = decode_tta(&data, &size)?;
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].level, Level::Warn);

        let strict = DecodeOptions::default().with_fail_level(Level::Warn);
        let result = decode(Cursor::new(&data[..]), &size, &strict);
        let failure = result.unwrap_err();
        assert_eq!(failure.format(), Some(Format::TrueAudio));

        let DecodeFailure::Header { source, .. } = failure else {
            panic!("a CRC mismatch must fail in the header");
        };
        assert!(matches!(source, HeaderError::CrcMismatch { .. }));

        Ok(())
    }

    #[test]
    fn encrypted_reported() -> Result<()> {
        let data = header(TTA_FORMAT_ENCRYPTED, 44100, 44100);
        let size = SizeInfo::new(data.len() as u64);

        let strict = DecodeOptions::default().with_fail_level(Level::Warn);
        let decoded = decode(Cursor::new(&data[..]), &size, &strict)?;
        assert_eq!(decoded.diagnostics[0].level, Level::Info);

        Ok(())
    }

    #[test]
    fn zero_divisors() {
        let size = SizeInfo::new(1000);

        assert!(matches!(
            decode_tta(&header(TTA_FORMAT_SIMPLE, 0, 1000), &size),
            Err(DecodeFailure::Degenerate {
                field: "sample rate",
                ..
            })
        ));
        assert!(matches!(
            decode_tta(&header(TTA_FORMAT_SIMPLE, 44100, 0), &size),
            Err(DecodeFailure::Degenerate {
                field: "sample count",
                ..
            })
        ));
    }

    #[test]
    fn idempotent() -> Result<()> {
        let data = header(TTA_FORMAT_SIMPLE, 96000, 9_600_000);
        let size = SizeInfo::new(50_000_000);

        let first = decode_tta(&data, &size)?;
        let second = decode_tta(&data, &size)?;
        assert_eq!(first, second);

        Ok(())
    }
}
