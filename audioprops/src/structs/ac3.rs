//! Dolby Digital (AC-3) sync frame header.
//!
//! ```text
//! syncword(16) crc1(16) fscod(2) frmsizecod(6) bsid(5) bsmod(3) acmod(3) ...
//! ```
//!
//! Duration is derived from the file size and the nominal bitrate since the
//! elementary stream carries no sample count.

use std::io::{Read, Seek};

use log::Level::{Debug, Warn};

use crate::process::decode::DecodeContext;
use crate::report_or_err;
use crate::structs::descriptor::StreamDescriptor;
use crate::structs::tables;
use crate::utils::bitstream_io::BitstreamIoReader;
use crate::utils::errors::{DecodeFailure, HeaderError};
use crate::utils::metrics;

/// 16-bit sync word opening every AC-3 frame.
pub const AC3_SYNC_WORD: u16 = 0x0B77;

/// Leading fields of the bit stream information block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitStreamInfo {
    pub bsid: u8,
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
}

impl BitStreamInfo {
    fn read<R: Read + Seek>(reader: &mut BitstreamIoReader<R>) -> std::io::Result<Self> {
        let mut bsi = Self {
            bsid: reader.get_n(5)?,
            bsmod: reader.get_n(3)?,
            acmod: reader.get_n(3)?,
            ..Default::default()
        };

        // cmixlev
        if bsi.acmod & 1 != 0 && bsi.acmod != 1 {
            reader.skip_n(2)?;
        }
        // surmixlev
        if bsi.acmod & 4 != 0 {
            reader.skip_n(2)?;
        }
        // dsurmod
        if bsi.acmod == 2 {
            reader.skip_n(2)?;
        }

        bsi.lfeon = reader.get()?;

        Ok(bsi)
    }

    pub fn channels(&self) -> u32 {
        tables::ac3_channels(self.acmod) + self.lfeon as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ac3Header {
    pub crc1: u16,
    pub fscod: u8,
    pub frmsizecod: u8,
    /// `None` when the stream ends inside the BSI.
    pub bsi: Option<BitStreamInfo>,
}

impl Ac3Header {
    pub fn read<R: Read + Seek>(
        ctx: &mut DecodeContext,
        reader: &mut BitstreamIoReader<R>,
    ) -> Result<Self, DecodeFailure> {
        let sync = AC3_SYNC_WORD.to_be_bytes();
        ctx.expect_signature(reader, 0, &sync)?;

        let mut header = Self {
            crc1: reader.get_n(16)?,
            fscod: reader.get_n(2)?,
            frmsizecod: reader.get_n(6)?,
            bsi: None,
        };

        if header.sample_rate() == 0 {
            report_or_err!(
                ctx,
                Warn,
                HeaderError::UnknownCode {
                    field: "fscod",
                    code: header.fscod as u32,
                }
            );
        }

        match BitStreamInfo::read(reader) {
            Ok(bsi) => header.bsi = Some(bsi),
            Err(e) => ctx.report(Debug, &format!("Incomplete BSI: {e}")),
        }

        Ok(header)
    }

    pub fn sample_rate(&self) -> u32 {
        tables::ac3_sample_rate(self.fscod)
    }

    /// Nominal bitrate in kbit/s, 0 for reserved `frmsizecod` values.
    pub fn kbps(&self) -> u32 {
        tables::ac3_bitrate(self.frmsizecod >> 1)
    }

    pub fn descriptor(&self, ctx: &DecodeContext) -> Result<StreamDescriptor, DecodeFailure> {
        let kbps = self.kbps();
        let duration = metrics::size_based_duration(ctx.size.file_size, kbps)
            .ok_or_else(|| ctx.degenerate("bitrate"))?;

        Ok(StreamDescriptor {
            sample_rate: self.sample_rate(),
            bit_depth: 0,
            channels: self.bsi.map_or(0, |bsi| bsi.channels()),
            bitrate: kbps as f64 * 1000.0,
            duration,
            valid: true,
            codec_family: ctx.format.codec_family(),
            vbr: false,
        })
    }
}
