//! DTS core frame header.
//!
//! After the 32-bit sync word and three bytes of frame type / block count /
//! frame size, an 8-byte block holds the fields decoded here:
//!
//! | Field | Bits | Source word |
//! |-------|------|-------------|
//! | AMODE | 11..6 | block\[0..2\] |
//! | SFREQ | 5..2 | block\[0..2\] |
//! | RATE  | 9..5 | block\[1..3\] |
//! | PCMR  | 8..6 | block\[6..8\] |

use std::io::{Read, Seek};

use log::Level::{Info, Warn};

use crate::process::decode::DecodeContext;
use crate::report_or_err;
use crate::structs::descriptor::StreamDescriptor;
use crate::structs::tables::{self, DtsRate};
use crate::utils::bitstream_io::{BitstreamIoReader, BsIoSliceReader};
use crate::utils::errors::{DecodeFailure, HeaderError};
use crate::utils::metrics;

/// 32-bit core sync word, big-endian.
pub const DTS_SYNC_WORD: u32 = 0x7FFE_8001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DtsHeader {
    pub amode: u8,
    pub sfreq: u8,
    pub rate: u8,
    pub pcmr: u8,
}

impl DtsHeader {
    pub fn read<R: Read + Seek>(
        ctx: &mut DecodeContext,
        reader: &mut BitstreamIoReader<R>,
    ) -> Result<Self, DecodeFailure> {
        let sync = DTS_SYNC_WORD.to_be_bytes();
        ctx.expect_signature(reader, 0, &sync)?;

        reader.skip_bytes(3)?;
        let block: [u8; 8] = reader.get_bytes()?;
        let header = Self::parse_block(&block)?;

        if header.sample_rate() == 0 {
            report_or_err!(
                ctx,
                Warn,
                HeaderError::UnknownCode {
                    field: "SFREQ",
                    code: header.sfreq as u32,
                }
            );
        }

        if header.channels() == 0 {
            // user defined channel arrangement
            ctx.report(
                Info,
                &HeaderError::UnknownCode {
                    field: "AMODE",
                    code: header.amode as u32,
                },
            );
        }

        Ok(header)
    }

    fn parse_block(block: &[u8; 8]) -> std::io::Result<Self> {
        let reader = &mut BsIoSliceReader::from_slice(block);

        // tail of FSIZE
        reader.skip_n(4)?;
        let amode = reader.get_n(6)?;
        let sfreq = reader.get_n(4)?;
        let rate = reader.get_n(5)?;

        reader.seek_to_byte(6)?;
        reader.skip_n(7)?;
        let pcmr = reader.get_n(3)?;

        Ok(Self {
            amode,
            sfreq,
            rate,
            pcmr,
        })
    }

    pub fn channels(&self) -> u32 {
        tables::dts_channels(self.amode)
    }

    pub fn sample_rate(&self) -> u32 {
        tables::dts_sample_rate(self.sfreq)
    }

    pub fn bit_depth(&self) -> u32 {
        tables::dts_bit_depth(self.pcmr)
    }

    pub fn bitrate(&self) -> DtsRate {
        tables::dts_bitrate(self.rate)
    }

    pub fn descriptor(&self, ctx: &DecodeContext) -> Result<StreamDescriptor, DecodeFailure> {
        let kbps = match self.bitrate() {
            DtsRate::Kbps(kbps) => kbps,
            DtsRate::Sentinel(value) => {
                return Err(HeaderError::ReservedBitrate {
                    code: self.rate,
                    value,
                }
                .into());
            }
        };

        let duration = metrics::size_based_duration(ctx.size.file_size, kbps)
            .ok_or_else(|| ctx.degenerate("bitrate"))?;

        Ok(StreamDescriptor {
            sample_rate: self.sample_rate(),
            bit_depth: self.bit_depth(),
            channels: self.channels(),
            bitrate: kbps as f64 * 1000.0,
            duration,
            valid: true,
            codec_family: ctx.format.codec_family(),
            vbr: false,
        })
    }
}
