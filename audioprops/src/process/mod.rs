use std::fmt::Display;
use std::io::{Read, Seek};

use crate::structs::descriptor::{CodecFamily, SizeInfo};
use crate::structs::{ac3, dsf, dts, tta};
use crate::utils::bitstream_io::BitstreamIoReader;
use crate::utils::errors::DecodeFailure;

/// Signature detection and header decoding.
///
/// Provides [`decode`](decode::decode), the [`Decoded`](decode::Decoded) result
/// and the [`DecodeOptions`](decode::DecodeOptions) controlling it.
pub mod decode;

pub use decode::{DecodeOptions, Decoded, Header, decode, decode_or_null};

/// Container formats with a header decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// AC-3 elementary stream.
    DolbyDigital,
    /// DTS Coherent Acoustics core stream.
    Dts,
    /// True Audio (TTA1), possibly behind a leading tag.
    TrueAudio,
    /// Sony DSD Stream File.
    DsdStream,
}

impl Format {
    pub const ALL: [Format; 4] = [
        Format::DsdStream,
        Format::Dts,
        Format::DolbyDigital,
        Format::TrueAudio,
    ];

    pub fn codec_family(self) -> CodecFamily {
        match self {
            Format::DolbyDigital | Format::Dts => CodecFamily::Lossy,
            Format::TrueAudio | Format::DsdStream => CodecFamily::Lossless,
        }
    }

    /// Whether the container can embed a rewritable metadata block.
    pub fn embeds_metadata(self) -> bool {
        matches!(self, Format::DsdStream)
    }

    /// Picks the format owning a stream from its first bytes.
    ///
    /// `head` starts at byte 0; `tagged_head` starts after the leading tag
    /// and is only consulted by formats that may sit behind one.
    pub fn sniff(head: &[u8], tagged_head: &[u8]) -> Option<Format> {
        if head.starts_with(dsf::DSD_CHUNK_ID) {
            Some(Format::DsdStream)
        } else if head.starts_with(&dts::DTS_SYNC_WORD.to_be_bytes()) {
            Some(Format::Dts)
        } else if head.starts_with(&ac3::AC3_SYNC_WORD.to_be_bytes()) {
            Some(Format::DolbyDigital)
        } else if tagged_head.starts_with(tta::TTA_SIGNATURE) {
            Some(Format::TrueAudio)
        } else {
            None
        }
    }

    /// Decodes `source` with this format's decoder only.
    pub fn decode<R: Read + Seek>(
        self,
        source: R,
        size: &SizeInfo,
        options: &DecodeOptions,
    ) -> Result<Decoded, DecodeFailure> {
        let mut reader = decode::open(source)?;
        decode::decode_as(self, &mut reader, size, options)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::DolbyDigital => write!(f, "Dolby Digital"),
            Format::Dts => write!(f, "DTS"),
            Format::TrueAudio => write!(f, "True Audio"),
            Format::DsdStream => write!(f, "DSD Stream"),
        }
    }
}

const SNIFF_LEN: usize = 4;

/// Reads the signature windows of `reader` and sniffs them.
pub fn detect<R: Read + Seek>(
    reader: &mut BitstreamIoReader<R>,
    size: &SizeInfo,
) -> std::io::Result<Option<Format>> {
    let head = peek(reader, 0)?;
    let tagged_head = if size.leading_tag_size == 0 {
        head.clone()
    } else {
        peek(reader, size.leading_tag_size)?
    };

    Ok(Format::sniff(&head, &tagged_head))
}

fn peek<R: Read + Seek>(
    reader: &mut BitstreamIoReader<R>,
    offset: u64,
) -> std::io::Result<Vec<u8>> {
    if reader.seek_to_byte(offset).is_err() {
        return Ok(Vec::new());
    }

    let mut window = Vec::with_capacity(SNIFF_LEN);
    while window.len() < SNIFF_LEN && reader.available()? >= 8 {
        window.push(reader.get_n::<u8>(8)?);
    }

    Ok(window)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::utils::bitstream_io::BsIoSliceReader;

    #[test]
    fn sniff_signatures() {
        assert_eq!(Format::sniff(b"DSD \x1c\0", b""), Some(Format::DsdStream));
        assert_eq!(
            Format::sniff(&[0x7F, 0xFE, 0x80, 0x01], &[]),
            Some(Format::Dts)
        );
        assert_eq!(
            Format::sniff(&[0x0B, 0x77, 0x00], &[]),
            Some(Format::DolbyDigital)
        );
        assert_eq!(Format::sniff(b"ID3\x04", b"TTA1"), Some(Format::TrueAudio));
        assert_eq!(Format::sniff(b"RIFF", b"RIFF"), None);
        assert_eq!(Format::sniff(&[0x0B], &[]), None);
        assert_eq!(Format::sniff(&[], &[]), None);
    }

    #[test]
    fn detect_behind_leading_tag() -> Result<()> {
        let mut data = vec![0u8; 10];
        data[..3].copy_from_slice(b"ID3");
        data.extend_from_slice(b"TTA1");

        let size = SizeInfo {
            file_size: data.len() as u64,
            leading_tag_size: 10,
            trailing_tag_size: 0,
        };
        let reader = &mut BsIoSliceReader::from_slice(&data);
        assert_eq!(detect(reader, &size)?, Some(Format::TrueAudio));

        let untagged = SizeInfo::new(data.len() as u64);
        assert_eq!(detect(reader, &untagged)?, None);

        Ok(())
    }

    #[test]
    fn detect_short_input() -> Result<()> {
        let size = SizeInfo {
            file_size: 1,
            leading_tag_size: 50,
            trailing_tag_size: 0,
        };
        let reader = &mut BsIoSliceReader::from_slice(&[0x0B]);
        assert_eq!(detect(reader, &size)?, None);

        Ok(())
    }

    #[test]
    fn families() {
        assert_eq!(Format::Dts.codec_family(), CodecFamily::Lossy);
        assert_eq!(Format::TrueAudio.codec_family(), CodecFamily::Lossless);

        let embedding: Vec<Format> = Format::ALL
            .into_iter()
            .filter(|f| f.embeds_metadata())
            .collect();
        assert_eq!(embedding, [Format::DsdStream]);
    }
}
