use std::fmt::Display;
use std::io::{self, Read, Seek, SeekFrom};

use log::{Level, debug, trace};

use crate::process::{Format, detect};
use crate::structs::ac3::Ac3Header;
use crate::structs::descriptor::{MetadataLocation, SizeInfo, StreamDescriptor};
use crate::structs::dsf::DsfHeader;
use crate::structs::dts::DtsHeader;
use crate::structs::tta::TtaHeader;
use crate::structs::zone::ZoneMap;
use crate::utils::bitstream_io::BitstreamIoReader;
use crate::utils::errors::{DecodeFailure, Diagnostic};

/// Caller choices for a decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Build the [`ZoneMap`] a later tag write needs.
    pub prepare_for_write: bool,
    /// Header warnings at or above this level abort the decode.
    ///
    /// - `log::Level::Error`: only hard failures abort (default)
    /// - `log::Level::Warn`: suspicious codes and CRC mismatches abort too
    pub fail_level: Level,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            prepare_for_write: false,
            fail_level: Level::Error,
        }
    }
}

impl DecodeOptions {
    pub fn for_write() -> Self {
        Self {
            prepare_for_write: true,
            ..Default::default()
        }
    }

    pub fn with_fail_level(mut self, level: Level) -> Self {
        self.fail_level = level;
        self
    }
}

/// Scratch state of one decode attempt.
#[derive(Debug)]
pub struct DecodeContext {
    pub format: Format,
    pub size: SizeInfo,
    pub options: DecodeOptions,
    diagnostics: Vec<Diagnostic>,
}

impl DecodeContext {
    pub fn new(format: Format, size: SizeInfo, options: DecodeOptions) -> Self {
        Self {
            format,
            size,
            options,
            diagnostics: Vec::new(),
        }
    }

    pub fn fail_level(&self) -> Level {
        self.options.fail_level
    }

    pub fn report(&mut self, level: Level, message: &impl Display) {
        trace!("{}: {message}", self.format);
        self.diagnostics
            .push(Diagnostic::new(level, Some(self.format), message));
    }

    /// Failure for a header field that would be a zero divisor.
    pub fn degenerate(&self, field: &'static str) -> DecodeFailure {
        DecodeFailure::Degenerate {
            format: self.format,
            field,
        }
    }

    /// Checks that `magic` sits at byte `offset`.
    ///
    /// A short read is a mismatch, not an I/O failure.
    pub fn expect_signature<R: Read + Seek, const N: usize>(
        &self,
        reader: &mut BitstreamIoReader<R>,
        offset: u64,
        magic: &[u8; N],
    ) -> Result<(), DecodeFailure> {
        let found = reader
            .seek_to_byte(offset)
            .and_then(|_| reader.get_bytes::<N>());

        match found {
            Ok(found) if &found == magic => Ok(()),
            _ => Err(DecodeFailure::SignatureMismatch {
                format: self.format,
            }),
        }
    }
}

/// Decoded header of one of the supported containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    DolbyDigital(Ac3Header),
    Dts(DtsHeader),
    TrueAudio(TtaHeader),
    DsdStream(DsfHeader),
}

impl Header {
    fn descriptor(&self, ctx: &DecodeContext) -> Result<StreamDescriptor, DecodeFailure> {
        match self {
            Header::DolbyDigital(h) => h.descriptor(ctx),
            Header::Dts(h) => h.descriptor(ctx),
            Header::TrueAudio(h) => h.descriptor(ctx),
            Header::DsdStream(h) => h.descriptor(ctx),
        }
    }

    pub fn metadata(&self) -> MetadataLocation {
        match self {
            Header::DsdStream(h) => h.metadata(),
            _ => MetadataLocation::Unchecked,
        }
    }

    fn zones(&self, size: &SizeInfo) -> Option<ZoneMap> {
        match self {
            Header::DsdStream(h) => Some(h.zones(size)),
            _ => None,
        }
    }
}

/// Outcome of a decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// `None` for the null result.
    pub format: Option<Format>,
    pub header: Option<Header>,
    pub descriptor: StreamDescriptor,
    pub metadata: MetadataLocation,
    /// Present only when the caller prepared for a write and the format
    /// embeds metadata.
    pub zones: Option<ZoneMap>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decoded {
    /// The result for a stream no decoder claims: every field at its default
    /// and the descriptor invalid.
    pub fn null() -> Self {
        Self {
            format: None,
            header: None,
            descriptor: StreamDescriptor::default(),
            metadata: MetadataLocation::Unchecked,
            zones: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.format.is_none()
    }
}

/// Wraps `source`, bounding reads by its actual length.
pub(crate) fn open<R: Read + Seek>(mut source: R) -> io::Result<BitstreamIoReader<R>> {
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;

    Ok(BitstreamIoReader::new(source, len))
}

pub(crate) fn decode_as<R: Read + Seek>(
    format: Format,
    reader: &mut BitstreamIoReader<R>,
    size: &SizeInfo,
    options: &DecodeOptions,
) -> Result<Decoded, DecodeFailure> {
    read_header(format, reader, size, options)
        .map_err(|failure| failure.with_format(format))
}

fn read_header<R: Read + Seek>(
    format: Format,
    reader: &mut BitstreamIoReader<R>,
    size: &SizeInfo,
    options: &DecodeOptions,
) -> Result<Decoded, DecodeFailure> {
    let mut ctx = DecodeContext::new(format, *size, *options);

    let header = match format {
        Format::DolbyDigital => Header::DolbyDigital(Ac3Header::read(&mut ctx, reader)?),
        Format::Dts => Header::Dts(DtsHeader::read(&mut ctx, reader)?),
        Format::TrueAudio => Header::TrueAudio(TtaHeader::read(&mut ctx, reader)?),
        Format::DsdStream => Header::DsdStream(DsfHeader::read(&mut ctx, reader)?),
    };

    let descriptor = header.descriptor(&ctx)?;

    let zones = if options.prepare_for_write {
        header.zones(size)
    } else {
        None
    };

    debug!(
        "{format}: {} Hz, {} ch, {} bit, {:.0} bit/s, {:.1} ms",
        descriptor.sample_rate,
        descriptor.channels,
        descriptor.bit_depth,
        descriptor.bitrate,
        descriptor.duration
    );

    Ok(Decoded {
        format: Some(format),
        metadata: header.metadata(),
        header: Some(header),
        descriptor,
        zones,
        diagnostics: ctx.diagnostics,
    })
}

/// Detects the container format of `source` and decodes its header.
///
/// Returns [`DecodeFailure::Unrecognized`] when no decoder claims the
/// signature.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use audioprops::process::{DecodeOptions, decode};
/// use audioprops::structs::descriptor::SizeInfo;
///
/// // AC-3 sync word, CRC, 44.1 kHz at 80 kbit/s
/// let data = [0x0B, 0x77, 0x00, 0x00, 0x4A, 0x40, 0x40];
/// let size = SizeInfo::new(10_000);
///
/// let decoded = decode(Cursor::new(&data[..]), &size, &DecodeOptions::default())?;
/// assert_eq!(decoded.descriptor.sample_rate, 44100);
/// assert_eq!(decoded.descriptor.duration, 1000.0);
/// # Ok::<(), audioprops::utils::errors::DecodeFailure>(())
/// ```
pub fn decode<R: Read + Seek>(
    source: R,
    size: &SizeInfo,
    options: &DecodeOptions,
) -> Result<Decoded, DecodeFailure> {
    let mut reader = open(source)?;

    let format = detect(&mut reader, size)?.ok_or(DecodeFailure::Unrecognized)?;
    debug!("Detected {format}");

    decode_as(format, &mut reader, size, options)
}

/// Like [`decode`], but falls back to [`Decoded::null`] instead of failing.
///
/// The fallback keeps the failure as a diagnostic, tagged with the format
/// whose decoder failed, when it is more than a plain signature miss.
pub fn decode_or_null<R: Read + Seek>(
    source: R,
    size: &SizeInfo,
    options: &DecodeOptions,
) -> Decoded {
    match decode(source, size, options) {
        Ok(decoded) => decoded,
        Err(failure) => {
            let mut null = Decoded::null();
            null.diagnostics.extend(failure.diagnostic());
            null
        }
    }
}
