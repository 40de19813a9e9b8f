//! ## Technical Overview
//!
//! Header decoders that report the technical properties of an audio file
//! (sample rate, bit depth, channel count, bitrate, duration) without
//! decoding any audio.
//!
//! ### Supported Containers
//!
//! - Dolby Digital (AC-3) elementary streams
//! - DTS Coherent Acoustics core streams
//! - True Audio (TTA1), possibly behind an ID3v2 tag
//! - Sony DSD Stream File (DSF) with its embedded ID3v2 block
//!
//! ### Duration
//!
//! Streams without a sample count (AC-3, DTS) derive duration from the file
//! size and the nominal bitrate. The others derive it from the sample count
//! and bitrate from the audio payload size.
//!
//! ## Quick Start
//!
//! 1. Measure the file and its tags into a [`structs::descriptor::SizeInfo`]
//! 2. Call [`process::decode`] to detect the format and read its header
//! 3. Inspect [`process::Decoded::descriptor`] and the diagnostics
//!
//! ```rust,no_run
//! use std::fs::File;
//! use audioprops::process::{DecodeOptions, decode};
//! use audioprops::structs::descriptor::SizeInfo;
//!
//! let file = File::open("track.dsf")?;
//! let size = SizeInfo::new(file.metadata()?.len());
//!
//! let decoded = decode(file, &size, &DecodeOptions::for_write())?;
//! println!("{} ms", decoded.descriptor.duration);
//!
//! // Where the ID3v2 block lives, and what to patch when it changes size
//! if let Some(zones) = &decoded.zones {
//!     for write in zones.plan("ID3v2", 2048, 4096)? {
//!         println!("patch {} bytes at {}", write.bytes.len(), write.offset);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Format detection and header decoding.
///
/// - **Detection** ([`process::Format::sniff`]): Signature matching
/// - **Decoding** ([`process::decode()`]): Header parsing and derived metrics
pub mod process;

/// Data structures representing container headers.
///
/// - **Dolby Digital** ([`structs::ac3`]): Sync frame and BSI
/// - **DTS** ([`structs::dts`]): Core frame header
/// - **True Audio** ([`structs::tta`]): TTA1 header
/// - **DSD Stream** ([`structs::dsf`]): DSD and fmt chunks
/// - **Zones** ([`structs::zone`]): Byte ranges and dependent header fields
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **CRC Validation** ([`utils::crc`]): Header checksums
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **Metrics** ([`utils::metrics`]): Duration and bitrate arithmetic
pub mod utils;
