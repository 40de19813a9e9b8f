//! Utility functions and supporting infrastructure.
//!
//! Provides bitstream I/O, CRC validation, byte order helpers, error
//! handling and the duration and bitrate arithmetic shared by the decoders.

pub mod bitstream_io;
pub mod byteorder;
pub mod crc;
pub mod errors;
pub mod metrics;
