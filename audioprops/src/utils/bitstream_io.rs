//! Positioned bit and byte reads over a seekable source.
//!
//! Big-endian bit fields are read MSB first; multi-byte little-endian integers
//! are assembled from whole bytes.

use std::io;
use std::io::SeekFrom;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
    len: u64,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bytes: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bytes << 3,
        }
    }

    #[inline(always)]
    pub fn get(&mut self) -> io::Result<bool> {
        self.bs.read_bit()
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        if n as u64 > self.available()? {
            return Err(self.out_of_bounds("get_n", n as u64));
        }

        self.bs.read_unsigned_var(n)
    }

    /// Reads `N` whole bytes.
    #[inline(always)]
    pub fn get_bytes<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        if (N as u64) << 3 > self.available()? {
            return Err(self.out_of_bounds("get_bytes", (N as u64) << 3));
        }

        let mut buf = [0u8; N];
        self.bs.read_bytes(&mut buf)?;

        Ok(buf)
    }

    #[inline(always)]
    pub fn get_u16_le(&mut self) -> io::Result<u16> {
        self.get_bytes().map(u16::from_le_bytes)
    }

    #[inline(always)]
    pub fn get_u32_le(&mut self) -> io::Result<u32> {
        self.get_bytes().map(u32::from_le_bytes)
    }

    #[inline(always)]
    pub fn get_u64_le(&mut self) -> io::Result<u64> {
        self.get_bytes().map(u64::from_le_bytes)
    }

    #[inline(always)]
    pub fn get_i64_le(&mut self) -> io::Result<i64> {
        self.get_bytes().map(i64::from_le_bytes)
    }

    /// Places the cursor on an absolute byte offset.
    #[inline(always)]
    pub fn seek_to_byte(&mut self, offset: u64) -> io::Result<()> {
        let bits = offset.checked_mul(8).filter(|&bits| bits <= self.len);
        match bits {
            Some(bits) => self.bs.seek_bits(SeekFrom::Start(bits)).map(|_| ()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("seek_to_byte({offset}): beyond {} bytes", self.len >> 3),
            )),
        }
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs
            .position_in_bits()
            .map(|pos| self.len.saturating_sub(pos))
    }

    #[inline(always)]
    pub fn skip_n(&mut self, n: u32) -> io::Result<()> {
        if n as u64 > self.available()? {
            return Err(self.out_of_bounds("skip_n", n as u64));
        }

        self.bs.skip(n)
    }

    #[inline(always)]
    pub fn skip_bytes(&mut self, n: u32) -> io::Result<()> {
        self.skip_n(n << 3)
    }

    #[inline(always)]
    pub fn position(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits()
    }

    /// Current position in whole bytes, rounded down.
    #[inline(always)]
    pub fn byte_position(&mut self) -> io::Result<u64> {
        self.position().map(|bits| bits >> 3)
    }

    fn out_of_bounds(&mut self, op: &str, n: u64) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{op}({n}): out of bounds bits at {}",
                self.bs.position_in_bits().unwrap_or(0)
            ),
        )
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        let len = buf.len() as u64;
        let read = io::Cursor::new(buf);

        Self::new(read, len)
    }
}
