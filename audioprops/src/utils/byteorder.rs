//! Fixed-width integer serialization.
//!
//! Used to encode patch field values and, in tests, to lay out container
//! headers byte by byte.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

pub trait WriteBytesBe {
    fn write_be(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le_be {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
        impl WriteBytesBe for $t { #[inline] fn write_be(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_be_bytes()); }}
    )+ }
}

impl_num_le_be!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! impl_collection {
    ($trait:ident, $method:ident) => {
        impl<T: $trait> $trait for Vec<T> {
            #[inline]
            fn $method(&self, dst: &mut Vec<u8>) {
                self.iter().for_each(|item| item.$method(dst));
            }
        }
        impl<T: $trait, const N: usize> $trait for [T; N] {
            #[inline]
            fn $method(&self, dst: &mut Vec<u8>) {
                self.iter().for_each(|item| item.$method(dst));
            }
        }
    };
}

impl_collection!(WriteBytesLe, write_le);
impl_collection!(WriteBytesBe, write_be);

#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::utils::byteorder::WriteBytesLe::write_le(&$value, &mut vec); )+
        vec
    }};
}

#[macro_export]
macro_rules! join_bytes_be {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::utils::byteorder::WriteBytesBe::write_be(&$value, &mut vec); )+
        vec
    }};
}

/// Byte order of a container's integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Encodes the low `width` bytes of `value`.
    ///
    /// Returns `None` when `width` is 0, larger than 8, or too narrow for `value`.
    pub fn encode(self, value: u64, width: usize) -> Option<Vec<u8>> {
        if width == 0 || width > 8 || (width < 8 && value >> (width * 8) != 0) {
            return None;
        }

        let mut vec = Vec::with_capacity(8);
        match self {
            ByteOrder::Little => {
                value.write_le(&mut vec);
                vec.truncate(width);
            }
            ByteOrder::Big => {
                value.write_be(&mut vec);
                vec.drain(..8 - width);
            }
        }

        Some(vec)
    }
}
