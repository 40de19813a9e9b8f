//! CRC validation utilities for container headers.
//!
//! Only the reflected CRC-32 used by the True Audio header is needed.

/// CRC algorithm parameters: reflected polynomial, initial value and
/// final xor.
pub struct Algorithm<T> {
    poly: T,
    init: T,
    xorout: T,
}

/// CRC-32/ISO-HDLC, as stored after the TTA1 header fields.
pub const CRC_TTA_HEADER_ALG: Algorithm<u32> = Algorithm {
    poly: 0xEDB8_8320,
    init: 0xFFFF_FFFF,
    xorout: 0xFFFF_FFFF,
};

/// Runs `len` reflected shift steps of `value` through `poly`.
#[inline(always)]
pub const fn crc32_reflected(poly: u32, mut value: u32, len: usize) -> u32 {
    let mut i = 0;
    while i < len {
        value = (value >> 1) ^ ((value & 1) * poly);
        i += 1;
    }

    value
}

#[inline(always)]
const fn crc32_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = crc32_reflected(poly, i as u32, 8);
        i += 1;
    }

    table
}

#[derive(Debug)]
pub struct Crc32 {
    pub poly: u32,
    pub init: u32,
    pub xorout: u32,
    table: [u32; 256],
}

impl Crc32 {
    pub const fn new(algorithm: &Algorithm<u32>) -> Self {
        Self {
            poly: algorithm.poly,
            init: algorithm.init,
            xorout: algorithm.xorout,
            table: crc32_table(algorithm.poly),
        }
    }

    const fn table_entry(&self, index: u32) -> u32 {
        self.table[(index & 0xFF) as usize]
    }

    #[inline(always)]
    pub const fn update(&self, mut crc: u32, bytes: &[u8]) -> u32 {
        let mut i = 0;

        while i < bytes.len() {
            crc = self.table_entry(crc ^ bytes[i] as u32) ^ (crc >> 8);
            i += 1;
        }

        crc
    }

    pub const fn checksum(&self, bytes: &[u8]) -> u32 {
        self.update(self.init, bytes) ^ self.xorout
    }
}

pub static CRC_TTA_HEADER: Crc32 = Crc32::new(&CRC_TTA_HEADER_ALG);

#[cfg(test)]
mod tests {
    use super::CRC_TTA_HEADER;

    #[test]
    fn check_value() {
        assert_eq!(CRC_TTA_HEADER.checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(CRC_TTA_HEADER.checksum(&[]), 0);
    }

    #[test]
    fn incremental() {
        let whole = CRC_TTA_HEADER.checksum(b"TTA1 header");
        let partial = CRC_TTA_HEADER.update(CRC_TTA_HEADER.init, b"TTA1");
        let partial = CRC_TTA_HEADER.update(partial, b" header") ^ CRC_TTA_HEADER.xorout;

        assert_eq!(whole, partial);
    }
}
