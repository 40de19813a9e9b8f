//! Code → physical value tables.
//!
//! Each function is total over the bit width of its code: codes without a
//! physical meaning map to 0. Inputs wider than the documented field are
//! masked first.

/// AC-3 nominal bitrates in kbit/s, indexed by `frmsizecod >> 1`.
pub const AC3_BITRATES: [u32; 19] = [
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 448, 512, 576, 640,
];

/// AC-3 channels per `acmod`, LFE excluded. Mode 0 is dual mono (1+1).
pub const AC3_CHANNELS: [u32; 8] = [2, 1, 2, 3, 3, 4, 4, 5];

/// AC-3 `fscod` (2 bits) → Hz.
pub const fn ac3_sample_rate(fscod: u8) -> u32 {
    match fscod & 0b11 {
        0 => 48000,
        1 => 44100,
        2 => 32000,
        _ => 0,
    }
}

/// AC-3 bitrate index (5 bits, `frmsizecod >> 1`) → kbit/s.
pub const fn ac3_bitrate(index: u8) -> u32 {
    let index = (index & 0x1F) as usize;
    if index < AC3_BITRATES.len() {
        AC3_BITRATES[index]
    } else {
        0
    }
}

/// AC-3 `acmod` (3 bits) → full-bandwidth channel count.
pub const fn ac3_channels(acmod: u8) -> u32 {
    AC3_CHANNELS[(acmod & 0b111) as usize]
}

/// DTS `RATE` table in kbit/s. The last three entries are kept as stored:
/// they are markers rather than rates.
pub const DTS_BITRATES: [i32; 32] = [
    32, 56, 64, 96, 112, 128, 192, 224, 256, 320, 384, 448, 512, 576, 640, 768, 960, 1024, 1152,
    1280, 1344, 1408, 1411, 1472, 1536, 1920, 2048, 3072, 3840, 0, -1, 1,
];

/// A DTS `RATE` code resolved through [`DTS_BITRATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtsRate {
    Kbps(u32),
    Sentinel(i32),
}

impl DtsRate {
    pub const fn kbps(self) -> Option<u32> {
        match self {
            DtsRate::Kbps(kbps) => Some(kbps),
            DtsRate::Sentinel(_) => None,
        }
    }
}

/// DTS `RATE` (5 bits).
pub const fn dts_bitrate(code: u8) -> DtsRate {
    let code = (code & 0x1F) as usize;
    if code < 29 {
        DtsRate::Kbps(DTS_BITRATES[code] as u32)
    } else {
        DtsRate::Sentinel(DTS_BITRATES[code])
    }
}

/// DTS `AMODE` (6 bits) → channel count. Codes above 15 are user defined.
pub const fn dts_channels(amode: u8) -> u32 {
    match amode & 0x3F {
        0 => 1,
        1..=4 => 2,
        5..=6 => 3,
        7..=8 => 4,
        9 => 5,
        10..=12 => 6,
        13 => 7,
        14..=15 => 8,
        _ => 0,
    }
}

/// DTS `SFREQ` (4 bits) → Hz.
pub const fn dts_sample_rate(sfreq: u8) -> u32 {
    match sfreq & 0x0F {
        1 => 8000,
        2 => 16000,
        3 => 32000,
        6 => 11025,
        7 => 22050,
        8 => 44100,
        11 => 12000,
        12 => 24000,
        13 => 48000,
        _ => 0,
    }
}

/// DTS `PCMR` (3 bits) → source bit depth. Reserved codes fall back to 16.
pub const fn dts_bit_depth(pcmr: u8) -> u32 {
    match pcmr & 0b111 {
        0..=1 => 16,
        2..=3 => 20,
        4..=5 => 24,
        _ => 16,
    }
}
