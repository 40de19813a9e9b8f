use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::Result;
use audioprops::structs::descriptor::SizeInfo;

const ID3V2_HEADER_LEN: u64 = 10;
const ID3V2_FOOTER_FLAG: u8 = 0x10;
const ID3V1_LEN: u64 = 128;

/// Seekable input file together with the sizes the decoders need.
pub struct InputFile {
    reader: BufReader<File>,
    size: SizeInfo,
}

impl InputFile {
    /// Open `path` and measure it.
    /// Tag sizes not given by the caller are probed from the file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        leading_tag_size: Option<u64>,
        trailing_tag_size: Option<u64>,
    ) -> Result<Self> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let leading_tag_size = match leading_tag_size {
            Some(size) => size,
            None => id3v2_size(&mut reader)?,
        };
        let trailing_tag_size = match trailing_tag_size {
            Some(size) => size,
            None => id3v1_size(&mut reader)?,
        };
        reader.rewind()?;

        Ok(Self {
            reader,
            size: SizeInfo {
                file_size,
                leading_tag_size,
                trailing_tag_size,
            },
        })
    }

    pub fn size(&self) -> &SizeInfo {
        &self.size
    }

    pub fn into_reader(self) -> BufReader<File> {
        self.reader
    }
}

/// Total length of an ID3v2 tag at the start of `data`, 0 if there is none.
pub fn id3v2_size<R: Read + Seek>(data: &mut R) -> io::Result<u64> {
    data.rewind()?;

    let mut header = [0u8; ID3V2_HEADER_LEN as usize];
    if data.read_exact(&mut header).is_err() || &header[..3] != b"ID3" {
        return Ok(0);
    }

    let size_bytes = &header[6..10];
    if size_bytes.iter().any(|b| b & 0x80 != 0) {
        return Ok(0);
    }

    let body = size_bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b));
    let footer = if header[5] & ID3V2_FOOTER_FLAG != 0 {
        ID3V2_HEADER_LEN
    } else {
        0
    };

    Ok(ID3V2_HEADER_LEN + body + footer)
}

/// Length of an ID3v1 tag at the end of `data`, 0 if there is none.
pub fn id3v1_size<R: Read + Seek>(data: &mut R) -> io::Result<u64> {
    let len = data.seek(SeekFrom::End(0))?;
    if len < ID3V1_LEN {
        return Ok(0);
    }

    data.seek(SeekFrom::Start(len - ID3V1_LEN))?;

    let mut id3v1_header = [0u8; 3];
    data.read_exact(&mut id3v1_header)?;

    if &id3v1_header == b"TAG" {
        Ok(ID3V1_LEN)
    } else {
        Ok(0)
    }
}
