use crate::error::{EmuError, Result};
use std::cmp::min;
use std::path::Path;

pub struct BinReader {
    data: Vec<u8>,
    pos: usize,
}
impl BinReader {
    pub const fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let data = std::fs::read(file)?;
        Ok(Self::new(data))
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        if self.pos < self.data.len() {
            let byte = self.data[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }

    pub fn read_into(&mut self, target: &mut [u8]) -> usize {
        let count = min(target.len(), self.remaining());
        if count > 0 {
            target[..count].copy_from_slice(&self.data[self.pos..(self.pos + count)]);
            self.pos += count;
        }
        count
    }

    /// Returns everything that has not been read yet
    pub fn rest(&self) -> &[u8] {
        &self.data[min(self.pos, self.data.len())..]
    }
}

/// Parses `0x1234`, `$1234`, `1234h` or plain decimal numbers
pub fn parse_number(text: &str) -> Result<u32> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_prefix('$') {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_suffix('h').or_else(|| text.strip_suffix('H')) {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse::<u32>()
    };
    parsed.map_err(|_| EmuError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_number_notations() {
        assert_eq!(parse_number("0x1ffe").unwrap(), 0x1FFE);
        assert_eq!(parse_number("$80").unwrap(), 0x80);
        assert_eq!(parse_number("100h").unwrap(), 0x100);
        assert_eq!(parse_number("4096").unwrap(), 4096);
        assert!(parse_number("zz").is_err());
    }

    #[test]
    fn reader_stops_at_end_of_data() {
        let mut reader = BinReader::new(vec![1, 2, 3]);
        assert_eq!(reader.read_byte(), Some(1));
        let mut buf = [0u8; 4];
        assert_eq!(reader.read_into(&mut buf), 2);
        assert_eq!(&buf[..2], &[2, 3]);
        assert_eq!(reader.read_byte(), None);
        assert!(reader.rest().is_empty());
    }
}
