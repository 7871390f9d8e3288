use crate::error::{EmuError, Result};
use crate::util::BinReader;
use std::path::Path;

/// Contiguous bytes destined for one address range
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub address: u32,
    pub data: Vec<u8>,
}
impl Segment {
    /// One past the last address, which may be 2^32
    #[inline]
    pub fn end(&self) -> u64 {
        self.address as u64 + self.data.len() as u64
    }
}

/// A program image as loaded from disk
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    pub segments: Vec<Segment>,
    /// Start address from an S7/S8/S9 record, if any
    pub entry: Option<u32>,
    /// Text of the S0 header record, if any
    pub header: Option<String>,
}
impl Image {
    pub fn from_binary(data: Vec<u8>, load_address: u32) -> Self {
        Self {
            segments: vec![Segment {
                address: load_address,
                data,
            }],
            entry: None,
            header: None,
        }
    }

    /// Loads a raw binary or, if the file looks like one, a Motorola S-record file
    pub fn load<P: AsRef<Path>>(path: P, load_address: u32) -> Result<Self> {
        let reader = BinReader::from_file(path)?;
        let data = reader.rest();
        if is_srecord(data) {
            let text = String::from_utf8_lossy(data);
            Self::parse_srecord(&text)
        } else {
            Ok(Self::from_binary(data.to_vec(), load_address))
        }
    }

    pub fn parse_srecord(text: &str) -> Result<Self> {
        let mut image = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = |reason: &str| EmuError::MalformedRecord {
                line: line_number,
                reason: reason.to_string(),
            };

            let mut chars = line.chars();
            if chars.next() != Some('S') {
                return Err(malformed("record does not start with 'S'"));
            }
            let kind = chars
                .next()
                .and_then(|c| c.to_digit(10))
                .ok_or_else(|| malformed("missing record type"))?;

            let bytes = decode_hex(&line[2..]).ok_or_else(|| malformed("invalid hex digits"))?;
            let (&count, body) = bytes
                .split_first()
                .ok_or_else(|| malformed("missing byte count"))?;
            if body.len() != count as usize {
                return Err(malformed("byte count does not match record length"));
            }
            if body.is_empty() {
                return Err(malformed("missing checksum"));
            }

            let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
            if sum != 0xFF {
                let found = body[body.len() - 1];
                let expected = found.wrapping_add(0xFF).wrapping_sub(sum);
                return Err(EmuError::ChecksumMismatch {
                    line: line_number,
                    expected,
                    found,
                });
            }

            let address_len = match kind {
                0 | 1 | 5 | 9 => 2,
                2 | 6 | 8 => 3,
                3 | 7 => 4,
                _ => return Err(malformed("unsupported record type")),
            };
            // address plus checksum
            if body.len() < address_len + 1 {
                return Err(malformed("record too short"));
            }
            let address = body[..address_len]
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | (*b as u32));
            let data = &body[address_len..body.len() - 1];
            if (address as u64 + data.len() as u64) > (1u64 << 32) {
                return Err(malformed("data runs past the 32 bit address space"));
            }

            match kind {
                0 => image.header = Some(String::from_utf8_lossy(data).into_owned()),
                1..=3 => image.append(address, data),
                7..=9 => image.entry = Some(address),
                // S5/S6 only carry a record count
                _ => {}
            }
        }

        tracing::debug!(
            target: "m6805",
            "parsed S-record image: {} segment(s), entry {:?}",
            image.segments.len(),
            image.entry
        );
        Ok(image)
    }

    fn append(&mut self, address: u32, data: &[u8]) {
        match self.segments.last_mut() {
            Some(segment) if segment.end() == address as u64 => segment.data.extend_from_slice(data),
            _ => self.segments.push(Segment {
                address,
                data: data.to_vec(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.data.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_srecord(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let data = &data[start..];
    data.len() >= 2 && data[0] == b'S' && data[1].is_ascii_digit() && data.is_ascii()
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| text.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_and_entry_records() {
        let text = "S00600004844521B\n\
                    S1051000A6FF45\n\
                    S10410028168\n\
                    S9031000EC\n";
        let image = Image::parse_srecord(text).unwrap();
        assert_eq!(image.header.as_deref(), Some("HDR"));
        assert_eq!(image.entry, Some(0x1000));
        assert_eq!(
            image.segments,
            vec![Segment {
                address: 0x1000,
                data: vec![0xA6, 0xFF, 0x81],
            }]
        );
    }

    #[test]
    fn rejects_bad_checksum() {
        let result = Image::parse_srecord("S1051000A6FF46\n");
        assert!(matches!(
            result,
            Err(EmuError::ChecksumMismatch {
                line: 1,
                expected: 0x45,
                found: 0x46
            })
        ));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            Image::parse_srecord("S1051000A6FF\n"),
            Err(EmuError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            Image::parse_srecord("\nX1051000A6FF45\n"),
            Err(EmuError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_data_past_the_end_of_memory() {
        assert!(matches!(
            Image::parse_srecord("S307FFFFFFFF0102F9\nS10401009D5D\n"),
            Err(EmuError::MalformedRecord { line: 1, .. })
        ));

        // the very last byte still fits
        let image = Image::parse_srecord("S306FFFFFFFF01FC\n").unwrap();
        assert_eq!(image.segments[0].end(), 1 << 32);
    }

    #[test]
    fn binary_is_a_single_segment() {
        let image = Image::from_binary(vec![1, 2, 3], 0x0100);
        assert_eq!(image.len(), 3);
        assert_eq!(image.segments[0].address, 0x0100);
        assert!(!is_srecord(&[0x53, 0x00]));
        assert!(is_srecord(b"  S1"));
    }
}
