use std::fmt::Write as _;

use crate::error::{DecodeError, DecodeResult, UnsupportedFeature};

/// Cursor over a package byte stream.
///
/// Starts out little-endian; the header decoder flips it to big-endian
/// when the byte-swapped file tag is seen, and every later multi-byte
/// read follows that one decision.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    big_endian: bool,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            big_endian: false,
        }
    }

    /// Current cursor position, used when recording offsets in errors.
    pub fn current_index(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set_big_endian(&mut self, on: bool) {
        self.big_endian = on;
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Move the cursor to an absolute offset. A position past the end is
    /// permitted; the next read reports truncation.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        let available = self.data.len().saturating_sub(self.pos);
        if n > available {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                wanted: n - available,
            });
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let b = self.take(2)?;
        let raw = [b[0], b[1]];
        Ok(if self.big_endian {
            u16::from_be_bytes(raw)
        } else {
            u16::from_le_bytes(raw)
        })
    }

    pub fn read_i16(&mut self) -> DecodeResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        let b = self.take(4)?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(if self.big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        let b = self.take(8)?;
        let raw = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
        Ok(if self.big_endian {
            u64::from_be_bytes(raw)
        } else {
            u64::from_le_bytes(raw)
        })
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Length-prefixed, NUL-terminated narrow string. A zero length is an
    /// empty string; a negative length marks UTF-16 content, which this
    /// reader rejects instead of guessing a decoding for.
    pub fn read_fstring(&mut self) -> DecodeResult<String> {
        let start = self.pos;
        let len = self.read_i32()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len < 0 {
            return Err(DecodeError::Unsupported {
                offset: start,
                feature: UnsupportedFeature::Utf16Strings,
            });
        }
        let raw = self.take(len as usize)?;
        let body = &raw[..raw.len() - 1]; // drop the NUL terminator
        match std::str::from_utf8(body) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(DecodeError::format(start, "string is not valid utf-8")),
        }
    }

    /// 16 GUID bytes rendered as plain lowercase hex, in stream order.
    pub fn read_guid_hex(&mut self) -> DecodeResult<String> {
        let raw = self.take(16)?;
        let mut out = String::with_capacity(32);
        for b in raw {
            write!(out, "{b:02x}").ok();
        }
        Ok(out)
    }

    /// 16 GUID bytes stored as four little-endian 32-bit words: each
    /// 4-byte group is byte-reversed before hex rendering, uppercase.
    pub fn read_guid_slotted(&mut self) -> DecodeResult<String> {
        let raw = self.take(16)?;
        let mut out = String::with_capacity(32);
        for word in raw.chunks_exact(4) {
            for b in word.iter().rev() {
                write!(out, "{b:02X}").ok();
            }
        }
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }
}
