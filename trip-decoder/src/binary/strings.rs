//! The string table.
//!
//! Pointer-addressed, NUL-terminated strings in a table-relative range.
//! The table's real encoding is itself one of its strings, so the table
//! starts out decoding provisionally as 7-bit ASCII and is finalized
//! exactly once when the charset name has been read. Pointer 0 means
//! "no string", which is not the same as an empty string.

use super::cursor::Buffer;
use super::error::{DecodeError, FormatError};

/// Character encodings the backends are known to declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Charset {
    Ascii,
    Latin1,
    Utf8,
}

impl Charset {
    /// Parse a charset name as the backends spell them.
    pub(crate) fn parse(name: &str) -> Result<Self, FormatError> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            _ => Err(FormatError::UnknownCharset(name.to_owned())),
        }
    }

    fn decode(self, bytes: &[u8]) -> String {
        match self {
            // 7-bit: anything with the high bit set is undecodable here.
            Charset::Ascii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            // Latin-1 maps byte-for-byte onto the first 256 code points.
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Offset-addressed view of the response's string table.
pub(crate) struct StringTable<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
    len: usize,
    /// `None` until the mid-parse encoding discovery finalizes the table.
    encoding: Option<Charset>,
}

impl<'a> StringTable<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize, len: usize) -> Self {
        Self {
            buf,
            base,
            len,
            encoding: None,
        }
    }

    /// Install the discovered encoding. May only happen once.
    pub(crate) fn finalize(&mut self, charset_name: &str) -> Result<(), FormatError> {
        if self.encoding.is_some() {
            return Err(FormatError::EncodingAlreadyFinalized);
        }
        self.encoding = Some(Charset::parse(charset_name)?);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_finalized(&self) -> bool {
        self.encoding.is_some()
    }

    /// Read the string at `pointer`.
    ///
    /// Pointer 0 is "no string"; any other pointer must fall inside the
    /// table. Decoding stops at the first NUL byte (or the table end) and
    /// trailing whitespace is trimmed.
    pub(crate) fn read(&self, pointer: u16) -> Result<Option<String>, DecodeError> {
        if pointer == 0 {
            return Ok(None);
        }
        let offset = usize::from(pointer);
        if offset >= self.len {
            return Err(FormatError::BadStringPointer {
                pointer,
                len: self.len,
            }
            .into());
        }

        let mut cur = self.buf.cursor_at(self.base + offset)?;
        let mut raw = Vec::new();
        for _ in offset..self.len {
            let b = cur.u8()?;
            if b == 0 {
                break;
            }
            raw.push(b);
        }

        let decoded = self.encoding.unwrap_or(Charset::Ascii).decode(&raw);
        Ok(Some(decoded.trim_end().to_owned()))
    }
}
