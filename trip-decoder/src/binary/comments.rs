//! The comment table.
//!
//! Variable-length lists of string-table references carrying line
//! annotations: a u16 count at the pointed-to offset, then that many u16
//! string pointers. Classifying the annotation prefixes (wheelchair,
//! bicycle, on-demand) is the trip decoder's job, not this table's.

use super::cursor::Buffer;
use super::error::{DecodeError, FormatError};
use super::strings::StringTable;

pub(crate) struct CommentTable<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
    len: usize,
}

impl<'a> CommentTable<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize, len: usize) -> Self {
        Self { buf, base, len }
    }

    /// Read the annotation list at `pointer` (0 = no annotations).
    pub(crate) fn read(
        &self,
        pointer: u16,
        strings: &StringTable<'_>,
    ) -> Result<Vec<String>, DecodeError> {
        if pointer == 0 {
            return Ok(Vec::new());
        }
        let offset = usize::from(pointer);
        if offset >= self.len {
            return Err(FormatError::BadCommentPointer {
                pointer,
                len: self.len,
            }
            .into());
        }

        let mut cur = self.buf.cursor_at(self.base + offset)?;
        let count = cur.u16_reversed()?;
        let mut comments = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let string_ptr = cur.u16_reversed()?;
            if let Some(comment) = strings.read(string_ptr)? {
                comments.push(comment);
            }
        }
        Ok(comments)
    }
}
