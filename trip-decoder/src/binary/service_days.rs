//! The service-day table.
//!
//! Each trip references a record describing the days its schedule
//! operates: an informational calendar text, a bit base, and a bitmask of
//! up to `bit_length` bytes scanned most-significant-bit first. The first
//! set bit's absolute index, counted from `bit_base * 8`, is the trip's
//! day offset from the response's base date.

use super::cursor::Buffer;
use super::error::{DecodeError, FormatError};
use super::strings::StringTable;

/// A resolved service-day record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceDays {
    /// Human-readable calendar text ("Mo-Fr, not 24. Dec"). Informational
    /// only; the bitmask is authoritative.
    pub(crate) text: Option<String>,
    /// Days after the response's base date the trip first operates.
    pub(crate) day_offset: u32,
}

pub(crate) struct ServiceDayTable<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
    len: usize,
}

impl<'a> ServiceDayTable<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize, len: usize) -> Self {
        Self { buf, base, len }
    }

    /// Resolve the record at `offset` to a day offset.
    ///
    /// An all-zero byte advances eight days without per-bit testing. When
    /// the whole scanned range is zero the result is
    /// `bit_base * 8 + 8 * bit_length` — one past the scanned region.
    /// That matches the wire producers; see the repository design notes
    /// before "fixing" it.
    pub(crate) fn resolve(
        &self,
        offset: u16,
        strings: &StringTable<'_>,
    ) -> Result<ServiceDays, DecodeError> {
        if usize::from(offset) >= self.len {
            return Err(FormatError::BadServiceDayOffset {
                offset,
                len: self.len,
            }
            .into());
        }

        let mut cur = self.buf.cursor_at(self.base + usize::from(offset))?;
        let text_ptr = cur.u16_reversed()?;
        let text = strings.read(text_ptr)?;
        let bit_base = cur.u16_reversed()?;
        let bit_length = cur.u16_reversed()?;

        let mut day_offset = u32::from(bit_base) * 8;
        for _ in 0..bit_length {
            let mut bits = cur.u8()?;
            if bits == 0 {
                day_offset += 8;
                continue;
            }
            while bits & 0x80 == 0 {
                bits <<= 1;
                day_offset += 1;
            }
            break;
        }

        Ok(ServiceDays { text, day_offset })
    }
}
