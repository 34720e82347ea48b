//! Key/value attribute lists.
//!
//! Trip and leg records reference lists of string-keyed attributes:
//! consecutive 4-byte slots of key pointer + value pointer, terminated by
//! a zero key pointer. Unknown keys are skipped generically — every value
//! occupies exactly one slot regardless of key — so the scan is driven by
//! the set of wanted keys rather than per-key parsing code.

use std::collections::HashMap;

use super::cursor::Buffer;
use super::error::DecodeError;
use super::strings::StringTable;

pub(crate) struct AttrArea<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
}

impl<'a> AttrArea<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize) -> Self {
        Self { buf, base }
    }

    /// Scan the list starting at slot `index`, capturing the wanted keys.
    ///
    /// Keys appearing more than once keep their first value.
    pub(crate) fn scan(
        &self,
        index: u16,
        wanted: &[&'static str],
        strings: &StringTable<'_>,
    ) -> Result<HashMap<&'static str, String>, DecodeError> {
        let mut cur = self.buf.cursor_at(self.base + usize::from(index) * 4)?;
        let mut captured = HashMap::new();

        loop {
            let key_ptr = cur.u16_reversed()?;
            if key_ptr == 0 {
                break;
            }
            let value_ptr = cur.u16_reversed()?;

            let Some(key) = strings.read(key_ptr)? else {
                continue;
            };
            let Some(&slot) = wanted.iter().find(|w| **w == key) else {
                continue;
            };
            if captured.contains_key(slot) {
                continue;
            }
            if let Some(value) = strings.read(value_ptr)? {
                captured.insert(slot, value);
            }
        }

        Ok(captured)
    }
}
