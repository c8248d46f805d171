//! The bounded, typed, in-memory settings store of one domain.

use crate::error::Error;
use crate::Text;
use alloc::vec::Vec;
#[cfg(feature = "defmt")]
use defmt::trace;

/// Maximum number of integer entries per store.
pub const INT_CAPACITY: usize = 5;
/// Maximum number of string entries per store.
pub const STRING_CAPACITY: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntEntry {
    pub id: i32,
    pub value: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StringEntry {
    pub id: i32,
    pub value: Text,
}

/// Two fixed-capacity arrays of integer and string entries.
///
/// Ids are unique within each array. Entries keep the position they were appended at, updating
/// an existing id replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedStore {
    pub(crate) ints: Vec<IntEntry>,
    pub(crate) strings: Vec<StringEntry>,
}

impl Default for TypedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypedStore {
    pub fn new() -> Self {
        Self {
            ints: Vec::with_capacity(INT_CAPACITY),
            strings: Vec::with_capacity(STRING_CAPACITY),
        }
    }

    /// Replaces the value stored under `id` or appends a new entry.
    ///
    /// Fails with [`Error::CapacityExceeded`] if `id` is new and the integer array is full. The
    /// store is left unchanged in that case.
    pub fn upsert_int(&mut self, id: i32, value: i32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("upsert_int: {} = {}", id, value);

        if let Some(entry) = self.ints.iter_mut().find(|entry| entry.id == id) {
            entry.value = value;
            return Ok(());
        }

        if self.ints.len() >= INT_CAPACITY {
            return Err(Error::CapacityExceeded);
        }

        self.ints.push(IntEntry { id, value });
        Ok(())
    }

    /// Replaces the text stored under `id` or appends a new entry. `value` is truncated to
    /// [`MAX_STRING_LENGTH`](crate::MAX_STRING_LENGTH) bytes.
    ///
    /// Fails with [`Error::CapacityExceeded`] if `id` is new and the string array is full.
    pub fn upsert_string(&mut self, id: i32, value: &str) -> Result<(), Error> {
        self.upsert_text(id, Text::from_str_truncated(value))
    }

    pub(crate) fn upsert_text(&mut self, id: i32, value: Text) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("upsert_string: {}", id);

        if let Some(entry) = self.strings.iter_mut().find(|entry| entry.id == id) {
            entry.value = value;
            return Ok(());
        }

        if self.strings.len() >= STRING_CAPACITY {
            return Err(Error::CapacityExceeded);
        }

        self.strings.push(StringEntry { id, value });
        Ok(())
    }

    /// Replaces the value of an existing integer entry. Never appends.
    ///
    /// Fails with [`Error::InvalidArgument`] for a negative id and with [`Error::NotFound`] if
    /// no integer is stored under `id`.
    pub fn update_int(&mut self, id: i32, value: i32) -> Result<(), Error> {
        if id < 0 {
            return Err(Error::InvalidArgument);
        }

        let entry = self
            .ints
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(Error::NotFound)?;
        entry.value = value;
        Ok(())
    }

    /// Replaces the text of an existing string entry, truncated like
    /// [`TypedStore::upsert_string`]. Never appends.
    pub fn update_string(&mut self, id: i32, value: &str) -> Result<(), Error> {
        if id < 0 {
            return Err(Error::InvalidArgument);
        }

        let entry = self
            .strings
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(Error::NotFound)?;
        entry.value = Text::from_str_truncated(value);
        Ok(())
    }

    pub fn get_int(&self, id: i32) -> Result<i32, Error> {
        self.ints
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value)
            .ok_or(Error::NotFound)
    }

    pub fn get_string(&self, id: i32) -> Result<&str, Error> {
        self.get_text(id).map(Text::as_str)
    }

    pub fn get_text(&self, id: i32) -> Result<&Text, Error> {
        self.strings
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.value)
            .ok_or(Error::NotFound)
    }

    /// Integer entries in insertion order.
    pub fn ints(&self) -> &[IntEntry] {
        &self.ints
    }

    /// String entries in insertion order.
    pub fn strings(&self) -> &[StringEntry] {
        &self.strings
    }

    pub fn int_count(&self) -> usize {
        self.ints.len()
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.strings.is_empty()
    }

    /// Number of integer and string ids in `ints`/`strings` that are not stored yet, each id
    /// counted once.
    pub(crate) fn new_ids(&self, ints: &[IntEntry], strings: &[StringEntry]) -> (usize, usize) {
        let new_ints = ints
            .iter()
            .enumerate()
            .filter(|(idx, entry)| {
                !ints[..*idx].iter().any(|other| other.id == entry.id)
                    && !self.ints.iter().any(|other| other.id == entry.id)
            })
            .count();
        let new_strings = strings
            .iter()
            .enumerate()
            .filter(|(idx, entry)| {
                !strings[..*idx].iter().any(|other| other.id == entry.id)
                    && !self.strings.iter().any(|other| other.id == entry.id)
            })
            .count();
        (new_ints, new_strings)
    }
}
