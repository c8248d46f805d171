//! Linear serialization of a [`TypedStore`].
//!
//! ```text
//! [int_count:u32][string_count:u32]
//!   int_count times:    [type:u32=0][id:u32][value:i32]
//!   string_count times: [type:u32=1][id:u32][text:20 bytes, zero padded]
//! ```
//!
//! All words are little endian. Integers precede strings, each in store insertion order.

use crate::error::Error;
use crate::store::{INT_CAPACITY, IntEntry, STRING_CAPACITY, StringEntry, TypedStore};
use crate::{STRING_FIELD_SIZE, Text};
use alloc::vec;
use alloc::vec::Vec;
use core::mem::size_of;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

pub const HEADER_SIZE: usize = 2 * size_of::<u32>();
pub const INT_RECORD_SIZE: usize = 3 * size_of::<u32>();
pub const STRING_RECORD_SIZE: usize = 2 * size_of::<u32>() + STRING_FIELD_SIZE;

/// Largest buffer a full store serializes to.
pub const MAX_ENCODED_SIZE: usize =
    encoded_len(INT_CAPACITY as u32, STRING_CAPACITY as u32) as usize;

#[derive(strum::FromRepr, strum::Display, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum RecordType {
    Integer = 0,
    String = 1,
}

/// Number of bytes a store with the given counts serializes to.
pub const fn encoded_len(int_count: u32, string_count: u32) -> u64 {
    HEADER_SIZE as u64
        + int_count as u64 * INT_RECORD_SIZE as u64
        + string_count as u64 * STRING_RECORD_SIZE as u64
}

impl TypedStore {
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.ints.len() as u32, self.strings.len() as u32) as usize
    }
}

/// Serializes `store` into the front of `buf` and returns the number of bytes written.
///
/// Bytes of `buf` past the returned length are left untouched.
pub fn serialize(store: &TypedStore, buf: &mut [u8]) -> Result<usize, Error> {
    #[cfg(feature = "defmt")]
    trace!(
        "serialize: {} ints, {} strings",
        store.ints.len(),
        store.strings.len()
    );

    let len = store.encoded_len();
    if buf.len() < len {
        return Err(Error::BufferTooSmall);
    }

    let mut writer = Writer { buf, pos: 0 };
    writer.put_u32(store.ints.len() as u32);
    writer.put_u32(store.strings.len() as u32);

    for entry in &store.ints {
        writer.put_u32(RecordType::Integer as u32);
        writer.put_u32(entry.id.cast_unsigned());
        writer.put_u32(entry.value.cast_unsigned());
    }

    for entry in &store.strings {
        writer.put_u32(RecordType::String as u32);
        writer.put_u32(entry.id.cast_unsigned());
        writer.put(entry.value.as_field());
    }

    debug_assert_eq!(writer.pos, len);
    Ok(len)
}

/// Serializes `store` into a freshly allocated buffer of exactly [`TypedStore::encoded_len`]
/// bytes.
pub fn to_vec(store: &TypedStore) -> Vec<u8> {
    let mut buf = vec![0u8; store.encoded_len()];
    // the buffer is sized from the same store, so this cannot fail
    let _ = serialize(store, &mut buf);
    buf
}

/// The validated content of a serialized buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub ints: Vec<IntEntry>,
    pub strings: Vec<StringEntry>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.ints.len() + self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.strings.is_empty()
    }
}

/// Parses a serialized buffer without touching any store.
///
/// `buf` may be longer than the encoded data, e.g. a whole flash window. Fails with
/// [`Error::MalformedBuffer`] if the header is truncated, a count exceeds the store capacity,
/// the buffer is shorter than the counts require, a record carries an unknown type tag, the
/// record tags disagree with the counts or a string is not valid UTF-8.
pub fn decode(buf: &[u8]) -> Result<Snapshot, Error> {
    let mut reader = Reader { buf, pos: 0 };
    let int_count = reader.get_u32()?;
    let string_count = reader.get_u32()?;

    #[cfg(feature = "defmt")]
    trace!("decode: {} ints, {} strings", int_count, string_count);

    if int_count as usize > INT_CAPACITY || string_count as usize > STRING_CAPACITY {
        #[cfg(feature = "defmt")]
        warn!("decode: counts exceed capacity");
        return Err(Error::MalformedBuffer);
    }

    if encoded_len(int_count, string_count) > buf.len() as u64 {
        #[cfg(feature = "defmt")]
        warn!("decode: buffer shorter than declared counts");
        return Err(Error::MalformedBuffer);
    }

    let mut snapshot = Snapshot {
        ints: Vec::with_capacity(int_count as usize),
        strings: Vec::with_capacity(string_count as usize),
    };

    for _ in 0..int_count + string_count {
        let tag = reader.get_u32()?;
        let id = reader.get_u32()?.cast_signed();
        match RecordType::from_repr(tag) {
            Some(RecordType::Integer) => {
                let value = reader.get_u32()?.cast_signed();
                snapshot.ints.push(IntEntry { id, value });
            }
            Some(RecordType::String) => {
                let value = Text::from_field(reader.get_field()?)?;
                snapshot.strings.push(StringEntry { id, value });
            }
            None => {
                #[cfg(feature = "defmt")]
                warn!("decode: unknown record type {}", tag);
                return Err(Error::MalformedBuffer);
            }
        }
    }

    if snapshot.ints.len() != int_count as usize || snapshot.strings.len() != string_count as usize
    {
        #[cfg(feature = "defmt")]
        warn!("decode: record types disagree with counts");
        return Err(Error::MalformedBuffer);
    }

    Ok(snapshot)
}

/// Parses `buf` and merges its entries into `store`.
///
/// This is a merge, not a replace: entries of `store` that are absent from `buf` are retained.
/// The merge is all-or-nothing, if the new ids would not fit, [`Error::CapacityExceeded`] is
/// returned and `store` is unchanged. Returns the number of merged records.
pub fn deserialize(buf: &[u8], store: &mut TypedStore) -> Result<usize, Error> {
    let snapshot = decode(buf)?;
    store.merge(&snapshot)?;
    Ok(snapshot.len())
}

impl TypedStore {
    /// Upserts every entry of `snapshot`, see [`deserialize`].
    pub fn merge(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        let (new_ints, new_strings) = self.new_ids(&snapshot.ints, &snapshot.strings);
        if self.ints.len() + new_ints > INT_CAPACITY
            || self.strings.len() + new_strings > STRING_CAPACITY
        {
            return Err(Error::CapacityExceeded);
        }

        for entry in &snapshot.ints {
            self.upsert_int(entry.id, entry.value)?;
        }
        for entry in &snapshot.strings {
            self.upsert_text(entry.id, entry.value)?;
        }
        Ok(())
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let bytes = self
            .buf
            .get(self.pos..self.pos + N)
            .ok_or(Error::MalformedBuffer)?;
        self.pos += N;

        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn get_u32(&mut self) -> Result<u32, Error> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    fn get_field(&mut self) -> Result<[u8; STRING_FIELD_SIZE], Error> {
        self.take::<STRING_FIELD_SIZE>()
    }
}
