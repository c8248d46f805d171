use std::fmt;

use nvm_settings::codec::{
    self,
    HEADER_SIZE,
};
use nvm_settings::geometry::QUAD_WORD_SIZE;
use nvm_settings::store::{
    INT_CAPACITY,
    STRING_CAPACITY,
};
use nvm_settings::{
    TypedStore,
    MAX_STRING_LENGTH,
};

use crate::error::Error;
use crate::RegionImage;

/// A single settings entry of a region image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub id: i32,
    pub value: ImageValue,
}

impl ImageEntry {
    pub fn new_integer(id: i32, value: i32) -> Self {
        Self {
            id,
            value: ImageValue::Integer(value),
        }
    }

    pub fn new_string(id: i32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: ImageValue::String(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValue {
    Integer(i32),
    String(String),
}

impl ImageValue {
    /// The type column used in the CSV representation.
    pub fn type_str(&self) -> &'static str {
        match self {
            ImageValue::Integer(_) => "integer",
            ImageValue::String(_) => "string",
        }
    }
}

impl fmt::Display for ImageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageValue::Integer(v) => write!(f, "{v}"),
            ImageValue::String(s) => write!(f, "{s}"),
        }
    }
}

pub(crate) fn validate(entries: &[ImageEntry]) -> Result<(), Error> {
    let mut int_ids = Vec::new();
    let mut string_ids = Vec::new();

    for entry in entries {
        if entry.id < 0 {
            return Err(Error::InvalidId(entry.id.to_string()));
        }

        let (seen, capacity) = match &entry.value {
            ImageValue::Integer(_) => (&mut int_ids, INT_CAPACITY),
            ImageValue::String(s) => {
                if s.len() > MAX_STRING_LENGTH {
                    return Err(Error::InvalidValue(format!(
                        "string of id {} is {} bytes long, at most {} are supported",
                        entry.id,
                        s.len(),
                        MAX_STRING_LENGTH
                    )));
                }
                if s.contains('\0') {
                    return Err(Error::InvalidValue(format!(
                        "string of id {} contains a null byte",
                        entry.id
                    )));
                }
                (&mut string_ids, STRING_CAPACITY)
            }
        };

        let kind = entry.value.type_str();
        if seen.contains(&entry.id) {
            return Err(Error::DuplicateId { kind, id: entry.id });
        }
        if seen.len() == capacity {
            return Err(Error::TooManyEntries(kind));
        }
        seen.push(entry.id);
    }

    Ok(())
}

fn to_store(image: &RegionImage) -> Result<TypedStore, Error> {
    validate(&image.entries)?;

    let mut store = TypedStore::new();
    for entry in &image.entries {
        match &entry.value {
            ImageValue::Integer(v) => store.upsert_int(entry.id, *v)?,
            ImageValue::String(s) => store.upsert_string(entry.id, s)?,
        }
    }
    Ok(store)
}

pub(crate) fn encoded_len(image: &RegionImage) -> Result<usize, Error> {
    to_store(image).map(|store| store.encoded_len())
}

pub(crate) fn generate(image: &RegionImage, page_size: usize) -> Result<Vec<u8>, Error> {
    if page_size == 0 || !page_size.is_multiple_of(QUAD_WORD_SIZE) {
        return Err(Error::InvalidImageSize(page_size));
    }

    let store = to_store(image)?;
    let mut data = codec::to_vec(&store);
    if data.len() > page_size {
        return Err(Error::ImageTooSmall(page_size));
    }

    data.resize(page_size, 0xFF);
    Ok(data)
}

pub(crate) fn parse(data: &[u8]) -> Result<RegionImage, Error> {
    let erased = data.len() >= HEADER_SIZE && data[..HEADER_SIZE].iter().all(|&b| b == 0xFF);
    if erased {
        return Ok(RegionImage::default());
    }

    let snapshot = codec::decode(data)?;

    let ints = snapshot
        .ints
        .iter()
        .map(|e| ImageEntry::new_integer(e.id, e.value));
    let strings = snapshot
        .strings
        .iter()
        .map(|e| ImageEntry::new_string(e.id, e.value.as_str()));

    Ok(RegionImage {
        entries: ints.chain(strings).collect(),
    })
}
