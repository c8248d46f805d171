//! Generator and parser for page images of an `nvm-settings` region.
//!
//! An image is what a flushed region page holds on the medium: the serialized typed store
//! followed by erased (`0xFF`) bytes up to the page size. Images can be produced from a CSV
//! description on the host and flashed together with the firmware, or read back from a flash
//! dump for inspection.

pub mod error;
pub mod image;

mod csv;

use std::fs;
use std::io::Write;
use std::path::Path;

pub use error::Error;
pub use image::{
    ImageEntry,
    ImageValue,
};

/// The ordered entries of one region image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionImage {
    pub entries: Vec<ImageEntry>,
}

impl RegionImage {
    /// Parse CSV content (`id,type,value`) from a string.
    pub fn from_csv(content: &str) -> Result<Self, Error> {
        csv::parser::parse_csv(content)
    }

    /// Parse a CSV file at the given `path`.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        csv::parser::parse_csv(&content)
    }

    /// Serialize the entries to CSV and return the content as a `String`.
    ///
    /// Entries are written in their order in [`RegionImage::entries`].
    pub fn to_csv(&self) -> Result<String, Error> {
        csv::writer::write_csv_content(self)
    }

    /// Serialize the entries to a CSV file at the given `path`.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        csv::writer::write_csv(self, path)
    }

    /// Checks that the entries fit into one region: non-negative ids, strings of at most 19
    /// bytes, no duplicate id within a kind and at most five entries per kind.
    pub fn validate(&self) -> Result<(), Error> {
        image::validate(&self.entries)
    }

    /// Number of bytes the entries serialize to, without the erased padding of an image.
    pub fn encoded_len(&self) -> Result<usize, Error> {
        image::encoded_len(self)
    }

    /// Number of integer and string entries.
    pub fn counts(&self) -> (usize, usize) {
        let ints = self
            .entries
            .iter()
            .filter(|entry| matches!(entry.value, ImageValue::Integer(_)))
            .count();
        (ints, self.entries.len() - ints)
    }

    /// Generate a page image in memory.
    ///
    /// `page_size` must be a non-zero multiple of 16 bytes and large enough to hold the
    /// serialized store.
    pub fn generate_image(&self, page_size: usize) -> Result<Vec<u8>, Error> {
        image::generate(self, page_size)
    }

    /// Generate a page image and write it to `path`.
    pub fn generate_image_file<P: AsRef<Path>>(
        &self,
        path: P,
        page_size: usize,
    ) -> Result<(), Error> {
        let data = self.generate_image(page_size)?;
        fs::File::create(path)?.write_all(&data)?;
        Ok(())
    }

    /// Parse a page image from an in-memory byte slice. An erased image has no entries.
    pub fn parse_image(data: &[u8]) -> Result<Self, Error> {
        image::parse(data)
    }

    /// Parse a page image file at the given `path`.
    pub fn parse_image_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = fs::read(path)?;
        image::parse(&data)
    }
}
