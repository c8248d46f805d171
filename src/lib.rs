#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod codec;
pub mod domain;
pub mod driver;
pub mod error;
pub mod geometry;
mod get;
pub mod handles;
pub mod platform;
mod set;
pub mod store;

/// Size of a string field including the null terminator.
pub const STRING_FIELD_SIZE: usize = 20;
/// Strings are limited to 19 bytes + 1 byte for the null terminator.
pub const MAX_STRING_LENGTH: usize = STRING_FIELD_SIZE - 1;
/// Size of the window flushed to and loaded from a region.
pub const MAX_BUFFER_SIZE: usize = 256;

// Compile-time assertion that a full store fits into the region window
const _: () = assert!(
    codec::MAX_ENCODED_SIZE <= MAX_BUFFER_SIZE,
    "A full store must fit into MAX_BUFFER_SIZE"
);

/// A 20-byte, null-padded text field used for string values and handle names (19 bytes + null
/// terminator). Always holds valid UTF-8.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Text([u8; STRING_FIELD_SIZE]);

impl Text {
    /// Copies at most [`MAX_STRING_LENGTH`] bytes of `s`, stopping at the first null byte. If
    /// the cut would split a multibyte character, the whole character is dropped.
    pub fn from_str_truncated(s: &str) -> Self {
        let s = s.find('\0').map_or(s, |nul| &s[..nul]);
        let mut len = s.len().min(MAX_STRING_LENGTH);
        while !s.is_char_boundary(len) {
            len -= 1;
        }

        let mut dst = [0u8; STRING_FIELD_SIZE];
        dst[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self(dst)
    }

    /// Takes a raw field as read from a serialized buffer. The last byte is forced to the
    /// terminator and everything after the first null byte is cleared.
    pub(crate) fn from_field(mut raw: [u8; STRING_FIELD_SIZE]) -> Result<Self, Error> {
        raw[MAX_STRING_LENGTH] = b'\0';
        let len = nul_position(&raw);
        raw[len..].fill(0);
        core::str::from_utf8(&raw[..len]).map_err(|_| Error::MalformedBuffer)?;
        Ok(Self(raw))
    }

    /// The full, null-padded field.
    pub const fn as_field(&self) -> &[u8; STRING_FIELD_SIZE] {
        &self.0
    }

    /// The text without the terminator and padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..nul_position(&self.0)]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        nul_position(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

fn nul_position(raw: &[u8]) -> usize {
    raw.iter().position(|&e| e == 0x00).unwrap_or(raw.len())
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text({:?})", self.as_str())
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

pub use domain::{Domain, Value};
pub use driver::RegionDriver;
pub use geometry::{Geometry, PageLocation};
pub use get::Get;
pub use handles::{HandleRegistry, HandleTable, RegionName};
pub use set::Set;
pub use store::TypedStore;

extern crate alloc;

use crate::error::Error;
use crate::platform::Platform;
use core::fmt;
use strum::IntoEnumIterator;

/// Page-aligned addresses of the config and firmware regions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionLayout {
    pub config: u32,
    pub firmware: u32,
}

/// The Nvm struct owns the medium, the process-wide open-handle table and both domains.
pub struct Nvm<T: Platform> {
    pub(crate) driver: RegionDriver<T>,
    pub(crate) handles: HandleTable,
    pub(crate) config: Domain,
    pub(crate) firmware: Domain,
}

impl<T: Platform> Nvm<T> {
    /// Both region addresses have to be page aligned, lie within the geometry and use distinct
    /// pages. A page has to hold at least [`MAX_BUFFER_SIZE`] bytes. Nothing is read from the
    /// medium, call [`Nvm::load_all`] at boot.
    pub fn new(hal: T, geometry: Geometry, layout: RegionLayout) -> Result<Nvm<T>, Error> {
        if (geometry.page_size() as usize) < MAX_BUFFER_SIZE {
            return Err(Error::InvalidGeometry);
        }

        for address in [layout.config, layout.firmware] {
            geometry.resolve_page(address)?;
            if !geometry.is_page_aligned(address) {
                return Err(Error::MisalignedAddress);
            }
        }

        if layout.config == layout.firmware {
            return Err(Error::InvalidArgument);
        }

        Ok(Self {
            driver: RegionDriver::new(hal, geometry)?,
            handles: HandleTable::new(),
            config: Domain::config(layout.config),
            firmware: Domain::firmware(layout.firmware),
        })
    }

    /// Opens the region called `name`, see [`HandleTable::open`].
    pub fn open(&mut self, name: &str) -> Result<RegionName, Error> {
        self.handles.open(name)
    }

    pub fn is_open(&self, region: RegionName) -> bool {
        self.handles.is_open(region)
    }

    pub fn domain(&self, region: RegionName) -> &Domain {
        match region {
            RegionName::Config => &self.config,
            RegionName::Firmware => &self.firmware,
        }
    }

    pub fn domain_mut(&mut self, region: RegionName) -> &mut Domain {
        match region {
            RegionName::Config => &mut self.config,
            RegionName::Firmware => &mut self.firmware,
        }
    }

    pub fn config(&mut self) -> &mut Domain {
        &mut self.config
    }

    pub fn firmware(&mut self) -> &mut Domain {
        &mut self.firmware
    }

    /// Commits the store of `region` to its page.
    pub fn flush(&mut self, region: RegionName) -> Result<(), Error> {
        let domain = match region {
            RegionName::Config => &self.config,
            RegionName::Firmware => &self.firmware,
        };
        domain.flush(&mut self.driver)
    }

    /// Merges the page of `region` into its store. Returns the number of merged records.
    pub fn load(&mut self, region: RegionName) -> Result<usize, Error> {
        let domain = match region {
            RegionName::Config => &mut self.config,
            RegionName::Firmware => &mut self.firmware,
        };
        domain.load(&mut self.driver)
    }

    /// Reloads both domains. Stops at the first failing region.
    pub fn load_all(&mut self) -> Result<usize, Error> {
        let mut merged = 0;
        for region in RegionName::iter() {
            merged += self.load(region)?;
        }
        Ok(merged)
    }

    pub fn driver(&mut self) -> &mut RegionDriver<T> {
        &mut self.driver
    }

    pub fn into_inner(self) -> T {
        self.driver.into_inner()
    }
}
