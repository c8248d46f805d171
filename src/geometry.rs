//! Bank/page arithmetic of the flash address space.
//!
//! The address space starts at a base address and is split into [`BANK_COUNT`] banks of
//! [`PAGES_PER_BANK`] equally sized pages. A page is the erase granule, a quad-word
//! ([`QUAD_WORD_SIZE`] bytes) is the program granule. Banks are numbered starting at 1.

use crate::error::Error;

pub const BANK_COUNT: u32 = 2;
pub const PAGES_PER_BANK: u32 = 128;
pub const QUAD_WORD_SIZE: usize = 16;
pub const WORD_SIZE: usize = 4;

/// A page identified by its 1-based bank number and its page index within that bank.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageLocation {
    pub bank: u32,
    pub page: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    base: u32,
    bank_size: u32,
    page_size: u32,
}

impl Geometry {
    /// STM32U5 with 2 MiB of flash: two 1 MiB banks of 128 pages with 8 KiB each.
    pub const STM32U5: Geometry = Geometry {
        base: 0x0800_0000,
        bank_size: 0x0010_0000,
        page_size: 0x2000,
    };

    /// Creates a geometry of two banks with 128 pages of `page_size` bytes each, starting at
    /// `base`.
    pub fn new(base: u32, page_size: u32) -> Result<Self, Error> {
        if page_size == 0 || !(page_size as usize).is_multiple_of(QUAD_WORD_SIZE) {
            return Err(Error::InvalidGeometry);
        }

        let bank_size = page_size
            .checked_mul(PAGES_PER_BANK)
            .ok_or(Error::InvalidGeometry)?;
        bank_size
            .checked_mul(BANK_COUNT)
            .and_then(|size| base.checked_add(size - 1))
            .ok_or(Error::InvalidGeometry)?;

        Ok(Self {
            base,
            bank_size,
            page_size,
        })
    }

    pub const fn base(&self) -> u32 {
        self.base
    }

    pub const fn bank_size(&self) -> u32 {
        self.bank_size
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Size of both banks together in bytes.
    pub const fn size(&self) -> u32 {
        self.bank_size * BANK_COUNT
    }

    pub const fn contains(&self, address: u32) -> bool {
        address >= self.base && address - self.base < self.size()
    }

    /// Returns true if `len` bytes starting at `address` lie completely inside both banks.
    pub const fn contains_range(&self, address: u32, len: usize) -> bool {
        if !self.contains(address) {
            return false;
        }
        let remaining = (self.size() - (address - self.base)) as usize;
        len <= remaining
    }

    /// Maps an absolute address onto the (bank, page) pair containing it.
    ///
    /// Addresses outside of both banks are rejected instead of being folded onto some page.
    pub fn resolve_page(&self, address: u32) -> Result<PageLocation, Error> {
        if !self.contains(address) {
            return Err(Error::AddressOutOfRange);
        }

        let relative = address - self.base;
        Ok(PageLocation {
            bank: 1 + relative / self.bank_size,
            page: (relative % self.bank_size) / self.page_size,
        })
    }

    /// Start address of a page. `bank` is clamped to `1..=2` and `page` to `0..=127`.
    pub const fn page_address(&self, bank: u32, page: u32) -> u32 {
        let bank_index = clamp(bank, 1, BANK_COUNT) - 1;
        let page = clamp(page, 0, PAGES_PER_BANK - 1);
        self.base + bank_index * self.bank_size + page * self.page_size
    }

    pub const fn is_page_aligned(&self, address: u32) -> bool {
        address >= self.base && (address - self.base).is_multiple_of(self.page_size)
    }

    /// Offset of `address` relative to the start of the medium.
    pub(crate) const fn offset(&self, address: u32) -> u32 {
        address - self.base
    }
}

const fn clamp(value: u32, min: u32, max: u32) -> u32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
