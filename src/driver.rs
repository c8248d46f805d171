//! Erase → program → verify of a single flash page.

use crate::error::{Error, FatalCause};
use crate::geometry::{Geometry, PageLocation, QUAD_WORD_SIZE, WORD_SIZE};
use crate::platform::{AlignedOps, Platform};
use alloc::vec;
use alloc::vec::Vec;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// Commits buffers to pages of the medium and reads them back. Owns no persistent state besides
/// the fault latch: after a [`Error::Fatal`] every further medium access fails with
/// [`Error::Faulted`].
pub struct RegionDriver<T: Platform> {
    pub(crate) hal: T,
    pub(crate) geometry: Geometry,
    pub(crate) faulted: Option<FatalCause>,
}

impl<T: Platform> RegionDriver<T> {
    /// Fails with [`Error::InvalidGeometry`] if pages are not made of whole erase sectors of the
    /// medium, a quad-word is not made of whole write units or the medium is smaller than the
    /// two banks.
    pub fn new(hal: T, geometry: Geometry) -> Result<Self, Error> {
        if !(geometry.page_size() as usize).is_multiple_of(T::ERASE_SIZE)
            || !QUAD_WORD_SIZE.is_multiple_of(T::WRITE_SIZE)
            || !WORD_SIZE.is_multiple_of(T::READ_SIZE)
            || hal.capacity() < geometry.size() as usize
        {
            return Err(Error::InvalidGeometry);
        }

        Ok(Self {
            hal,
            geometry,
            faulted: None,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The cause of the fatal failure that latched this driver, if any.
    pub fn fault(&self) -> Option<FatalCause> {
        self.faulted
    }

    pub fn into_inner(self) -> T {
        self.hal
    }

    pub fn resolve_page(&self, address: u32) -> Result<PageLocation, Error> {
        self.geometry.resolve_page(address)
    }

    /// Replaces the content of the page containing `address` with `data`.
    ///
    /// The page is erased and programmed from its start address in quad-words, regardless of
    /// where in the page `address` points. A trailing partial quad-word is padded with `0xFF`.
    /// Afterwards the page is read back and compared against `data`.
    ///
    /// * [`Error::EraseFailed`]: the page could not be erased, nothing was programmed.
    /// * [`Error::VerificationFailed`]: the page does not hold `data` after programming.
    /// * [`Error::Fatal`]: unlock, program or lock failed. The page content is undefined and the
    ///   driver refuses any further access.
    pub fn erase_program_verify(&mut self, data: &[u8], address: u32) -> Result<(), Error> {
        self.ensure_not_faulted()?;

        #[cfg(feature = "defmt")]
        trace!("erase_program_verify: @{:#010x}[{}]", address, data.len());

        #[cfg(feature = "debug-logs")]
        println!("  RegionDriver: erase_program_verify {address:#010x}[{}]", data.len());

        let location = self.geometry.resolve_page(address)?;
        if data.len() > self.geometry.page_size() as usize {
            return Err(Error::BufferTooLarge);
        }

        let page_address = self.geometry.page_address(location.bank, location.page);
        let page_offset = self.geometry.offset(page_address);

        if self.hal.unlock().is_err() {
            return Err(self.latch(FatalCause::Unlock));
        }

        if self
            .hal
            .erase(page_offset, page_offset + self.geometry.page_size())
            .is_err()
        {
            #[cfg(feature = "defmt")]
            warn!("erase failed: bank {} page {}", location.bank, location.page);

            if self.hal.lock().is_err() {
                return Err(self.latch(FatalCause::Lock));
            }
            return Err(Error::EraseFailed);
        }

        for (idx, chunk) in data.chunks(QUAD_WORD_SIZE).enumerate() {
            let offset = page_offset + (idx * QUAD_WORD_SIZE) as u32;

            let mut quad_word = [0xFFu8; QUAD_WORD_SIZE];
            quad_word[..chunk.len()].copy_from_slice(chunk);

            if self.hal.write(offset, &quad_word).is_err() {
                // best effort, the page is lost either way
                let _ = self.hal.lock();
                return Err(self.latch(FatalCause::Program {
                    address: page_address + (idx * QUAD_WORD_SIZE) as u32,
                }));
            }
        }

        if self.hal.lock().is_err() {
            return Err(self.latch(FatalCause::Lock));
        }

        self.verify(page_offset, data)
    }

    /// Fills `bytes` with the content of the medium starting at `address`.
    ///
    /// `address` and the length of `bytes` must be word aligned and the whole range must lie
    /// within the two banks.
    pub fn read(&mut self, address: u32, bytes: &mut [u8]) -> Result<(), Error> {
        self.ensure_not_faulted()?;

        #[cfg(feature = "defmt")]
        trace!("read: @{:#010x}[{}]", address, bytes.len());

        if !self.geometry.contains_range(address, bytes.len()) {
            return Err(Error::AddressOutOfRange);
        }

        let offset = self.geometry.offset(address);
        if !(offset as usize).is_multiple_of(WORD_SIZE) || !bytes.len().is_multiple_of(WORD_SIZE)
        {
            return Err(Error::MisalignedAddress);
        }

        self.hal
            .read(offset, bytes)
            .map_err(|_| Error::FlashError)
    }

    /// Reads `count` words starting at `address`, see [`RegionDriver::read`].
    pub fn read_words(&mut self, address: u32, count: usize) -> Result<Vec<u8>, Error> {
        let len = count.checked_mul(WORD_SIZE).ok_or(Error::AddressOutOfRange)?;
        if len > self.geometry.size() as usize {
            return Err(Error::AddressOutOfRange);
        }

        let mut bytes = vec![0u8; len];
        self.read(address, &mut bytes)?;
        Ok(bytes)
    }

    fn verify(&mut self, page_offset: u32, data: &[u8]) -> Result<(), Error> {
        let mut read_back = vec![0u8; T::align_read(data.len())];
        self.hal
            .read(page_offset, &mut read_back)
            .map_err(|_| Error::FlashError)?;

        if read_back[..data.len()] != *data {
            #[cfg(feature = "defmt")]
            warn!("verification failed @{:#010x}", page_offset);

            return Err(Error::VerificationFailed);
        }

        Ok(())
    }

    fn ensure_not_faulted(&self) -> Result<(), Error> {
        match self.faulted {
            Some(cause) => Err(Error::Faulted(cause)),
            None => Ok(()),
        }
    }

    fn latch(&mut self, cause: FatalCause) -> Error {
        #[cfg(feature = "defmt")]
        warn!("fatal flash failure: {}", cause);

        #[cfg(feature = "debug-logs")]
        println!("  RegionDriver: FATAL {cause:?}");

        self.faulted = Some(cause);
        Error::Fatal(cause)
    }
}
