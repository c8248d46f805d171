use embedded_storage::nor_flash::NorFlash;

/// A medium that can be used by the region driver: a NOR flash whose controller has to be
/// unlocked before erase/program and locked again afterwards.
///
/// Addresses passed to the [`NorFlash`] methods are offsets from the start of the medium, i.e.
/// the geometry base address maps to offset 0.
pub trait Platform: FlashLock + NorFlash {}

impl<T: FlashLock + NorFlash> Platform for T {}

/// Returned by [`FlashLock`] when the controller rejects the lock/unlock sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockError;

pub trait FlashLock {
    fn unlock(&mut self) -> Result<(), LockError>;
    fn lock(&mut self) -> Result<(), LockError>;
}

impl<T: FlashLock> FlashLock for &mut T {
    fn unlock(&mut self) -> Result<(), LockError> {
        (**self).unlock()
    }

    fn lock(&mut self) -> Result<(), LockError> {
        (**self).lock()
    }
}

pub trait AlignedOps: Platform {
    fn align_read(size: usize) -> usize {
        align_ceil(size, Self::READ_SIZE)
    }
}

#[inline(always)]
pub(crate) const fn align_ceil(size: usize, alignment: usize) -> usize {
    if alignment.is_power_of_two() {
        size.saturating_add(alignment - 1) & !(alignment - 1)
    } else {
        size.saturating_add(alignment - 1) / alignment * alignment
    }
}

impl<T: Platform> AlignedOps for T {}

#[cfg(any(
    feature = "esp32",
    feature = "esp32s2",
    feature = "esp32s3",
    feature = "esp32c2",
    feature = "esp32c3",
    feature = "esp32c6",
    feature = "esp32h2",
))]
mod chip {
    use esp_storage::FlashStorage;

    use crate::platform::{FlashLock, LockError};

    // The SPI flash of the ESP chips has no controller lock; write protection is handled by the
    // ROM routines inside every erase/write call.
    impl FlashLock for FlashStorage<'_> {
        fn unlock(&mut self) -> Result<(), LockError> {
            Ok(())
        }

        fn lock(&mut self) -> Result<(), LockError> {
            Ok(())
        }
    }
}
