#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use nvm_settings::Geometry;
use nvm_settings::platform::{FlashLock, LockError};

pub const BASE: u32 = 0x0800_0000;
pub const PAGE_SIZE: usize = 256;
pub const PAGES_PER_BANK: usize = 128;
pub const BANK_SIZE: usize = PAGE_SIZE * PAGES_PER_BANK;
pub const FLASH_SIZE: usize = 2 * BANK_SIZE;
pub const QUAD_WORD_SIZE: usize = 16;
pub const WORD_SIZE: usize = 4;

pub fn geometry() -> Geometry {
    Geometry::new(BASE, PAGE_SIZE as u32).unwrap()
}

/// Absolute address of a page, banks counted from 1.
pub fn page_address(bank: u32, page: u32) -> u32 {
    BASE + (bank - 1) * BANK_SIZE as u32 + page * PAGE_SIZE as u32
}

pub struct Flash {
    pub buf: Vec<u8>,
    pub locked: bool,
    pub fail_after_operation: usize,
    pub fail_unlock: bool,
    pub fail_lock: bool,
    /// Offset of a byte that gets flipped after every write covering it.
    pub corrupt_offset: Option<usize>,
    pub operations: Vec<Operation>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Unlock,
    Lock,
    Read { offset: u32, len: usize },
    Write { offset: u32, len: usize },
    Erase { offset: u32, len: usize },
}

impl Default for Flash {
    fn default() -> Self {
        Self::new()
    }
}

impl Flash {
    pub fn new() -> Self {
        Self {
            buf: vec![0xffu8; FLASH_SIZE],
            locked: true,
            fail_after_operation: usize::MAX,
            fail_unlock: false,
            fail_lock: false,
            corrupt_offset: None,
            operations: Vec::new(),
        }
    }

    pub fn new_with_fault(fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
        self.fail_unlock = false;
        self.fail_lock = false;
        self.corrupt_offset = None;
    }

    /// Bytes of the page starting at the absolute address `address`.
    pub fn page(&self, address: u32) -> &[u8] {
        let offset = (address - BASE) as usize;
        &self.buf[offset..offset + PAGE_SIZE]
    }

    pub fn erases(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Erase { .. }))
            .count()
    }

    pub fn writes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .count()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }

    fn check_fault(&self) -> Result<(), FlashError> {
        if self.operations.len() >= self.fail_after_operation {
            println!("    flash: FAULT");
            return Err(FlashError);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FlashError;

impl NorFlashError for FlashError {
    fn kind(&self) -> NorFlashErrorKind {
        NorFlashErrorKind::Other
    }
}

impl ErrorType for Flash {
    type Error = FlashError;
}

impl ReadNorFlash for Flash {
    const READ_SIZE: usize = WORD_SIZE;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        assert!(offset.is_multiple_of(Self::READ_SIZE as _));
        assert!(bytes.len().is_multiple_of(Self::READ_SIZE));

        println!(
            "    flash: read:  0x{offset:05X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        self.check_fault()?;
        self.operations.push(Operation::Read {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        bytes.copy_from_slice(&self.buf[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl NorFlash for Flash {
    const WRITE_SIZE: usize = QUAD_WORD_SIZE;

    const ERASE_SIZE: usize = PAGE_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        assert!(from.is_multiple_of(Self::ERASE_SIZE as _));
        assert!(to.is_multiple_of(Self::ERASE_SIZE as _));
        assert!(!self.locked, "erase while locked");

        println!(
            "    flash: erase: 0x{from:05X} - 0x{to:05X} #{:>2}",
            self.operations.len()
        );
        self.check_fault()?;
        self.operations.push(Operation::Erase {
            offset: from,
            len: (to - from) as usize,
        });

        for addr in from..to {
            self.buf[addr as usize] = 0xff;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        assert!(offset.is_multiple_of(Self::WRITE_SIZE as _));
        assert!(bytes.len().is_multiple_of(Self::WRITE_SIZE));
        assert!(!self.locked, "write while locked");

        println!(
            "    flash: write: 0x{offset:05X}[0x{:04X}] #{:>2}",
            bytes.len(),
            self.operations.len()
        );
        self.check_fault()?;
        assert!(!bytes.is_empty());

        self.operations.push(Operation::Write {
            offset,
            len: bytes.len(),
        });

        let offset = offset as usize;
        for (i, &val) in bytes.iter().enumerate() {
            // NOR flash can only flip bits from 1 to 0
            self.buf[offset + i] &= val;
        }

        if let Some(corrupt) = self.corrupt_offset {
            if (offset..offset + bytes.len()).contains(&corrupt) {
                self.buf[corrupt] ^= 0x01;
            }
        }
        Ok(())
    }
}

impl FlashLock for Flash {
    fn unlock(&mut self) -> Result<(), LockError> {
        println!("    flash: unlock #{:>2}", self.operations.len());
        if self.fail_unlock {
            println!("    flash: FAULT");
            return Err(LockError);
        }
        self.operations.push(Operation::Unlock);
        self.locked = false;
        Ok(())
    }

    fn lock(&mut self) -> Result<(), LockError> {
        println!("    flash: lock #{:>2}", self.operations.len());
        if self.fail_lock {
            println!("    flash: FAULT");
            return Err(LockError);
        }
        self.operations.push(Operation::Lock);
        self.locked = true;
        Ok(())
    }
}
