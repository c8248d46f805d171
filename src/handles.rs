//! Region handles: the process-wide table of opened regions and the per-domain name → id
//! registry.

use crate::Text;
use crate::error::Error;
use alloc::vec::Vec;
use core::str::FromStr;
#[cfg(feature = "defmt")]
use defmt::trace;
use strum::EnumCount;

/// Maximum number of name/id pairs per domain.
pub const HANDLE_CAPACITY: usize = 10;

/// The named regions that can be opened.
#[derive(
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumCount,
    strum::EnumIter,
    strum::Display,
    Debug,
    Eq,
    PartialEq,
    Copy,
    Clone,
    Hash
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionName {
    #[strum(serialize = "config region")]
    Config,
    #[strum(serialize = "firmware region")]
    Firmware,
}

impl RegionName {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Tracks which regions have been opened. Shared by all domains; an opened region stays open.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HandleTable {
    opened: [bool; RegionName::COUNT],
}

impl HandleTable {
    pub const fn new() -> Self {
        Self {
            opened: [false; RegionName::COUNT],
        }
    }

    /// Marks the region called `name` as open.
    ///
    /// Fails with [`Error::HandleInUse`] if it is open already and with [`Error::UnknownHandle`]
    /// for any name but "config region" and "firmware region". There is no close.
    pub fn open(&mut self, name: &str) -> Result<RegionName, Error> {
        #[cfg(feature = "defmt")]
        trace!("open: {}", name);

        let region = RegionName::from_str(name).map_err(|_| Error::UnknownHandle)?;
        if self.opened[region.index()] {
            return Err(Error::HandleInUse);
        }

        self.opened[region.index()] = true;
        Ok(region)
    }

    pub fn is_open(&self, region: RegionName) -> bool {
        self.opened[region.index()]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NamedHandle {
    pub name: Text,
    pub id: i32,
}

/// Ordered name → id pairs of one domain, unique by name. Names are truncated like string
/// values, lookups truncate the queried name the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleRegistry {
    handles: Vec<NamedHandle>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            handles: Vec::with_capacity(HANDLE_CAPACITY),
        }
    }

    /// Binds `name` to `id`, replacing the id of an existing binding.
    pub fn save_handle(&mut self, name: &str, id: i32) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("save_handle: {} -> {}", name, id);

        if name.is_empty() || id < 0 {
            return Err(Error::InvalidArgument);
        }

        let name = Text::from_str_truncated(name);
        if let Some(handle) = self.handles.iter_mut().find(|handle| handle.name == name) {
            handle.id = id;
            return Ok(());
        }

        if self.handles.len() >= HANDLE_CAPACITY {
            return Err(Error::RegistryFull);
        }

        self.handles.push(NamedHandle { name, id });
        Ok(())
    }

    pub fn get_id_from_name(&self, name: &str) -> Result<i32, Error> {
        let name = Text::from_str_truncated(name);
        self.handles
            .iter()
            .find(|handle| handle.name == name)
            .map(|handle| handle.id)
            .ok_or(Error::NotFound)
    }

    pub fn handles(&self) -> &[NamedHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
