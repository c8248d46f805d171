//! One settings pipeline: typed store, handle registry and the flash region backing them.
//!
//! The config and firmware domains are two instances of [`Domain`] that differ only in their
//! [`RegionName`] and region address.

use crate::codec::{self, HEADER_SIZE};
use crate::driver::RegionDriver;
use crate::error::Error;
use crate::get::Get;
use crate::handles::{HandleRegistry, RegionName};
use crate::platform::Platform;
use crate::set::Set;
use crate::store::TypedStore;
use crate::MAX_BUFFER_SIZE;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// A typed value as accepted by [`Domain::write`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value<'a> {
    Integer(i32),
    String(&'a str),
}

impl<'a> Value<'a> {
    /// Builds a value from a textual kind discriminator and payload.
    ///
    /// `kind` is "integer" (or "i") or "string" (or "s"), anything else is
    /// [`Error::UnknownType`]. An integer payload that does not parse is
    /// [`Error::InvalidArgument`].
    pub fn parse(kind: &str, payload: &'a str) -> Result<Self, Error> {
        match kind {
            "integer" | "i" => payload
                .trim()
                .parse::<i32>()
                .map(Value::Integer)
                .map_err(|_| Error::InvalidArgument),
            "string" | "s" => Ok(Value::String(payload)),
            _ => Err(Error::UnknownType),
        }
    }
}

pub struct Domain {
    region: RegionName,
    address: u32,
    store: TypedStore,
    handles: HandleRegistry,
}

impl Domain {
    /// Creates an empty domain persisted at `address`. The address is checked against the
    /// geometry once the domain is used with a driver.
    pub fn new(region: RegionName, address: u32) -> Self {
        Self {
            region,
            address,
            store: TypedStore::new(),
            handles: HandleRegistry::new(),
        }
    }

    pub fn config(address: u32) -> Self {
        Self::new(RegionName::Config, address)
    }

    pub fn firmware(address: u32) -> Self {
        Self::new(RegionName::Firmware, address)
    }

    pub fn region(&self) -> RegionName {
        self.region
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn store(&self) -> &TypedStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TypedStore {
        &mut self.store
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Binds `name` to `id` and stores `value` under `id`.
    ///
    /// Fails with [`Error::InvalidArgument`] for a negative id, otherwise with the errors of
    /// [`HandleRegistry::save_handle`] or the capacity error of the store. The handle binding is
    /// kept even if the store is full.
    pub fn write(&mut self, name: &str, id: i32, value: Value<'_>) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("write: {} {} {}", self.region, name, id);

        if id < 0 {
            return Err(Error::InvalidArgument);
        }

        self.handles.save_handle(name, id)?;

        match value {
            Value::Integer(value) => self.store.upsert_int(id, value),
            Value::String(value) => self.store.upsert_string(id, value),
        }
    }

    /// [`Domain::write`] with the value given as a kind discriminator and a textual payload,
    /// see [`Value::parse`].
    ///
    /// A negative id is reported as [`Error::InvalidArgument`] before the kind is looked at.
    pub fn write_kind(
        &mut self,
        name: &str,
        id: i32,
        kind: &str,
        payload: &str,
    ) -> Result<(), Error> {
        if id < 0 {
            return Err(Error::InvalidArgument);
        }

        let value = Value::parse(kind, payload)?;
        self.write(name, id, value)
    }

    /// Stores `value` under `id` without touching the handle registry.
    pub fn set<R>(&mut self, id: i32, value: R) -> Result<(), Error>
    where
        TypedStore: Set<R>,
    {
        Set::set(&mut self.store, id, value)
    }

    /// Get a value from the store.
    ///
    /// Supported types are `i32` and `String`.
    pub fn get<R>(&self, id: i32) -> Result<R, Error>
    where
        TypedStore: Get<R>,
    {
        Get::get(&self.store, id)
    }

    pub fn save_handle(&mut self, name: &str, id: i32) -> Result<(), Error> {
        self.handles.save_handle(name, id)
    }

    pub fn get_id_from_name(&self, name: &str) -> Result<i32, Error> {
        self.handles.get_id_from_name(name)
    }

    /// Serializes the store and commits it to the domain's page.
    pub fn flush<T: Platform>(&self, driver: &mut RegionDriver<T>) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("flush: {} @{:#010x}", self.region, self.address);

        let mut buf = [0u8; MAX_BUFFER_SIZE];
        let len = codec::serialize(&self.store, &mut buf)?;
        driver.erase_program_verify(&buf[..len], self.address)
    }

    /// Reads the domain's page and merges it into the store.
    ///
    /// A page that was never written (erased header) loads as empty. Returns the number of
    /// merged records.
    pub fn load<T: Platform>(&mut self, driver: &mut RegionDriver<T>) -> Result<usize, Error> {
        #[cfg(feature = "defmt")]
        trace!("load: {} @{:#010x}", self.region, self.address);

        let mut buf = [0u8; MAX_BUFFER_SIZE];
        driver.read(self.address, &mut buf)?;

        if buf[..HEADER_SIZE].iter().all(|&byte| byte == 0xFF) {
            #[cfg(feature = "defmt")]
            warn!("load: {} region is blank", self.region);
            return Ok(0);
        }

        codec::deserialize(&buf, &mut self.store)
    }
}
