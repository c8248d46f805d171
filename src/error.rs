use thiserror::Error;

/// The medium operation whose failure left a page in an unknown state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FatalCause {
    /// The medium refused to unlock for erase/program.
    Unlock,
    /// The medium could not be locked again after erase/program.
    Lock,
    /// Programming the quad-word at `address` failed; the page is half-written.
    Program { address: u32 },
}

/// Errors that can occur while storing, serializing or committing settings. Marked as
/// non-exhaustive to allow for future additions without breaking the API. `Fatal` and `Faulted`
/// are the only variants a caller must not paper over: the medium is in an unknown state and the
/// supervisor has to decide whether to halt or reset.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Negative id, empty name or missing payload.
    #[error("invalid argument")]
    InvalidArgument,

    /// The value kind is neither "integer" nor "string".
    #[error("unknown value type")]
    UnknownType,

    /// Only the config and firmware region names can be opened.
    #[error("unknown handle")]
    UnknownHandle,

    /// The region name was already opened in this process.
    #[error("handle in use")]
    HandleInUse,

    /// The integer or string array of a store is full.
    #[error("capacity exceeded")]
    CapacityExceeded,

    /// The name/id registry of a domain is full.
    #[error("handle registry full")]
    RegistryFull,

    /// No entry with the requested id or name.
    #[error("not found")]
    NotFound,

    /// A serialized buffer is truncated, inconsistent with its declared counts or carries an
    /// unknown record type.
    #[error("malformed buffer")]
    MalformedBuffer,

    /// The destination is smaller than the serialized store.
    #[error("buffer too small")]
    BufferTooSmall,

    /// The data does not fit into a single page.
    #[error("buffer too large")]
    BufferTooLarge,

    /// The address lies outside of the two flash banks.
    #[error("address out of range")]
    AddressOutOfRange,

    /// The address or length violates the alignment required by the medium.
    #[error("misaligned address")]
    MisalignedAddress,

    /// The geometry is inconsistent in itself or with the medium.
    #[error("invalid geometry")]
    InvalidGeometry,

    /// The internal error value is returned from the provided medium on read.
    #[error("internal flash error")]
    FlashError,

    /// The page could not be erased. The medium was locked again and nothing was programmed.
    #[error("erase failed")]
    EraseFailed,

    /// The page was programmed but reading it back did not reproduce the data.
    #[error("verification failed")]
    VerificationFailed,

    /// The medium failed in a way that leaves persistent state undefined.
    #[error("fatal flash failure: {0:?}")]
    Fatal(FatalCause),

    /// A previous fatal failure latched the driver. No further medium access is performed.
    #[error("driver faulted: {0:?}")]
    Faulted(FatalCause),
}
