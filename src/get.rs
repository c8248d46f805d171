//! The `Get<T>` trait and its implementation in this module allows providing a single generic,
//! overloaded function `get<T>()` for all supported value types of a store.

use crate::error::Error;
use crate::store::TypedStore;
use alloc::string::{String, ToString};

pub trait Get<T> {
    fn get(&self, id: i32) -> Result<T, Error>;
}

impl<T, G: Get<T>> Get<T> for &G {
    fn get(&self, id: i32) -> Result<T, Error> {
        (*self).get(id)
    }
}

impl Get<i32> for TypedStore {
    fn get(&self, id: i32) -> Result<i32, Error> {
        self.get_int(id)
    }
}

impl Get<String> for TypedStore {
    fn get(&self, id: i32) -> Result<String, Error> {
        self.get_string(id).map(ToString::to_string)
    }
}
