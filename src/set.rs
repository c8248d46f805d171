use crate::error::Error;
use crate::store::TypedStore;

pub trait Set<T> {
    fn set(&mut self, id: i32, value: T) -> Result<(), Error>;
}

impl<T, S: Set<T>> Set<T> for &mut S {
    fn set(&mut self, id: i32, value: T) -> Result<(), Error> {
        (*self).set(id, value)
    }
}

impl Set<i32> for TypedStore {
    fn set(&mut self, id: i32, value: i32) -> Result<(), Error> {
        self.upsert_int(id, value)
    }
}

impl Set<&str> for TypedStore {
    fn set(&mut self, id: i32, value: &str) -> Result<(), Error> {
        self.upsert_string(id, value)
    }
}
