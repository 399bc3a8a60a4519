pub mod error;
pub mod tree;

use bytes::Bytes;

use crate::api::error::Result;

pub type KV = crate::mem::raw::RawTree;

/// Byte-level store with fixed-size keys and values.
pub trait Store {
    fn lookup(&self, key: &[u8]) -> Result<Option<Bytes>>;
    fn insert(&mut self, key: &[u8], val: &[u8]) -> Result<()>;
    fn remove(&mut self, key: &[u8]) -> Result<bool>;

    fn is_empty(&self) -> bool;

    /// Get lowest/smallest key stored in the tree, or none if tree is empty.
    fn min(&self) -> Result<Option<Bytes>>;

    /// Get highest/biggest key stored in the tree, or none if tree is empty.
    fn max(&self) -> Result<Option<Bytes>>;

    /// Get smallest key that is strictly greater than given one, if any.
    fn above(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Get biggest key that is strictly lesser than given one, if any.
    fn below(&self, key: &[u8]) -> Result<Option<Bytes>>;
}
