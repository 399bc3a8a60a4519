use crate::api::error::{Error, Result};
use crate::api::tree::Tree;
use crate::api::Store;
use crate::mem::tree::{degree, BTree, BLOCK};
use crate::util::hex::hex;
use bytes::Bytes;
use log::trace;
use std::cmp::Ordering;

pub type Cmp = fn(&[u8], &[u8]) -> Ordering;

fn memcmp(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// B-tree over raw byte keys and values whose sizes are fixed at creation.
///
/// The degree is derived from the two strides and the child reference size,
/// so small elements give wide nodes. Ordering comes from the comparator the
/// tree was created with (bytewise by default).
pub struct RawTree {
    key_size: usize,
    val_size: usize,
    cmp: Cmp,
    tree: BTree<Bytes, Bytes>,
}

impl RawTree {
    pub fn create(key_size: usize, val_size: usize) -> Self {
        Self::with_cmp(key_size, val_size, memcmp)
    }

    pub fn with_cmp(key_size: usize, val_size: usize, cmp: Cmp) -> Self {
        Self::with_block(key_size, val_size, BLOCK, cmp)
    }

    pub fn with_block(key_size: usize, val_size: usize, block: usize, cmp: Cmp) -> Self {
        let t = degree(block, key_size, val_size);
        trace!(
            "raw tree: key_size={} val_size={} block={} t={}",
            key_size,
            val_size,
            block,
            t
        );
        Self {
            key_size,
            val_size,
            cmp,
            tree: BTree::with_degree(t),
        }
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn val_size(&self) -> usize {
        self.val_size
    }

    pub fn tree(&self) -> &BTree<Bytes, Bytes> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn check(&self) -> Result<()> {
        let cmp = self.cmp;
        self.tree.check_by(|a: &Bytes, b: &Bytes| cmp(a, b))
    }

    fn key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_size {
            return Err(Error::Stride(self.key_size, key.len()));
        }
        Ok(())
    }

    fn val(&self, val: &[u8]) -> Result<()> {
        if val.len() != self.val_size {
            return Err(Error::Stride(self.val_size, val.len()));
        }
        Ok(())
    }
}

impl Store for RawTree {
    fn lookup(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.key(key)?;
        let cmp = self.cmp;
        Ok(self
            .tree
            .search_by(key, |a: &[u8], b: &Bytes| cmp(a, b))
            .cloned())
    }

    fn insert(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
        self.key(key)?;
        self.val(val)?;
        trace!("insert: key='{}' val='{}'", hex(key), hex(val));
        let cmp = self.cmp;
        self.tree.insert_by(
            Bytes::copy_from_slice(key),
            Bytes::copy_from_slice(val),
            |a: &Bytes, b: &Bytes| cmp(a, b),
        );
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool> {
        self.key(key)?;
        let cmp = self.cmp;
        let removed = self
            .tree
            .remove_by(key, |a: &[u8], b: &Bytes| cmp(a, b))
            .is_some();
        trace!("remove: key='{}' found={}", hex(key), removed);
        Ok(removed)
    }

    fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn min(&self) -> Result<Option<Bytes>> {
        Ok(self.tree.first().map(|(k, _)| k.clone()))
    }

    fn max(&self) -> Result<Option<Bytes>> {
        Ok(self.tree.last().map(|(k, _)| k.clone()))
    }

    fn above(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.key(key)?;
        let cmp = self.cmp;
        Ok(self
            .tree
            .above_by(key, |a: &[u8], b: &Bytes| cmp(a, b))
            .map(|(k, _)| k.clone()))
    }

    fn below(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.key(key)?;
        let cmp = self.cmp;
        Ok(self
            .tree
            .below_by(key, |a: &[u8], b: &Bytes| cmp(a, b))
            .map(|(k, _)| k.clone()))
    }
}
