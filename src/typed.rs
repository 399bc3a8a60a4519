use crate::api::{self, Store as KVStore};

pub struct Store(api::KV);

pub trait DB<K, V>
where
    K: AsRef<[u8]> + for<'a> From<&'a [u8]>,
    V: AsRef<[u8]> + for<'a> From<&'a [u8]>,
{
    fn new(key_size: usize, val_size: usize) -> Self;

    fn contains(&self, key: &K) -> anyhow::Result<bool>;
    fn lookup(&self, key: &K) -> anyhow::Result<Option<V>>;
    fn remove(&mut self, key: &K) -> anyhow::Result<Option<V>>;
    fn insert(&mut self, key: &K, val: V) -> anyhow::Result<()>;

    fn min(&self) -> anyhow::Result<Option<K>>;
    fn max(&self) -> anyhow::Result<Option<K>>;
    fn above(&self, key: &K) -> anyhow::Result<Option<K>>;
    fn below(&self, key: &K) -> anyhow::Result<Option<K>>;
}

impl Store {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> DB<K, V> for Store
where
    K: AsRef<[u8]> + for<'a> From<&'a [u8]>,
    V: AsRef<[u8]> + for<'a> From<&'a [u8]>,
{
    fn new(key_size: usize, val_size: usize) -> Self {
        Self(api::KV::create(key_size, val_size))
    }

    fn contains(&self, key: &K) -> anyhow::Result<bool> {
        Ok(self.0.lookup(key.as_ref())?.is_some())
    }

    fn lookup(&self, key: &K) -> anyhow::Result<Option<V>> {
        Ok(self.0.lookup(key.as_ref())?.map(|bytes| V::from(&bytes[..])))
    }

    fn remove(&mut self, key: &K) -> anyhow::Result<Option<V>> {
        let val = self.lookup(key)?;
        self.0.remove(key.as_ref())?;
        Ok(val)
    }

    fn insert(&mut self, key: &K, val: V) -> anyhow::Result<()> {
        Ok(self.0.insert(key.as_ref(), val.as_ref())?)
    }

    fn min(&self) -> anyhow::Result<Option<K>> {
        Ok(self.0.min()?.map(|bytes| K::from(&bytes[..])))
    }

    fn max(&self) -> anyhow::Result<Option<K>> {
        Ok(self.0.max()?.map(|bytes| K::from(&bytes[..])))
    }

    fn above(&self, key: &K) -> anyhow::Result<Option<K>> {
        Ok(self.0.above(key.as_ref())?.map(|bytes| K::from(&bytes[..])))
    }

    fn below(&self, key: &K) -> anyhow::Result<Option<K>> {
        Ok(self.0.below(key.as_ref())?.map(|bytes| K::from(&bytes[..])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::Error;

    type Bin = Vec<u8>;

    fn db() -> Store {
        <Store as DB<Bin, Bin>>::new(2, 3)
    }

    #[test]
    fn test_typed_ops() -> anyhow::Result<()> {
        let mut db = db();
        let keys: Vec<Bin> = (0u16..50).rev().map(|x| x.to_be_bytes().to_vec()).collect();
        for k in keys.iter() {
            let val = vec![k[1]; 3];
            DB::<Bin, Bin>::insert(&mut db, k, val)?;
        }
        assert_eq!(db.len(), 50);

        let key: Bin = 7u16.to_be_bytes().to_vec();
        assert!(DB::<Bin, Bin>::contains(&db, &key)?);
        assert_eq!(DB::<Bin, Bin>::lookup(&db, &key)?, Some(vec![7u8; 3]));
        assert_eq!(
            DB::<Bin, Bin>::above(&db, &key)?,
            Some(8u16.to_be_bytes().to_vec())
        );
        assert_eq!(
            DB::<Bin, Bin>::below(&db, &key)?,
            Some(6u16.to_be_bytes().to_vec())
        );
        assert_eq!(DB::<Bin, Bin>::min(&db)?, Some(vec![0, 0]));
        assert_eq!(DB::<Bin, Bin>::max(&db)?, Some(vec![0, 49]));

        assert_eq!(DB::<Bin, Bin>::remove(&mut db, &key)?, Some(vec![7u8; 3]));
        assert_eq!(DB::<Bin, Bin>::remove(&mut db, &key)?, None);
        assert!(!DB::<Bin, Bin>::contains(&db, &key)?);
        assert_eq!(db.len(), 49);
        Ok(())
    }

    #[test]
    fn test_typed_stride_error() {
        let mut db = db();
        let res = DB::<Bin, Bin>::insert(&mut db, &vec![1, 2, 3], vec![0; 3]);
        let err = res.unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Stride(2, 3)));
        assert!(db.is_empty());
    }
}
