use log::{debug, error, info, trace};
use std::collections::BTreeMap;
use std::time::SystemTime;

use yabt::api::Store as _;
use yabt::api::tree::Tree;
use yabt::mem::tree::BTree;
use yabt::util::{self, hex::hex};
use yabt::RawTree;

trait Storage {
    fn insert(&mut self, key: &[u8], val: &[u8]);
    fn remove(&mut self, key: &[u8]);
    fn lookup(&self, key: &[u8]) -> Option<Vec<u8>>;
    fn len(&self) -> usize;
}

struct SelfStorage(RawTree);

impl Storage for SelfStorage {
    fn insert(&mut self, key: &[u8], val: &[u8]) {
        if let Err(e) = self.0.insert(key, val) {
            error!("insert: key='{}': {}", hex(key), e);
        }
    }

    fn remove(&mut self, key: &[u8]) {
        if let Err(e) = self.0.remove(key) {
            error!("remove: key='{}': {}", hex(key), e);
        }
    }

    fn lookup(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.0.lookup(key).ok().flatten().map(|x| x.to_vec())
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

struct StdStorage(BTreeMap<Vec<u8>, Vec<u8>>);

impl Storage for StdStorage {
    fn insert(&mut self, key: &[u8], val: &[u8]) {
        self.0.insert(key.to_vec(), val.to_vec());
    }

    fn remove(&mut self, key: &[u8]) {
        self.0.remove(key);
    }

    fn lookup(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.0.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

fn rate(count: usize, millis: u128) -> u128 {
    count as u128 * 1000 / millis.max(1)
}

fn benchmark<S: Storage>(mut storage: S, count: usize) {
    let data = util::data(count, 42);

    let mut now = SystemTime::now();
    for (k, v) in data.iter() {
        trace!("insert: key='{}' val='{}'", hex(k), hex(v));
        storage.insert(k, v);
    }
    let mut millis = now.elapsed().unwrap_or_default().as_millis();
    info!("insert: {} ms (rate={} op/s)", millis, rate(count, millis));

    now = SystemTime::now();
    let mut found = Vec::with_capacity(data.len());
    for (k, _) in data.iter() {
        if let Some(r) = storage.lookup(k) {
            found.push(r);
        } else {
            error!("key='{}' not found", hex(k));
        }
    }
    millis = now.elapsed().unwrap_or_default().as_millis();
    info!("lookup: {} ms (rate={} op/s)", millis, rate(count, millis));

    let errors = data
        .iter()
        .zip(found.iter())
        .filter(|((k, v), r)| {
            if v != *r {
                debug!(
                    "key='{}': expected '{}' but got '{}'",
                    hex(k),
                    hex(v),
                    hex(r)
                );
                true
            } else {
                false
            }
        })
        .count();
    if errors > 0 {
        error!("lookup errors: {}", errors);
    }

    now = SystemTime::now();
    for (key, _) in util::shuffle(data, 42).iter() {
        storage.remove(key);
        if storage.lookup(key).is_some() {
            error!("key='{}' not removed", hex(key));
        }
    }
    millis = now.elapsed().unwrap_or_default().as_millis();
    info!("remove: {} ms (rate={} op/s)", millis, rate(count, millis));

    if storage.len() > 0 {
        error!("non-empty storage: {} entries left", storage.len());
    }
}

fn dot(count: usize, seed: u64) {
    let keys = util::shuffle((0..count as i64).collect::<Vec<_>>(), seed);
    let mut tree: BTree<i64, i64> = BTree::with_degree(2);
    for k in keys {
        tree.insert(k, k * k);
    }
    if let Err(e) = tree.check() {
        error!("{}", e);
    }
    info!(
        "dot: count={} seed={} height={} nodes={}",
        count,
        seed,
        tree.height(),
        tree.nodes()
    );
    print!("{}", tree.dot());
}

fn main() {
    env_logger::init();
    let mut it = std::env::args().skip(1);
    let target = it.next().unwrap_or_else(|| "bench".to_string());
    let count = it
        .next()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(1000);

    match target.as_str() {
        "dot" => {
            let seed = it.next().and_then(|x| x.parse::<u64>().ok()).unwrap_or(42);
            dot(count, seed);
        }
        "bench" => {
            let raw = RawTree::create(8, 8);
            info!(
                "target=self count={} degree={}",
                count,
                raw.tree().degree()
            );
            benchmark(SelfStorage(raw), count);

            info!("target=std count={}", count);
            benchmark(StdStorage(BTreeMap::new()), count);
        }
        other => {
            error!("unknown target '{}', expected 'dot' or 'bench'", other);
            std::process::exit(1);
        }
    }
}
