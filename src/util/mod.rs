use rand::prelude::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

pub(crate) mod bsearch;
pub mod hex;

pub fn data(count: usize, seed: u64) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (
                rng.next_u64().to_be_bytes().to_vec(),
                rng.next_u64().to_be_bytes().to_vec(),
            )
        })
        .collect()
}

pub fn shuffle<T>(mut data: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    data.shuffle(&mut rng);
    data
}

/// Fixed permutation of `0..100`.
#[cfg(test)]
pub(crate) const SHUFFLED: [i32; 100] = [
    44, 19, 13, 39, 94, 7, 36, 75, 77, 24, 52, 49, 28, 79, 88, 26, 59, 12, 35, 33, 67, 78, 96,
    71, 14, 41, 5, 53, 83, 66, 34, 60, 45, 40, 98, 92, 27, 99, 69, 65, 74, 54, 1, 89, 61, 76,
    57, 84, 80, 97, 46, 64, 32, 29, 81, 87, 68, 42, 91, 93, 9, 2, 23, 37, 48, 58, 50, 73, 43,
    86, 72, 18, 56, 0, 38, 70, 85, 22, 63, 82, 47, 30, 55, 62, 90, 16, 3, 31, 25, 21, 20, 17,
    8, 51, 95, 15, 10, 4, 6, 11,
];
