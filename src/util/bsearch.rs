/// Index of the first element in `0..len` for which `pred` is false,
/// given that `pred` holds for a (possibly empty) prefix and fails after it.
pub(crate) fn partition<F: Fn(usize) -> bool>(len: usize, pred: F) -> usize {
    let mut lo = 0;
    let mut hi = len;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    assert_eq!(lo, hi);
    lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_partition_bounds() {
        let xs = [1, 3, 3, 5, 8];
        assert_eq!(partition(xs.len(), |i| xs[i] < 0), 0);
        assert_eq!(partition(xs.len(), |i| xs[i] < 3), 1);
        assert_eq!(partition(xs.len(), |i| xs[i] <= 3), 3);
        assert_eq!(partition(xs.len(), |i| xs[i] < 9), 5);
        assert_eq!(partition(0, |_| true), 0);
    }

    #[test]
    fn test_partition_matches_scan() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let mut xs = (0..rng.gen_range(0..32))
                .map(|_| rng.gen_range(0..64))
                .collect::<Vec<u32>>();
            xs.sort_unstable();
            let key = rng.gen_range(0..64);

            let scan = xs.iter().take_while(|x| **x < key).count();
            assert_eq!(partition(xs.len(), |i| xs[i] < key), scan);
        }
    }
}
