use std::sync::RwLock;

pub const ENTRIES_PER_BUCKET: usize = 4;

pub type Bucket<K, V> = [Option<(K, V)>; ENTRIES_PER_BUCKET];

/// A shared, fixed-size hash table used as the transposition table.
///
/// Features:
///  - Direct-mapped slots grouped into buckets, one `RwLock` per bucket, so
///    concurrent searches can read and insert without a global lock
///  - Size given in megabytes; zero megabytes yields a disabled table that
///    never stores anything
///  - Conditional replacement through `replace_if`
pub struct CacheTable<K: Eq + Copy + Into<usize>, V: Sized + Clone> {
    megabytes: usize,
    number_of_entries: usize,
    buckets: Vec<RwLock<Bucket<K, V>>>,
}

impl<K: Eq + Copy + Into<usize>, V: Sized + Clone> std::fmt::Debug for CacheTable<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTable")
            .field("megabytes", &self.megabytes)
            .field("number_of_entries", &self.number_of_entries)
            .field("bucket_count", &self.buckets.len())
            .finish()
    }
}

impl<K: Eq + Copy + Into<usize>, V: Sized + Clone> CacheTable<K, V> {
    pub fn new(megabytes: usize) -> Self {
        let bytes = megabytes * 1024 * 1024;
        let bytes_per_bucket = std::mem::size_of::<RwLock<Bucket<K, V>>>().max(1);
        let bucket_count = bytes / bytes_per_bucket;
        let buckets = (0..bucket_count).map(|_| Default::default()).collect();
        Self {
            megabytes,
            number_of_entries: bucket_count * ENTRIES_PER_BUCKET,
            buckets,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.number_of_entries > 0
    }

    pub fn megabytes(&self) -> usize {
        self.megabytes
    }

    pub fn max_entries(&self) -> usize {
        self.number_of_entries
    }

    pub fn occupied_count(&self) -> usize {
        self.buckets
            .iter()
            .filter_map(|bucket| bucket.read().ok())
            .map(|bucket| bucket.iter().filter(|x| x.is_some()).count())
            .sum()
    }

    /// (bucket_index, entry_index)
    #[inline]
    fn decompose(&self, k: &K) -> (usize, usize) {
        let index = Into::<usize>::into(*k) % self.number_of_entries;
        (index / ENTRIES_PER_BUCKET, index % ENTRIES_PER_BUCKET)
    }

    pub fn clear(&self) {
        for b in &self.buckets {
            let Ok(mut bucket) = b.write() else { continue };
            bucket.iter_mut().for_each(|r| *r = None)
        }
    }

    pub fn get(&self, k: &K) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let (bi, ei) = self.decompose(k);
        let bucket = self.buckets[bi].read().ok()?;
        match &bucket[ei] {
            Some((k1, v)) if k1 == k => Some(v.clone()),
            _ => None,
        }
    }

    pub fn set(&self, k: &K, v: V) {
        self.replace_if(k, v, |_| true);
    }

    /// Stores `v` if the slot is empty, or if `should_replace` accepts the value currently in it.
    pub fn replace_if<F: Fn(&V) -> bool>(&self, k: &K, v: V, should_replace: F) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let (bi, ei) = self.decompose(k);
        let Ok(mut bucket) = self.buckets[bi].write() else {
            return false;
        };
        let slot = &mut bucket[ei];
        match slot {
            Some((_, v0)) if !should_replace(v0) => false,
            _ => {
                *slot = Some((*k, v));
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CacheTable;

    #[test]
    fn test_get_set() {
        let table = CacheTable::<usize, u8>::new(1);
        assert_eq!(0, table.occupied_count());
        let k1 = 123usize;
        let k2 = 10usize;

        table.set(&k1, 100);
        assert_eq!(Some(100), table.get(&k1));
        assert_eq!(None, table.get(&k2));

        table.set(&k1, 40);
        assert_eq!(Some(40), table.get(&k1));
        assert_eq!(1, table.occupied_count());

        table.set(&k2, 5);
        assert_eq!(Some(5), table.get(&k2));
        assert_eq!(2, table.occupied_count());

        table.clear();
        assert_eq!(0, table.occupied_count());
    }

    #[test]
    fn test_replace_if() {
        let table = CacheTable::<usize, u8>::new(1);
        let k1 = 123usize;

        assert!(table.replace_if(&k1, 14, |_| false));
        assert!(!table.replace_if(&k1, 50, |prev| *prev >= 50));
        assert_eq!(Some(14), table.get(&k1));

        assert!(table.replace_if(&k1, 50, |prev| *prev >= 10));
        assert_eq!(Some(50), table.get(&k1));
        assert_eq!(1, table.occupied_count());
    }

    #[test]
    fn test_colliding_key_is_not_returned() {
        let table = CacheTable::<usize, u8>::new(1);
        let k1 = 7usize;
        let k2 = k1 + table.max_entries();
        table.set(&k1, 1);
        assert_eq!(None, table.get(&k2));
        table.set(&k2, 2);
        assert_eq!(None, table.get(&k1));
        assert_eq!(Some(2), table.get(&k2));
    }

    #[test]
    fn test_disabled_table() {
        let table = CacheTable::<usize, u8>::new(0);
        assert!(!table.is_enabled());
        table.set(&1, 1);
        assert_eq!(None, table.get(&1));
        assert_eq!(0, table.occupied_count());
    }
}
