use std::collections::BTreeMap;

/// 有序字节串 map + 前缀扫描。
///
/// 键索引/值索引的 trie 槽位统一走这层：有序性保证 `iter_prefix`
/// 是一段连续 range，插删查语义与底层容器一致（byte 精确比较）。
#[derive(Clone, Debug, Default)]
pub struct PrefixMap<V> {
    inner: BTreeMap<Vec<u8>, V>,
}

impl<V> PrefixMap<V> {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        self.inner.insert(key.to_vec(), value)
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &V)> {
        self.inner.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// 共享给定前缀的所有条目（字典序）。
    pub fn iter_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = (&'a [u8], &'a V)> {
        self.inner
            .range(prefix.to_vec()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_slice(), v))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut m: PrefixMap<u32> = PrefixMap::new();
        assert!(m.insert(b"abc", 1).is_none());
        assert_eq!(m.insert(b"abc", 2), Some(1));
        assert_eq!(m.get(b"abc"), Some(&2));
        assert_eq!(m.remove(b"abc"), Some(2));
        assert!(m.is_empty());
    }

    #[test]
    fn prefix_iteration_is_contiguous_and_sorted() {
        let mut m: PrefixMap<u32> = PrefixMap::new();
        for (i, k) in ["ab", "abc", "abd", "ac", "b"].iter().enumerate() {
            m.insert(k.as_bytes(), i as u32);
        }
        let hits: Vec<&[u8]> = m.iter_prefix(b"ab").map(|(k, _)| k).collect();
        assert_eq!(hits, vec![b"ab".as_slice(), b"abc", b"abd"]);

        let all: Vec<&[u8]> = m.iter_prefix(b"").map(|(k, _)| k).collect();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn empty_prefix_hits_nothing_on_empty_map() {
        let m: PrefixMap<u32> = PrefixMap::new();
        assert_eq!(m.iter_prefix(b"x").count(), 0);
    }
}
