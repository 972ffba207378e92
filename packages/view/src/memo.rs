/// Remembers the inputs of the last computation.
///
/// Validity is equality of the full key, never ordering: an empty memo
/// never matches, so the first computation always runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Memo<K> {
    key: Option<K>,
}

impl<K> Default for Memo<K> {
    fn default() -> Self {
        Self { key: None }
    }
}

impl<K: PartialEq> Memo<K> {
    pub fn is_current(&self, key: &K) -> bool {
        self.key.as_ref() == Some(key)
    }

    pub fn record(&mut self, key: K) {
        self.key = Some(key);
    }

    /// Record `key`, returning true when it differs from the stored one
    pub fn update(&mut self, key: K) -> bool {
        if self.is_current(&key) {
            false
        } else {
            self.key = Some(key);
            true
        }
    }
}
