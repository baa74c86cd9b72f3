use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Round-robin pool of API keys shared by every call of a client.
pub struct CredentialRotation {
    keys: Vec<String>,
    cursor: AtomicUsize,
    rotations: AtomicU64,
}

impl CredentialRotation {
    /// Blank keys are dropped. Returns `None` if nothing usable remains.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Option<Self> {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return None;
        }
        Some(Self {
            keys,
            cursor: AtomicUsize::new(0),
            rotations: AtomicU64::new(0),
        })
    }

    /// Parses a comma-separated key list.
    pub fn from_csv(raw: &str) -> Option<Self> {
        Self::new(raw.split(',').map(str::to_string))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The index observed and the key at it.
    pub fn current(&self) -> (usize, &str) {
        let idx = self.cursor.load(Ordering::Acquire) % self.keys.len();
        (idx, &self.keys[idx])
    }

    /// Moves past `observed`. If another caller already rotated away from the
    /// same observation this is a no-op, so a burst of 429s on one key rotates
    /// once.
    pub fn advance_from(&self, observed: usize) -> usize {
        let next = (observed + 1) % self.keys.len();
        match self
            .cursor
            .compare_exchange(observed, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.rotations.fetch_add(1, Ordering::Relaxed);
                next
            }
            Err(actual) => actual,
        }
    }

    pub fn rotation_count(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }
}
