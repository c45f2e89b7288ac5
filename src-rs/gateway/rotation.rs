use std::sync::Mutex;

#[derive(Default)]
struct RotatorState {
    cached_raw: String,
    keys: Vec<String>,
    cursor: usize,
}

/// Round-robin selector over the configured API keys.
///
/// The raw key string is compared against the last-seen value on every call;
/// the list is re-split only when it actually changed, and the cursor resets
/// with it so a shrunken list can never be indexed out of range.
pub struct KeyRotator {
    state: Mutex<RotatorState>,
}

impl KeyRotator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RotatorState::default()),
        }
    }

    /// Return the next key from `raw`, or `None` when the string holds no
    /// usable keys. The lock spans only the compare/reload/select/advance
    /// sequence, never any I/O.
    pub fn next(&self, raw: &str) -> Option<String> {
        let mut state = self.state.lock().ok()?;
        if raw != state.cached_raw {
            tracing::info!("API key list changed, reloading");
            state.keys = raw
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect();
            state.cached_raw = raw.to_string();
            state.cursor = 0;
        }
        if state.keys.is_empty() {
            return None;
        }
        let key = state.keys[state.cursor].clone();
        state.cursor = (state.cursor + 1) % state.keys.len();
        Some(key)
    }
}

impl Default for KeyRotator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn rotates_in_order_and_wraps() {
        let rotator = KeyRotator::new();
        let picked: Vec<String> = (0..7).map(|_| rotator.next("a, b,c").unwrap()).collect();
        assert_eq!(picked, ["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn separator_only_string_yields_no_key() {
        let rotator = KeyRotator::new();
        assert_eq!(rotator.next(" , ,,"), None);
        assert_eq!(rotator.next(" , ,,"), None);
    }

    #[test]
    fn unchanged_raw_string_keeps_the_cursor() {
        let rotator = KeyRotator::new();
        assert_eq!(rotator.next("a,b").unwrap(), "a");
        assert_eq!(rotator.next("a,b").unwrap(), "b");
        assert_eq!(rotator.next("a,b").unwrap(), "a");
    }

    #[test]
    fn changed_raw_string_reloads_and_resets_the_cursor() {
        let rotator = KeyRotator::new();
        assert_eq!(rotator.next("a,b").unwrap(), "a");
        assert_eq!(rotator.next("a,b,c").unwrap(), "a");
        assert_eq!(rotator.next("a,b,c").unwrap(), "b");
    }

    #[test]
    fn shrinking_reload_never_indexes_out_of_range() {
        let rotator = KeyRotator::new();
        for _ in 0..5 {
            rotator.next("a,b,c").unwrap();
        }
        assert_eq!(rotator.next("x").unwrap(), "x");
        assert_eq!(rotator.next("x").unwrap(), "x");
    }

    #[test]
    fn concurrent_callers_share_the_rotation_fairly() {
        let rotator = Arc::new(KeyRotator::new());
        let threads = 8;
        let per_thread = 150;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let rotator = Arc::clone(&rotator);
                thread::spawn(move || {
                    (0..per_thread)
                        .map(|_| rotator.next("k1,k2,k3").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                *counts.entry(key).or_default() += 1;
            }
        }

        // 1200 calls over 3 keys: exactly 400 each when the advance is atomic.
        let expected = threads * per_thread / 3;
        assert_eq!(counts.len(), 3);
        for key in ["k1", "k2", "k3"] {
            assert_eq!(counts[key], expected, "uneven share for {key}");
        }
    }
}
