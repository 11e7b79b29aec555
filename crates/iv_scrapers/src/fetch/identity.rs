use std::sync::atomic::{AtomicUsize, Ordering};
use iv_core::config::DEFAULT_IDENTITIES;
use iv_core::{Error, Result};

/// Cycles through a fixed pool of client identity strings (User-Agent values).
/// Safe to share between concurrent adapters.
#[derive(Debug)]
pub struct IdentityRotator {
    identities: Vec<String>,
    cursor: AtomicUsize,
}

impl IdentityRotator {
    pub fn new(identities: Vec<String>) -> Result<Self> {
        if identities.is_empty() {
            return Err(Error::Config("identity pool must not be empty".to_string()));
        }
        Ok(Self {
            identities,
            cursor: AtomicUsize::new(0),
        })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> &str {
        let len = self.identities.len();
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or(0);
        &self.identities[index]
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl Default for IdentityRotator {
    fn default() -> Self {
        Self {
            identities: DEFAULT_IDENTITIES.iter().map(|s| s.to_string()).collect(),
            cursor: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_full_cycle_then_repeat() {
        let pool: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let rotator = IdentityRotator::new(pool.clone()).unwrap();
        let first: Vec<String> = (0..3).map(|_| rotator.next().to_string()).collect();
        let second: Vec<String> = (0..3).map(|_| rotator.next().to_string()).collect();
        assert_eq!(first, pool);
        assert_eq!(second, first);
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(IdentityRotator::new(vec![]).is_err());
    }

    #[test]
    fn test_concurrent_rotation_hands_out_every_entry() {
        let rotator = Arc::new(IdentityRotator::default());
        let handles: Vec<_> = (0..rotator.len())
            .map(|_| {
                let rotator = rotator.clone();
                std::thread::spawn(move || rotator.next().to_string())
            })
            .collect();
        let seen: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen.len(), rotator.len());
    }
}
