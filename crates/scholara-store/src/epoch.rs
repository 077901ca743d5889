//! Request epochs: lets a late response tell whether a newer request for the
//! same key has started since it was issued.
//!
//! Epochs come from one counter shared by all keys and never repeat, so a key
//! can be released once its current request finishes without reviving any
//! older token.

use std::collections::HashMap;

use crate::status::OperationKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    key: OperationKey,
    epoch: u64,
}

impl RequestToken {
    pub fn key(&self) -> &OperationKey {
        &self.key
    }
}

#[derive(Debug, Default)]
pub struct RequestEpochs {
    next: u64,
    latest: HashMap<OperationKey, u64>,
}

impl RequestEpochs {
    /// Start a request for `key`. Every earlier token for the key goes stale.
    pub fn begin(&mut self, key: OperationKey) -> RequestToken {
        self.next += 1;
        self.latest.insert(key.clone(), self.next);
        RequestToken { key, epoch: self.next }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.latest.get(&token.key) == Some(&token.epoch)
    }

    /// Release the key if `token` is its current request.
    pub fn finish(&mut self, token: &RequestToken) {
        if self.is_current(token) {
            self.latest.remove(&token.key);
        }
    }

    /// Keys with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::OperationKind;

    #[test]
    fn test_newer_request_supersedes() {
        let mut epochs = RequestEpochs::default();
        let key = OperationKey::new(OperationKind::GenerateSummary, "p1");
        let first = epochs.begin(key.clone());
        assert!(epochs.is_current(&first));
        let second = epochs.begin(key);
        assert!(!epochs.is_current(&first));
        assert!(epochs.is_current(&second));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut epochs = RequestEpochs::default();
        let a = epochs.begin(OperationKey::new(OperationKind::VerifyClaim, "c1"));
        let b = epochs.begin(OperationKey::new(OperationKind::VerifyClaim, "c2"));
        let c = epochs.begin(OperationKey::global(OperationKind::SearchPapers));
        assert!(epochs.is_current(&a) && epochs.is_current(&b) && epochs.is_current(&c));
    }

    #[test]
    fn test_finished_key_is_released() {
        let mut epochs = RequestEpochs::default();
        let key = OperationKey::new(OperationKind::GenerateSummary, "p1");
        let stale = epochs.begin(key.clone());
        let current = epochs.begin(key.clone());

        epochs.finish(&stale);
        assert_eq!(epochs.in_flight(), 1);
        epochs.finish(&current);
        assert_eq!(epochs.in_flight(), 0);

        // A fresh request after release never revives the stale token.
        let fresh = epochs.begin(key);
        assert!(epochs.is_current(&fresh));
        assert!(!epochs.is_current(&stale));
        assert!(!epochs.is_current(&current));
    }
}
