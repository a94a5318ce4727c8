//! Persistent header options shared by every request of a client.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::headers::options::HeaderOption;

/// Reader/writer-locked set of header options keyed by header name.
///
/// Sends take the read lock while copying options into a request; renewal
/// and reconfiguration take the write lock only for the map update.
#[derive(Debug, Default)]
pub struct HeaderRegistry {
    options: RwLock<BTreeMap<String, HeaderOption>>,
}

impl HeaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an option, replacing any option for the same header name.
    pub fn register(&self, option: HeaderOption) {
        let key = option.name().as_str().to_string();
        self.options.write().insert(key, option);
    }

    /// Remove the option for `name`, returning it if present.
    pub fn remove(&self, name: &str) -> Option<HeaderOption> {
        self.options.write().remove(&name.to_ascii_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<HeaderValue> {
        self.options
            .read()
            .get(&name.to_ascii_lowercase())
            .map(|option| option.value().clone())
    }

    /// Apply every registered option, in header-name order.
    pub fn apply(&self, headers: &mut HeaderMap) {
        let options = self.options.read();
        for option in options.values() {
            option.apply(headers);
        }
    }

    /// Copy of the current options.
    pub fn snapshot(&self) -> Vec<HeaderOption> {
        self.options.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.options.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.read().is_empty()
    }
}
