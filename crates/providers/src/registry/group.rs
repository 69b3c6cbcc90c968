use std::fmt;
use std::sync::Arc;

use crate::models::ProviderKey;

/// Ordered providers serving one concept, most preferred first.
pub struct ProviderGroup<P: ?Sized> {
    entries: Vec<(ProviderKey, Arc<P>)>,
}

impl<P: ?Sized> ProviderGroup<P> {
    pub(super) fn new(entries: Vec<(ProviderKey, Arc<P>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<P>> {
        self.entries.iter().map(|(_, provider)| provider)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The preferred provider, if any is configured.
    pub fn first(&self) -> Option<&Arc<P>> {
        self.entries.first().map(|(_, provider)| provider)
    }

    pub fn keys(&self) -> Vec<ProviderKey> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    pub fn get(&self, key: ProviderKey) -> Option<&Arc<P>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, provider)| provider)
    }
}

impl<P: ?Sized> Clone for ProviderGroup<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<P: ?Sized> Default for ProviderGroup<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: ?Sized> fmt::Debug for ProviderGroup<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
