//! Resolution of the data item a producing unit emits.
//!
//! The emitted name of a unit is looked up on its declaring type, never on an
//! interception wrapper, and memoized per declaring type in a cache which can
//! be shared by many builders running on different threads.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::unit::{DataKey, UnitType};

static SHARED: LazyLock<EmittedKeyResolver> = LazyLock::new(EmittedKeyResolver::new);

/// Memoizing resolver for emitted data names.
///
/// Cloning the resolver yields another handle to the same cache. Inserts are
/// idempotent: two threads racing on the first lookup of a type compute the
/// same name, the first insert wins and both observe it.
#[derive(Debug, Clone, Default)]
pub struct EmittedKeyResolver {
    cache: Arc<RwLock<HashMap<UnitType, Cow<'static, str>>>>,
}

impl EmittedKeyResolver {
    /// Creates a resolver with its own, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the process-wide resolver.
    pub fn shared() -> Self {
        SHARED.clone()
    }

    /// Name of the data item emitted by `unit`, empty when the declaring type
    /// does not name it explicitly.
    pub fn name_of(&self, unit: UnitType) -> Cow<'static, str> {
        let declaring = unit.declaring();

        if let Some(name) = self.lookup(declaring) {
            return name;
        }

        let name = declaring
            .declarations()
            .emission()
            .and_then(|emission| emission.name())
            .map(|name| Cow::Owned(name.to_owned()))
            .unwrap_or(Cow::Borrowed(""));

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(declaring).or_insert(name).clone()
    }

    /// Key of the data item emitted by `unit`, `None` if the unit does not
    /// produce any data.
    pub fn key_of(&self, unit: UnitType) -> Option<DataKey> {
        let emission = unit.effective_declarations().emission()?.data_type();
        Some(DataKey::new(self.name_of(unit), emission))
    }

    /// Cached name for the declaring type of `unit`, if resolved before.
    pub fn cached(&self, unit: UnitType) -> Option<Cow<'static, str>> {
        self.lookup(unit.declaring())
    }

    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every cached name. Only meant for isolating tests.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn lookup(&self, declaring: UnitType) -> Option<Cow<'static, str>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&declaring)
            .cloned()
    }
}
