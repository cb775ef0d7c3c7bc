use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::emit::EmittedKeyResolver;
use crate::error::AdapterConflictError;
use crate::unit::{DataKey, UnitType};

/// Maps every emitted data item to the single unit producing it.
#[derive(Debug, Clone, Default)]
pub struct DataAdapterRegistry {
    adapters: HashMap<DataKey, UnitType>,
}

impl DataAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `unit`. Binding a key again to the same unit, or to an
    /// interception wrapper of it, is a no-op.
    pub(crate) fn bind(
        &mut self,
        key: DataKey,
        unit: UnitType,
    ) -> Result<(), AdapterConflictError> {
        match self.adapters.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(unit);
                Ok(())
            }
            Entry::Occupied(entry) if entry.get().declaring() == unit.declaring() => Ok(()),
            Entry::Occupied(entry) => Err(AdapterConflictError {
                key: entry.key().clone(),
                existing: *entry.get(),
                conflicting: unit,
            }),
        }
    }

    /// Registers every data-producing unit among `units`.
    pub(crate) fn populate(
        &mut self,
        units: impl IntoIterator<Item = UnitType>,
        resolver: &EmittedKeyResolver,
    ) -> Result<(), AdapterConflictError> {
        for unit in units {
            if let Some(key) = resolver.key_of(unit) {
                tracing::trace!(%unit, %key, "registering data adapter");
                self.bind(key, unit)?;
            }
        }

        Ok(())
    }

    /// Unit producing the data item `key`.
    pub fn producer(&self, key: &DataKey) -> Option<UnitType> {
        self.adapters.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DataKey, UnitType)> {
        self.adapters.iter().map(|(key, unit)| (key, *unit))
    }
}
