use thiserror::Error;

use crate::unit::{DataKey, UnitType};

pub type FlowResult<T> = Result<T, FlowError>;

/// Reasons a [`FlowBuilder`](crate::FlowBuilder) refuses to produce a flow.
///
/// All of them are configuration errors, detected before any unit runs.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Every unit has at least one prerequisite, there is nowhere to start.
    #[error("could not deduce the starting step")]
    StartNotFound,

    /// Some units were ordered, but the remaining ones wait on each other.
    #[error("cyclic graphs are not supported")]
    CycleDetected {
        /// Units left unordered when the solver stalled.
        unresolved: Vec<UnitType>,
    },

    /// A unit requires a data item no registered unit produces.
    #[error("Data Adapter not resolved for {}", .key.data_type())]
    UnresolvedDataDependency { consumer: UnitType, key: DataKey },

    #[error(transparent)]
    AdapterConflict(#[from] AdapterConflictError),
}

/// Two distinct units claim to produce the same data item.
#[derive(Debug, Error)]
#[error("data '{key}' is emitted by both {existing} and {conflicting}")]
pub struct AdapterConflictError {
    pub key: DataKey,
    pub existing: UnitType,
    pub conflicting: UnitType,
}
