#![forbid(unsafe_code)]
//! Dependency planning for business-logic flows.
//!
//! A flow is made of units of work ("bizlogics"). Units say what has to run
//! before them in three ways: prerequisites passed on registration, a
//! prerequisite declared on the type, and data items they require, which
//! makes them depend on whichever unit emits that data. [`FlowBuilder`]
//! merges all of it into one graph, validates it and orders it into a
//! [`Flow`].
//!
//! ```rust
//! use bizflow::{Bizlogic, Declarations, FlowBuilder, FlowError};
//!
//! struct Prices;
//!
//! struct LoadPrices;
//!
//! impl Bizlogic for LoadPrices {
//!     fn declare(decl: &mut Declarations) {
//!         decl.emits_named::<Prices>("list");
//!     }
//! }
//!
//! struct Discount;
//!
//! impl Bizlogic for Discount {
//!     fn declare(decl: &mut Declarations) {
//!         decl.inject_named::<Prices>("list");
//!     }
//! }
//!
//! let mut builder = FlowBuilder::new();
//! builder.add::<Discount>();
//!
//! // nobody emits the prices yet
//! assert!(matches!(
//!     builder.build(),
//!     Err(FlowError::UnresolvedDataDependency { .. })
//! ));
//!
//! builder.add::<LoadPrices>();
//! let flow = builder.build().unwrap();
//! assert_eq!(flow.len(), 2);
//! ```

mod adapter;
mod builder;
mod collect;
mod emit;
mod error;
mod flow;
mod graph;
mod solver;
mod unit;
#[cfg(feature = "logging")]
mod utils;

pub use crate::adapter::DataAdapterRegistry;
pub use crate::builder::FlowBuilder;
pub use crate::collect::DataDependencyMap;
pub use crate::emit::EmittedKeyResolver;
pub use crate::error::*;
pub use crate::flow::{Flow, FlowPlan};
pub use crate::graph::{DependencyGraph, EdgeKind};
pub use crate::unit::{Bizlogic, DataKey, DataType, Declarations, Emission, UnitType};
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
