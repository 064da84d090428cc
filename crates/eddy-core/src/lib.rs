//! Core types and traits for the Eddy flow-field workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate: grid coordinates and
//! dimensions, flow vectors, agent identifiers, the [`GridOracle`]
//! trait through which solidity is queried, and the error types for
//! grid and field contracts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod id;
pub mod vector;

pub use error::{FieldError, GridError};
pub use grid::{GridDims, GridOracle, MAX_CELLS};
pub use id::{AgentId, Cell};
pub use vector::FlowVector;
