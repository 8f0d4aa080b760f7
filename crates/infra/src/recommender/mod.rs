//! Hosted recommendation adapters.

mod edge_function;

pub use edge_function::{DEFAULT_FUNCTION, EdgeFunctionRecommender};
