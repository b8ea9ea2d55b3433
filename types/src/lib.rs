pub use context::Context;
pub use value::{Map, Value};

mod context;
mod value;

/// Name bound to the current element inside every `for` body
pub const ITERATION_VARIABLE: &str = "it";
