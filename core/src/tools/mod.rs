//! Tool system: typed schemas, the tool trait and the registry

pub mod base;
pub mod registry;
pub mod schema;

pub use base::Tool;
pub use registry::{ToolProvider, ToolRegistry};
pub use schema::{ParameterKind, ParameterSchema, ParameterSpec, ParameterValue, ToolArguments};
