//! Tools that let the model drive the dashboard

pub mod logs;
pub mod registry;
pub mod theme;

pub use logs::LogToolProvider;
pub use registry::create_cli_tool_registry;
pub use theme::ThemeToolProvider;
