//! Embedded templates and the engine that renders them

pub mod manager;
pub mod types;

pub use manager::TemplateManager;
pub use types::BindingLocation;
