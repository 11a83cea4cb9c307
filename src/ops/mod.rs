pub mod filters;
pub mod processor;
pub mod registry;
