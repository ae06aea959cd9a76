pub mod decorators;
pub mod observability;
pub mod persistence;
pub mod translation;
