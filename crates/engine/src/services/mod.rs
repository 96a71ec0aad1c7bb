pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod store;
pub mod stream;
pub mod templates;
