pub mod error;
pub mod model;
pub mod redis;
pub mod store;
