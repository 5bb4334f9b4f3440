pub mod chat;
pub mod document;
pub mod error;
pub mod mutation;
pub mod project;
pub mod session;
pub mod store;
pub mod task;
pub mod team;
pub mod types;
pub mod views;

pub use error::{LeadMateError, Result};
