pub mod advice;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod server;
pub mod vision;

pub use error::{Error, Result};
