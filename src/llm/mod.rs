mod client;
mod types;

pub use client::{OllamaClient, TextGenerator};
pub use types::{GenerateRequest, GenerateResponse};
