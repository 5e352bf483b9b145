pub mod common;
pub mod openai;
