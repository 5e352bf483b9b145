pub mod calendly;
pub mod chat;
pub mod health;
pub mod intake;
pub mod static_files;
