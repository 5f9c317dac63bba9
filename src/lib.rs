pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod voting;

pub use db::{Database, Store};
pub use error::{EngineError, ErrorKind, ProblemDetails};
