// netdiag Core - Domain Logic, Ports & Runner
// NO infrastructure dependencies: sockets, processes and files live in infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
