pub mod cli;
pub mod config;
pub mod session;

pub use cli::*;
pub use config::*;
pub use session::*;
