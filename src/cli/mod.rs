pub mod commands;
pub mod handlers;
pub mod logging;
pub mod output;
pub mod serve;

pub use commands::*;
pub use handlers::*;
pub use output::*;
