pub mod config;
pub mod desktop;
pub mod repository;
pub mod settings;
pub mod shell;

pub use config::*;
pub use desktop::*;
pub use repository::*;
pub use settings::*;
pub use shell::*;
