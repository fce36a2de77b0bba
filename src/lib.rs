// 核心模块
pub mod cli;
pub mod core;
pub mod environments;
pub mod error;
pub mod infrastructure;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use environments::java::{Jdk, JdkProbe, LauncherProbe, ProbeOutcome, Registry, Scanner};
pub use error::{AppError, AppResult};
// 常量模块使用命名空间导出，避免与 std 模块名冲突
pub use crate::core::constants as app_constants;
pub use crate::core::{AppUiState, CommandDispatcher, StateBroadcaster, Switcher, UiStateStream};
pub use infrastructure::{AppConfig, AppPaths, AppSettings, AppTheme, SettingsStore};
