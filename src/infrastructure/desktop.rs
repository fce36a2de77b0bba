use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::core::constants::version;
use crate::error::{AppError, AppResult};

/// "关于"信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub repository: String,
}

impl AboutInfo {
    /// 当前程序的包信息
    pub fn current() -> Self {
        Self {
            name: version::APP_NAME.to_string(),
            description: version::DESCRIPTION.to_string(),
            version: version::VERSION.to_string(),
            repository: version::REPOSITORY.to_string(),
        }
    }
}

/// 桌面集成抽象接口
pub trait Desktop: Send + Sync {
    /// 在文件管理器中打开目录
    fn open_folder(&self, path: &Path) -> AppResult<()>;

    /// 展示"关于"信息
    fn show_about(&self, info: &AboutInfo) -> AppResult<()>;
}

/// 使用系统默认程序打开目录
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDesktop;

impl Desktop for SystemDesktop {
    fn open_folder(&self, path: &Path) -> AppResult<()> {
        debug!("Opening {}", path.display());
        open::that(path).map_err(|e| AppError::io_at(path, e))
    }

    fn show_about(&self, info: &AboutInfo) -> AppResult<()> {
        // 没有原生窗口，由调用方渲染
        debug!("About {} {}", info.name, info.version);
        Ok(())
    }
}
