use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::environments::java::jdk::Jdk;
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::{AppConfig, AppPaths, SwitchMode};
use crate::utils::{FileSystemUtils, PathUtils};

/// 当前 JDK 在宿主机上的固定入口
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentPointer {
    /// 指向 JDK 主目录的链接
    Link(PathBuf),
    /// 内容为 JDK 主目录的文本文件
    File(PathBuf),
}

/// 切换器抽象接口
///
/// 同一时刻只会有一个调用方（由注册表保证）。所有失败原因都原样返回。
pub trait Switcher: Send + Sync {
    /// 让 `jdk` 成为宿主机解析到的当前 JDK
    fn switch(&self, jdk: &Jdk) -> AppResult<()>;

    /// 移除固定入口，之后没有 JDK 被解析为当前
    fn clear(&self) -> AppResult<()>;

    /// 固定入口当前指向的 JDK 主目录
    fn current_target(&self) -> Option<PathBuf>;

    fn pointer(&self) -> CurrentPointer;
}

/// 按配置创建切换器
pub fn create_switcher(config: &AppConfig, paths: &AppPaths) -> Arc<dyn Switcher> {
    match config.switch_mode {
        SwitchMode::Symlink => {
            let link = config
                .link_path
                .clone()
                .unwrap_or_else(|| paths.current_link());
            Arc::new(SymlinkSwitcher::new(link))
        }
        SwitchMode::PointerFile => Arc::new(PointerFileSwitcher::new(paths.pointer_file())),
    }
}

fn ensure_target(jdk: &Jdk) -> AppResult<()> {
    if jdk.path.is_dir() {
        Ok(())
    } else {
        Err(AppError::switch_failed(format!(
            "目标 JDK 不存在: {}",
            jdk.path.display()
        )))
    }
}

/// 通过固定位置的符号链接切换
pub struct SymlinkSwitcher {
    link: PathBuf,
}

impl SymlinkSwitcher {
    pub fn new(link: PathBuf) -> Self {
        Self { link }
    }

    fn staged_path(&self) -> PathBuf {
        let name = self
            .link
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "current".to_string());
        self.link
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    fn link_exists(&self) -> bool {
        fs::symlink_metadata(&self.link).is_ok()
    }
}

impl Switcher for SymlinkSwitcher {
    fn switch(&self, jdk: &Jdk) -> AppResult<()> {
        ensure_target(jdk)?;

        if let Some(parent) = self.link.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::switch_failed(format!("无法创建目录 {}: {e}", parent.display()))
            })?;
        }

        let staged = self.staged_path();
        create_link(&jdk.path, &staged).map_err(|e| {
            AppError::switch_failed(format!("无法创建链接 {}: {e}", staged.display()))
        })?;

        // Windows 无法用 rename 覆盖已有的目录链接，只能先移除旧链接。
        // 从移除到重命名完成之间，固定入口不指向任何 JDK。
        #[cfg(windows)]
        if self.link_exists() {
            if let Err(e) = remove_link(&self.link) {
                let _ = remove_link(&staged);
                return Err(AppError::switch_failed(format!(
                    "无法替换链接 {}: {e}",
                    self.link.display()
                )));
            }
        }

        if let Err(e) = fs::rename(&staged, &self.link) {
            let _ = remove_link(&staged);
            return Err(AppError::switch_failed(format!(
                "无法替换链接 {}: {e}",
                self.link.display()
            )));
        }

        info!("{} -> {}", self.link.display(), jdk.path.display());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        if !self.link_exists() {
            return Ok(());
        }
        remove_link(&self.link).map_err(|e| {
            AppError::switch_failed(format!("无法移除链接 {}: {e}", self.link.display()))
        })
    }

    fn current_target(&self) -> Option<PathBuf> {
        let target = fs::read_link(&self.link).ok()?;
        let target = if target.is_relative() {
            self.link.parent()?.join(target)
        } else {
            target
        };
        debug!("Link target: {}", target.display());
        Some(PathUtils::normalize(&target))
    }

    fn pointer(&self) -> CurrentPointer {
        CurrentPointer::Link(self.link.clone())
    }
}

#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "当前平台不支持符号链接",
    ))
}

fn remove_link(link: &Path) -> io::Result<()> {
    // Windows 上的目录链接需要 remove_dir
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

/// 通过指针文件切换，文件内容为 JDK 主目录
pub struct PointerFileSwitcher {
    file: PathBuf,
}

impl PointerFileSwitcher {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

impl Switcher for PointerFileSwitcher {
    fn switch(&self, jdk: &Jdk) -> AppResult<()> {
        ensure_target(jdk)?;
        let content = format!("{}\n", jdk.path.display());
        FileSystemUtils::write_atomic(&self.file, &content)
            .map_err(|e| AppError::switch_failed(e.to_string()))?;
        info!("{} = {}", self.file.display(), jdk.path.display());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::switch_failed(format!(
                "无法移除指针文件 {}: {e}",
                self.file.display()
            ))),
        }
    }

    fn current_target(&self) -> Option<PathBuf> {
        let content = fs::read_to_string(&self.file).ok()?;
        let home = content.trim();
        if home.is_empty() {
            return None;
        }
        Some(PathUtils::normalize(Path::new(home)))
    }

    fn pointer(&self) -> CurrentPointer {
        CurrentPointer::File(self.file.clone())
    }
}
