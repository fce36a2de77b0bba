use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants::{env as env_keys, fs as fs_names, scan};
use crate::error::{AppError, AppResult};
use crate::utils::FileSystemUtils;

/// 切换方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchMode {
    /// `<data_dir>/current` 符号链接
    #[default]
    Symlink,
    /// `<data_dir>/current_java_home` 指针文件
    PointerFile,
}

/// 可选配置文件 `config.toml`，所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 扫描深度
    pub scan_max_depth: usize,
    pub switch_mode: SwitchMode,
    /// 覆盖符号链接位置
    pub link_path: Option<PathBuf>,
    /// 加载时是否根据 PATH 上的 java 识别当前 JDK
    pub detect_path_java: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_max_depth: scan::DEFAULT_MAX_DEPTH,
            switch_mode: SwitchMode::default(),
            link_path: None,
            detect_path_java: true,
        }
    }
}

impl AppConfig {
    /// 从数据目录加载配置，文件不存在时使用默认值
    pub fn load(paths: &AppPaths) -> AppResult<Self> {
        let path = paths.config_file();
        let Some(content) = FileSystemUtils::read_to_string_optional(&path)? else {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        };
        Self::parse(&content).map_err(|message| AppError::Config {
            message: format!("{}: {message}", path.display()),
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.scan_max_depth == 0 {
            return Err("scan_max_depth 必须大于 0".to_string());
        }
        Ok(config)
    }
}

/// 数据目录布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// 依次使用 `--data-dir`、`JDKSWITCH_HOME`、`~/.jdkswitch`
    pub fn resolve(override_dir: Option<PathBuf>) -> AppResult<Self> {
        Self::resolve_with(
            override_dir,
            env::var_os(env_keys::HOME_OVERRIDE),
            dirs::home_dir(),
        )
    }

    fn resolve_with(
        override_dir: Option<PathBuf>,
        env_dir: Option<OsString>,
        home_dir: Option<PathBuf>,
    ) -> AppResult<Self> {
        let data_dir = override_dir
            .or_else(|| env_dir.filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| home_dir.map(|home| home.join(fs_names::DEFAULT_DATA_DIR)))
            .ok_or_else(|| AppError::Config {
                message: "无法获取用户主目录".to_string(),
            })?;
        Ok(Self::new(data_dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn registry_file(&self) -> PathBuf {
        self.data_dir.join(fs_names::REGISTRY_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(fs_names::SETTINGS_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(fs_names::CONFIG_FILE)
    }

    pub fn current_link(&self) -> PathBuf {
        self.data_dir.join(fs_names::CURRENT_LINK)
    }

    pub fn pointer_file(&self) -> PathBuf {
        self.data_dir.join(fs_names::POINTER_FILE)
    }
}
