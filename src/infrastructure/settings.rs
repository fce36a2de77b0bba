use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::utils::FileSystemUtils;

/// 界面主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    Light,
    Dark,
    /// 跟随系统
    Default,
    /// 尚未初始化
    #[default]
    Unknown,
}

impl AppTheme {
    /// Unknown 按 Default 处理
    pub fn effective(self) -> Self {
        match self {
            AppTheme::Unknown => AppTheme::Default,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppTheme::Light => "light",
            AppTheme::Dark => "dark",
            AppTheme::Default => "default",
            AppTheme::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for AppTheme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "light" => Ok(AppTheme::Light),
            "dark" => Ok(AppTheme::Dark),
            "default" => Ok(AppTheme::Default),
            "unknown" => Ok(AppTheme::Unknown),
            other => Err(AppError::validation(
                "theme",
                format!("不支持的主题: {other}"),
            )),
        }
    }
}

/// 用户设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: AppTheme,
    /// 跳过选择目录前的提示
    pub skip_dir_selection_hint: bool,
}

/// 部分更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<AppTheme>,
    pub skip_dir_selection_hint: Option<bool>,
}

impl SettingsPatch {
    pub fn theme(theme: AppTheme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn skip_dir_selection_hint(value: bool) -> Self {
        Self {
            skip_dir_selection_hint: Some(value),
            ..Self::default()
        }
    }

    fn apply_to(&self, settings: &AppSettings) -> AppSettings {
        AppSettings {
            theme: self.theme.unwrap_or(settings.theme),
            skip_dir_selection_hint: self
                .skip_dir_selection_hint
                .unwrap_or(settings.skip_dir_selection_hint),
        }
    }
}

/// 设置存储，每次修改立即落盘
pub struct SettingsStore {
    path: PathBuf,
    settings: AppSettings,
}

impl SettingsStore {
    /// 读取设置；文件缺失或损坏时使用默认值
    pub fn load(path: PathBuf) -> Self {
        let settings = match FileSystemUtils::read_to_string_optional(&path) {
            Ok(Some(content)) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings {}: {e}", path.display());
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!("Failed to read settings: {e}");
                AppSettings::default()
            }
        };
        Self { path, settings }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 合并并落盘，返回完整的新设置；写入失败时内存中的设置不变
    pub fn update(&mut self, patch: SettingsPatch) -> AppResult<AppSettings> {
        if patch.theme == Some(AppTheme::Unknown) {
            return Err(AppError::validation(
                "theme",
                "只能设置为 light、dark 或 default",
            ));
        }

        let next = patch.apply_to(&self.settings);
        let content = toml::to_string_pretty(&next)?;
        FileSystemUtils::write_atomic(&self.path, &content)?;

        info!(
            "Settings updated: theme={}, skip_dir_selection_hint={}",
            next.theme.as_str(),
            next.skip_dir_selection_hint
        );
        self.settings = next.clone();
        Ok(next)
    }
}
