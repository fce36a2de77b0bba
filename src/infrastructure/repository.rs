use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::environments::java::jdk::JdkRecord;
use crate::error::AppResult;
use crate::utils::FileSystemUtils;

/// 注册表文件结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    /// 当前 JDK 的主目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub jdks: Vec<JdkRecord>,
}

/// 注册表仓储抽象接口
pub trait JdkRepository: Send + Sync {
    /// 读取注册表；文件不存在时返回 `None`
    fn load(&self) -> AppResult<Option<RegistryFile>>;

    /// 完整写入注册表
    fn save(&self, file: &RegistryFile) -> AppResult<()>;
}

/// 基于 TOML 文件的注册表仓储
pub struct FileJdkRepository {
    path: PathBuf,
}

impl FileJdkRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl JdkRepository for FileJdkRepository {
    fn load(&self) -> AppResult<Option<RegistryFile>> {
        let Some(content) = FileSystemUtils::read_to_string_optional(&self.path)? else {
            debug!("Registry file not found: {}", self.path.display());
            return Ok(None);
        };
        let file: RegistryFile = toml::from_str(&content)?;
        Ok(Some(file))
    }

    fn save(&self, file: &RegistryFile) -> AppResult<()> {
        let content = toml::to_string_pretty(file)?;
        FileSystemUtils::write_atomic(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tempfile::TempDir;

    fn record(path: &str, version: &str) -> JdkRecord {
        JdkRecord {
            path: PathBuf::from(path),
            name: "OpenJDK".to_string(),
            version: version.to_string(),
            arch: "x86_64".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let repository = FileJdkRepository::new(temp.path().join("data").join("jdks.toml"));
        assert!(repository.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let repository = FileJdkRepository::new(temp.path().join("data").join("jdks.toml"));
        let file = RegistryFile {
            current: Some(PathBuf::from("/opt/jdks/jdk-21")),
            last_updated: Some(Utc::now()),
            jdks: vec![
                record("/opt/jdks/jdk-17", "17.0.9"),
                record("/opt/jdks/jdk-21", "21.0.2"),
            ],
        };

        repository.save(&file).unwrap();
        assert_eq!(repository.load().unwrap(), Some(file));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jdks.toml");
        std::fs::write(&path, "[[jdks]]\npath = 42\n").unwrap();

        let result = FileJdkRepository::new(path).load();
        assert!(matches!(result, Err(AppError::Serialization { .. })));
    }
}
