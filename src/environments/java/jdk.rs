use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 一个已发现的 JDK 安装
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jdk {
    /// JDK 主目录（规范化路径），在注册表中唯一
    pub path: PathBuf,
    pub name: String,
    pub version: String,
    pub arch: String,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub is_current: bool,
}

impl Jdk {
    /// 显示名称，例如 "OpenJDK 21.0.2"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.version)
    }

    pub fn record(&self) -> JdkRecord {
        JdkRecord {
            path: self.path.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            arch: self.arch.clone(),
        }
    }

    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }
}

/// 持久化到注册表文件中的 JDK 记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdkRecord {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
    pub arch: String,
}

impl JdkRecord {
    pub fn into_jdk(self, is_valid: bool, is_current: bool) -> Jdk {
        Jdk {
            path: self.path,
            name: self.name,
            version: self.version,
            arch: self.arch,
            is_valid,
            is_current,
        }
    }
}
