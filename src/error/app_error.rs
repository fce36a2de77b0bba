use serde::Serialize;
use std::io;
use std::path::Path;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("未找到 JDK: {path}")]
    NotFound { path: String },

    #[error("JDK 不可用: {path} - {reason}")]
    Invalid { path: String, reason: String },

    #[error("切换 JDK 失败: {reason}")]
    SwitchFailed { reason: String },

    #[error("IO 错误: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("另一个修改操作正在进行中，请稍后重试")]
    Busy,

    #[error("配置错误: {message}")]
    Config { message: String },

    #[error("序列化错误: {message}")]
    Serialization { message: String },

    #[error("验证错误: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("线程锁定错误: {operation}")]
    LockError { operation: String },

    #[error("内部错误: {message}")]
    Internal { message: String },
}

/// 应用程序 Result 类型
pub type AppResult<T> = Result<T, AppError>;

/// 便捷的错误创建函数
impl AppError {
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound {
            path: path.display().to_string(),
        }
    }

    pub fn invalid(path: &Path, reason: &str) -> Self {
        Self::Invalid {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn switch_failed(reason: impl Into<String>) -> Self {
        Self::SwitchFailed {
            reason: reason.into(),
        }
    }

    pub fn io_at(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn lock_failed(operation: &str) -> Self {
        Self::LockError {
            operation: operation.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// 稳定的错误类别标识，供前端区分 not found / switch failed / busy
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "not_found",
            AppError::Invalid { .. } => "invalid",
            AppError::SwitchFailed { .. } => "switch_failed",
            AppError::Io { .. } => "io",
            AppError::Busy => "busy",
            AppError::Config { .. } => "config",
            AppError::Serialization { .. } => "serialization",
            AppError::Validation { .. } => "validation",
            AppError::LockError { .. } => "lock",
            AppError::Internal { .. } => "internal",
        }
    }
}

/// 发送给前端的错误结构
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl From<&AppError> for ErrorBody {
    fn from(error: &AppError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}
