use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AppError;

/// 提供安全的 Mutex 操作，避免 unwrap()
pub struct SafeMutex<T> {
    inner: Arc<Mutex<T>>,
    name: String,
}

impl<T> SafeMutex<T> {
    pub fn new(data: T, name: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(data)),
            name: name.to_string(),
        }
    }

    /// 安全地获取锁，锁被污染时返回错误
    pub fn lock(&self) -> Result<MutexGuard<'_, T>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::lock_failed(&format!("锁定失败: {}", self.name)))
    }
}

impl<T> Clone for SafeMutex<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: self.name.clone(),
        }
    }
}

/// 安全的 JSON 序列化
pub fn safe_to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// 安全的 JSON 序列化（紧凑格式）
pub fn safe_to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(Into::into)
}
