use serde::{Deserialize, Serialize};

use crate::environments::java::jdk::Jdk;
use crate::infrastructure::settings::AppSettings;

/// 前端可见的状态快照，每次发布时由注册表和设置重新计算
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUiState {
    pub settings: AppSettings,
    pub jdks: Vec<Jdk>,
}

impl AppUiState {
    pub fn new(settings: AppSettings, jdks: Vec<Jdk>) -> Self {
        Self { settings, jdks }
    }

    pub fn current(&self) -> Option<&Jdk> {
        self.jdks.iter().find(|jdk| jdk.is_current)
    }
}
