//! 应用程序常量定义
//!
//! 本模块包含全局使用的常量，避免魔数并提供统一的配置值。

/// 扫描相关常量
pub mod scan {
    /// 默认最大扫描深度（相对于根目录）
    pub const DEFAULT_MAX_DEPTH: usize = 4;
    /// 扫描时跳过的目录名
    pub const PRUNED_DIR_NAMES: &[&str] = &[
        "node_modules",
        "proc",
        "sys",
        "dev",
        "$Recycle.Bin",
        "System Volume Information",
        "Windows",
    ];
}

/// 文件系统相关常量
pub mod fs {
    /// 默认数据目录（位于用户主目录下）
    pub const DEFAULT_DATA_DIR: &str = ".jdkswitch";
    /// JDK 注册表文件（相对于数据目录）
    pub const REGISTRY_FILE: &str = "data/jdks.toml";
    /// 设置文件
    pub const SETTINGS_FILE: &str = "settings.toml";
    /// 可选配置文件
    pub const CONFIG_FILE: &str = "config.toml";
    /// 当前 JDK 链接名
    pub const CURRENT_LINK: &str = "current";
    /// 当前 JDK 指针文件名
    pub const POINTER_FILE: &str = "current_java_home";
}

/// 环境变量相关常量
pub mod env {
    /// 覆盖数据目录
    pub const HOME_OVERRIDE: &str = "JDKSWITCH_HOME";
    /// 日志过滤器
    pub const LOG_FILTER: &str = "JDKSWITCH_LOG";
}

/// 版本信息常量
pub mod version {
    pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
    pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");
}

/// 前端事件名
pub mod events {
    pub const UI_STATE_STREAM: &str = "ui-state-stream";
}

/// 正则表达式模式
pub mod patterns {
    /// 版本行，例如 `openjdk version "21.0.2" 2024-01-16`
    pub const VERSION_LINE_PATTERN: &str = r#"version\s+"([^"]+)""#;
    /// `-XshowSettings:properties` 输出中的属性行
    pub const PROPERTY_LINE_PATTERN: &str = r"^\s*([A-Za-z0-9_.]+)\s*=\s*(.*?)\s*$";
}
