use std::path::{Path, PathBuf};

/// 路径工具
pub struct PathUtils;

impl PathUtils {
    /// Java 启动器文件名
    pub const fn java_executable_name() -> &'static str {
        if cfg!(target_os = "windows") {
            "java.exe"
        } else {
            "java"
        }
    }

    /// JDK 主目录下的启动器路径
    pub fn launcher_of(java_home: &Path) -> PathBuf {
        java_home.join("bin").join(Self::java_executable_name())
    }

    /// 规范化路径，失败时返回原路径
    pub fn normalize(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    /// 是否为隐藏目录（以 `.` 开头）
    pub fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.') && name.len() > 1)
            .unwrap_or(false)
    }

    /// 目录名是否为 `bin`
    pub fn is_bin_dir(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.eq_ignore_ascii_case("bin"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_of() {
        let launcher = PathUtils::launcher_of(Path::new("/usr/lib/jvm/java-17"));
        assert!(launcher.starts_with("/usr/lib/jvm/java-17/bin"));
        assert_eq!(
            launcher.file_name().and_then(|n| n.to_str()),
            Some(PathUtils::java_executable_name())
        );
    }

    #[test]
    fn test_is_hidden() {
        assert!(PathUtils::is_hidden(Path::new("/home/user/.cache")));
        assert!(!PathUtils::is_hidden(Path::new("/opt/jdks")));
        assert!(!PathUtils::is_hidden(Path::new(".")));
    }

    #[test]
    fn test_is_bin_dir() {
        assert!(PathUtils::is_bin_dir(Path::new("/opt/jdk-21/bin")));
        assert!(!PathUtils::is_bin_dir(Path::new("/opt/jdk-21/lib")));
    }
}
