use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};

/// 文件系统工具
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// 安全地创建目录
    pub fn create_dir_all(path: &Path) -> AppResult<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| AppError::io_at(path, e))?;
        }
        Ok(())
    }

    /// 读取文件内容，如果文件不存在则返回 None
    pub fn read_to_string_optional(path: &Path) -> AppResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::io_at(path, e)),
        }
    }

    /// 原子写入：先写同目录下的临时文件并 fsync，再重命名覆盖目标文件
    pub fn write_atomic(path: &Path, content: &str) -> AppResult<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::create_dir_all(parent)?;

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| AppError::io_at(parent, e))?;
        staged
            .write_all(content.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| AppError::io_at(staged.path(), e))?;
        staged
            .persist(path)
            .map_err(|e| AppError::io_at(path, e.error))?;
        Ok(())
    }

    /// 文件是否存在并可执行
    pub fn is_executable(path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o111 != 0
        }

        #[cfg(not(unix))]
        {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_and_replaces() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("file.toml");

        FileSystemUtils::write_atomic(&target, "first").unwrap();
        FileSystemUtils::write_atomic(&target, "second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        let leftovers = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_read_to_string_optional_missing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        assert!(FileSystemUtils::read_to_string_optional(&missing)
            .unwrap()
            .is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("java");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!FileSystemUtils::is_executable(&file));

        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(FileSystemUtils::is_executable(&file));
        assert!(!FileSystemUtils::is_executable(temp.path()));
    }
}
