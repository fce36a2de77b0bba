use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use walkdir::{DirEntry, FilterEntry, WalkDir};

use crate::core::constants::scan;
use crate::environments::java::jdk::Jdk;
use crate::environments::java::probe::{JdkProbe, ProbeOutcome};
use crate::error::{AppError, AppResult};
use crate::utils::PathUtils;

/// JDK 目录扫描器
pub struct Scanner {
    probe: Arc<dyn JdkProbe>,
    max_depth: usize,
}

impl Scanner {
    pub fn new(probe: Arc<dyn JdkProbe>, max_depth: usize) -> Self {
        Self { probe, max_depth }
    }

    /// 扫描根目录，返回惰性迭代器
    ///
    /// 只有根目录本身无法读取时才返回错误；单个候选目录的失败会被跳过。
    #[instrument(level = "debug", skip(self))]
    pub fn scan(&self, root: &Path) -> AppResult<ScanIter> {
        let metadata = fs::metadata(root).map_err(|e| AppError::io_at(root, e))?;
        if !metadata.is_dir() {
            return Err(AppError::io_at(
                root,
                io::Error::new(io::ErrorKind::InvalidInput, "目标路径不是目录"),
            ));
        }
        // 提前确认有读取权限
        fs::read_dir(root).map_err(|e| AppError::io_at(root, e))?;

        let walker = WalkDir::new(root)
            .follow_links(true)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(is_scannable as fn(&DirEntry) -> bool);

        Ok(ScanIter {
            walker,
            probe: Arc::clone(&self.probe),
            seen: HashSet::new(),
        })
    }

    /// 扫描并收集所有结果
    pub fn scan_all(&self, root: &Path) -> AppResult<Vec<Jdk>> {
        let jdks: Vec<Jdk> = self.scan(root)?.collect();
        info!("Found {} JDK(s) under {}", jdks.len(), root.display());
        Ok(jdks)
    }
}

/// 扫描结果迭代器；按规范化路径去重
pub struct ScanIter {
    walker: FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    probe: Arc<dyn JdkProbe>,
    seen: HashSet<PathBuf>,
}

impl Iterator for ScanIter {
    type Item = Jdk;

    fn next(&mut self) -> Option<Jdk> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let Some(home) = self.probe.locate_home(entry.path()) else {
                continue;
            };
            if !self.seen.insert(PathUtils::normalize(&home)) {
                continue;
            }
            match self.probe.probe(&home) {
                ProbeOutcome::Found(jdk) => {
                    // 已识别为 JDK 的目录不再深入（避免重复报告内置的 jre）
                    self.walker.skip_current_dir();
                    return Some(jdk);
                }
                ProbeOutcome::NotAJdk => {
                    debug!("Not a usable JDK: {}", home.display());
                }
            }
        }
    }
}

fn is_scannable(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let path = entry.path();
    if PathUtils::is_hidden(path) {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    !scan::PRUNED_DIR_NAMES
        .iter()
        .any(|pruned| name.eq_ignore_ascii_case(pruned))
}
