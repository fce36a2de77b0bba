use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::switcher::Switcher;
use crate::environments::java::jdk::Jdk;
use crate::environments::java::probe::{JdkProbe, ProbeOutcome};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repository::{JdkRepository, RegistryFile};
use crate::utils::PathUtils;

/// JDK 注册表
///
/// 按插入顺序保存已知 JDK，并保证至多一个为当前、路径不重复。
/// 每次修改先构造新状态并落盘，成功后才替换内存状态。
pub struct Registry {
    repository: Box<dyn JdkRepository>,
    probe: Arc<dyn JdkProbe>,
    switcher: Arc<dyn Switcher>,
    detect_path_java: bool,
    jdks: Vec<Jdk>,
}

impl Registry {
    pub fn new(
        repository: Box<dyn JdkRepository>,
        probe: Arc<dyn JdkProbe>,
        switcher: Arc<dyn Switcher>,
        detect_path_java: bool,
    ) -> Self {
        Self {
            repository,
            probe,
            switcher,
            detect_path_java,
            jdks: Vec::new(),
        }
    }

    pub fn jdks(&self) -> &[Jdk] {
        &self.jdks
    }

    pub fn current(&self) -> Option<&Jdk> {
        self.jdks.iter().find(|jdk| jdk.is_current)
    }

    pub fn switcher(&self) -> &Arc<dyn Switcher> {
        &self.switcher
    }

    /// 读取持久化的条目并重新校验，然后与宿主机实际的当前 JDK 对齐
    pub fn load(&mut self) -> AppResult<Vec<Jdk>> {
        let file = self.repository.load()?;
        let first_run = file.is_none();
        let file = file.unwrap_or_default();

        let mut jdks: Vec<Jdk> = Vec::with_capacity(file.jdks.len());
        for record in file.jdks {
            if jdks.iter().any(|jdk| jdk.is_at(&record.path)) {
                warn!("Duplicate registry entry ignored: {}", record.path.display());
                continue;
            }
            let is_valid = self.probe.is_valid(&record.path);
            let is_current = file.current.as_deref() == Some(record.path.as_path());
            jdks.push(record.into_jdk(is_valid, is_current));
        }

        if self.reconcile_current(&mut jdks, first_run) {
            if let Err(e) = self.persist(&jdks) {
                warn!("Failed to persist reconciled registry: {e}");
            }
        }

        self.jdks = jdks;
        Ok(self.jdks.clone())
    }

    /// 合并扫描结果，已存在的路径保持不变，返回新增数量
    pub fn add_from_scan(&mut self, scanned: Vec<Jdk>) -> AppResult<usize> {
        let mut next = self.jdks.clone();
        let mut added = 0;
        for mut jdk in scanned {
            if next.iter().any(|existing| existing.is_at(&jdk.path)) {
                debug!("Already registered: {}", jdk.path.display());
                continue;
            }
            jdk.is_current = false;
            next.push(jdk);
            added += 1;
        }

        if added > 0 {
            self.persist(&next)?;
            self.jdks = next;
            info!("Registered {added} new JDK(s)");
        }
        Ok(added)
    }

    /// 移除条目；不会删除磁盘上的安装，也不会自动选择新的当前 JDK
    pub fn remove(&mut self, path: &Path) -> AppResult<Jdk> {
        let index = self
            .position(path)
            .ok_or_else(|| AppError::not_found(path))?;

        let mut next = self.jdks.clone();
        let removed = next.remove(index);
        self.persist(&next)?;
        self.jdks = next;

        info!("Removed {}", removed.path.display());
        Ok(removed)
    }

    /// 切换当前 JDK
    ///
    /// 切换器成功后才一次性翻转 `is_current`；落盘失败时尽力恢复宿主机上之前的当前 JDK。
    pub fn set_current(&mut self, path: &Path) -> AppResult<Jdk> {
        let index = self
            .position(path)
            .ok_or_else(|| AppError::not_found(path))?;
        let target = self.jdks[index].clone();
        if !self.probe.is_valid(&target.path) {
            return Err(AppError::invalid(&target.path, "启动器不存在或不可执行"));
        }

        let previous = self.current().cloned();
        self.switcher.switch(&target)?;

        let mut next = self.jdks.clone();
        for (i, jdk) in next.iter_mut().enumerate() {
            jdk.is_current = i == index;
        }
        next[index].is_valid = true;

        if let Err(e) = self.persist(&next) {
            let restored = match &previous {
                Some(previous) => self.switcher.switch(previous),
                None => self.switcher.clear(),
            };
            if let Err(restore_error) = restored {
                warn!("Failed to restore previous JDK: {restore_error}");
            }
            return Err(e);
        }

        self.jdks = next;
        info!("Switched to {}", target.path.display());
        Ok(self.jdks[index].clone())
    }

    fn position(&self, path: &Path) -> Option<usize> {
        let normalized = PathUtils::normalize(path);
        self.jdks
            .iter()
            .position(|jdk| jdk.is_at(path) || jdk.is_at(&normalized))
    }

    fn persist(&self, jdks: &[Jdk]) -> AppResult<()> {
        let file = RegistryFile {
            current: jdks
                .iter()
                .find(|jdk| jdk.is_current)
                .map(|jdk| jdk.path.clone()),
            last_updated: Some(Utc::now()),
            jdks: jdks.iter().map(Jdk::record).collect(),
        };
        self.repository.save(&file)
    }

    /// 宿主机当前解析到的 JDK 主目录
    fn host_current(&self) -> Option<PathBuf> {
        if let Some(target) = self.switcher.current_target() {
            return Some(target);
        }
        if !self.detect_path_java {
            return None;
        }
        let launcher = which::which(PathUtils::java_executable_name()).ok()?;
        let launcher = PathUtils::normalize(&launcher);
        // <home>/bin/java
        launcher.parent()?.parent().map(Path::to_path_buf)
    }

    /// 返回是否修改了 `jdks`
    fn reconcile_current(&self, jdks: &mut Vec<Jdk>, first_run: bool) -> bool {
        let Some(host) = self.host_current() else {
            return false;
        };
        let host = PathUtils::normalize(&host);

        let index = match jdks.iter().position(|jdk| jdk.is_at(&host)) {
            Some(index) => index,
            None if first_run => match self.probe.probe(&host) {
                ProbeOutcome::Found(mut jdk) => match jdks.iter().position(|e| e.is_at(&jdk.path)) {
                    Some(index) => index,
                    None => {
                        info!("Importing current JDK {}", jdk.path.display());
                        jdk.is_current = false;
                        jdks.push(jdk);
                        jdks.len() - 1
                    }
                },
                ProbeOutcome::NotAJdk => {
                    debug!("Host java is not a usable JDK: {}", host.display());
                    return false;
                }
            },
            None => {
                debug!("Host JDK is not registered: {}", host.display());
                return false;
            }
        };

        let already = jdks
            .iter()
            .enumerate()
            .all(|(i, jdk)| jdk.is_current == (i == index));
        if already {
            return false;
        }
        for (i, jdk) in jdks.iter_mut().enumerate() {
            jdk.is_current = i == index;
        }
        true
    }
}
