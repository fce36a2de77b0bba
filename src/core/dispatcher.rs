use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::core::broadcaster::{StateBroadcaster, UiStateStream};
use crate::core::switcher::{create_switcher, CurrentPointer};
use crate::core::ui_state::AppUiState;
use crate::environments::java::jdk::Jdk;
use crate::environments::java::probe::{JdkProbe, LauncherProbe};
use crate::environments::java::registry::Registry;
use crate::environments::java::scanner::Scanner;
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::{AppConfig, AppPaths};
use crate::infrastructure::desktop::{AboutInfo, Desktop, SystemDesktop};
use crate::infrastructure::repository::FileJdkRepository;
use crate::infrastructure::settings::{AppSettings, AppTheme, SettingsPatch, SettingsStore};

/// 受同一把锁保护的可变状态
pub struct Core {
    pub registry: Registry,
    pub settings: SettingsStore,
}

impl Core {
    fn snapshot(&self) -> AppUiState {
        AppUiState::new(self.settings.settings().clone(), self.registry.jdks().to_vec())
    }
}

/// 前端命令入口
///
/// 修改类命令互斥执行，有命令在执行时立即返回 `Busy`；`load_jdks` 会等待。
/// 每个操作连同锁一起移交给阻塞线程池，调用方放弃等待也会执行完毕。
#[derive(Clone)]
pub struct CommandDispatcher {
    core: Arc<Mutex<Core>>,
    scanner: Arc<Scanner>,
    desktop: Arc<dyn Desktop>,
    broadcaster: Arc<StateBroadcaster>,
    pointer: CurrentPointer,
}

impl CommandDispatcher {
    pub fn new(
        registry: Registry,
        settings: SettingsStore,
        scanner: Scanner,
        desktop: Arc<dyn Desktop>,
    ) -> Self {
        let pointer = registry.switcher().pointer();
        let core = Core { registry, settings };
        let broadcaster = StateBroadcaster::new(core.snapshot());
        Self {
            core: Arc::new(Mutex::new(core)),
            scanner: Arc::new(scanner),
            desktop,
            broadcaster: Arc::new(broadcaster),
            pointer,
        }
    }

    /// 按数据目录和配置组装默认实现
    pub fn open(paths: &AppPaths, config: &AppConfig) -> Self {
        let probe: Arc<dyn JdkProbe> = Arc::new(LauncherProbe);
        let registry = Registry::new(
            Box::new(FileJdkRepository::new(paths.registry_file())),
            Arc::clone(&probe),
            create_switcher(config, paths),
            config.detect_path_java,
        );
        let settings = SettingsStore::load(paths.settings_file());
        let scanner = Scanner::new(probe, config.scan_max_depth);
        Self::new(registry, settings, scanner, Arc::new(SystemDesktop))
    }

    /// 当前 JDK 的固定入口
    pub fn pointer(&self) -> &CurrentPointer {
        &self.pointer
    }

    pub fn snapshot(&self) -> AppResult<AppUiState> {
        self.broadcaster.snapshot()
    }

    pub async fn load_jdks(&self) -> AppResult<Vec<Jdk>> {
        let guard = Arc::clone(&self.core).lock_owned().await;
        self.run(guard, |core| core.registry.load()).await
    }

    /// 扫描目录并登记新发现的 JDK，返回新增数量
    pub async fn add_jdks_from_dir(&self, dir: PathBuf) -> AppResult<usize> {
        let scanner = Arc::clone(&self.scanner);
        self.mutate(move |core| {
            let found = scanner.scan_all(&dir)?;
            let added = core.registry.add_from_scan(found)?;
            info!("Added {added} JDK(s) from {}", dir.display());
            Ok(added)
        })
        .await
    }

    pub async fn remove_jdk_by_path(&self, path: PathBuf) -> AppResult<Jdk> {
        self.mutate(move |core| core.registry.remove(&path)).await
    }

    pub async fn switch_to_jdk(&self, jdk: Jdk) -> AppResult<Jdk> {
        self.mutate(move |core| core.registry.set_current(&jdk.path))
            .await
    }

    pub async fn update_app_theme(&self, theme: AppTheme) -> AppResult<AppSettings> {
        self.mutate(move |core| core.settings.update(SettingsPatch::theme(theme)))
            .await
    }

    pub async fn update_skip_dir_selection_hint(&self, value: bool) -> AppResult<AppSettings> {
        self.mutate(move |core| {
            core.settings
                .update(SettingsPatch::skip_dir_selection_hint(value))
        })
        .await
    }

    /// 在文件管理器中打开目录，不影响状态
    pub async fn open_folder(&self, path: PathBuf) -> AppResult<()> {
        ensure_directory(&path)?;
        let desktop = Arc::clone(&self.desktop);
        tokio::task::spawn_blocking(move || desktop.open_folder(&path))
            .await
            .map_err(join_error)?
    }

    pub async fn open_about_dialog(&self) -> AppResult<AboutInfo> {
        let info = AboutInfo::current();
        self.desktop.show_about(&info)?;
        Ok(info)
    }

    /// 挂载为唯一观察者，立即收到当前快照
    pub fn listen_ui_state_stream(&self) -> AppResult<UiStateStream> {
        self.broadcaster.attach()
    }

    /// 卸下观察者，已推送的快照仍可从流中取出
    pub fn stop_ui_state_stream(&self) -> AppResult<()> {
        self.broadcaster.detach()
    }

    async fn mutate<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Core) -> AppResult<T> + Send + 'static,
    {
        let guard = Arc::clone(&self.core)
            .try_lock_owned()
            .map_err(|_| AppError::Busy)?;
        self.run(guard, op).await
    }

    /// 在阻塞线程池上执行并在成功后发布快照；锁在任务结束时才释放
    async fn run<T, F>(&self, mut guard: OwnedMutexGuard<Core>, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Core) -> AppResult<T> + Send + 'static,
    {
        let broadcaster = Arc::clone(&self.broadcaster);
        tokio::task::spawn_blocking(move || {
            let result = op(&mut *guard);
            if result.is_ok() {
                if let Err(e) = broadcaster.publish(guard.snapshot()) {
                    warn!("Failed to publish ui state: {e}");
                }
            }
            result
        })
        .await
        .map_err(join_error)?
    }
}

fn ensure_directory(path: &Path) -> AppResult<()> {
    if !path.exists() {
        return Err(AppError::validation("path", "目录不存在"));
    }
    if !path.is_dir() {
        return Err(AppError::validation("path", "目标路径不是目录"));
    }
    Ok(())
}

fn join_error(error: tokio::task::JoinError) -> AppError {
    AppError::Internal {
        message: format!("后台任务失败: {error}"),
    }
}
