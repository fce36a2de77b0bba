//! 测试辅助：假 JDK 目录与可注入失败的协作方

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use crate::core::switcher::{CurrentPointer, Switcher};
use crate::environments::java::jdk::Jdk;
use crate::environments::java::probe::{JdkProbe, ProbeOutcome};
use crate::error::{AppError, AppResult};
use crate::infrastructure::desktop::{AboutInfo, Desktop};
use crate::infrastructure::repository::{JdkRepository, RegistryFile};
use crate::utils::PathUtils;

/// 创建一个带有可执行 `bin/java` 脚本的假 JDK，返回其主目录
#[cfg(unix)]
pub fn fake_jdk(root: &Path, dir_name: &str, version: &str) -> PathBuf {
    let script = format!(
        "#!/bin/sh\n\
         cat >&2 <<'EOF'\n\
         Property settings:\n    \
         java.runtime.name = OpenJDK Runtime Environment\n    \
         os.arch = amd64\n\
         \n\
         openjdk version \"{version}\" 2024-01-16\n\
         OpenJDK Runtime Environment (build {version})\n\
         OpenJDK 64-Bit Server VM (build {version}, mixed mode)\n\
         EOF\n\
         exit 0\n"
    );
    write_launcher(root, dir_name, &script)
}

/// 创建一个启动器执行失败的假 JDK
#[cfg(unix)]
pub fn broken_jdk(root: &Path, dir_name: &str) -> PathBuf {
    write_launcher(root, dir_name, "#!/bin/sh\necho 'Error: corrupt image' >&2\nexit 1\n")
}

#[cfg(unix)]
fn write_launcher(root: &Path, dir_name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let home = root.join(dir_name);
    let bin = home.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let launcher = bin.join(PathUtils::java_executable_name());
    fs::write(&launcher, script).unwrap();
    fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();
    home
}

/// 直接构造一个注册表条目，主目录下放一个可执行的空启动器
pub fn jdk_entry(root: &Path, dir_name: &str, version: &str) -> Jdk {
    let home = root.join(dir_name);
    let bin = home.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let launcher = bin.join(PathUtils::java_executable_name());
    fs::write(&launcher, "").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();
    }
    Jdk {
        path: PathUtils::normalize(&home),
        name: "OpenJDK".to_string(),
        version: version.to_string(),
        arch: "x86_64".to_string(),
        is_valid: true,
        is_current: false,
    }
}

/// 记录调用的切换器，可注入失败
#[derive(Default)]
pub struct RecordingSwitcher {
    state: Mutex<SwitcherState>,
}

#[derive(Default)]
struct SwitcherState {
    switched: Vec<PathBuf>,
    target: Option<PathBuf>,
    failure: Option<String>,
    clears: usize,
}

impl RecordingSwitcher {
    pub fn fail_with(&self, reason: &str) {
        self.state.lock().unwrap().failure = Some(reason.to_string());
    }

    /// 模拟宿主机上的入口在外部被修改
    pub fn point_at(&self, home: &Path) {
        self.state.lock().unwrap().target = Some(home.to_path_buf());
    }

    pub fn switched(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().switched.clone()
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }
}

impl Switcher for RecordingSwitcher {
    fn switch(&self, jdk: &Jdk) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.failure {
            return Err(AppError::switch_failed(reason.clone()));
        }
        state.switched.push(jdk.path.clone());
        state.target = Some(jdk.path.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.clears += 1;
        state.target = None;
        Ok(())
    }

    fn current_target(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().target.clone()
    }

    fn pointer(&self) -> CurrentPointer {
        CurrentPointer::Link(PathBuf::from("current"))
    }
}

/// 内存中的注册表仓储，可让后续写入失败
#[derive(Clone, Default)]
pub struct FailingRepository {
    file: Arc<Mutex<Option<RegistryFile>>>,
    failing: Arc<AtomicBool>,
}

impl FailingRepository {
    pub fn fail_saves(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl JdkRepository for FailingRepository {
    fn load(&self) -> AppResult<Option<RegistryFile>> {
        Ok(self.file.lock().unwrap().clone())
    }

    fn save(&self, file: &RegistryFile) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::io_at(
                Path::new("jdks.toml"),
                io::Error::new(io::ErrorKind::Other, "disk full"),
            ));
        }
        *self.file.lock().unwrap() = Some(file.clone());
        Ok(())
    }
}

/// 记录调用的桌面集成
#[derive(Default)]
pub struct RecordingDesktop {
    opened: Mutex<Vec<PathBuf>>,
    abouts: Mutex<Vec<AboutInfo>>,
}

impl RecordingDesktop {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }

    pub fn abouts(&self) -> Vec<AboutInfo> {
        self.abouts.lock().unwrap().clone()
    }
}

impl Desktop for RecordingDesktop {
    fn open_folder(&self, path: &Path) -> AppResult<()> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn show_about(&self, info: &AboutInfo) -> AppResult<()> {
        self.abouts.lock().unwrap().push(info.clone());
        Ok(())
    }
}

/// 在探测时阻塞，直到测试放行；放行后交给 `inner` 处理
pub struct GatedProbe {
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
    inner: Option<Arc<dyn JdkProbe>>,
}

impl GatedProbe {
    /// 返回探测器、"已进入探测"的接收端和放行用的发送端；放行后什么也找不到
    pub fn new() -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        Self::build(None)
    }

    /// 同 `new`，放行后按 `inner` 正常探测
    pub fn around(inner: Arc<dyn JdkProbe>) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        Self::build(Some(inner))
    }

    fn build(inner: Option<Arc<dyn JdkProbe>>) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let probe = Self {
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(release_rx),
            inner,
        };
        (probe, entered_rx, release_tx)
    }
}

impl JdkProbe for GatedProbe {
    fn probe(&self, dir: &Path) -> ProbeOutcome {
        match &self.inner {
            Some(inner) => inner.probe(dir),
            None => ProbeOutcome::NotAJdk,
        }
    }

    fn locate_home(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(entered) = self.entered.lock().unwrap().take() {
            let _ = entered.send(());
            let _ = self.release.lock().unwrap().recv();
        }
        self.inner.as_ref().and_then(|inner| inner.locate_home(dir))
    }
}
