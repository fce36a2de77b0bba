use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, instrument};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use crate::core::constants::patterns;
use crate::environments::java::jdk::Jdk;
use crate::utils::{FileSystemUtils, PathUtils};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// 探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found(Jdk),
    NotAJdk,
}

impl ProbeOutcome {
    pub fn into_jdk(self) -> Option<Jdk> {
        match self {
            ProbeOutcome::Found(jdk) => Some(jdk),
            ProbeOutcome::NotAJdk => None,
        }
    }
}

/// JDK 探测器抽象接口
pub trait JdkProbe: Send + Sync {
    /// 判断目录是否为 JDK 并提取其信息
    fn probe(&self, dir: &Path) -> ProbeOutcome;

    /// 按常见布局查找 JDK 主目录，不启动子进程
    fn locate_home(&self, dir: &Path) -> Option<PathBuf> {
        JdkLayout::locate(dir)
    }

    /// 启动器是否仍然存在并可执行
    fn is_valid(&self, java_home: &Path) -> bool {
        FileSystemUtils::is_executable(&PathUtils::launcher_of(java_home))
    }
}

/// 常见的 JDK 目录布局
pub struct JdkLayout;

impl JdkLayout {
    /// 在 `dir` 附近查找启动器：
    /// `<dir>/bin/java`、`<dir>/Contents/Home/bin/java`（macOS），或 `dir` 本身就是 `bin`
    pub fn locate(dir: &Path) -> Option<PathBuf> {
        let candidates = [
            dir.to_path_buf(),
            dir.join("Contents").join("Home"),
        ];
        for home in candidates {
            if PathUtils::launcher_of(&home).is_file() {
                return Some(home);
            }
        }

        if PathUtils::is_bin_dir(dir) && dir.join(PathUtils::java_executable_name()).is_file() {
            return dir.parent().map(Path::to_path_buf);
        }

        None
    }
}

/// 通过执行 `java -XshowSettings:properties -version` 识别 JDK
#[derive(Debug, Clone, Copy, Default)]
pub struct LauncherProbe;

impl JdkProbe for LauncherProbe {
    #[instrument(level = "debug", skip(self))]
    fn probe(&self, dir: &Path) -> ProbeOutcome {
        let Some(home) = self.locate_home(dir) else {
            return ProbeOutcome::NotAJdk;
        };
        let launcher = PathUtils::launcher_of(&home);
        if !FileSystemUtils::is_executable(&launcher) {
            debug!("Launcher is not executable: {}", launcher.display());
            return ProbeOutcome::NotAJdk;
        }

        let mut command = Command::new(&launcher);
        command
            .args(["-XshowSettings:properties", "-version"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = match command.output() {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to execute {}: {e}", launcher.display());
                return ProbeOutcome::NotAJdk;
            }
        };
        if !output.status.success() {
            debug!("{} exited with {}", launcher.display(), output.status);
            return ProbeOutcome::NotAJdk;
        }

        // java -version 输出到 stderr，部分发行版会输出到 stdout
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
        parse_version_output(&PathUtils::normalize(&home), &text)
    }
}

/// 解析启动器输出；任一字段缺失即视为 NotAJdk
pub fn parse_version_output(java_home: &Path, output: &str) -> ProbeOutcome {
    let properties = parse_properties(output);

    let Some(version) = parse_version(output) else {
        return ProbeOutcome::NotAJdk;
    };
    let Some(name) = parse_name(output, &properties) else {
        return ProbeOutcome::NotAJdk;
    };
    let Some(arch) = parse_arch(output, &properties) else {
        return ProbeOutcome::NotAJdk;
    };

    ProbeOutcome::Found(Jdk {
        path: java_home.to_path_buf(),
        name,
        version,
        arch,
        is_valid: true,
        is_current: false,
    })
}

fn version_regex() -> Option<&'static Regex> {
    static VERSION: OnceLock<Option<Regex>> = OnceLock::new();
    VERSION
        .get_or_init(|| Regex::new(patterns::VERSION_LINE_PATTERN).ok())
        .as_ref()
}

fn property_regex() -> Option<&'static Regex> {
    static PROPERTY: OnceLock<Option<Regex>> = OnceLock::new();
    PROPERTY
        .get_or_init(|| Regex::new(patterns::PROPERTY_LINE_PATTERN).ok())
        .as_ref()
}

fn parse_properties(output: &str) -> HashMap<String, String> {
    let Some(regex) = property_regex() else {
        return HashMap::new();
    };
    output
        .lines()
        .filter_map(|line| regex.captures(line))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

fn parse_version(output: &str) -> Option<String> {
    let regex = version_regex()?;
    output
        .lines()
        .find_map(|line| regex.captures(line).map(|caps| caps[1].to_string()))
}

fn parse_name(output: &str, properties: &HashMap<String, String>) -> Option<String> {
    // 跳过属性行（java.runtime.name = ...），只看 -version 的第二行
    let from_runtime_line = output
        .lines()
        .filter(|line| !line.contains('='))
        .find_map(|line| line.split_once("Runtime Environment"))
        .map(|(prefix, _)| prefix.trim().to_string())
        .filter(|name| !name.is_empty());
    if from_runtime_line.is_some() {
        return from_runtime_line;
    }

    properties
        .get("java.runtime.name")
        .map(|name| name.replace("Runtime Environment", "").trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| properties.get("java.vendor").cloned())
        .filter(|name| !name.is_empty())
}

fn parse_arch(output: &str, properties: &HashMap<String, String>) -> Option<String> {
    if let Some(arch) = properties.get("os.arch") {
        return Some(normalize_arch(arch));
    }
    if output.contains("64-Bit") {
        Some("64-Bit".to_string())
    } else if output.contains("32-Bit") || output.contains("Client VM") {
        Some("32-Bit".to_string())
    } else {
        None
    }
}

/// 统一架构名称
pub fn normalize_arch(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "amd64" | "x64" | "x86_64" => "x86_64".to_string(),
        "arm64" | "aarch64" => "aarch64".to_string(),
        "x86" | "i386" | "i486" | "i586" | "i686" => "x86".to_string(),
        other => other.to_string(),
    }
}
