use std::env;
use std::path::Path;

use crate::core::switcher::CurrentPointer;
use crate::error::{AppError, AppResult};

/// Shell 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Cmd,
}

impl std::str::FromStr for ShellType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "bash" | "sh" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            "fish" => Ok(ShellType::Fish),
            "powershell" | "pwsh" => Ok(ShellType::PowerShell),
            "cmd" => Ok(ShellType::Cmd),
            other => Err(AppError::validation(
                "shell",
                format!("不支持的 shell: {other}"),
            )),
        }
    }
}

/// 检测当前使用的 shell
pub fn detect_shell() -> ShellType {
    if let Ok(shell) = env::var("SHELL") {
        if shell.contains("fish") {
            return ShellType::Fish;
        } else if shell.contains("zsh") {
            return ShellType::Zsh;
        } else if shell.contains("bash") {
            return ShellType::Bash;
        }
    }

    if cfg!(target_os = "windows") {
        // PowerShell 会设置 PSModulePath
        if env::var_os("PSModulePath").is_some() {
            return ShellType::PowerShell;
        }
        return ShellType::Cmd;
    }

    ShellType::Bash
}

/// 生成让当前 shell 使用固定入口的脚本：设置 JAVA_HOME 并把 `$JAVA_HOME/bin` 加到 PATH 前面
pub fn render_env(pointer: &CurrentPointer, shell: ShellType) -> String {
    let java_home = match pointer {
        CurrentPointer::Link(link) => java_home_literal(link, shell),
        CurrentPointer::File(file) => java_home_from_file(file, shell),
    };
    format!("{java_home}\n{}\n", path_command(shell))
}

/// 按 shell 类型解析，缺省时自动检测
pub fn resolve_shell(shell: Option<&str>) -> AppResult<ShellType> {
    match shell {
        Some(name) => name.parse(),
        None => Ok(detect_shell()),
    }
}

fn java_home_literal(home: &Path, shell: ShellType) -> String {
    let value = home.display().to_string();
    match shell {
        ShellType::Bash | ShellType::Zsh => format!("export JAVA_HOME={}", quote_posix(&value)),
        ShellType::Fish => format!("set -gx JAVA_HOME {}", quote_fish(&value)),
        ShellType::PowerShell => format!("$env:JAVA_HOME = {}", quote_powershell(&value)),
        ShellType::Cmd => format!("set \"JAVA_HOME={value}\""),
    }
}

fn java_home_from_file(file: &Path, shell: ShellType) -> String {
    let file = file.display().to_string();
    match shell {
        ShellType::Bash | ShellType::Zsh => {
            format!("export JAVA_HOME=\"$(cat {})\"", quote_posix(&file))
        }
        ShellType::Fish => format!("set -gx JAVA_HOME (cat {})", quote_fish(&file)),
        ShellType::PowerShell => format!(
            "$env:JAVA_HOME = (Get-Content -Raw {}).Trim()",
            quote_powershell(&file)
        ),
        ShellType::Cmd => format!("set /p JAVA_HOME=<\"{file}\""),
    }
}

fn path_command(shell: ShellType) -> &'static str {
    match shell {
        ShellType::Bash | ShellType::Zsh => "export PATH=\"$JAVA_HOME/bin:$PATH\"",
        ShellType::Fish => "set -gx PATH $JAVA_HOME/bin $PATH",
        ShellType::PowerShell => "$env:PATH = \"$env:JAVA_HOME\\bin;\" + $env:PATH",
        ShellType::Cmd => "set \"PATH=%JAVA_HOME%\\bin;%PATH%\"",
    }
}

/// 单引号包裹，内部的 `'` 写成 `'\''`
fn quote_posix(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn quote_fish(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn quote_powershell(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
