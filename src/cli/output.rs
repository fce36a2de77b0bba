use serde::Serialize;

use crate::environments::java::jdk::Jdk;
use crate::error::{safe_to_json_pretty, AppError, AppResult, ErrorBody};
use crate::infrastructure::desktop::AboutInfo;
use crate::infrastructure::settings::AppSettings;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// 输出格式化器
pub struct OutputFormatter;

impl OutputFormatter {
    /// 格式化 JDK 列表
    pub fn format_jdks(&self, jdks: &[Jdk], format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => {
                if jdks.is_empty() {
                    return Ok("No JDKs registered\n".to_string());
                }
                let mut output = String::from("Registered JDKs:\n");
                for jdk in jdks {
                    output.push_str(&self.jdk_line(jdk));
                }
                Ok(output)
            }
            OutputFormat::Json => json_line(&jdks),
        }
    }

    /// 格式化当前 JDK
    pub fn format_current(&self, current: Option<&Jdk>, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(match current {
                Some(jdk) => format!(
                    "{} ({}) {}\n",
                    jdk.display_name(),
                    jdk.arch,
                    jdk.path.display()
                ),
                None => "No current JDK\n".to_string(),
            }),
            OutputFormat::Json => json_line(&current),
        }
    }

    pub fn format_added(&self, added: usize, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!("Added {added} JDK(s)\n")),
            OutputFormat::Json => json_line(&serde_json::json!({ "added": added })),
        }
    }

    pub fn format_removed(&self, jdk: &Jdk, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "Removed {} ({})\n",
                jdk.display_name(),
                jdk.path.display()
            )),
            OutputFormat::Json => json_line(jdk),
        }
    }

    pub fn format_switched(&self, jdk: &Jdk, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "Switched to {} ({})\n",
                jdk.display_name(),
                jdk.path.display()
            )),
            OutputFormat::Json => json_line(jdk),
        }
    }

    pub fn format_settings(&self, settings: &AppSettings, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "theme = {}\nskip_dir_selection_hint = {}\n",
                settings.theme.as_str(),
                settings.skip_dir_selection_hint
            )),
            OutputFormat::Json => json_line(settings),
        }
    }

    pub fn format_about(&self, info: &AboutInfo, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "{} {}\n{}\n{}\n",
                info.name, info.version, info.description, info.repository
            )),
            OutputFormat::Json => json_line(info),
        }
    }

    /// 格式化错误信息
    pub fn format_error(&self, error: &AppError, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => format!("Error: {error}\n"),
            OutputFormat::Json => {
                let body = serde_json::json!({
                    "success": false,
                    "error": ErrorBody::from(error),
                });
                // 序列化失败时退回文本
                json_line(&body).unwrap_or_else(|_| format!("Error: {error}\n"))
            }
        }
    }

    fn jdk_line(&self, jdk: &Jdk) -> String {
        let marker = if jdk.is_current { '*' } else { ' ' };
        let status = if jdk.is_valid { "" } else { "  [invalid]" };
        format!(
            "{marker} {:<28} {:<8} {}{status}\n",
            jdk.display_name(),
            jdk.arch,
            jdk.path.display()
        )
    }
}

fn json_line<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(format!("{}\n", safe_to_json_pretty(&value)?))
}

/// 默认输出格式化器实例
pub static FORMATTER: OutputFormatter = OutputFormatter;
