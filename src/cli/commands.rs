use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::infrastructure::settings::AppTheme;

/// jdkswitch CLI 应用程序
#[derive(Parser)]
#[command(name = "jdkswitch")]
#[command(about = "Discover installed JDKs and switch the one resolved as current", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON 格式输出
    #[arg(long, global = true)]
    pub json: bool,

    /// 日志详细程度（-v info，-vv debug）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// 数据目录
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 顶级命令
#[derive(Subcommand)]
pub enum Commands {
    /// 列出已登记的 JDK
    List,
    /// 扫描目录并登记发现的 JDK
    Add {
        /// 扫描根目录
        dir: PathBuf,
    },
    /// 从注册表中移除 JDK（不删除安装目录）
    Remove {
        /// JDK 主目录
        path: PathBuf,
    },
    /// 切换当前 JDK
    Use {
        /// JDK 主目录
        path: PathBuf,
    },
    /// 显示当前 JDK
    Current,
    /// 设置界面主题
    Theme {
        /// light、dark 或 default
        theme: String,
    },
    /// 设置是否跳过选择目录前的提示
    Hint {
        #[arg(action = ArgAction::Set)]
        skip: bool,
    },
    /// 在文件管理器中打开目录
    Open {
        path: PathBuf,
    },
    /// 显示程序信息
    About,
    /// 输出让 shell 使用当前 JDK 的脚本
    Env {
        /// Shell 类型（bash、zsh、fish、powershell、cmd）
        #[arg(short, long)]
        shell: Option<String>,
    },
    /// 通过 stdin/stdout 提供 JSON 行协议
    Serve,
}

/// 解析主题参数，Unknown 不能由用户设置
pub fn parse_theme(value: &str) -> AppResult<AppTheme> {
    match value.parse::<AppTheme>()? {
        AppTheme::Unknown => Err(AppError::validation(
            "theme",
            "只能设置为 light、dark 或 default",
        )),
        theme => Ok(theme),
    }
}
