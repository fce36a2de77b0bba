use std::env;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::constants::env as env_keys;

/// 日志过滤规则：`JDKSWITCH_LOG` 优先，否则按 `-v` 次数决定级别
pub fn filter_directive(verbose: u8, from_env: Option<String>) -> String {
    if let Some(directive) = from_env.filter(|d| !d.trim().is_empty()) {
        return directive;
    }
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
    .to_string()
}

/// 安装输出到 stderr 的日志订阅者；stdout 留给命令输出和 serve 协议
pub fn init_logging(verbose: u8) {
    let directive = filter_directive(verbose, env::var(env_keys::LOG_FILTER).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
