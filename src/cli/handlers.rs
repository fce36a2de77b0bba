use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::commands::{parse_theme, Commands};
use crate::cli::output::{OutputFormat, FORMATTER};
use crate::cli::serve::serve_stdio;
use crate::core::dispatcher::CommandDispatcher;
use crate::environments::java::jdk::Jdk;
use crate::error::{AppError, AppResult};
use crate::infrastructure::shell::{render_env, resolve_shell};
use crate::utils::PathUtils;

/// 命令处理器
pub struct CommandHandler {
    dispatcher: CommandDispatcher,
    format: OutputFormat,
}

impl CommandHandler {
    pub fn new(dispatcher: CommandDispatcher, format: OutputFormat) -> Self {
        Self { dispatcher, format }
    }

    /// 处理命令；所有命令执行前先加载注册表
    pub async fn handle_command(&self, command: Commands) -> AppResult<()> {
        let jdks = self.dispatcher.load_jdks().await?;

        match command {
            Commands::List => print!("{}", FORMATTER.format_jdks(&jdks, self.format)?),
            Commands::Current => {
                let current = jdks.iter().find(|jdk| jdk.is_current);
                print!("{}", FORMATTER.format_current(current, self.format)?);
            }
            Commands::Add { dir } => {
                let spinner = self.spinner(&format!("Scanning {}", dir.display()));
                let result = self.dispatcher.add_jdks_from_dir(dir).await;
                spinner.finish_and_clear();
                print!("{}", FORMATTER.format_added(result?, self.format)?);
            }
            Commands::Remove { path } => {
                let removed = self.dispatcher.remove_jdk_by_path(path).await?;
                print!("{}", FORMATTER.format_removed(&removed, self.format)?);
            }
            Commands::Use { path } => {
                let target = find_registered(&jdks, &path)?;
                let switched = self.dispatcher.switch_to_jdk(target).await?;
                print!("{}", FORMATTER.format_switched(&switched, self.format)?);
            }
            Commands::Theme { theme } => {
                let settings = self.dispatcher.update_app_theme(parse_theme(&theme)?).await?;
                print!("{}", FORMATTER.format_settings(&settings, self.format)?);
            }
            Commands::Hint { skip } => {
                let settings = self.dispatcher.update_skip_dir_selection_hint(skip).await?;
                print!("{}", FORMATTER.format_settings(&settings, self.format)?);
            }
            Commands::Open { path } => self.dispatcher.open_folder(path).await?,
            Commands::About => {
                let info = self.dispatcher.open_about_dialog().await?;
                print!("{}", FORMATTER.format_about(&info, self.format)?);
            }
            Commands::Env { shell } => {
                let shell = resolve_shell(shell.as_deref())?;
                print!("{}", render_env(self.dispatcher.pointer(), shell));
            }
            Commands::Serve => serve_stdio(self.dispatcher.clone()).await?,
        }
        Ok(())
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if self.format == OutputFormat::Json {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

fn find_registered(jdks: &[Jdk], path: &Path) -> AppResult<Jdk> {
    let normalized = PathUtils::normalize(path);
    jdks.iter()
        .find(|jdk| jdk.is_at(path) || jdk.is_at(&normalized))
        .cloned()
        .ok_or_else(|| AppError::not_found(path))
}
