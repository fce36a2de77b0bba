//! JSON 行协议会话
//!
//! 每行一个请求 `{"id": 1, "command": "switch_to_jdk", "args": {...}}`，
//! 每个请求对应一行响应 `{"id": 1, "ok": true, "result": ...}`。
//! 挂载观察者后，状态快照以 `{"event": "ui-state-stream", "payload": ...}` 推送。
//! 请求并发处理，stdin 结束时会话结束。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::core::broadcaster::UiStateStream;
use crate::core::constants::events;
use crate::core::dispatcher::CommandDispatcher;
use crate::core::ui_state::AppUiState;
use crate::environments::java::jdk::Jdk;
use crate::error::{safe_to_json, AppError, AppResult, ErrorBody, SafeMutex};
use crate::infrastructure::settings::AppTheme;

/// 前端可发送的命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadJdks,
    AddJdksFromDir(PathBuf),
    RemoveJdkByPath(PathBuf),
    SwitchToJdk(Jdk),
    UpdateAppTheme(AppTheme),
    UpdateSkipDirSelectionHint(bool),
    OpenFolder(PathBuf),
    OpenAboutDialog,
    ListenUiStateStream,
}

#[derive(Deserialize)]
struct RawRequest {
    id: u64,
    command: String,
    #[serde(default)]
    args: Value,
}

#[derive(Deserialize)]
struct DirArgs {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct PathArgs {
    path: PathBuf,
}

#[derive(Deserialize)]
struct JdkArgs {
    jdk: Jdk,
}

#[derive(Deserialize)]
struct ThemeArgs {
    theme: AppTheme,
}

#[derive(Deserialize)]
struct ValueArgs {
    value: bool,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Option<u64>,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl Response {
    fn from_result(id: Option<u64>, result: AppResult<Value>) -> Self {
        match result {
            Ok(value) => Self {
                id,
                ok: true,
                result: Some(value),
                error: None,
            },
            Err(e) => Self {
                id,
                ok: false,
                result: None,
                error: Some(ErrorBody::from(&e)),
            },
        }
    }
}

#[derive(Serialize)]
struct Event<'a> {
    event: &'static str,
    payload: &'a AppUiState,
}

/// 解析一行请求，返回请求 id 与命令
pub fn parse_request(line: &str) -> (Option<u64>, AppResult<Command>) {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return (None, Err(e.into())),
    };
    let id = value.get("id").and_then(Value::as_u64);
    let request: RawRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return (id, Err(AppError::validation("request", e.to_string()))),
    };
    (Some(request.id), parse_command(&request.command, request.args))
}

fn parse_command(name: &str, args: Value) -> AppResult<Command> {
    match name {
        "load_jdks" => Ok(Command::LoadJdks),
        "add_jdks_from_dir" => args_of::<DirArgs>(args).map(|a| Command::AddJdksFromDir(a.dir)),
        "remove_jdk_by_path" => {
            args_of::<PathArgs>(args).map(|a| Command::RemoveJdkByPath(a.path))
        }
        "switch_to_jdk" => args_of::<JdkArgs>(args).map(|a| Command::SwitchToJdk(a.jdk)),
        "update_app_theme" => {
            args_of::<ThemeArgs>(args).map(|a| Command::UpdateAppTheme(a.theme))
        }
        "update_skip_dir_selection_hint" => {
            args_of::<ValueArgs>(args).map(|a| Command::UpdateSkipDirSelectionHint(a.value))
        }
        "open_folder" => args_of::<PathArgs>(args).map(|a| Command::OpenFolder(a.path)),
        "open_about_dialog" => Ok(Command::OpenAboutDialog),
        "listen_ui_state_stream" => Ok(Command::ListenUiStateStream),
        other => Err(AppError::validation("command", format!("未知命令: {other}"))),
    }
}

fn args_of<T: DeserializeOwned>(args: Value) -> AppResult<T> {
    serde_json::from_value(args).map_err(|e| AppError::validation("args", e.to_string()))
}

async fn execute(dispatcher: &CommandDispatcher, command: Command) -> AppResult<Value> {
    let value = match command {
        Command::LoadJdks => serde_json::to_value(dispatcher.load_jdks().await?)?,
        Command::AddJdksFromDir(dir) => {
            serde_json::to_value(dispatcher.add_jdks_from_dir(dir).await?)?
        }
        Command::RemoveJdkByPath(path) => {
            serde_json::to_value(dispatcher.remove_jdk_by_path(path).await?)?
        }
        Command::SwitchToJdk(jdk) => serde_json::to_value(dispatcher.switch_to_jdk(jdk).await?)?,
        Command::UpdateAppTheme(theme) => {
            serde_json::to_value(dispatcher.update_app_theme(theme).await?)?
        }
        Command::UpdateSkipDirSelectionHint(value) => {
            serde_json::to_value(dispatcher.update_skip_dir_selection_hint(value).await?)?
        }
        Command::OpenFolder(path) => {
            dispatcher.open_folder(path).await?;
            Value::Null
        }
        Command::OpenAboutDialog => serde_json::to_value(dispatcher.open_about_dialog().await?)?,
        Command::ListenUiStateStream => {
            return Err(AppError::Internal {
                message: "观察者需要由会话挂载".to_string(),
            })
        }
    };
    Ok(value)
}

/// 一次会话：请求并发执行，所有输出经同一通道按行写出
struct Session {
    dispatcher: CommandDispatcher,
    out: mpsc::UnboundedSender<String>,
    forwarder: SafeMutex<Option<JoinHandle<()>>>,
}

impl Session {
    fn send<T: Serialize>(&self, message: &T) {
        match safe_to_json(message) {
            Ok(line) => {
                if self.out.send(line).is_err() {
                    debug!("Output closed");
                }
            }
            Err(e) => warn!("Failed to encode message: {e}"),
        }
    }

    async fn handle_line(&self, line: &str) {
        let (id, command) = parse_request(line);
        let command = match command {
            Ok(command) => command,
            Err(e) => return self.send(&Response::from_result(id, Err(e))),
        };

        if command == Command::ListenUiStateStream {
            match self.dispatcher.listen_ui_state_stream() {
                Ok(stream) => {
                    self.send(&Response::from_result(id, Ok(Value::Null)));
                    self.forward(stream);
                }
                Err(e) => self.send(&Response::from_result(id, Err(e))),
            }
            return;
        }

        let result = execute(&self.dispatcher, command).await;
        self.send(&Response::from_result(id, result));
    }

    /// 把状态流转发为事件行；新的观察者替换旧的转发任务
    fn forward(&self, mut stream: UiStateStream) {
        let out = self.out.clone();
        let handle = tokio::spawn(async move {
            while let Some(state) = stream.next().await {
                let event = Event {
                    event: events::UI_STATE_STREAM,
                    payload: &state,
                };
                match safe_to_json(&event) {
                    Ok(line) => {
                        if out.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to encode ui state: {e}"),
                }
            }
        });
        match self.forwarder.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(handle) {
                    previous.abort();
                }
            }
            Err(e) => warn!("{e}"),
        }
    }

    /// 卸下观察者并等待转发任务写完剩余快照
    async fn finish_forwarding(&self) {
        if let Err(e) = self.dispatcher.stop_ui_state_stream() {
            warn!("{e}");
        }
        let handle = match self.forwarder.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                warn!("{e}");
                None
            }
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Forwarder task failed: {e}");
            }
        }
    }
}

/// 从 `input` 读取请求直到 EOF，把输出行发送到 `out`
pub async fn run_session<R>(
    dispatcher: CommandDispatcher,
    input: R,
    out: mpsc::UnboundedSender<String>,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let session = std::sync::Arc::new(Session {
        dispatcher,
        out,
        forwarder: SafeMutex::new(None, "serve_forwarder"),
    });
    let mut tasks = JoinSet::new();
    let mut lines = input.lines();

    let read_result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(AppError::io_at(Path::new("<stdin>"), e)),
        };
        if line.trim().is_empty() {
            continue;
        }
        let session = std::sync::Arc::clone(&session);
        tasks.spawn(async move { session.handle_line(&line).await });
    };

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("Request task failed: {e}");
        }
    }
    // 所有请求已提交，之后不会再有快照发布
    session.finish_forwarding().await;
    read_result
}

/// 在 stdin/stdout 上运行会话
pub async fn serve_stdio(dispatcher: CommandDispatcher) -> AppResult<()> {
    let (out, mut lines) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = lines.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let result = run_session(dispatcher, BufReader::new(tokio::io::stdin()), out).await;

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(AppError::io_at(Path::new("<stdout>"), e)),
        Err(e) => {
            return Err(AppError::Internal {
                message: format!("输出任务失败: {e}"),
            })
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environments::java::probe::LauncherProbe;
    use crate::environments::java::registry::Registry;
    use crate::environments::java::scanner::Scanner;
    use crate::infrastructure::repository::FileJdkRepository;
    use crate::infrastructure::settings::SettingsStore;
    use crate::testing::{jdk_entry, RecordingDesktop, RecordingSwitcher};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dispatcher(temp: &TempDir, jdks: &[Jdk]) -> CommandDispatcher {
        let probe = Arc::new(LauncherProbe);
        let mut registry = Registry::new(
            Box::new(FileJdkRepository::new(temp.path().join("jdks.toml"))),
            probe.clone(),
            Arc::new(RecordingSwitcher::default()),
            false,
        );
        registry.add_from_scan(jdks.to_vec()).unwrap();
        CommandDispatcher::new(
            registry,
            SettingsStore::load(temp.path().join("settings.toml")),
            Scanner::new(probe, 4),
            Arc::new(RecordingDesktop::default()),
        )
    }

    async fn run_lines(dispatcher: CommandDispatcher, input: &str) -> Vec<Value> {
        let (out, mut rx) = mpsc::unbounded_channel();
        run_session(dispatcher, BufReader::new(input.as_bytes()), out)
            .await
            .unwrap();
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(serde_json::from_str(&line).unwrap());
        }
        lines
    }

    #[test]
    fn test_parse_commands() {
        let (id, command) =
            parse_request(r#"{"id": 7, "command": "add_jdks_from_dir", "args": {"dir": "/opt"}}"#);
        assert_eq!(id, Some(7));
        assert_eq!(command.unwrap(), Command::AddJdksFromDir(PathBuf::from("/opt")));

        let (_, command) = parse_request(r#"{"id": 1, "command": "load_jdks"}"#);
        assert_eq!(command.unwrap(), Command::LoadJdks);

        let (_, command) = parse_request(
            r#"{"id": 2, "command": "update_app_theme", "args": {"theme": "dark"}}"#,
        );
        assert_eq!(command.unwrap(), Command::UpdateAppTheme(AppTheme::Dark));
    }

    #[test]
    fn test_parse_errors_keep_id() {
        let (id, command) = parse_request(r#"{"id": 3, "command": "format_disk"}"#);
        assert_eq!(id, Some(3));
        assert_eq!(command.unwrap_err().kind(), "validation");

        let (id, command) = parse_request(r#"{"id": 4, "command": "remove_jdk_by_path"}"#);
        assert_eq!(id, Some(4));
        assert!(command.is_err());

        let (id, command) = parse_request("not json");
        assert_eq!(id, None);
        assert_eq!(command.unwrap_err().kind(), "serialization");
    }

    #[tokio::test]
    async fn test_session_answers_each_request() {
        let temp = TempDir::new().unwrap();
        let jdk = jdk_entry(temp.path(), "jdk-21", "21.0.2");
        // 请求并发执行，这里只放一个修改类命令
        let switch = serde_json::json!({
            "id": 2,
            "command": "switch_to_jdk",
            "args": { "jdk": jdk.clone() },
        });
        let input = format!(
            "{}\n{}\n\n{}\n",
            r#"{"id": 1, "command": "open_about_dialog"}"#,
            switch,
            r#"{"id": 3, "command": "open_folder", "args": {"path": "/nowhere/at/all"}}"#,
        );

        let lines = run_lines(dispatcher(&temp, &[jdk]), &input).await;
        assert_eq!(lines.len(), 3);
        let by_id = |id: u64| {
            lines
                .iter()
                .find(|line| line["id"] == id)
                .cloned()
                .unwrap()
        };
        assert_eq!(by_id(1)["result"]["name"], "jdkswitch");
        assert_eq!(by_id(2)["ok"], true);
        assert_eq!(by_id(2)["result"]["is_current"], true);
        assert_eq!(by_id(3)["ok"], false);
        assert_eq!(by_id(3)["error"]["kind"], "validation");
    }

    #[tokio::test]
    async fn test_unknown_command_is_answered() {
        let temp = TempDir::new().unwrap();
        let lines = run_lines(
            dispatcher(&temp, &[]),
            "{\"id\": 9, \"command\": \"format_disk\"}\n",
        )
        .await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["id"], 9);
        assert_eq!(lines[0]["error"]["kind"], "validation");
    }

    #[tokio::test]
    async fn test_listen_streams_events() {
        let temp = TempDir::new().unwrap();
        let input = concat!(
            r#"{"id": 1, "command": "listen_ui_state_stream"}"#,
            "\n",
        );

        let lines = run_lines(dispatcher(&temp, &[]), input).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["ok"], true);
        assert_eq!(lines[1]["event"], "ui-state-stream");
        assert_eq!(lines[1]["payload"]["settings"]["theme"], "unknown");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_committed_change_is_streamed_before_session_ends() {
        let input = concat!(
            r#"{"id": 1, "command": "listen_ui_state_stream"}"#,
            "\n",
            r#"{"id": 2, "command": "update_skip_dir_selection_hint", "args": {"value": true}}"#,
            "\n",
        );

        for _ in 0..50 {
            let temp = TempDir::new().unwrap();
            let lines = run_lines(dispatcher(&temp, &[]), input).await;

            let responses: Vec<&Value> = lines.iter().filter(|l| l.get("id").is_some()).collect();
            assert_eq!(responses.len(), 2);
            assert!(responses.iter().all(|r| r["ok"] == true));

            let events: Vec<&Value> = lines
                .iter()
                .filter(|l| l["event"] == "ui-state-stream")
                .collect();
            let last = events.last().expect("at least one event");
            assert_eq!(last["payload"]["settings"]["skip_dir_selection_hint"], true);
        }
    }
}
