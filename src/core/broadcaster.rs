use tokio::sync::mpsc;
use tracing::debug;

use crate::core::ui_state::AppUiState;
use crate::error::{AppResult, SafeMutex};

struct BroadcastState {
    snapshot: AppUiState,
    observer: Option<mpsc::UnboundedSender<AppUiState>>,
}

/// 保存最近一次发布的快照，并推送给唯一的观察者
///
/// 新的观察者会替换旧的，旧的流随之结束。观察者断开不影响状态。
pub struct StateBroadcaster {
    state: SafeMutex<BroadcastState>,
}

impl StateBroadcaster {
    pub fn new(initial: AppUiState) -> Self {
        Self {
            state: SafeMutex::new(
                BroadcastState {
                    snapshot: initial,
                    observer: None,
                },
                "state_broadcaster",
            ),
        }
    }

    pub fn snapshot(&self) -> AppResult<AppUiState> {
        Ok(self.state.lock()?.snapshot.clone())
    }

    /// 挂载观察者并立即推送当前快照
    pub fn attach(&self) -> AppResult<UiStateStream> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock()?;
        // 接收端就在这里，发送不会失败
        let _ = sender.send(state.snapshot.clone());
        if state.observer.replace(sender).is_some() {
            debug!("Replaced previous ui state observer");
        }
        Ok(UiStateStream { receiver })
    }

    /// 保存并推送新快照
    pub fn publish(&self, snapshot: AppUiState) -> AppResult<()> {
        let mut state = self.state.lock()?;
        state.snapshot = snapshot;
        if let Some(observer) = &state.observer {
            if observer.send(state.snapshot.clone()).is_err() {
                debug!("Ui state observer detached");
                state.observer = None;
            }
        }
        Ok(())
    }

    /// 卸下当前观察者；流在取完已推送的快照后结束
    pub fn detach(&self) -> AppResult<()> {
        if self.state.lock()?.observer.take().is_some() {
            debug!("Detached ui state observer");
        }
        Ok(())
    }
}

/// 状态流；被新的观察者替换后结束
pub struct UiStateStream {
    receiver: mpsc::UnboundedReceiver<AppUiState>,
}

impl UiStateStream {
    pub async fn next(&mut self) -> Option<AppUiState> {
        self.receiver.recv().await
    }

    /// 不等待，取出一条已到达的快照
    pub fn try_next(&mut self) -> Option<AppUiState> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::settings::AppTheme;

    fn state_with_theme(theme: AppTheme) -> AppUiState {
        let mut state = AppUiState::default();
        state.settings.theme = theme;
        state
    }

    #[tokio::test]
    async fn test_attach_receives_latest_snapshot() {
        let broadcaster = StateBroadcaster::new(AppUiState::default());
        broadcaster.publish(state_with_theme(AppTheme::Dark)).unwrap();

        let mut stream = broadcaster.attach().unwrap();
        assert_eq!(stream.next().await.unwrap().settings.theme, AppTheme::Dark);

        broadcaster.publish(state_with_theme(AppTheme::Light)).unwrap();
        assert_eq!(stream.next().await.unwrap().settings.theme, AppTheme::Light);
        assert!(stream.try_next().is_none());
    }

    #[tokio::test]
    async fn test_new_observer_replaces_old() {
        let broadcaster = StateBroadcaster::new(AppUiState::default());
        let mut first = broadcaster.attach().unwrap();
        let mut second = broadcaster.attach().unwrap();

        assert!(first.next().await.is_some());
        assert!(first.next().await.is_none());

        broadcaster.publish(state_with_theme(AppTheme::Dark)).unwrap();
        assert!(second.next().await.is_some());
        assert_eq!(second.next().await.unwrap().settings.theme, AppTheme::Dark);
    }

    #[tokio::test]
    async fn test_dropped_observer_keeps_state() {
        let broadcaster = StateBroadcaster::new(AppUiState::default());
        drop(broadcaster.attach().unwrap());

        broadcaster.publish(state_with_theme(AppTheme::Light)).unwrap();
        assert_eq!(
            broadcaster.snapshot().unwrap().settings.theme,
            AppTheme::Light
        );

        let mut next = broadcaster.attach().unwrap();
        assert_eq!(next.next().await.unwrap().settings.theme, AppTheme::Light);
    }

    #[tokio::test]
    async fn test_detach_drains_then_ends() {
        let broadcaster = StateBroadcaster::new(AppUiState::default());
        let mut stream = broadcaster.attach().unwrap();
        broadcaster.publish(state_with_theme(AppTheme::Dark)).unwrap();
        broadcaster.detach().unwrap();
        broadcaster.publish(state_with_theme(AppTheme::Light)).unwrap();

        assert_eq!(stream.next().await.unwrap().settings.theme, AppTheme::Unknown);
        assert_eq!(stream.next().await.unwrap().settings.theme, AppTheme::Dark);
        assert!(stream.next().await.is_none());
        assert_eq!(
            broadcaster.snapshot().unwrap().settings.theme,
            AppTheme::Light
        );
    }
}
