//! ISPConfig 会话状态机
//!
//! `NoSession → HasSession` on login; `HasSession → NoSession` when the panel
//! reports the session as expired or on logout. The state lives behind a
//! `tokio::sync::Mutex` that stays locked for the whole login, so concurrent
//! first calls share one login request.

use std::future::Future;

use tokio::sync::Mutex;

use crate::error::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum SessionState {
    #[default]
    NoSession,
    HasSession(String),
}

/// Cached remote API session.
#[derive(Debug, Default)]
pub(crate) struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// The cached session id, logging in through `login` when there is none.
    pub async fn get_or_login<F, Fut>(&self, login: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut state = self.state.lock().await;
        if let SessionState::HasSession(id) = &*state {
            return Ok(id.clone());
        }
        let id = login().await?;
        log::debug!("ISPConfig session established");
        *state = SessionState::HasSession(id.clone());
        Ok(id)
    }

    /// Forget `stale` if it is still the cached id. A newer session set by a
    /// concurrent caller is kept.
    pub async fn invalidate(&self, stale: &str) {
        let mut state = self.state.lock().await;
        if matches!(&*state, SessionState::HasSession(id) if id == stale) {
            *state = SessionState::NoSession;
        }
    }

    /// Remove and return the cached id.
    pub async fn take(&self) -> Option<String> {
        match std::mem::take(&mut *self.state.lock().await) {
            SessionState::HasSession(id) => Some(id),
            SessionState::NoSession => None,
        }
    }

    #[cfg(test)]
    pub async fn is_active(&self) -> bool {
        matches!(&*self.state.lock().await, SessionState::HasSession(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PanelError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counting_login(counter: Arc<AtomicU32>) -> impl Future<Output = Result<String>> {
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("session-{n}"))
        }
    }

    #[tokio::test]
    async fn logs_in_once_and_caches() {
        let session = Session::default();
        let logins = Arc::new(AtomicU32::new(0));

        let first = session.get_or_login(|| counting_login(Arc::clone(&logins))).await.unwrap();
        let second = session.get_or_login(|| counting_login(Arc::clone(&logins))).await.unwrap();

        assert_eq!(first, "session-1");
        assert_eq!(second, "session-1");
        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert!(session.is_active().await);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_login() {
        let session = Session::default();
        let logins = Arc::new(AtomicU32::new(0));

        let (a, b) = tokio::join!(
            session.get_or_login(|| counting_login(Arc::clone(&logins))),
            session.get_or_login(|| counting_login(Arc::clone(&logins))),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_login_leaves_no_session() {
        let session = Session::default();
        let err = session
            .get_or_login(|| async {
                Err(PanelError::InvalidCredentials {
                    panel: "ispconfig".to_string(),
                    raw_message: None,
                })
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "AUTHENTICATION_FAILED");
        assert!(!session.is_active().await);
    }

    #[tokio::test]
    async fn invalidate_only_drops_the_stale_id() {
        let session = Session::default();
        let logins = Arc::new(AtomicU32::new(0));
        session.get_or_login(|| counting_login(Arc::clone(&logins))).await.unwrap();

        session.invalidate("some-other-id").await;
        assert!(session.is_active().await);

        session.invalidate("session-1").await;
        assert!(!session.is_active().await);

        let renewed = session.get_or_login(|| counting_login(Arc::clone(&logins))).await.unwrap();
        assert_eq!(renewed, "session-2");
    }

    #[tokio::test]
    async fn take_clears_state() {
        let session = Session::default();
        assert_eq!(session.take().await, None);
        session
            .get_or_login(|| async { Ok("abc".to_string()) })
            .await
            .unwrap();
        assert_eq!(session.take().await.as_deref(), Some("abc"));
        assert!(!session.is_active().await);
    }
}
