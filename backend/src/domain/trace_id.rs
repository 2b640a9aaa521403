//! Correlation id carried by every request, its log lines and its errors.
//!
//! The id lives in tokio task-local storage. Spawned tasks do not inherit
//! task-locals, so detached work goes through [`TraceId::spawn_detached`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task::JoinHandle;
use uuid::Uuid;

tokio::task_local! {
    static CURRENT: TraceId;
}

/// Identifier of one inbound request.
///
/// # Examples
/// ```
/// use herdbook::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "6f1c1d0e-6e9a-4c59-9a43-0f0b7f6c2a11".parse().unwrap();
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the request the calling task serves, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `id` as the current trace id.
    pub async fn scope<F: Future>(id: Self, fut: F) -> F::Output {
        CURRENT.scope(id, fut).await
    }

    /// `tokio::spawn` that re-enters the caller's trace scope inside the new
    /// task.
    pub(crate) fn spawn_detached<F>(fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(id) = Self::current() {
            tokio::spawn(CURRENT.scope(id, fut))
        } else {
            tokio::spawn(fut)
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn scope_sets_and_clears_the_current_id() {
        let id = TraceId::generate();

        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
        assert_eq!(TraceId::current(), None);
    }

    #[tokio::test]
    async fn plain_spawns_lose_the_id() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async { tokio::spawn(async { TraceId::current() }) })
            .await
            .await
            .expect("task joins");
        assert_eq!(seen, None);
    }

    #[tokio::test]
    async fn detached_spawns_keep_the_id() {
        let id = TraceId::generate();
        let (tx, rx) = oneshot::channel();

        let handle = TraceId::scope(id, async move {
            TraceId::spawn_detached(async move {
                tx.send(TraceId::current()).ok();
            })
        })
        .await;

        handle.await.expect("task joins");
        assert_eq!(rx.await.expect("id sent"), Some(id));
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn malformed_ids_do_not_parse(#[case] raw: &str) {
        assert!(raw.parse::<TraceId>().is_err());
    }
}
