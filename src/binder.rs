//! Selection-driven resource binding.
//!
//! A binding observes a reactive selection cell (a year string) and keeps a
//! derived content cell up to date: every change of the selection issues an
//! asynchronous artifact fetch whose result (or a fixed fallback, on
//! failure) is written back to the cell. Overlapping fetches follow
//! switch-latest semantics: each fetch carries a generation number, and
//! only the most recently issued generation may write the cell when it
//! resolves. Superseded fetches are not cancelled, just discarded.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

/// Derived content cell. Holds `None` until the first fetch resolves.
pub type ContentCell<C> = watch::Receiver<Option<C>>;

/// Bind a selection cell to an artifact fetch.
///
/// The value present at subscription time counts as the first change;
/// after that, changes are detected by comparing values, so re-sending the
/// current selection does not refetch. Empty selections never fetch and
/// leave the cell untouched. A fetch failure writes `fallback` instead of
/// tearing down the binding; later selection changes still fetch.
pub fn bind<F, Fut, T, C>(
    selection: watch::Receiver<String>,
    fetch: F,
    transform: T,
    fallback: C,
) -> ContentCell<C>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
    T: Fn(String) -> C + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let (out_tx, out_rx) = watch::channel(None);
    tokio::spawn(drive(selection, fetch, transform, fallback, out_tx));
    out_rx
}

async fn drive<F, Fut, T, C>(
    mut selection: watch::Receiver<String>,
    fetch: F,
    transform: T,
    fallback: C,
    out_tx: watch::Sender<Option<C>>,
) where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
    T: Fn(String) -> C + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let transform = Arc::new(transform);
    let latest = Arc::new(AtomicU64::new(0));
    let mut last_seen: Option<String> = None;

    loop {
        let sel = selection.borrow_and_update().clone();
        if last_seen.as_deref() != Some(sel.as_str()) {
            last_seen = Some(sel.clone());
            if !sel.is_empty() {
                let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;
                let latest = latest.clone();
                let transform = transform.clone();
                let fallback = fallback.clone();
                let out_tx = out_tx.clone();
                let fut = fetch(sel.clone());
                tokio::spawn(async move {
                    let content = match fut.await {
                        Ok(raw) => transform(raw),
                        Err(err) => {
                            tracing::warn!(
                                selection = %sel,
                                error = %err,
                                "artifact fetch failed, substituting fallback"
                            );
                            fallback
                        }
                    };
                    // Only the most recently issued fetch may write the cell.
                    if latest.load(Ordering::SeqCst) == generation {
                        let _ = out_tx.send(Some(content));
                    }
                });
            }
        }
        if selection.changed().await.is_err() {
            break;
        }
    }
}

/// One-shot selection discovery with fallback.
///
/// Fetches the list of valid selections, substituting `fallback` if the
/// fetch fails, and seeds the selection cell with the most recently listed
/// element, if any. Returns the effective list. Called once per activation.
pub async fn discover<F, Fut>(
    fetch: F,
    fallback: &[String],
    selection: &watch::Sender<String>,
) -> Vec<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<String>>>,
{
    let selections = match fetch().await {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(error = %err, "selection discovery failed, using fallback list");
            fallback.to_vec()
        }
    };
    if let Some(newest) = selections.last() {
        let _ = selection.send(newest.clone());
    }
    selections
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::{oneshot, Notify};

    type BoxedFetch = std::pin::Pin<Box<dyn Future<Output = Result<String>> + Send>>;

    /// Fetcher whose responses stay pending until the test releases them,
    /// so resolution order can be controlled explicitly.
    #[derive(Clone, Default)]
    struct GatedFetch {
        pending: Arc<Mutex<HashMap<String, oneshot::Sender<Result<String>>>>>,
        started: Arc<Mutex<Vec<String>>>,
        notify: Arc<Notify>,
    }

    impl GatedFetch {
        fn fetch_fn(&self) -> impl Fn(String) -> BoxedFetch + Send + Sync + 'static {
            let gates = self.clone();
            move |sel: String| -> BoxedFetch {
                let gates = gates.clone();
                Box::pin(async move {
                    let (tx, rx) = oneshot::channel();
                    gates.pending.lock().unwrap().insert(sel.clone(), tx);
                    gates.started.lock().unwrap().push(sel);
                    gates.notify.notify_waiters();
                    rx.await.expect("test dropped the gate")
                })
            }
        }

        async fn wait_for_start(&self, sel: &str) {
            loop {
                let notified = self.notify.notified();
                if self.started.lock().unwrap().iter().any(|s| s == sel) {
                    return;
                }
                notified.await;
            }
        }

        async fn wait_for_count(&self, n: usize) {
            loop {
                let notified = self.notify.notified();
                if self.started.lock().unwrap().len() >= n {
                    return;
                }
                notified.await;
            }
        }

        fn resolve(&self, sel: &str, result: Result<String>) {
            let tx = self
                .pending
                .lock()
                .unwrap()
                .remove(sel)
                .expect("no pending fetch for selection");
            let _ = tx.send(result);
        }

        fn started_count(&self) -> usize {
            self.started.lock().unwrap().len()
        }
    }

    /// Let spawned fetch tasks run to completion.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn wrap(raw: String) -> String {
        format!("<{}>", raw)
    }

    #[tokio::test]
    async fn test_cell_starts_unset() {
        let gates = GatedFetch::default();
        let (_sel_tx, sel_rx) = watch::channel(String::new());
        let cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());
        settle().await;
        assert!(cell.borrow().is_none());
        assert_eq!(gates.started_count(), 0);
    }

    #[tokio::test]
    async fn test_initial_selection_triggers_fetch() {
        let gates = GatedFetch::default();
        let (_sel_tx, sel_rx) = watch::channel("2023".to_string());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        gates.wait_for_start("2023").await;
        gates.resolve("2023", Ok("content".to_string()));
        cell.changed().await.unwrap();
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<content>"));
    }

    #[tokio::test]
    async fn test_empty_selection_never_fetches() {
        let gates = GatedFetch::default();
        let (sel_tx, sel_rx) = watch::channel("2023".to_string());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        gates.wait_for_start("2023").await;
        gates.resolve("2023", Ok("a".to_string()));
        cell.changed().await.unwrap();

        sel_tx.send(String::new()).unwrap();
        settle().await;
        assert_eq!(gates.started_count(), 1);
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<a>"));

        // Re-entering the same year after clearing counts as a change.
        sel_tx.send("2023".to_string()).unwrap();
        gates.wait_for_count(2).await;
        gates.resolve("2023", Ok("b".to_string()));
        cell.changed().await.unwrap();
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<b>"));
    }

    #[tokio::test]
    async fn test_resending_same_selection_is_not_a_change() {
        let gates = GatedFetch::default();
        let (sel_tx, sel_rx) = watch::channel("2023".to_string());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        gates.wait_for_start("2023").await;
        gates.resolve("2023", Ok("a".to_string()));
        cell.changed().await.unwrap();

        sel_tx.send("2023".to_string()).unwrap();
        settle().await;
        assert_eq!(gates.started_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_fallback_and_keeps_reacting() {
        let gates = GatedFetch::default();
        let (sel_tx, sel_rx) = watch::channel("2023".to_string());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        gates.wait_for_start("2023").await;
        gates.resolve("2023", Err(anyhow!("HTTP 500")));
        cell.changed().await.unwrap();
        assert_eq!(cell.borrow_and_update().as_deref(), Some("FALLBACK"));

        // A later selection still fetches and fully replaces the fallback.
        sel_tx.send("2022".to_string()).unwrap();
        gates.wait_for_start("2022").await;
        gates.resolve("2022", Ok("fresh".to_string()));
        cell.changed().await.unwrap();
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<fresh>"));
    }

    #[tokio::test]
    async fn test_stale_fetch_never_overwrites_newer_result() {
        let gates = GatedFetch::default();
        let (sel_tx, sel_rx) = watch::channel(String::new());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        sel_tx.send("2021".to_string()).unwrap();
        gates.wait_for_start("2021").await;
        sel_tx.send("2022".to_string()).unwrap();
        gates.wait_for_start("2022").await;

        // The newer fetch resolves first and wins.
        gates.resolve("2022", Ok("newer".to_string()));
        cell.changed().await.unwrap();
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<newer>"));

        // The stale fetch resolves late and must be discarded.
        gates.resolve("2021", Ok("stale".to_string()));
        settle().await;
        assert!(!cell.has_changed().unwrap());
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<newer>"));
    }

    #[tokio::test]
    async fn test_stale_failure_never_regresses_to_fallback() {
        let gates = GatedFetch::default();
        let (sel_tx, sel_rx) = watch::channel(String::new());
        let mut cell = bind(sel_rx, gates.fetch_fn(), wrap, "FALLBACK".to_string());

        sel_tx.send("2021".to_string()).unwrap();
        gates.wait_for_start("2021").await;
        sel_tx.send("2022".to_string()).unwrap();
        gates.wait_for_start("2022").await;

        gates.resolve("2022", Ok("newer".to_string()));
        cell.changed().await.unwrap();

        gates.resolve("2021", Err(anyhow!("timed out")));
        settle().await;
        assert_eq!(cell.borrow_and_update().as_deref(), Some("<newer>"));
    }

    #[tokio::test]
    async fn test_discovery_seeds_latest_selection() {
        let (sel_tx, sel_rx) = watch::channel(String::new());
        let years = discover(
            || async {
                Ok(vec![
                    "2021".to_string(),
                    "2022".to_string(),
                    "2023".to_string(),
                ])
            },
            &[],
            &sel_tx,
        )
        .await;
        assert_eq!(years, ["2021", "2022", "2023"]);
        assert_eq!(*sel_rx.borrow(), "2023");
    }

    #[tokio::test]
    async fn test_discovery_failure_uses_fallback() {
        let fallback = vec![
            "2021".to_string(),
            "2022".to_string(),
            "2023".to_string(),
        ];
        let (sel_tx, sel_rx) = watch::channel(String::new());
        let years = discover(
            || async { Err(anyhow!("connection refused")) },
            &fallback,
            &sel_tx,
        )
        .await;
        assert_eq!(years, fallback);
        assert_eq!(*sel_rx.borrow(), "2023");
    }

    #[tokio::test]
    async fn test_discovery_empty_list_seeds_nothing() {
        let (sel_tx, sel_rx) = watch::channel(String::new());
        let years = discover(|| async { Ok(Vec::new()) }, &[], &sel_tx).await;
        assert!(years.is_empty());
        assert_eq!(*sel_rx.borrow(), "");
    }
}
