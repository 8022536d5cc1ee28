use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Per-key quiet-period timer for quantity edits.
///
/// Every `schedule` for a key supersedes the one before it; only the last
/// action runs, once `delay` has passed without a newer edit. Keys do not
/// affect each other.
#[derive(Debug, Clone)]
pub struct QuantityDebouncer<K> {
  delay: Duration,
  generations: Arc<Mutex<HashMap<K, u64>>>,
}

impl<K> QuantityDebouncer<K>
where
  K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
  pub fn new(delay: Duration) -> Self {
    Self { delay, generations: Arc::new(Mutex::new(HashMap::new())) }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  /// Keys with an edit still waiting out the delay.
  pub fn pending(&self) -> usize {
    self.generations.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// Arms the timer for `key`. The handle resolves to `true` if `action`
  /// ran and `false` if a newer edit took its place.
  pub fn schedule<F, Fut>(&self, key: K, action: F) -> JoinHandle<bool>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let generation = {
      let mut map = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
      let slot = map.entry(key.clone()).or_insert(0);
      *slot += 1;
      *slot
    };

    let delay = self.delay;
    let generations = Arc::clone(&self.generations);

    tokio::spawn(async move {
      tokio::time::sleep(delay).await;

      {
        let mut map = generations.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(&key) != Some(&generation) {
          log::debug!("edit for {key:?} superseded");
          return false;
        }
        map.remove(&key);
      }

      action().await;
      true
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  type Log = Arc<Mutex<Vec<(u32, u32)>>>;

  type Edit = std::future::Ready<()>;

  fn record(log: &Log, key: u32, value: u32) -> impl FnOnce() -> Edit + Send + 'static {
    let log = Arc::clone(log);
    move || {
      log.lock().unwrap().push((key, value));
      std::future::ready(())
    }
  }

  #[tokio::test(start_paused = true)]
  async fn last_edit_wins_after_quiet_period() {
    let debouncer = QuantityDebouncer::new(Duration::from_millis(500));
    let log: Log = Arc::default();

    let first = debouncer.schedule(1, record(&log, 1, 3));
    tokio::time::sleep(Duration::from_millis(200)).await;
    let second = debouncer.schedule(1, record(&log, 1, 4));
    tokio::time::sleep(Duration::from_millis(200)).await;
    let third = debouncer.schedule(1, record(&log, 1, 5));

    assert!(!first.await.unwrap());
    assert!(!second.await.unwrap());
    assert!(third.await.unwrap());
    assert_eq!(*log.lock().unwrap(), vec![(1, 5)]);
    assert_eq!(debouncer.pending(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn keys_are_independent() {
    let debouncer = QuantityDebouncer::new(Duration::from_millis(500));
    let log: Log = Arc::default();

    let a = debouncer.schedule(1, record(&log, 1, 2));
    let b = debouncer.schedule(2, record(&log, 2, 9));
    assert_eq!(debouncer.pending(), 2);

    assert!(a.await.unwrap());
    assert!(b.await.unwrap());

    let mut seen = log.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![(1, 2), (2, 9)]);
  }

  #[tokio::test(start_paused = true)]
  async fn nothing_fires_before_the_delay() {
    let debouncer = QuantityDebouncer::new(Duration::from_millis(500));
    let log: Log = Arc::default();

    let handle = debouncer.schedule(7, record(&log, 7, 1));
    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(log.lock().unwrap().is_empty());

    assert!(handle.await.unwrap());
    assert_eq!(log.lock().unwrap().len(), 1);
  }
}
