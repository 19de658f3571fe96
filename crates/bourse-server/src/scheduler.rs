//! Fixed-interval background job with an observable next run time.

use std::{
  future::Future,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use bourse_core::clock::TickSchedule;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
  sync::{Notify, watch},
  task::JoinHandle,
  time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Handle to a running periodic job.
///
/// Clones share the same job. [`SchedulerHandle::shutdown`] stops it for all
/// of them, after which [`SchedulerHandle::next_run_time`] reports `None`.
#[derive(Clone)]
pub struct SchedulerHandle {
  next_run: Arc<watch::Sender<Option<DateTime<Utc>>>>,
  stop:     Arc<Notify>,
  task:     Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SchedulerHandle {
  /// Run `job` every `period`, the first time one period from now.
  ///
  /// A run that overruns its slot delays the following ones rather than
  /// firing them in a burst. Runs never overlap.
  pub fn spawn<F, Fut>(period: Duration, mut job: F) -> Result<Self>
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    if period.is_zero() {
      return Err(Error::Config("scheduler period must be positive".into()));
    }
    let step = TimeDelta::from_std(period)?;

    let (tx, _) = watch::channel(Some(Utc::now() + step));
    let next_run = Arc::new(tx);
    let stop = Arc::new(Notify::new());

    let task = tokio::spawn({
      let next_run = Arc::clone(&next_run);
      let stop = Arc::clone(&stop);
      async move {
        let mut ticks = time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?period, "scheduler started");

        loop {
          tokio::select! {
            () = stop.notified() => break,
            _ = ticks.tick() => {
              next_run.send_replace(Some(Utc::now() + step));
              debug!("scheduler tick");
              job().await;
            }
          }
        }
        info!("scheduler stopped");
      }
    });

    Ok(Self { next_run, stop, task: Arc::new(Mutex::new(Some(task))) })
  }

  /// Stop the job and wait for an in-flight run to finish. Idempotent.
  pub async fn shutdown(&self) {
    self.stop.notify_one();
    let task = self
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(task) = task
      && let Err(e) = task.await
    {
      warn!("scheduler task ended abnormally: {e}");
    }
    self.next_run.send_replace(None);
  }

  /// `true` until [`SchedulerHandle::shutdown`] has been called.
  pub fn is_running(&self) -> bool {
    self
      .task
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .is_some()
  }
}

impl TickSchedule for SchedulerHandle {
  fn next_run_time(&self) -> Option<DateTime<Utc>> { *self.next_run.borrow() }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  fn counting(period: Duration) -> (SchedulerHandle, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let handle = SchedulerHandle::spawn(period, {
      let runs = Arc::clone(&runs);
      move || {
        let runs = Arc::clone(&runs);
        async move {
          runs.fetch_add(1, Ordering::SeqCst);
        }
      }
    })
    .unwrap();
    (handle, runs)
  }

  #[tokio::test(start_paused = true)]
  async fn runs_once_per_period() {
    let (handle, runs) = counting(Duration::from_secs(120));

    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    time::sleep(Duration::from_secs(70)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    time::sleep(Duration::from_secs(240)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    handle.shutdown().await;
  }

  #[tokio::test(start_paused = true)]
  async fn next_run_time_is_one_period_ahead() {
    let before = Utc::now();
    let (handle, _) = counting(Duration::from_secs(120));
    let next = handle.next_run_time().unwrap();
    assert!(next >= before + TimeDelta::seconds(120));
    assert!(next <= Utc::now() + TimeDelta::seconds(120));
    handle.shutdown().await;
  }

  #[tokio::test(start_paused = true)]
  async fn shutdown_stops_runs_and_clears_next_run() {
    let (handle, runs) = counting(Duration::from_secs(10));
    time::sleep(Duration::from_secs(15)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let observer = handle.clone();
    handle.shutdown().await;
    assert!(!observer.is_running());
    assert_eq!(observer.next_run_time(), None);

    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // A second shutdown is a no-op.
    observer.shutdown().await;
  }

  #[tokio::test]
  async fn zero_period_is_rejected() {
    assert!(SchedulerHandle::spawn(Duration::ZERO, || async {}).is_err());
  }
}
