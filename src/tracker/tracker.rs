use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::task::{spawn_blocking, JoinHandle};
use tokio::time::sleep;

use super::error::TrackerError;
use super::events::{StopReason, TrackerEvent};
use super::sample::{sample_pointing, PointingSample};
use crate::catalog::TrackTarget;
use crate::mount::{lock_mount, MountError, SharedMount};
use crate::predict::{Observer, ObserverSlot, Propagator};

pub const DEFAULT_CADENCE: Duration = Duration::from_secs(3);
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrackerMode {
    Idle,
    Streaming {
        norad_id: u32,
        name: String,
        since: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackerStatus {
    pub mode: TrackerMode,
    pub last_sample: Option<PointingSample>,
    pub cadence_ms: u64,
}

#[derive(Debug)]
struct Shared {
    status: TrackerStatus,
}

type SharedStatus = Arc<StdMutex<Shared>>;

fn lock_shared(shared: &SharedStatus) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Streams look angles for one target at a time to the mount.
pub struct Tracker {
    propagator: Arc<dyn Propagator>,
    mount: SharedMount,
    observer: ObserverSlot,
    cadence: Duration,
    shared: SharedStatus,
    events: broadcast::Sender<TrackerEvent>,
    worker: Option<WorkerHandle>,
}

impl Tracker {
    pub fn new(
        propagator: Arc<dyn Propagator>,
        mount: SharedMount,
        observer: ObserverSlot,
        cadence: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            propagator,
            mount,
            observer,
            cadence,
            shared: Arc::new(StdMutex::new(Shared {
                status: TrackerStatus {
                    mode: TrackerMode::Idle,
                    last_sample: None,
                    cadence_ms: cadence.as_millis() as u64,
                },
            })),
            events,
            worker: None,
        }
    }

    pub fn status(&self) -> TrackerStatus {
        lock_shared(&self.shared).status.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    pub fn is_streaming(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.join.is_finished())
    }

    /// Starts streaming `target`. A running session is stopped first
    /// (reset, park, close) and the mount device is reopened for the new one.
    pub async fn start(&mut self, target: TrackTarget) -> Result<(), TrackerError> {
        let observer = self.observer.get().ok_or(TrackerError::ObserverUnavailable)?;

        if self.worker.is_some() {
            self.stop().await?;
            lock_mount(&self.mount).reopen()?;
        } else if !lock_mount(&self.mount).is_open() {
            return Err(MountError::NotOpen.into());
        }

        log::info!(
            "Streaming {} (NORAD {}) every {:?}",
            target.name,
            target.norad_id,
            self.cadence
        );
        {
            let mut locked = lock_shared(&self.shared);
            locked.status.mode = TrackerMode::Streaming {
                norad_id: target.norad_id,
                name: target.name.clone(),
                since: Utc::now(),
            };
            locked.status.last_sample = None;
        }
        let _ = self.events.send(TrackerEvent::SessionStarted {
            norad_id: target.norad_id,
            name: target.name.clone(),
        });

        let session = Session {
            propagator: self.propagator.clone(),
            mount: self.mount.clone(),
            observer,
            target,
            cadence: self.cadence,
            shared: self.shared.clone(),
            events: self.events.clone(),
        };
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(Arc::new(session).run(stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });

        Ok(())
    }

    /// Stops the session and waits until the mount is parked and released.
    pub async fn stop(&mut self) -> Result<(), TrackerError> {
        let worker = self.worker.take().ok_or(TrackerError::NotRunning)?;
        let _ = worker.stop_tx.send(());
        if let Err(e) = worker.join.await {
            log::error!("Tracker worker failed: {}", e);
            lock_mount(&self.mount).park_and_close();
        }

        let mut locked = lock_shared(&self.shared);
        locked.status.mode = TrackerMode::Idle;
        Ok(())
    }
}

struct Session {
    propagator: Arc<dyn Propagator>,
    mount: SharedMount,
    observer: Observer,
    target: TrackTarget,
    cadence: Duration,
    shared: SharedStatus,
    events: broadcast::Sender<TrackerEvent>,
}

impl Session {
    async fn run(self: Arc<Self>, mut stop_rx: oneshot::Receiver<()>) {
        let norad_id = self.target.norad_id;

        loop {
            if !matches!(stop_rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
                break;
            }

            // propagation and the serial write both block
            let session = self.clone();
            let ticked = match spawn_blocking(move || session.tick()).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Tick for {} failed: {}", self.target.name, e);
                    Ok(())
                }
            };
            if let Err(MountError::NotOpen) = ticked {
                log::error!("Mount device closed, ending session for {}", self.target.name);
                self.finish(StopReason::DeviceClosed);
                return;
            }

            let should_stop = tokio::select! {
                _ = sleep(self.cadence) => false,
                _ = &mut stop_rx => true,
            };
            if should_stop {
                break;
            }
        }

        log::info!("Stopping stream for {} (NORAD {})", self.target.name, norad_id);
        let mount = self.mount.clone();
        if let Err(e) = spawn_blocking(move || lock_mount(&mount).park_and_close()).await {
            log::error!("Stop sequence task failed: {}", e);
        }
        self.finish(StopReason::Requested);
    }

    /// One sample, one command. Failures are reported and the tick skipped;
    /// only a vanished device is returned.
    fn tick(&self) -> Result<(), MountError> {
        let norad_id = self.target.norad_id;
        let sample = match sample_pointing(
            self.propagator.as_ref(),
            &self.target,
            &self.observer,
            Utc::now(),
        ) {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("No sample for {}: {}", self.target.name, e);
                let _ = self.events.send(TrackerEvent::SampleFailed {
                    norad_id,
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let sent = lock_mount(&self.mount).send(sample.mount_command());
        match sent {
            Ok(()) => {
                lock_shared(&self.shared).status.last_sample = Some(sample);
                let _ = self
                    .events
                    .send(TrackerEvent::SampleSent { norad_id, sample });
                Ok(())
            }
            Err(MountError::NotOpen) => Err(MountError::NotOpen),
            Err(e) => {
                log::warn!("Skipping tick for {}: {}", self.target.name, e);
                let _ = self.events.send(TrackerEvent::WriteFailed {
                    norad_id,
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }

    fn finish(&self, reason: StopReason) {
        lock_shared(&self.shared).status.mode = TrackerMode::Idle;
        let _ = self.events.send(TrackerEvent::SessionStopped {
            norad_id: self.target.norad_id,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::dummy;
    use crate::mount::testing::Recorder;
    use crate::mount::{MountDispatcher, SerialSettings};
    use crate::predict::testing::ScriptedPropagator;
    use crate::predict::PredictError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CADENCE: Duration = Duration::from_millis(10);

    fn open_mount(recorder: &Recorder) -> SharedMount {
        let mount = MountDispatcher::new(recorder.provider(), SerialSettings::default()).shared();
        lock_mount(&mount).open().unwrap();
        mount
    }

    fn observer() -> ObserverSlot {
        ObserverSlot::with(Observer::new(0.0, 0.0, 0.0).unwrap())
    }

    fn tracker(mount: SharedMount, propagator: ScriptedPropagator) -> Tracker {
        Tracker::new(Arc::new(propagator), mount, observer(), CADENCE)
    }

    fn drain(rx: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Splits the recorder log into per-open segments (open marker excluded).
    fn sessions(entries: &[String]) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = Vec::new();
        for entry in entries {
            if entry.starts_with("<open") {
                out.push(Vec::new());
            } else if let Some(current) = out.last_mut() {
                current.push(entry.clone());
            }
        }
        out
    }

    fn assert_parked_session(segment: &[String]) {
        let n = segment.len();
        assert!(n >= 4, "expected points and a stop sequence, got {segment:?}");
        assert_eq!(segment[n - 3..], ["tz \r\n", "i 0 90 \r\n", "<close>"]);
        for entry in &segment[..n - 3] {
            assert!(entry.starts_with("i "), "unexpected {entry:?}");
        }
        assert_eq!(segment.iter().filter(|e| e.as_str() == "tz \r\n").count(), 1);
    }

    #[tokio::test]
    async fn stop_parks_and_releases_mount() {
        let recorder = Recorder::single_usb();
        let mount = open_mount(&recorder);
        let mut tracker = tracker(mount.clone(), ScriptedPropagator::fixed(10.0, 0.0));

        tracker.start(dummy(1, "NORTH")).await.unwrap();
        assert!(tracker.is_streaming());
        sleep(Duration::from_millis(35)).await;
        tracker.stop().await.unwrap();

        let segments = sessions(&recorder.entries());
        assert_eq!(segments.len(), 1);
        assert_parked_session(&segments[0]);
        assert!(!lock_mount(&mount).is_open());
        assert_eq!(tracker.status().mode, TrackerMode::Idle);
        assert!(tracker.status().last_sample.is_some());
    }

    #[tokio::test]
    async fn switching_targets_parks_previous_session_once() {
        let recorder = Recorder::single_usb();
        let mount = open_mount(&recorder);
        let mut tracker = tracker(
            mount,
            ScriptedPropagator::new(|target, _| match target.norad_id {
                1 => Ok((10.0, 0.0)),
                _ => Ok((0.0, 10.0)),
            }),
        );
        let mut events = tracker.subscribe();

        tracker.start(dummy(1, "A")).await.unwrap();
        sleep(Duration::from_millis(35)).await;
        tracker.start(dummy(2, "B")).await.unwrap();
        sleep(Duration::from_millis(35)).await;
        tracker.stop().await.unwrap();

        let segments = sessions(&recorder.entries());
        assert_eq!(segments.len(), 2);
        assert_parked_session(&segments[0]);
        assert_parked_session(&segments[1]);

        let lifecycle: Vec<(u32, bool)> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                TrackerEvent::SessionStarted { norad_id, .. } => Some((norad_id, true)),
                TrackerEvent::SessionStopped { norad_id, .. } => Some((norad_id, false)),
                _ => None,
            })
            .collect();
        assert_eq!(lifecycle, vec![(1, true), (1, false), (2, true), (2, false)]);
    }

    #[tokio::test]
    async fn requires_observer() {
        let recorder = Recorder::single_usb();
        let mut tracker = Tracker::new(
            Arc::new(ScriptedPropagator::fixed(0.0, 0.0)),
            open_mount(&recorder),
            ObserverSlot::new(),
            CADENCE,
        );
        let err = tracker.start(dummy(1, "X")).await.unwrap_err();
        assert!(matches!(err, TrackerError::ObserverUnavailable));
        assert!(!tracker.is_streaming());
    }

    #[tokio::test]
    async fn requires_open_device() {
        let recorder = Recorder::single_usb();
        let mount = MountDispatcher::new(recorder.provider(), SerialSettings::default()).shared();
        let mut tracker = tracker(mount, ScriptedPropagator::fixed(0.0, 0.0));
        let err = tracker.start(dummy(1, "X")).await.unwrap_err();
        assert!(matches!(err, TrackerError::Mount(MountError::NotOpen)));
        assert!(recorder.entries().is_empty());
    }

    #[tokio::test]
    async fn stop_without_session_fails() {
        let recorder = Recorder::single_usb();
        let mut tracker = tracker(open_mount(&recorder), ScriptedPropagator::fixed(0.0, 0.0));
        assert!(matches!(
            tracker.stop().await,
            Err(TrackerError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn sample_failures_do_not_end_session() {
        let recorder = Recorder::single_usb();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let propagator = ScriptedPropagator::new(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(PredictError::Propagation("transient".into()))
            } else {
                Ok((10.0, 0.0))
            }
        });
        let mut tracker = tracker(open_mount(&recorder), propagator);
        let mut events = tracker.subscribe();

        tracker.start(dummy(1, "FLAKY")).await.unwrap();
        sleep(Duration::from_millis(60)).await;
        assert!(tracker.is_streaming());
        tracker.stop().await.unwrap();

        let events = drain(&mut events);
        let failed = events
            .iter()
            .filter(|e| matches!(e, TrackerEvent::SampleFailed { .. }))
            .count();
        assert_eq!(failed, 2);
        assert!(events
            .iter()
            .any(|e| matches!(e, TrackerEvent::SampleSent { .. })));
        assert_parked_session(&sessions(&recorder.entries())[0]);
    }

    #[tokio::test]
    async fn write_failures_skip_ticks() {
        let recorder = Recorder::single_usb();
        let mut tracker = tracker(open_mount(&recorder), ScriptedPropagator::fixed(10.0, 0.0));
        let mut events = tracker.subscribe();

        recorder.fail_writes(true);
        tracker.start(dummy(1, "X")).await.unwrap();
        sleep(Duration::from_millis(35)).await;
        assert!(tracker.is_streaming());
        assert!(tracker.status().last_sample.is_none());

        recorder.fail_writes(false);
        sleep(Duration::from_millis(35)).await;
        tracker.stop().await.unwrap();

        assert!(drain(&mut events)
            .iter()
            .any(|e| matches!(e, TrackerEvent::WriteFailed { .. })));
        assert_parked_session(&sessions(&recorder.entries())[0]);
    }

    #[tokio::test]
    async fn closed_device_ends_session() {
        let recorder = Recorder::single_usb();
        let mount = open_mount(&recorder);
        let mut tracker = tracker(mount.clone(), ScriptedPropagator::fixed(10.0, 0.0));
        let mut events = tracker.subscribe();

        tracker.start(dummy(1, "X")).await.unwrap();
        sleep(Duration::from_millis(25)).await;
        lock_mount(&mount).close();
        sleep(Duration::from_millis(35)).await;

        assert!(!tracker.is_streaming());
        assert_eq!(tracker.status().mode, TrackerMode::Idle);
        assert!(drain(&mut events).iter().any(|e| matches!(
            e,
            TrackerEvent::SessionStopped {
                reason: StopReason::DeviceClosed,
                ..
            }
        )));
    }
}
