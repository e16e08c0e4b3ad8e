pub mod catalog;
pub mod error;
pub mod mount;
pub mod observer;
pub mod paths;
pub mod pointing;
pub mod tracker;

#[cfg(test)]
pub mod testing {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::sync::Mutex;

    use crate::catalog::testing::record;
    use crate::catalog::Catalog;
    use crate::mount::testing::Recorder;
    use crate::mount::MountDispatcher;
    use crate::predict::testing::ScriptedPropagator;
    use crate::predict::{Observer, ObserverSlot};
    use crate::track::PathBook;
    use crate::tracker::Tracker;
    use crate::web::auth::AuthenticatedUser;
    use crate::web::state::AppState;
    use crate::web::config::{Config, Permission};

    const CONFIG: &str = "\
catalog:
  tle_file: unused.tle
tracker:
  cadence: 10ms
paths:
  duration: 10m
  step: 60s
";

    /// Three catalog rows (NORAD 1, 2, 3) served by `propagator`.
    pub fn state(
        recorder: &Recorder,
        propagator: ScriptedPropagator,
        observer: Option<Observer>,
    ) -> AppState {
        let config = Config::from_str(CONFIG).unwrap();
        let catalog = Catalog::new(vec![record(1, "ONE"), record(2, "TWO"), record(3, "THREE")]);
        let observer = observer.map(ObserverSlot::with).unwrap_or_default();
        let propagator = Arc::new(propagator);
        let mount = MountDispatcher::new(recorder.provider(), config.mount.serial_settings()).shared();
        let tracker = Tracker::new(
            propagator.clone(),
            mount.clone(),
            observer.clone(),
            config.tracker.cadence,
        );
        AppState {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            propagator,
            observer,
            mount,
            tracker: Arc::new(Mutex::new(tracker)),
            paths: Arc::new(StdMutex::new(PathBook::new())),
        }
    }

    pub fn user(permissions: &[Permission]) -> AuthenticatedUser {
        AuthenticatedUser {
            name: "test".into(),
            permissions: permissions.iter().copied().collect::<HashSet<_>>(),
        }
    }

    pub fn operator() -> AuthenticatedUser {
        user(&[Permission::Read, Permission::Control])
    }

    pub fn viewer() -> AuthenticatedUser {
        user(&[Permission::Read])
    }
}
