use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::mount::SharedMount;
use crate::predict::{ObserverSlot, Propagator};
use crate::track::PathBook;
use crate::tracker::Tracker;

use super::config::Config;

/// Everything the handlers share. The mount is reached either directly for
/// manual commands or through the tracker while a session streams.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub propagator: Arc<dyn Propagator>,
    pub observer: ObserverSlot,
    pub mount: SharedMount,
    pub tracker: Arc<Mutex<Tracker>>,
    pub paths: Arc<StdMutex<PathBook>>,
}
