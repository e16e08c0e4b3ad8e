mod error;
mod frames;
mod observer;
mod propagation;
#[cfg(test)]
pub mod testing;

pub use error::PredictError;
pub use frames::{azimuth_elevation, geodetic_of};
pub use observer::{Observer, ObserverSlot};
pub use propagation::{Propagator, Sgp4Propagator};
