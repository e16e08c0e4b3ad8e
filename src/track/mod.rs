//! Ground-track generation, path bookkeeping and target ranking.

mod book;
mod error;
mod filter;
mod path;
mod rank;

pub use book::{PathBook, TrackedPath};
pub use error::{PathError, RankError};
pub use filter::{FilterParams, PathPoint};
pub use path::{generate_path, GroundTrack, PathWindow};
pub use rank::{rank_targets, RankParams, RankingEntry};
