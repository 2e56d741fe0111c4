pub mod bbox;
pub mod detection;
pub mod error;
pub mod kalman;
pub mod stats;
pub mod summary;
pub mod tracker;

mod association;
mod track;

pub use bbox::BBox;
pub use detection::Detection;
pub use summary::TrackSummary;
pub use track::TrackView;
pub use tracker::{ObjectTracker, TrackerConfig};

use error::Error;
use nalgebra as na;
use std::fmt;

pub trait Float:
    num_traits::FromPrimitive + na::RealField + Copy + fmt::Debug + PartialEq + 'static
{
}

impl<T> Float for T where
    T: num_traits::FromPrimitive + na::RealField + Copy + fmt::Debug + PartialEq + 'static
{
}

pub trait Tracking {
    fn update(&mut self, detections: &[Detection], frame_index: u64)
        -> Result<Vec<TrackView>, Error>;
    fn tracks(&self) -> Vec<TrackView>;
}
