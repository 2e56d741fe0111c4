use nalgebra as na;

use crate::bbox::BBox;
use crate::error::Error;
use crate::kalman::{KalmanFilter, KalmanState};

/// The mutable per-object entity owned by the track table. Exactly one of
/// [`Track::apply_match`] / [`Track::age`] runs per frame after
/// [`Track::predict`].
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    /// Last measured box when matched, predicted box while coasting.
    pub bbox: BBox,
    pub center: na::Point2<f32>,
    pub last_center: na::Point2<f32>,
    pub kalman: KalmanState<f32>,
    /// Consecutive frames without a matched detection.
    pub missed: u32,
    pub first_frame: u64,
    pub last_frame: u64,
    pub path_length: f32,
    /// One `(frame, box)` entry per frame the track existed.
    pub history: Vec<(u64, BBox)>,

    // Kalman prior for the current frame, valid between predict and the
    // frame's correction or aging.
    pub pred_center: na::Point2<f32>,
    pub pred_box: BBox,
}

impl Track {
    pub fn new(id: u32, kf: &KalmanFilter<f32>, bbox: BBox, frame_index: u64) -> Self {
        let center = bbox.center();

        Self {
            id,
            bbox,
            center,
            last_center: center,
            kalman: kf.initiate(center),
            missed: 0,
            first_frame: frame_index,
            last_frame: frame_index,
            path_length: 0.0,
            history: vec![(frame_index, bbox)],
            pred_center: center,
            pred_box: bbox,
        }
    }

    /// Run the time step and refresh the prior the matcher sees: the
    /// predicted center wearing the last known box size, kept inside the
    /// frame.
    pub fn predict(&mut self, kf: &KalmanFilter<f32>, frame_w: u32, frame_h: u32) {
        kf.predict(&mut self.kalman);

        self.pred_center = self.kalman.position();
        self.pred_box = self.bbox.centered_at(self.pred_center, frame_w, frame_h);
    }

    /// Correct with a matched measurement; the posterior becomes the current
    /// position and the measured box replaces the size.
    pub fn apply_match(
        &mut self,
        kf: &KalmanFilter<f32>,
        bbox: BBox,
        frame_index: u64,
    ) -> Result<(), Error> {
        kf.update(&mut self.kalman, bbox.center())?;

        self.bbox = bbox;
        self.missed = 0;
        self.advance(self.kalman.position(), bbox, frame_index);

        Ok(())
    }

    /// No measurement this frame: coast on the prior.
    pub fn age(&mut self, frame_index: u64) {
        self.missed += 1;
        self.bbox = self.pred_box;
        self.advance(self.pred_center, self.pred_box, frame_index);
    }

    fn advance(&mut self, center: na::Point2<f32>, bbox: BBox, frame_index: u64) {
        self.center = center;
        self.path_length += na::distance(&self.last_center, &self.center);
        self.last_center = self.center;
        self.last_frame = frame_index;
        self.history.push((frame_index, bbox));
    }
}

/// Read-only snapshot of one track, handed to callers. Owns its data; no
/// references into the table escape.
#[derive(Debug, Clone)]
pub struct TrackView {
    pub id: u32,
    pub bbox: BBox,
    pub center: na::Point2<f32>,
    pub last_center: na::Point2<f32>,
    /// Raw filter mean `[x, y, vx, vy]`.
    pub kalman_state: Option<[f32; 4]>,
    pub path_length: f32,
    pub first_frame: u64,
    pub last_frame: u64,
}

impl TrackView {
    /// Instantaneous speed in px/frame: filter velocity when the state is
    /// present, last center step otherwise.
    pub fn speed(&self) -> f32 {
        match self.kalman_state {
            Some([_, _, vx, vy]) => vx.hypot(vy),
            None => na::distance(&self.center, &self.last_center),
        }
    }
}

impl From<&Track> for TrackView {
    fn from(t: &Track) -> Self {
        Self {
            id: t.id,
            bbox: t.bbox,
            center: t.center,
            last_center: t.last_center,
            kalman_state: Some([
                t.kalman.mean[0],
                t.kalman.mean[1],
                t.kalman.mean[2],
                t.kalman.mean[3],
            ]),
            path_length: t.path_length,
            first_frame: t.first_frame,
            last_frame: t.last_frame,
        }
    }
}
