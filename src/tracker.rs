use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::association::{self, Candidate};
use crate::detection::Detection;
use crate::error::Error;
use crate::kalman::KalmanFilter;
use crate::summary::{self, TrackSummary};
use crate::track::{Track, TrackView};
use crate::Tracking;

/// Constructor-time tracker parameters. Frame dimensions bound the
/// predicted boxes; the thresholds gate matching and track termination.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Acceptance radius in pixels between a predicted track center and a
    /// detection center, the fallback when boxes no longer overlap.
    pub max_distance: f32,
    /// Consecutive unmatched frames tolerated before a track is finished.
    pub max_missed: u32,
    /// Minimum IoU for the geometric acceptance path.
    pub min_iou: f32,
}

impl TrackerConfig {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            max_distance: 120.0,
            max_missed: 15,
            min_iou: 0.15,
        }
    }
}

/// The track table. Owns every live track, the id counter and the finished
/// archive; one [`ObjectTracker::update`] call turns one frame of
/// detections into one frame of track state.
pub struct ObjectTracker {
    config: TrackerConfig,
    kf: KalmanFilter<f32>,
    tracks: BTreeMap<u32, Track>,
    finished: Vec<Track>,
    next_id: u32,
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            kf: KalmanFilter::new(),
            tracks: BTreeMap::new(),
            finished: Vec::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Process one frame. Calls must arrive once per frame in increasing
    /// `frame_index` order; detections with negative dimensions fail the
    /// whole call before any track state is touched.
    ///
    /// Returns a snapshot of every track still in the table after this
    /// frame's bookkeeping: matched, newly created, or aged.
    pub fn update(
        &mut self,
        detections: &[Detection],
        frame_index: u64,
    ) -> Result<Vec<TrackView>, Error> {
        for det in detections {
            det.bbox.validate()?;
        }

        // Time step for every live track; the prior is what the matcher sees.
        for track in self.tracks.values_mut() {
            track.predict(&self.kf, self.config.frame_width, self.config.frame_height);
        }

        let candidates: Vec<Candidate> = self
            .tracks
            .values()
            .map(|t| Candidate {
                id: t.id,
                pred_box: t.pred_box,
                pred_center: t.pred_center,
            })
            .collect();

        let assignment = association::associate(
            detections,
            &candidates,
            self.config.min_iou,
            self.config.max_distance,
        );

        for &(det_idx, track_id) in &assignment.matches {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                if let Err(err) = track.apply_match(&self.kf, detections[det_idx].bbox, frame_index)
                {
                    // A failed correction is isolated: this track coasts on
                    // its prior this frame, the rest of the frame proceeds.
                    error!("kalman update failed for track {track_id}: {err}");
                    track.age(frame_index);
                }
            }
        }

        for &track_id in &assignment.unmatched_tracks {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.age(frame_index);
            }
        }

        // Move tracks past their miss limit into the archive.
        let expired: Vec<u32> = self
            .tracks
            .values()
            .filter(|t| t.missed > self.config.max_missed)
            .map(|t| t.id)
            .collect();

        for id in expired {
            if let Some(track) = self.tracks.remove(&id) {
                debug!("track {id} finished after {} missed frames", track.missed);
                self.finished.push(track);
            }
        }

        // Leftover detections seed new tracks, in the order they arrived.
        for &det_idx in &assignment.unmatched_detections {
            let id = self.next_id;
            self.next_id += 1;

            debug!("track {id} created at frame {frame_index}");
            self.tracks.insert(
                id,
                Track::new(id, &self.kf, detections[det_idx].bbox, frame_index),
            );
        }

        Ok(self.tracks.values().map(TrackView::from).collect())
    }

    /// Active tracks, ascending id.
    pub fn tracks(&self) -> Vec<TrackView> {
        self.tracks.values().map(TrackView::from).collect()
    }

    /// The finished archive, in termination order.
    pub fn finished(&self) -> Vec<TrackView> {
        self.finished.iter().map(TrackView::from).collect()
    }

    /// Finished tracks followed by the still-active ones.
    pub fn all_tracks(&self) -> Vec<TrackView> {
        self.finished
            .iter()
            .chain(self.tracks.values())
            .map(TrackView::from)
            .collect()
    }

    /// Remove and return the finished archive. The archive otherwise grows
    /// for the lifetime of the tracker; long-running callers should export
    /// summaries and then drain.
    pub fn drain_finished(&mut self) -> Vec<TrackView> {
        self.finished
            .drain(..)
            .map(|t| TrackView::from(&t))
            .collect()
    }

    /// Lifetime statistics for every track, finished and active.
    pub fn object_summaries(&self) -> Vec<TrackSummary> {
        summary::summarize(self.finished.iter().chain(self.tracks.values()))
    }

    /// Write the summaries as CSV, one row per track. With a positive
    /// `fps`, dwell and speed are also reported in seconds-based units.
    /// Creates the parent directory if absent; never mutates track state.
    pub fn export_object_summaries_csv<P: AsRef<Path>>(
        &self,
        path: P,
        fps: Option<f32>,
    ) -> Result<PathBuf, Error> {
        summary::export_csv(path.as_ref(), &self.object_summaries(), fps)
    }
}

impl Tracking for ObjectTracker {
    fn update(
        &mut self,
        detections: &[Detection],
        frame_index: u64,
    ) -> Result<Vec<TrackView>, Error> {
        ObjectTracker::update(self, detections, frame_index)
    }

    fn tracks(&self) -> Vec<TrackView> {
        ObjectTracker::tracks(self)
    }
}
