use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::Serialize;

use crate::error::Error;
use crate::track::Track;

/// Compact statistics over one track's whole lifetime.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub id: u32,
    pub dwell_frames: u64,
    pub path_length_px: f32,
    pub avg_speed_px_per_frame: f32,
}

impl TrackSummary {
    #[inline]
    pub fn dwell_seconds(&self, fps: f32) -> f32 {
        self.dwell_frames as f32 / fps
    }

    #[inline]
    pub fn avg_speed_px_per_second(&self, fps: f32) -> f32 {
        self.avg_speed_px_per_frame * fps
    }
}

pub(crate) fn summarize<'a, I>(tracks: I) -> Vec<TrackSummary>
where
    I: IntoIterator<Item = &'a Track>,
{
    tracks
        .into_iter()
        .map(|t| {
            let dwell_frames = (t.last_frame - t.first_frame + 1).max(1);
            let avg_speed_px_per_frame = if dwell_frames > 1 {
                t.path_length / (dwell_frames - 1) as f32
            } else {
                0.0
            };

            TrackSummary {
                id: t.id,
                dwell_frames,
                path_length_px: t.path_length,
                avg_speed_px_per_frame,
            }
        })
        .collect()
}

/// One row per track, values to three decimals. A positive `fps` adds the
/// seconds-based columns. The parent directory is created if absent.
pub(crate) fn export_csv(
    path: &Path,
    summaries: &[TrackSummary],
    fps: Option<f32>,
) -> Result<PathBuf, Error> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let fps = fps.filter(|f| *f > 0.0);
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["id", "dwell_frames", "path_length_px", "avg_speed_px_per_frame"];
    if fps.is_some() {
        header.extend(["dwell_seconds", "avg_speed_px_per_second"]);
    }
    writer.write_record(&header)?;

    for s in summaries {
        let mut row = vec![
            s.id.to_string(),
            s.dwell_frames.to_string(),
            format!("{:.3}", s.path_length_px),
            format!("{:.3}", s.avg_speed_px_per_frame),
        ];

        if let Some(fps) = fps {
            row.push(format!("{:.3}", s.dwell_seconds(fps)));
            row.push(format!("{:.3}", s.avg_speed_px_per_second(fps)));
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::kalman::KalmanFilter;

    fn sample_track(id: u32, first: u64, last: u64, path_length: f32) -> Track {
        let kf = KalmanFilter::new();
        let mut t = Track::new(id, &kf, BBox::new(0, 0, 10, 10), first);
        t.last_frame = last;
        t.path_length = path_length;
        t
    }

    #[test]
    fn summarize_computes_dwell_and_speed() {
        let tracks = [sample_track(1, 0, 10, 100.0), sample_track(2, 5, 5, 0.0)];

        let summaries = summarize(tracks.iter());

        assert_eq!(summaries[0].dwell_frames, 11);
        assert_eq!(summaries[0].avg_speed_px_per_frame, 10.0);

        // single-frame track: dwell 1, speed 0
        assert_eq!(summaries[1].dwell_frames, 1);
        assert_eq!(summaries[1].avg_speed_px_per_frame, 0.0);
    }

    #[test]
    fn seconds_conversion() {
        let s = TrackSummary {
            id: 1,
            dwell_frames: 11,
            path_length_px: 100.0,
            avg_speed_px_per_frame: 10.0,
        };

        assert!((s.dwell_seconds(10.0) - 1.1).abs() < 1e-6);
        assert!((s.avg_speed_px_per_second(10.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn export_writes_rows_and_creates_dirs() {
        let dir = std::env::temp_dir()
            .join(format!("cvtrack-export-{}", std::process::id()))
            .join("nested");
        let path = dir.join("summaries.csv");

        let summaries = summarize([sample_track(1, 0, 10, 100.0)].iter());
        let written = export_csv(&path, &summaries, Some(10.0)).unwrap();

        let contents = fs::read_to_string(&written).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,dwell_frames,path_length_px,avg_speed_px_per_frame,dwell_seconds,avg_speed_px_per_second"
        );
        assert_eq!(lines.next().unwrap(), "1,11,100.000,10.000,1.100,100.000");

        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn export_without_fps_skips_seconds_columns() {
        let path = std::env::temp_dir().join(format!("cvtrack-nofps-{}.csv", std::process::id()));

        let summaries = summarize([sample_track(3, 2, 4, 6.0)].iter());
        export_csv(&path, &summaries, None).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,dwell_frames,path_length_px,avg_speed_px_per_frame"
        );
        assert_eq!(lines.next().unwrap(), "3,3,6.000,3.000");

        fs::remove_file(&path).ok();
    }
}
