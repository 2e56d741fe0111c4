use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Left-top-width-height pixel rectangle, as produced by the detector.
/// A valid box has non-negative width and height; zero-area boxes are
/// allowed and simply never overlap anything.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BBox {
    #[inline]
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline(always)]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline(always)]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.w.max(0) as i64 * self.h.max(0) as i64
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.w < 0 || self.h < 0 {
            return Err(Error::InvalidBox(*self));
        }

        Ok(())
    }

    /// Same-size box re-centered at `center`, origin truncated to whole
    /// pixels and clamped so the box stays inside a `frame_w` x `frame_h`
    /// frame.
    pub fn centered_at(&self, center: na::Point2<f32>, frame_w: u32, frame_h: u32) -> BBox {
        let px = (center.x - self.w as f32 / 2.0) as i32;
        let py = (center.y - self.h as f32 / 2.0) as i32;

        BBox {
            x: px.min(frame_w as i32 - self.w).max(0),
            y: py.min(frame_h as i32 - self.h).max(0),
            w: self.w,
            h: self.h,
        }
    }

    /// Intersection over union. Zero for disjoint boxes and whenever either
    /// box has non-positive area.
    pub fn iou(&self, other: &BBox) -> f32 {
        let ix = self.x.max(other.x);
        let iy = self.y.max(other.y);
        let iw = (self.right().min(other.right()) - ix).max(0) as i64;
        let ih = (self.bottom().min(other.bottom()) - iy).max(0) as i64;

        let inter = iw * ih;
        if inter <= 0 {
            return 0.0;
        }

        let union = self.area() + other.area() - inter;
        if union <= 0 {
            return 0.0;
        }

        inter as f32 / union as f32
    }
}
