use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;

/// One detector output: a box plus its score and class label. The tracker
/// matches on the box alone; score and class ride along for downstream
/// consumers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Detection {
    #[serde(flatten)]
    pub bbox: BBox,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,
}

impl Detection {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            confidence: 1.0,
            class: -1,
        }
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_follows_box() {
        let det = Detection::new(BBox::new(10, 10, 20, 20));
        assert_eq!(det.center(), na::Point2::new(20.0, 20.0));
    }
}
