// path/markers.rs - Static placement of objects anchored to the rail

use std::sync::Arc;

use serde::Serialize;

use crate::animation::{Color, Quat, Vec3};
use crate::sections::SectionRegistry;
use super::{Curve, FrameTable};

/// Pose of an object fixed at one rail parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMarker {
    pub section_id: Arc<str>,
    pub anchor: f64,
    pub position: Vec3,
    pub orientation: Quat,
    pub accent: Color,
}

/// Pose at `anchor`: position from the curve, orientation from the nearest table frame.
pub fn place_at(curve: &Curve, frames: &FrameTable, anchor: f64) -> (Vec3, Quat) {
    let anchor = anchor.clamp(0.0, 1.0);
    (curve.position_at(anchor), frames.frame_at(anchor).rotation())
}

/// One marker per section, anchored at the section midpoint.
pub fn section_markers(curve: &Curve, frames: &FrameTable, sections: &SectionRegistry) -> Vec<PathMarker> {
    sections
        .iter()
        .map(|section| {
            let anchor = section.midpoint();
            let (position, orientation) = place_at(curve, frames, anchor);
            PathMarker {
                section_id: section.id.clone(),
                anchor,
                position,
                orientation,
                accent: section.environment.accent,
            }
        })
        .collect()
}
