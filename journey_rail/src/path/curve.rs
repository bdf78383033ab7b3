// path/curve.rs - Open Catmull-Rom rail with arc-length sampling

use serde::{Deserialize, Serialize};

use crate::animation::Vec3;
use crate::error_handling::{Result, SceneError};

/// Knot spacing for the Catmull-Rom segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Uniform knots; segment tangents scaled by the tension parameter
    #[default]
    CatmullRom,
    Centripetal,
    Chordal,
}

/// Cubic `c0 + c1·s + c2·s² + c3·s³` over one segment, all three axes at once
#[derive(Debug, Clone, Copy)]
struct Cubic {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Cubic {
    /// Hermite form from endpoints and endpoint tangents
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: x0 * -3.0 + x1 * 3.0 - t0 * 2.0 - t1,
            c3: x0 * 2.0 - x1 * 2.0 + t0 + t1,
        }
    }

    fn eval(&self, s: f64) -> Vec3 {
        self.c0 + self.c1 * s + self.c2 * (s * s) + self.c3 * (s * s * s)
    }

    fn derivative(&self, s: f64) -> Vec3 {
        self.c1 + self.c2 * (2.0 * s) + self.c3 * (3.0 * s * s)
    }
}

/// Immutable spline through the authored control points.
///
/// `point`/`derivative` take the raw spline parameter. `position_at`/`tangent_at` take an
/// arc-length fraction, resolved through a piecewise-linear length table, so equal steps in
/// `u` are only approximately equal in distance.
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Vec3>,
    kind: CurveKind,
    tension: f64,
    segments: Vec<Cubic>,
    arc_lengths: Vec<f64>,
}

impl Curve {
    pub fn new(points: Vec<Vec3>, kind: CurveKind, tension: f64, arc_divisions: usize) -> Result<Self> {
        if points.len() < 2 {
            return Err(SceneError::TooFewControlPoints { found: points.len() });
        }
        if let Some(index) = points.windows(2).position(|w| w[0].distance(w[1]) < 1e-9) {
            return Err(SceneError::DegenerateSegment { index });
        }
        if !tension.is_finite() || tension < 0.0 {
            return Err(SceneError::InvalidParameter {
                name: "tension",
                reason: format!("{tension} must be a finite non-negative number"),
            });
        }
        if arc_divisions == 0 {
            return Err(SceneError::InvalidParameter {
                name: "arc_length_divisions",
                reason: "must be at least 1".to_string(),
            });
        }

        let segments = (0..points.len() - 1)
            .map(|i| build_segment(&points, i, kind, tension))
            .collect();

        let mut curve = Self {
            points,
            kind,
            tension,
            segments,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.measure(arc_divisions);
        Ok(curve)
    }

    fn measure(&self, divisions: usize) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut prev = self.point(0.0);
        let mut total = 0.0;
        lengths.push(0.0);
        for i in 1..=divisions {
            let p = self.point(i as f64 / divisions as f64);
            total += prev.distance(p);
            lengths.push(total);
            prev = p;
        }
        lengths
    }

    /// Segment index and local parameter for raw `t`
    fn locate(&self, t: f64) -> (usize, f64) {
        let t = t.clamp(0.0, 1.0);
        let last = self.segments.len();
        let scaled = t * last as f64;
        let index = scaled.floor() as usize;
        if index >= last {
            (last - 1, 1.0)
        } else {
            (index, scaled - index as f64)
        }
    }

    /// Position at raw spline parameter `t`
    pub fn point(&self, t: f64) -> Vec3 {
        let (i, s) = self.locate(t);
        self.segments[i].eval(s)
    }

    /// d(point)/d(local segment parameter) at raw `t`
    pub fn derivative(&self, t: f64) -> Vec3 {
        let (i, s) = self.locate(t);
        self.segments[i].derivative(s)
    }

    /// Unit direction at raw `t`; falls back to the segment chord where the derivative vanishes.
    pub fn tangent(&self, t: f64) -> Vec3 {
        let d = self.derivative(t);
        if d.length_squared() > 1e-18 {
            return d.normalize();
        }
        let (i, _) = self.locate(t);
        (self.points[i + 1] - self.points[i]).normalize()
    }

    /// Map an arc-length fraction `u` to the raw parameter
    pub fn u_to_t(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        let total = self.length();
        let last = self.arc_lengths.len() - 1;
        if total <= 0.0 {
            return u;
        }

        let target = u * total;
        let i = self.arc_lengths.partition_point(|&l| l <= target).saturating_sub(1);
        if i >= last {
            return 1.0;
        }

        let before = self.arc_lengths[i];
        let span = self.arc_lengths[i + 1] - before;
        let fraction = if span > 0.0 { (target - before) / span } else { 0.0 };
        (i as f64 + fraction) / last as f64
    }

    /// Position at arc-length fraction `u`
    pub fn position_at(&self, u: f64) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length fraction `u`
    pub fn tangent_at(&self, u: f64) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Approximate total length (sum of the measured chords)
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }
}

/// Open-ended neighbours are mirrored through the end point.
fn build_segment(points: &[Vec3], i: usize, kind: CurveKind, tension: f64) -> Cubic {
    let n = points.len();
    let p1 = points[i];
    let p2 = points[i + 1];
    let p0 = if i > 0 { points[i - 1] } else { p1 * 2.0 - p2 };
    let p3 = if i + 2 < n { points[i + 2] } else { p2 * 2.0 - p1 };

    let exponent = match kind {
        CurveKind::CatmullRom => {
            return Cubic::hermite(p1, p2, (p2 - p0) * tension, (p3 - p1) * tension);
        }
        CurveKind::Centripetal => 0.25,
        CurveKind::Chordal => 0.5,
    };

    let mut dt1 = p1.distance(p2).powi(2).powf(exponent);
    let mut dt0 = p0.distance(p1).powi(2).powf(exponent);
    let mut dt2 = p2.distance(p3).powi(2).powf(exponent);
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let t1 = ((p1 - p0) * (1.0 / dt0) - (p2 - p0) * (1.0 / (dt0 + dt1)) + (p2 - p1) * (1.0 / dt1)) * dt1;
    let t2 = ((p2 - p1) * (1.0 / dt1) - (p3 - p1) * (1.0 / (dt1 + dt2)) + (p3 - p2) * (1.0 / dt2)) * dt1;
    Cubic::hermite(p1, p2, t1, t2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn rail() -> Curve {
        let points = vec![
            Vec3::new(0.0, 1.4, 12.0),
            Vec3::new(1.0, 1.8, 6.0),
            Vec3::new(-1.0, 1.2, 2.0),
            Vec3::new(3.0, 1.5, -2.0),
            Vec3::new(2.0, 1.8, -6.0),
        ];
        Curve::new(points, CurveKind::CatmullRom, 0.5, 200).unwrap()
    }

    #[test]
    fn test_curve_passes_through_control_points() {
        let curve = rail();
        let pts = curve.control_points().to_vec();
        for (i, p) in pts.iter().enumerate() {
            let t = i as f64 / (pts.len() - 1) as f64;
            assert_abs_diff_eq!(curve.point(t).distance(*p), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_arc_length_endpoints() {
        let curve = rail();
        assert_abs_diff_eq!(curve.u_to_t(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.u_to_t(1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.position_at(1.0).distance(Vec3::new(2.0, 1.8, -6.0)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_length_mapping_is_monotonic() {
        let curve = rail();
        let mut last = -1.0;
        for i in 0..=500 {
            let t = curve.u_to_t(i as f64 / 500.0);
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn test_equal_u_steps_cover_similar_distance() {
        let curve = rail();
        // Walk 0.1 of the arc in fine steps so curvature does not shorten the measurement
        let walk = |u: f64| {
            (0..20)
                .map(|k| {
                    let a = u + 0.005 * k as f64;
                    curve.position_at(a).distance(curve.position_at(a + 0.005))
                })
                .sum::<f64>()
        };
        let a = walk(0.05);
        let b = walk(0.6);
        assert!((a - b).abs() / a < 0.02, "{a} vs {b}");
    }

    #[test]
    fn test_straight_two_point_curve() {
        let curve = Curve::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0)],
            CurveKind::CatmullRom,
            0.5,
            100,
        )
        .unwrap();
        assert_abs_diff_eq!(curve.length(), 10.0, epsilon = 1e-6);
        let tangent = curve.tangent_at(0.5);
        assert_abs_diff_eq!(tangent.z, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_control_points() {
        let one = Curve::new(vec![Vec3::zero()], CurveKind::CatmullRom, 0.5, 10);
        assert!(matches!(one, Err(SceneError::TooFewControlPoints { found: 1 })));

        let dup = Curve::new(
            vec![Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            CurveKind::CatmullRom,
            0.5,
            10,
        );
        assert!(matches!(dup, Err(SceneError::DegenerateSegment { index: 1 })));

        let tension = Curve::new(
            vec![Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)],
            CurveKind::CatmullRom,
            f64::NAN,
            10,
        );
        assert!(matches!(tension, Err(SceneError::InvalidParameter { name: "tension", .. })));
    }

    #[test]
    fn test_centripetal_interpolates_endpoints() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.1, 0.0, 3.0),
            Vec3::new(4.0, 0.0, 3.0),
        ];
        for kind in [CurveKind::Centripetal, CurveKind::Chordal] {
            let curve = Curve::new(points.clone(), kind, 0.5, 200).unwrap();
            assert_abs_diff_eq!(curve.point(0.0).distance(points[0]), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(curve.point(1.0).distance(points[3]), 0.0, epsilon = 1e-9);
        }
    }

    proptest! {
        #[test]
        fn prop_tangent_is_unit_length(u in 0.0f64..=1.0) {
            let curve = rail();
            let tangent = curve.tangent_at(u);
            prop_assert!((tangent.length() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_position_is_finite(u in 0.0f64..=1.0) {
            let p = rail().position_at(u);
            prop_assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        }
    }
}
