//! Parametric space curves and the moving frames used to sweep tubes.

use glam::{Quat, Vec3};

/// Samples taken along a curve when building its arc-length table.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

const TANGENT_DELTA: f32 = 1e-4;

/// A curve in 3D parameterized over `t` in `[0, 1]`.
///
/// Implementors supply [`point`](Self::point) and a cumulative arc-length
/// table; everything arc-length-uniform is derived from those two.
pub trait Curve {
    /// Point at curve parameter `t` (not arc-length uniform).
    fn point(&self, t: f32) -> Vec3;

    /// Cumulative lengths at `ARC_LENGTH_DIVISIONS + 1` evenly spaced `t`.
    fn arc_lengths(&self) -> &[f32];

    /// Total arc length.
    fn length(&self) -> f32 {
        self.arc_lengths().last().copied().unwrap_or(0.0)
    }

    /// Map an arc-length fraction `u` to the curve parameter `t`.
    fn u_to_t(&self, u: f32) -> f32 {
        let lengths = self.arc_lengths();
        let count = lengths.len();
        if count < 2 {
            return u.clamp(0.0, 1.0);
        }

        let target = u.clamp(0.0, 1.0) * lengths[count - 1];
        let i = lengths
            .partition_point(|&l| l <= target)
            .saturating_sub(1)
            .min(count - 2);

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = if segment > 0.0 {
            ((target - before) / segment).clamp(0.0, 1.0)
        } else {
            0.0
        };

        (i as f32 + fraction) / (count - 1) as f32
    }

    /// Point at arc-length fraction `u`.
    fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at curve parameter `t`, by central difference.
    fn tangent(&self, t: f32) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or(Vec3::X)
    }

    /// Unit tangent at arc-length fraction `u`.
    fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Parallel-transport frames at `segments + 1` arc-length-uniform samples.
    ///
    /// The first normal is seeded from the world axis least aligned with the
    /// starting tangent, then carried along with minimal twist. For closed
    /// curves the accumulated twist is spread evenly so the ends agree.
    fn frenet_frames(&self, segments: u32, closed: bool) -> FrenetFrames {
        let segments = segments.max(1) as usize;

        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| self.tangent_at(i as f32 / segments as f32))
            .collect();

        let t0 = tangents[0];
        let abs = t0.abs();
        let mut seed = Vec3::X;
        let mut min = abs.x;
        if abs.y <= min {
            min = abs.y;
            seed = Vec3::Y;
        }
        if abs.z <= min {
            seed = Vec3::Z;
        }

        let side = t0.cross(seed).normalize_or(Vec3::Y);
        let mut normals = Vec::with_capacity(segments + 1);
        let mut binormals = Vec::with_capacity(segments + 1);
        normals.push(t0.cross(side));
        binormals.push(t0.cross(normals[0]));

        for i in 1..=segments {
            let mut normal = normals[i - 1];
            let axis = tangents[i - 1].cross(tangents[i]);
            if axis.length() > f32::EPSILON {
                let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normal = Quat::from_axis_angle(axis.normalize(), theta) * normal;
            }
            normals.push(normal);
            binormals.push(tangents[i].cross(normal));
        }

        if closed {
            let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos()
                / segments as f32;
            if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..=segments {
                normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
                binormals[i] = tangents[i].cross(normals[i]);
            }
        }

        FrenetFrames {
            tangents,
            normals,
            binormals,
        }
    }
}

/// Orthonormal frames sampled along a curve.
#[derive(Clone, Debug)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

/// Centripetal Catmull-Rom spline through a list of control points.
///
/// Open curves extrapolate a phantom point past each end so the spline
/// still starts and ends on the first and last control point.
#[derive(Clone, Debug)]
pub struct CatmullRomCurve3 {
    points: Vec<Vec3>,
    closed: bool,
    arc_lengths: Vec<f32>,
}

impl CatmullRomCurve3 {
    /// Build an open curve through `points`.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self::with_closed(points, false)
    }

    /// Build a curve that optionally wraps from the last point to the first.
    pub fn with_closed(points: Vec<Vec3>, closed: bool) -> Self {
        let mut curve = Self {
            points,
            closed,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = compute_arc_lengths(|t| curve.point(t), ARC_LENGTH_DIVISIONS);
        curve
    }

    /// Control points.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Whether the curve wraps around.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Curve for CatmullRomCurve3 {
    fn point(&self, t: f32) -> Vec3 {
        let points = &self.points;
        let l = points.len();
        match l {
            0 => return Vec3::ZERO,
            1 => return points[0],
            _ => {}
        }

        let span = if self.closed { l } else { l - 1 };
        let p = span as f32 * t.clamp(0.0, 1.0);
        let mut index = p.floor() as usize;
        let mut weight = p - index as f32;

        if self.closed {
            if index >= l {
                index = 0;
                weight = 0.0;
            }
        } else if index >= l - 1 {
            index = l - 2;
            weight = 1.0;
        }

        let p0 = if self.closed || index > 0 {
            points[(index + l - 1) % l]
        } else {
            points[0] * 2.0 - points[1]
        };
        let p1 = points[index % l];
        let p2 = points[(index + 1) % l];
        let p3 = if self.closed || index + 2 < l {
            points[(index + 2) % l]
        } else {
            points[l - 1] * 2.0 - points[l - 2]
        };

        // Centripetal parameterization: knot spacing is sqrt(distance).
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        hermite(p1, p2, m1, m2, weight)
    }

    fn arc_lengths(&self) -> &[f32] {
        &self.arc_lengths
    }
}

/// Cubic Hermite segment from `p1` to `p2` with tangents `m1`, `m2`.
fn hermite(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3, w: f32) -> Vec3 {
    let c2 = p1 * -3.0 + p2 * 3.0 - m1 * 2.0 - m2;
    let c3 = p1 * 2.0 - p2 * 2.0 + m1 + m2;
    p1 + m1 * w + c2 * (w * w) + c3 * (w * w * w)
}

/// Cumulative chord lengths of `point` sampled at `divisions + 1` even steps.
pub fn compute_arc_lengths(point: impl Fn(f32) -> Vec3, divisions: usize) -> Vec<f32> {
    let divisions = divisions.max(1);
    let mut lengths = Vec::with_capacity(divisions + 1);
    let mut previous = point(0.0);
    let mut total = 0.0;
    lengths.push(0.0);
    for step in 1..=divisions {
        let current = point(step as f32 / divisions as f32);
        total += current.distance(previous);
        lengths.push(total);
        previous = current;
    }
    lengths
}
