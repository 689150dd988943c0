use crate::error::Error;
use ordered_float::NotNan;
use std::ops::{Add, Mul, Sub};

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub(crate) fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::NanCoordinate(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::NanCoordinate(e, y))?
                .into_inner(),
        })
    }

    #[inline]
    pub(crate) fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub(crate) fn y(self) -> f32 {
        self.y
    }

    #[inline]
    pub(crate) fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub(crate) fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub(crate) fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub(crate) fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Whether `self` and `other` are far enough apart to define a direction.
    pub(crate) fn is_distinct(self, other: Self) -> bool {
        self.distance(other) > f32::EPSILON
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::Output {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Angle at vertex `b`, in degrees, between the segments `b -> a` and `b -> c`.
///
/// The result lies in `[0, 180]`. Both segments must have non-zero length;
/// callers check this with [`Point::is_distinct`] first.
pub(crate) fn joint_angle(a: Point, b: Point, c: Point) -> f32 {
    let u = a - b;
    let v = c - b;
    let cos = (u.dot(v) / (u.length() * v.length())).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Endpoints of a segment through the midpoint of `p1 -> p2`, perpendicular to it.
///
/// The first endpoint lies `length_up` along the baseline rotated by 90 degrees,
/// `(dx, dy) -> (-dy, dx)`, and the second `length_down` in the opposite direction.
/// `p1` and `p2` must be distinct.
pub(crate) fn perpendicular_segment(
    p1: Point,
    p2: Point,
    length_up: f32,
    length_down: f32,
) -> (Point, Point) {
    let mid = p1.midpoint(p2);
    let baseline = p2 - p1;
    let length = baseline.length();
    let normal = Point {
        x: -baseline.y / length,
        y: baseline.x / length,
    };
    (mid + normal * length_up, mid + normal * -length_down)
}
