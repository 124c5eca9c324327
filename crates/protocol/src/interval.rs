use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// An ordered pair `[low, high)` over a numeric domain.
///
/// Every spatial computation in the browser goes through this type: views
/// over the global axis, segment extents, pixel ranges, label spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Interval<T> {
    pub low: T,
    pub high: T,
}

impl<T: Copy + PartialOrd> Interval<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    /// Build from two endpoints in either order.
    pub fn spanning(a: T, b: T) -> Self {
        if a <= b { Self::new(a, b) } else { Self::new(b, a) }
    }

    pub fn is_empty(&self) -> bool {
        self.low >= self.high
    }

    /// Right-open membership.
    pub fn contains(&self, v: T) -> bool {
        self.low <= v && v < self.high
    }

    pub fn contains_closed(&self, v: T) -> bool {
        self.low <= v && v <= self.high
    }

    pub fn overlaps(&self, other: &Interval<T>) -> bool {
        self.low < other.high && other.low < self.high
    }

    pub fn intersect(&self, other: &Interval<T>) -> Option<Interval<T>> {
        let low = if self.low >= other.low { self.low } else { other.low };
        let high = if self.high <= other.high { self.high } else { other.high };
        (low < high).then_some(Interval::new(low, high))
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Interval<U> {
        Interval {
            low: f(self.low),
            high: f(self.high),
        }
    }
}

impl<T: Copy + Sub<Output = T>> Interval<T> {
    pub fn size(&self) -> T {
        self.high - self.low
    }
}

impl<T: Copy + Add<Output = T>> Interval<T> {
    pub fn translate(&self, by: T) -> Interval<T> {
        Interval {
            low: self.low + by,
            high: self.high + by,
        }
    }
}

impl Interval<f64> {
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Multiply both endpoints by `k`.
    pub fn scale(&self, k: f64) -> Interval<f64> {
        Interval::new(self.low * k, self.high * k)
    }

    /// Keep the center, multiply the width by `factor`.
    pub fn scale_around_center(&self, factor: f64) -> Interval<f64> {
        self.with_width_centered(self.size() * factor)
    }

    pub fn with_width_centered(&self, width: f64) -> Interval<f64> {
        let c = self.center();
        Interval::new(c - width / 2.0, c + width / 2.0)
    }

    /// Value at fraction `t` of the way from `low` to `high`.
    pub fn lerp(&self, t: f64) -> f64 {
        self.low + t * self.size()
    }

    /// Inverse of [`lerp`](Self::lerp). `None` for a zero-width interval.
    pub fn fraction_of(&self, v: f64) -> Option<f64> {
        let size = self.size();
        (size != 0.0).then(|| (v - self.low) / size)
    }

    /// Shift inward so the interval lies within `bounds`, preserving width
    /// when it fits and collapsing to `bounds` when it does not.
    pub fn shift_into(&self, bounds: &Interval<f64>) -> Interval<f64> {
        let width = self.size();
        if width >= bounds.size() {
            return *bounds;
        }
        if self.low < bounds.low {
            Interval::new(bounds.low, bounds.low + width)
        } else if self.high > bounds.high {
            Interval::new(bounds.high - width, bounds.high)
        } else {
            *self
        }
    }
}

impl Interval<u64> {
    pub fn to_f64(self) -> Interval<f64> {
        self.map(|v| v as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_center() {
        let i = Interval::new(10.0, 30.0);
        assert_eq!(i.size(), 20.0);
        assert_eq!(i.center(), 20.0);
    }

    #[test]
    fn overlap_is_right_open() {
        let a = Interval::new(0u64, 10);
        assert!(!a.overlaps(&Interval::new(10, 20)));
        assert!(a.overlaps(&Interval::new(9, 20)));
        assert_eq!(a.intersect(&Interval::new(5, 20)), Some(Interval::new(5, 10)));
        assert_eq!(a.intersect(&Interval::new(10, 20)), None);
    }

    #[test]
    fn scale_around_center_keeps_center() {
        let i = Interval::new(0.0, 1510.0).scale_around_center(0.5);
        assert_eq!(i, Interval::new(377.5, 1132.5));
    }

    #[test]
    fn lerp_and_fraction_are_inverse() {
        let i = Interval::new(100.0, 300.0);
        assert_eq!(i.lerp(0.25), 150.0);
        assert_eq!(i.fraction_of(150.0), Some(0.25));
        assert_eq!(Interval::new(5.0, 5.0).fraction_of(5.0), None);
    }

    #[test]
    fn shift_into_preserves_width() {
        let bounds = Interval::new(0.0, 100.0);
        assert_eq!(Interval::new(-10.0, 20.0).shift_into(&bounds), Interval::new(0.0, 30.0));
        assert_eq!(Interval::new(90.0, 120.0).shift_into(&bounds), Interval::new(70.0, 100.0));
        assert_eq!(Interval::new(-10.0, 200.0).shift_into(&bounds), bounds);
    }

    #[test]
    fn spanning_orders_endpoints() {
        assert_eq!(Interval::spanning(5, 2), Interval::new(2, 5));
    }
}
