//! The global coordinate system: named segments laid end to end on one axis.
//!
//! ```text
//!   0          1000  1010       1510
//!   |--- "1" ---|pad|--- "2" ---|
//! ```
//!
//! Segment extents are right-open `[start, end)`, except the last segment,
//! which also owns `total_size` itself. Points in a padding gap
//! `[end, next_start)` belong to no segment.

use std::collections::HashMap;

use genoview_protocol::{Interval, SegmentId};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub size: u64,
}

/// A position expressed relative to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub segment: SegmentId,
    pub offset: u64,
}

/// One segment's visible part of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSegment {
    /// Position of the segment in coordinate-system order.
    pub index: usize,
    pub id: SegmentId,
    /// Clipped extent on the global axis.
    pub global: Interval<f64>,
    /// The same extent in segment-local units.
    pub local: Interval<f64>,
}

/// Immutable once built. Shared read-only by every downstream component.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordSys {
    segments: Vec<Segment>,
    /// Global start of each segment, strictly increasing.
    starts: Vec<u64>,
    index: HashMap<SegmentId, usize>,
    padding: u64,
    total: u64,
}

impl CoordSys {
    /// Lay `segments` out in the given order with `padding` units between
    /// neighbours.
    pub fn build<I, S>(segments: I, padding: u64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<SegmentId>,
    {
        let mut laid_out = Vec::new();
        let mut starts = Vec::new();
        let mut index = HashMap::new();
        let mut cursor: u64 = 0;

        for (i, (id, size)) in segments.into_iter().enumerate() {
            let id: SegmentId = id.into();
            if size <= 0 {
                return Err(ConfigError::NonPositiveSize { id, size });
            }
            if index.insert(id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateSegment(id));
            }
            if i > 0 {
                cursor += padding;
            }
            starts.push(cursor);
            let size = size as u64;
            cursor += size;
            laid_out.push(Segment { id, size });
        }

        if laid_out.is_empty() {
            return Err(ConfigError::EmptySegments);
        }

        Ok(Self {
            segments: laid_out,
            starts,
            index,
            padding,
            total: cursor,
        })
    }

    pub fn total_size(&self) -> u64 {
        self.total
    }

    pub fn padding(&self) -> u64 {
        self.padding
    }

    /// The whole axis as a view.
    pub fn full_view(&self) -> Interval<f64> {
        Interval::new(0.0, self.total as f64)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Global extent of a segment.
    pub fn segment_range(&self, id: &str) -> Option<Interval<u64>> {
        self.index_of(id).map(|i| self.range_at(i))
    }

    fn range_at(&self, i: usize) -> Interval<u64> {
        let start = self.starts[i];
        Interval::new(start, start + self.segments[i].size)
    }

    fn is_last(&self, i: usize) -> bool {
        i + 1 == self.segments.len()
    }

    /// Which segment holds `global`, and where inside it.
    ///
    /// `None` for points in a padding gap or past the end of the axis.
    pub fn segment_at(&self, global: u64) -> Option<Locus> {
        if global > self.total {
            return None;
        }
        let i = self.starts.partition_point(|&s| s <= global).checked_sub(1)?;
        let range = self.range_at(i);
        let inside = global < range.high || (global == range.high && self.is_last(i));
        inside.then(|| Locus {
            segment: self.segments[i].id.clone(),
            offset: global - range.low,
        })
    }

    /// [`segment_at`](Self::segment_at) for a fractional global position,
    /// e.g. one recovered from a pixel click.
    pub fn segment_at_point(&self, global: f64) -> Option<Locus> {
        if !global.is_finite() || global < 0.0 {
            return None;
        }
        self.segment_at(global.floor() as u64)
    }

    /// Inverse of [`segment_at`](Self::segment_at).
    pub fn global_offset_of(&self, id: &str, offset: u64) -> Option<u64> {
        let i = self.index_of(id)?;
        let size = self.segments[i].size;
        let valid = offset < size || (offset == size && self.is_last(i));
        valid.then(|| self.starts[i] + offset)
    }

    /// Every segment intersecting `view`, in segment order, with its clipped
    /// global and local extents.
    pub fn visible_segments(&self, view: Interval<f64>) -> Vec<VisibleSegment> {
        if view.is_empty() {
            return Vec::new();
        }
        // Last segment starting at or before the view start.
        let first = self
            .starts
            .partition_point(|&s| s as f64 <= view.low)
            .saturating_sub(1);

        let mut visible = Vec::new();
        for i in first..self.segments.len() {
            let extent = self.range_at(i).to_f64();
            if extent.low >= view.high {
                break;
            }
            if extent.high <= view.low {
                continue;
            }
            if let Some(global) = extent.intersect(&view) {
                visible.push(VisibleSegment {
                    index: i,
                    id: self.segments[i].id.clone(),
                    global,
                    local: global.translate(-extent.low),
                });
            }
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_chromosomes() -> CoordSys {
        CoordSys::build([("1", 1000), ("2", 500)], 10).unwrap()
    }

    #[test]
    fn total_size_includes_padding() {
        assert_eq!(two_chromosomes().total_size(), 1510);
    }

    #[test]
    fn lookup_scenario() {
        let cs = two_chromosomes();
        assert_eq!(
            cs.segment_at(999),
            Some(Locus {
                segment: "1".into(),
                offset: 999
            })
        );
        assert_eq!(cs.segment_at(1005), None);
        assert_eq!(
            cs.segment_at(1010),
            Some(Locus {
                segment: "2".into(),
                offset: 0
            })
        );
    }

    #[test]
    fn boundaries_are_right_open_except_last() {
        let cs = two_chromosomes();
        assert_eq!(cs.segment_at(1000), None);
        assert_eq!(cs.segment_at(1510).map(|l| l.offset), Some(500));
        assert_eq!(cs.segment_at(1511), None);
    }

    #[test]
    fn zero_padding_hands_boundary_to_next_segment() {
        let cs = CoordSys::build([("a", 10), ("b", 10)], 0).unwrap();
        assert_eq!(cs.segment_at(10).map(|l| l.segment), Some("b".into()));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            CoordSys::build(Vec::<(&str, i64)>::new(), 0),
            Err(ConfigError::EmptySegments)
        ));
        assert!(matches!(
            CoordSys::build([("1", 10), ("2", 0)], 0),
            Err(ConfigError::NonPositiveSize { size: 0, .. })
        ));
        assert!(matches!(
            CoordSys::build([("1", 10), ("1", 5)], 0),
            Err(ConfigError::DuplicateSegment(_))
        ));
    }

    #[test]
    fn global_offset_of_validates_offset() {
        let cs = two_chromosomes();
        assert_eq!(cs.global_offset_of("2", 0), Some(1010));
        assert_eq!(cs.global_offset_of("1", 1000), None);
        assert_eq!(cs.global_offset_of("2", 500), Some(1510));
        assert_eq!(cs.global_offset_of("3", 0), None);
    }

    #[test]
    fn visible_segments_clip_to_view() {
        let cs = two_chromosomes();
        let vis = cs.visible_segments(Interval::new(900.0, 1100.0));
        assert_eq!(vis.len(), 2);
        assert_eq!(vis[0].id, "1");
        assert_eq!(vis[0].global, Interval::new(900.0, 1000.0));
        assert_eq!(vis[0].local, Interval::new(900.0, 1000.0));
        assert_eq!(vis[1].id, "2");
        assert_eq!(vis[1].global, Interval::new(1010.0, 1100.0));
        assert_eq!(vis[1].local, Interval::new(0.0, 90.0));
    }

    #[test]
    fn view_inside_padding_sees_nothing() {
        let cs = two_chromosomes();
        assert!(cs.visible_segments(Interval::new(1001.0, 1009.0)).is_empty());
    }

    #[test]
    fn visible_segments_start_past_earlier_segments() {
        let cs = CoordSys::build([("1", 100), ("2", 100), ("3", 100), ("4", 100)], 10).unwrap();
        // starts at the exact end of segment 2
        let ids: Vec<String> = cs
            .visible_segments(Interval::new(210.0, 340.0))
            .into_iter()
            .map(|v| v.id.to_string())
            .collect();
        assert_eq!(ids, ["3", "4"]);
        let last = cs.visible_segments(Interval::new(335.0, 430.0));
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].index, 3);
        assert_eq!(last[0].local, Interval::new(5.0, 100.0));
    }

    #[test]
    fn segment_at_point_floors() {
        let cs = two_chromosomes();
        assert_eq!(cs.segment_at_point(999.7).map(|l| l.offset), Some(999));
        assert_eq!(cs.segment_at_point(-0.5), None);
        assert_eq!(cs.segment_at_point(f64::NAN), None);
    }

    fn arb_coords() -> impl Strategy<Value = CoordSys> {
        (prop::collection::vec(1i64..5_000, 1..12), 0u64..50).prop_map(|(sizes, padding)| {
            let segs: Vec<(String, i64)> = sizes
                .into_iter()
                .enumerate()
                .map(|(i, s)| (format!("chr{i}"), s))
                .collect();
            CoordSys::build(segs, padding).unwrap()
        })
    }

    proptest! {
        #[test]
        fn total_is_sum_plus_gaps(cs in arb_coords()) {
            let sum: u64 = cs.segments().iter().map(|s| s.size).sum();
            prop_assert_eq!(cs.total_size(), sum + cs.padding() * (cs.len() as u64 - 1));
        }

        #[test]
        fn lookup_round_trips_outside_gaps(cs in arb_coords(), frac in 0.0f64..=1.0) {
            let g = (frac * cs.total_size() as f64).floor() as u64;
            let in_gap = (0..cs.len().saturating_sub(1)).any(|i| {
                let r = cs.range_at(i);
                g >= r.high && g < r.high + cs.padding()
            });
            match cs.segment_at(g) {
                None => prop_assert!(in_gap),
                Some(locus) => {
                    prop_assert!(!in_gap);
                    prop_assert_eq!(cs.global_offset_of(&locus.segment, locus.offset), Some(g));
                }
            }
        }
    }
}
