//! Typed feature records handed to the browser by the data layer.

use std::collections::BTreeMap;

use genoview_protocol::{Interval, SegmentId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::coords::CoordSys;

/// Fields a record carries beyond position and payload, read back through
/// typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(BTreeMap<String, Value>);

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) -> serde_json::Result<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// `None` when the key is absent or holds a value of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| T::deserialize(v).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    /// Global position.
    pub position: u64,
    pub payload: P,
    #[serde(default)]
    pub extra: Extras,
}

/// A feature as the data layer knows it: relative to its segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord<P> {
    pub segment: SegmentId,
    pub offset: u64,
    pub payload: P,
    #[serde(default)]
    pub extra: Extras,
}

/// Features of one track grouped by segment, each group sorted by position.
#[derive(Debug, Clone)]
pub struct FeatureSet<P> {
    /// Indexed like the segments of the coordinate system.
    groups: Vec<Vec<Feature<P>>>,
}

impl<P> FeatureSet<P> {
    /// Resolve records against `coords`. Records naming an unknown segment or
    /// an offset past the segment end are dropped and counted in the
    /// returned total.
    pub fn build(coords: &CoordSys, records: impl IntoIterator<Item = FeatureRecord<P>>) -> (Self, usize) {
        let mut groups: Vec<Vec<Feature<P>>> = (0..coords.len()).map(|_| Vec::new()).collect();
        let mut dropped = 0;
        for r in records {
            let placed = coords
                .index_of(&r.segment)
                .zip(coords.global_offset_of(&r.segment, r.offset));
            match placed {
                Some((i, position)) => groups[i].push(Feature {
                    position,
                    payload: r.payload,
                    extra: r.extra,
                }),
                None => dropped += 1,
            }
        }
        for g in &mut groups {
            g.sort_by_key(|f| f.position);
        }
        if dropped > 0 {
            tracing::warn!(dropped, "features outside the coordinate system were skipped");
        }
        (Self { groups }, dropped)
    }

    pub fn segment(&self, index: usize) -> &[Feature<P>] {
        self.groups.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// Every feature in segment order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature<P>> {
        self.groups.iter().flatten()
    }

    /// Features with a position in the right-open global `range`.
    pub fn in_range(&self, range: Interval<f64>) -> impl Iterator<Item = &Feature<P>> {
        self.groups.iter().flat_map(move |g| {
            let lo = g.partition_point(|f| (f.position as f64) < range.low);
            let hi = g.partition_point(|f| (f.position as f64) < range.high);
            g[lo..hi.max(lo)].iter()
        })
    }
}

/// Bounded channel for streaming feature records in chunks.
///
/// A producer blocks once `bound` chunks are waiting. Dropping the
/// [`FeatureLoader`] cancels the stream: further sends fail.
pub fn feature_channel<P>(bound: usize) -> (mpsc::Sender<Vec<FeatureRecord<P>>>, FeatureLoader<P>) {
    let (tx, rx) = mpsc::channel(bound.max(1));
    (tx, FeatureLoader { rx })
}

#[derive(Debug)]
pub struct FeatureLoader<P> {
    rx: mpsc::Receiver<Vec<FeatureRecord<P>>>,
}

impl<P> FeatureLoader<P> {
    /// Drain every chunk until all senders are gone, then build the set.
    pub async fn collect(mut self, coords: &CoordSys) -> (FeatureSet<P>, usize) {
        let mut records = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = self.rx.recv().await {
            chunks += 1;
            records.extend(chunk);
        }
        tracing::debug!(chunks, records = records.len(), "feature stream finished");
        FeatureSet::build(coords, records)
    }
}
