// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relation groups and FSR unification.
//!
//! Layers that declare a relation are visually linked: their fail-safe
//! margins and usable areas must agree or their plots drift out of
//! alignment. Unification takes the most conservative value across the
//! group — the maximum of every margin field and the minimum of every area
//! field — so no member's labels get clipped and all members share one
//! plotting width. Running unification twice is a no-op.

use crate::config::RelSpec;
use crate::layer::Layer;

/// The declared relation groups of a figure: a lookup table from any
/// member id to its full group.
#[derive(Clone, Debug, Default)]
pub struct RelationTable {
    groups: Vec<Vec<String>>,
}

impl RelationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a layer's relation declaration.
    ///
    /// A single partner id becomes a two-member group; an explicit list
    /// that does not contain the declaring layer's own id has it appended.
    pub fn declare(&mut self, own_id: &str, rel: &RelSpec) {
        match rel {
            RelSpec::None => {}
            RelSpec::Partner(partner) => {
                self.groups.push(vec![partner.clone(), own_id.to_owned()]);
            }
            RelSpec::Group(ids) => {
                let mut group = ids.clone();
                if !group.iter().any(|i| i == own_id) {
                    group.push(own_id.to_owned());
                }
                self.groups.push(group);
            }
        }
    }

    /// The full group containing `id`, or `None` if it belongs to no group.
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.iter().any(|i| i == id))
            .map(Vec::as_slice)
    }

    /// All declared groups.
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }
}

/// The most conservative FSR values across a group.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FsrAggregate {
    margin_left: f64,
    margin_right: f64,
    area_x: f64,
    safe_margin: crate::fsr::SafeMargin,
    safe_area: crate::fsr::SafeArea,
}

/// Computes max-margins / min-areas over the given layers.
pub(crate) fn aggregate<'a>(layers: impl Iterator<Item = &'a Layer>) -> Option<FsrAggregate> {
    let mut agg: Option<FsrAggregate> = None;
    for layer in layers {
        let next = FsrAggregate {
            margin_left: layer.margin.left,
            margin_right: layer.margin.right,
            area_x: layer.area.x,
            safe_margin: layer.safe.margin,
            safe_area: layer.safe.area,
        };
        agg = Some(match agg {
            None => next,
            Some(a) => FsrAggregate {
                margin_left: a.margin_left.max(next.margin_left),
                margin_right: a.margin_right.max(next.margin_right),
                area_x: a.area_x.min(next.area_x),
                safe_margin: crate::fsr::SafeMargin {
                    top: a.safe_margin.top.max(next.safe_margin.top),
                    left: a.safe_margin.left.max(next.safe_margin.left),
                    right: a.safe_margin.right.max(next.safe_margin.right),
                    bottom: a.safe_margin.bottom.max(next.safe_margin.bottom),
                    z: a.safe_margin.z.max(next.safe_margin.z),
                },
                safe_area: crate::fsr::SafeArea {
                    x: a.safe_area.x.min(next.safe_area.x),
                    y: a.safe_area.y.min(next.safe_area.y),
                    z: a.safe_area.z.min(next.safe_area.z),
                },
            },
        });
    }
    agg
}

/// Writes the aggregate back into a layer.
pub(crate) fn apply(agg: &FsrAggregate, layer: &mut Layer) {
    layer.margin.left = agg.margin_left;
    layer.margin.right = agg.margin_right;
    layer.area.x = agg.area_x;
    layer.safe.margin = agg.safe_margin;
    layer.safe.area = agg.safe_area;
}
