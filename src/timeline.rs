/*!
Dense morph weight timelines built from blend shape batches.
*/

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    data_mappers::{Mapper, TalkServiceMapper},
    model::{BlendshapeBatch, BlendshapeFrame, MorphTargetTable},
};

/// Weight of any slot that a frame does not set.
pub const NEUTRAL_WEIGHT: f32 = 0.5;

/// Flat per-frame morph target weights.
///
/// The weight of slot `t` in frame `f` lives at `f * target_count + t`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphWeightTimeline {
    target_count: usize,
    weights: Vec<f32>,
}

impl MorphWeightTimeline {
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn frame_count(&self) -> usize {
        if self.target_count == 0 {
            0
        } else {
            self.weights.len() / self.target_count
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.weights
    }

    /// Weights of a single frame.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.target_count)?;
        let end = start.checked_add(self.target_count)?;
        self.weights.get(start..end)
    }
}

/// Turns blend shape batches into [MorphWeightTimeline]s for one morph target table.
///
/// Building is pure and can be shared between threads.
#[derive(Debug, Clone)]
pub struct TimelineBuilder<'a, M = TalkServiceMapper> {
    table: &'a MorphTargetTable,
    mapper: M,
    neutral_weight: f32,
}

impl<'a> TimelineBuilder<'a, TalkServiceMapper> {
    pub fn new(table: &'a MorphTargetTable) -> Self {
        Self {
            table,
            mapper: TalkServiceMapper,
            neutral_weight: NEUTRAL_WEIGHT,
        }
    }
}

impl<'a, M: Mapper> TimelineBuilder<'a, M> {
    pub fn with_mapper<N: Mapper>(self, mapper: N) -> TimelineBuilder<'a, N> {
        TimelineBuilder {
            table: self.table,
            mapper,
            neutral_weight: self.neutral_weight,
        }
    }

    pub fn neutral_weight(mut self, weight: f32) -> Self {
        self.neutral_weight = weight;
        self
    }

    pub fn build(&self, batch: &BlendshapeBatch) -> MorphWeightTimeline {
        let target_count = self.table.len();
        let mut weights = vec![self.neutral_weight; batch.len() * target_count];

        if target_count > 0 {
            weights
                .par_chunks_mut(target_count)
                .zip(batch.frames.par_iter())
                .for_each(|(slots, frame)| self.fill_frame(slots, frame));
        }

        MorphWeightTimeline {
            target_count,
            weights,
        }
    }

    /// Source keys in `batch` that do not resolve to a slot after mapping.
    pub fn unknown_keys<'b>(&self, batch: &'b BlendshapeBatch) -> BTreeSet<&'b str> {
        batch
            .iter()
            .flat_map(|frame| frame.iter())
            .map(|(key, _)| key)
            .filter(|key| self.table.index_of(&self.mapper.map_name(key)).is_none())
            .collect()
    }

    fn fill_frame(&self, slots: &mut [f32], frame: &BlendshapeFrame) {
        for (key, weight) in frame.iter() {
            if let Some(idx) = self.table.index_of(&self.mapper.map_name(key)) {
                slots[idx] = weight;
            }
        }
    }
}

/// Build a timeline with the talk service naming and the default neutral weight.
pub fn build_timeline(batch: &BlendshapeBatch, table: &MorphTargetTable) -> MorphWeightTimeline {
    TimelineBuilder::new(table).build(batch)
}
