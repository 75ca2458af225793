//! Episode index model
//!
//! Per-isolate episode metadata produced by segmentation: which bloodstream
//! infection episode an isolate belongs to, whether it is the episode's index
//! isolate, and the per-group aggregates downstream reporting merges back
//! onto the antibiogram matrix.

use crate::error::{AntibiogramError, Result};
use arrow::array::{ArrayRef, BooleanArray, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Episode metadata for one isolate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeAnnotation {
    /// Lab-assigned isolate identifier
    pub isolate_id: String,
    /// Patient part of the group key
    pub patient_id: String,
    /// Organism part of the group key
    pub organism: String,
    /// 1-based episode number, contiguous within the group
    pub episode_number: u32,
    /// True for exactly one isolate per episode, the chronologically first
    pub is_index_isolate: bool,
    /// Distinct isolate identifiers in this episode
    pub isolates_in_episode: u32,
    /// Highest episode number in the (patient, organism) group
    pub total_episodes_for_group: u32,
}

/// Collection of episode annotations in (patient, organism, collection
/// order), with lookup by isolate identifier
#[derive(Debug, Clone, Default)]
pub struct EpisodeIndex {
    annotations: Vec<EpisodeAnnotation>,
    by_isolate: FxHashMap<String, usize>,
}

impl EpisodeIndex {
    /// Build an index from annotations already in group/collection order
    ///
    /// When the same isolate identifier appears on several rows of a group,
    /// lookup resolves to its first annotation.
    #[must_use]
    pub fn from_annotations(annotations: Vec<EpisodeAnnotation>) -> Self {
        let mut by_isolate = FxHashMap::default();
        for (idx, annotation) in annotations.iter().enumerate() {
            by_isolate
                .entry(annotation.isolate_id.clone())
                .or_insert(idx);
        }
        Self {
            annotations,
            by_isolate,
        }
    }

    /// Annotations in (patient, organism, collection order)
    #[must_use]
    pub fn annotations(&self) -> &[EpisodeAnnotation] {
        &self.annotations
    }

    /// Look up the annotation for an isolate identifier
    #[must_use]
    pub fn get(&self, isolate_id: &str) -> Option<&EpisodeAnnotation> {
        self.by_isolate
            .get(isolate_id)
            .map(|&idx| &self.annotations[idx])
    }

    /// Annotations belonging to one (patient, organism) group
    #[must_use]
    pub fn group(&self, patient_id: &str, organism: &str) -> Vec<&EpisodeAnnotation> {
        self.annotations
            .iter()
            .filter(|a| a.patient_id == patient_id && a.organism == organism)
            .collect()
    }

    /// Total number of episodes for a (patient, organism) group, if present
    #[must_use]
    pub fn total_episodes(&self, patient_id: &str, organism: &str) -> Option<u32> {
        self.annotations
            .iter()
            .find(|a| a.patient_id == patient_id && a.organism == organism)
            .map(|a| a.total_episodes_for_group)
    }

    /// Number of annotated isolates
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the index holds no annotations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Get the Arrow schema for the episode index table
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("isolate_id", DataType::Utf8, false),
            Field::new("patient_id", DataType::Utf8, false),
            Field::new("organism", DataType::Utf8, false),
            Field::new("episode_number", DataType::UInt32, false),
            Field::new("is_index_isolate", DataType::Boolean, false),
            Field::new("isolates_in_episode", DataType::UInt32, false),
            Field::new("total_episodes_for_group", DataType::UInt32, false),
        ])
    }

    /// Convert the index to a flat Arrow `RecordBatch`
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.isolate_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.patient_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.organism.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.episode_number))
                    .collect::<UInt32Array>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.is_index_isolate))
                    .collect::<BooleanArray>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.isolates_in_episode))
                    .collect::<UInt32Array>(),
            ),
            Arc::new(
                self.annotations
                    .iter()
                    .map(|a| Some(a.total_episodes_for_group))
                    .collect::<UInt32Array>(),
            ),
        ];
        RecordBatch::try_new(Arc::new(Self::schema()), columns)
            .map_err(|e| AntibiogramError::schema(format!("Failed to build episode batch: {e}")))
    }
}
