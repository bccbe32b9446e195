//! Set tree model
//!
//! A [`Training`] owns an ordered list of top-level [`TrainingSet`]s and each
//! set may own sub-sets of the same shape. Top-level sets are positioned by
//! `set_order`, sub-sets by `sub_set_order`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swimlogs_common::{Equipment, StartType};
use uuid::Uuid;

/// Root aggregate of one workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    /// Derived by aggregation, client values are overwritten
    #[serde(default)]
    pub total_distance: i32,
    /// Optimistic concurrency token, required when editing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default)]
    pub sets: Vec<TrainingSet>,
}

/// A repeatable block, either top-level or owned by a parent set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_set_order: Option<i32>,
    pub repeat: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_type: StartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<Equipment>>,
    #[serde(default)]
    pub total_distance: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_sets: Option<Vec<TrainingSet>>,
}

/// Summary of a stored training, returned by writes and listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDetail {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub total_distance: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Columns selected into a [`TrainingDetail`]
pub(crate) const TRAINING_DETAIL_COLUMNS: &str =
    "id, start, duration_min, total_distance, version, created_at, modified_at";

/// Position of a sibling list within the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetLevel {
    /// Sets owned directly by the training, keyed by `set_order`
    Top,
    /// Sets owned by another set, keyed by `sub_set_order`
    Sub,
}

impl SetLevel {
    pub fn from_depth(depth: usize) -> Self {
        if depth == 0 {
            SetLevel::Top
        } else {
            SetLevel::Sub
        }
    }
}

impl TrainingSet {
    pub fn children(&self) -> &[TrainingSet] {
        self.sub_sets.as_deref().unwrap_or_default()
    }

    pub fn children_mut(&mut self) -> &mut [TrainingSet] {
        self.sub_sets.as_deref_mut().unwrap_or_default()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// The ordering field that positions this set among its siblings
    pub fn order_at(&self, level: SetLevel) -> Option<i32> {
        match level {
            SetLevel::Top => self.set_order,
            SetLevel::Sub => self.sub_set_order,
        }
    }
}

/// Where a visited set sits in the tree
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    /// 0 for top-level sets
    pub depth: usize,
    /// Index of the visited set within `siblings`
    pub index: usize,
    pub siblings: &'a [TrainingSet],
    pub parent: Option<&'a TrainingSet>,
}

impl WalkContext<'_> {
    pub fn level(&self) -> SetLevel {
        SetLevel::from_depth(self.depth)
    }
}

impl Training {
    /// Pre-order traversal over every set and sub-set
    pub fn walk<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&'a TrainingSet, WalkContext<'a>),
    {
        walk_sets(&self.sets, None, 0, &mut visitor);
    }

    /// Number of sets at every level
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }
}

fn walk_sets<'a, F>(
    siblings: &'a [TrainingSet],
    parent: Option<&'a TrainingSet>,
    depth: usize,
    visitor: &mut F,
) where
    F: FnMut(&'a TrainingSet, WalkContext<'a>),
{
    for (index, set) in siblings.iter().enumerate() {
        visitor(
            set,
            WalkContext {
                depth,
                index,
                siblings,
                parent,
            },
        );
        walk_sets(set.children(), Some(set), depth + 1, visitor);
    }
}
