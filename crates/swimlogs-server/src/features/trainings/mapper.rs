//! Flattening the set tree into rows and rebuilding it
//!
//! Top-level sets and sub-sets live in the same relation. A sub-set row points
//! at its parent through `parent_set_id` and repeats its top-level ancestor's
//! `set_order`, so reading rows ordered by
//! `set_order, sub_set_order NULLS FIRST` always yields a parent before its
//! children. [`reconstruct`] relies on that order.

use std::collections::{HashMap, HashSet};
use swimlogs_common::{Equipment, StartType};
use tracing::warn;
use uuid::Uuid;

use super::store::SetRowStore;
use super::types::{Training, TrainingSet};

/// One row of the `sets` relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRow {
    pub id: Uuid,
    pub training_id: Uuid,
    pub parent_set_id: Option<Uuid>,
    pub set_order: i32,
    pub sub_set_order: Option<i32>,
    pub repeat: i32,
    pub distance_meters: Option<i32>,
    pub description: Option<String>,
    pub start_type: String,
    pub start_seconds: Option<i32>,
    pub equipment: Option<Vec<String>>,
    pub total_distance: i32,
}

impl SetRow {
    fn into_set(self) -> TrainingSet {
        let top_level = self.parent_set_id.is_none();
        let equipment = self.equipment.map(|names| {
            names
                .iter()
                .filter_map(|name| match name.parse::<Equipment>() {
                    Ok(equipment) => Some(equipment),
                    Err(e) => {
                        warn!(set_id = %self.id, error = %e, "Ignoring stored equipment");
                        None
                    },
                })
                .collect()
        });

        TrainingSet {
            id: Some(self.id),
            set_order: top_level.then_some(self.set_order),
            sub_set_order: if top_level { None } else { self.sub_set_order },
            repeat: self.repeat,
            distance_meters: self.distance_meters,
            description: self.description,
            start_type: StartType::from(self.start_type),
            start_seconds: self.start_seconds,
            equipment,
            total_distance: self.total_distance,
            sub_sets: None,
        }
    }
}

/// Emit one row per set in pre-order
///
/// `assign_id` decides the stored id of every node from the id it carries in
/// the tree. It is called for a parent before any of its children, which then
/// reference the returned id. The tree must have passed validation, so every
/// node has the ordering field of its level.
pub fn flatten<F>(training: &Training, training_id: Uuid, mut assign_id: F) -> Vec<SetRow>
where
    F: FnMut(Option<Uuid>) -> Uuid,
{
    let mut rows = Vec::with_capacity(training.node_count());
    flatten_sets(&training.sets, training_id, None, &mut assign_id, &mut rows);
    rows
}

/// Id of the parent row and the `set_order` of the top-level ancestor
type ParentKey = (Uuid, i32);

fn flatten_sets<F>(
    sets: &[TrainingSet],
    training_id: Uuid,
    parent: Option<ParentKey>,
    assign_id: &mut F,
    rows: &mut Vec<SetRow>,
) where
    F: FnMut(Option<Uuid>) -> Uuid,
{
    for set in sets {
        let id = assign_id(set.id);
        let (parent_set_id, set_order, sub_set_order) = match parent {
            None => (None, set.set_order.unwrap_or_default(), None),
            Some((parent_id, root_order)) => (Some(parent_id), root_order, set.sub_set_order),
        };

        rows.push(SetRow {
            id,
            training_id,
            parent_set_id,
            set_order,
            sub_set_order,
            repeat: set.repeat,
            distance_meters: set.distance_meters,
            description: set.description.clone(),
            start_type: set.start_type.to_string(),
            start_seconds: set.start_type.requires_seconds().then_some(set.start_seconds).flatten(),
            equipment: set
                .equipment
                .as_ref()
                .map(|items| items.iter().map(|e| e.to_string()).collect()),
            total_distance: set.total_distance,
        });

        flatten_sets(set.children(), training_id, Some((id, set_order)), assign_id, rows);
    }
}

/// Sets rebuilt from rows, plus the rows that could not be attached
#[derive(Debug, Default)]
pub struct Reconstructed {
    pub sets: Vec<TrainingSet>,
    /// Ids of rows whose parent had not been seen earlier in the input
    pub orphans: Vec<Uuid>,
}

struct Node {
    set: TrainingSet,
    children: Vec<usize>,
}

/// Rebuild the set tree from rows ordered parents first
///
/// A row whose parent has not appeared earlier is dropped and reported in
/// [`Reconstructed::orphans`], together with anything hanging below it.
pub fn reconstruct<I>(rows: I) -> Reconstructed
where
    I: IntoIterator<Item = SetRow>,
{
    let mut nodes: Vec<Node> = Vec::new();
    let mut index_by_id: HashMap<Uuid, usize> = HashMap::new();
    let mut roots = Vec::new();
    let mut orphans = Vec::new();

    for row in rows {
        let parent = match row.parent_set_id {
            None => None,
            Some(parent_id) => match index_by_id.get(&parent_id) {
                Some(&index) => Some(index),
                None => {
                    warn!(
                        set_id = %row.id,
                        %parent_id,
                        training_id = %row.training_id,
                        "Dropping set row whose parent was not read before it"
                    );
                    orphans.push(row.id);
                    continue;
                },
            },
        };

        let index = nodes.len();
        index_by_id.insert(row.id, index);
        nodes.push(Node {
            set: row.into_set(),
            children: Vec::new(),
        });
        match parent {
            Some(parent) => nodes[parent].children.push(index),
            None => roots.push(index),
        }
    }

    let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
    let sets = roots
        .into_iter()
        .filter_map(|index| assemble(&mut slots, index))
        .collect();

    Reconstructed { sets, orphans }
}

fn assemble(slots: &mut [Option<Node>], index: usize) -> Option<TrainingSet> {
    let Node { mut set, children } = slots.get_mut(index)?.take()?;
    if !children.is_empty() {
        set.sub_sets = Some(
            children
                .into_iter()
                .filter_map(|child| assemble(slots, child))
                .collect(),
        );
    }
    Some(set)
}

/// Store every set of a newly created training under fresh ids
pub async fn insert_tree<S>(
    store: &mut S,
    training_id: Uuid,
    training: &Training,
) -> Result<Vec<SetRow>, sqlx::Error>
where
    S: SetRowStore + ?Sized,
{
    let rows = flatten(training, training_id, |_| Uuid::new_v4());
    for row in &rows {
        store.insert_set(row).await?;
    }
    Ok(rows)
}

/// Outcome of [`upsert_tree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Write an edited tree node by node
///
/// Nodes whose id is already stored for this training are updated in place.
/// Every other node, including one with an unknown client generated id, is
/// inserted under a fresh id. Stored rows missing from the tree are left as
/// they are.
pub async fn upsert_tree<S>(
    store: &mut S,
    training_id: Uuid,
    training: &Training,
) -> Result<UpsertSummary, sqlx::Error>
where
    S: SetRowStore + ?Sized,
{
    let mut candidates = Vec::new();
    training.walk(|set, _| candidates.extend(set.id));

    let existing = if candidates.is_empty() {
        HashSet::new()
    } else {
        store.existing_set_ids(training_id, &candidates).await?
    };

    // A stored id repeated within the tree only keeps its row for the first node
    let mut claimed = HashSet::new();
    let rows = flatten(training, training_id, |id| match id {
        Some(id) if existing.contains(&id) && claimed.insert(id) => id,
        _ => Uuid::new_v4(),
    });

    let mut summary = UpsertSummary::default();
    for row in &rows {
        if claimed.contains(&row.id) {
            store.update_set(row).await?;
            summary.updated += 1;
        } else {
            store.insert_set(row).await?;
            summary.inserted += 1;
        }
    }
    Ok(summary)
}
