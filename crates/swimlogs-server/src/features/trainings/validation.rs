//! Training tree validation
//!
//! Every rule is checked for every node and all violations are collected. The
//! result mirrors the input: `invalid_sets` holds one entry per set, in the same
//! positions, so a client can highlight the exact field. A sibling list whose
//! sets are all valid is omitted entirely.
//!
//! ```rust,ignore
//! match validation::validate(&training) {
//!     Ok(()) => persist(training).await?,
//!     Err(invalid) => return Err(CreateTrainingError::Validation(invalid)),
//! }
//! ```

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::types::{SetLevel, Training, TrainingSet, WalkContext};

/// Deepest level at which a set may still own sub-sets
pub const MAX_PARENT_DEPTH: usize = 0;

/// A single field level violation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Duration must be greater than 0")]
    DurationNotPositive,

    #[error("Training must have at least one set")]
    NoSets,

    #[error("Version must be set when editing a training")]
    VersionRequired,

    #[error("Either set order or sub set order must be set")]
    OrderNotSet,

    #[error("Top level set must have set order")]
    SetOrderRequired,

    #[error("Top level set can't have sub set order")]
    SubSetOrderOnTopLevel,

    #[error("Sub set must have sub set order")]
    SubSetOrderRequired,

    #[error("Sub set can't have set order")]
    SetOrderOnSubSet,

    #[error("Set order can't be less than 0")]
    NegativeSetOrder,

    #[error("Sub set order can't be less than 0")]
    NegativeSubSetOrder,

    #[error("Duplicate set order '{0}'")]
    DuplicateSetOrder(i32),

    #[error("Duplicate sub set order '{0}'")]
    DuplicateSubSetOrder(i32),

    #[error("Repeat must be greater than 0")]
    RepeatNotPositive,

    #[error("Distance must be greater than 0")]
    DistanceNotPositive,

    #[error("Distance must be set when set has no sub sets")]
    DistanceRequired,

    #[error("Unknown starting type name '{0}'")]
    UnknownStartType(String),

    #[error("Type '{0}' must have seconds set")]
    StartSecondsRequired(String),

    #[error("Sub sets can't have their own sub sets")]
    NestedSubSets,

    #[error("Total distance is too large")]
    TotalDistanceTooLarge,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors of the training root, mirroring [`Training`]
#[derive(Debug, Error, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("Training is invalid")]
pub struct InvalidTraining {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<FieldError>,
    /// Empty when the training has no sets at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_sets: Option<Vec<InvalidSet>>,
}

impl InvalidTraining {
    pub fn is_empty(&self) -> bool {
        self.duration_min.is_none()
            && self.sets.is_none()
            && self.version.is_none()
            && self.total_distance.is_none()
            && self.invalid_sets.is_none()
    }
}

/// Errors of one set, mirroring [`TrainingSet`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_order: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_set_order: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_type: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nesting: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sets: Option<Vec<InvalidSet>>,
}

impl InvalidSet {
    pub fn is_empty(&self) -> bool {
        self.set_order.is_none()
            && self.sub_set_order.is_none()
            && self.repeat.is_none()
            && self.distance_meters.is_none()
            && self.start_type.is_none()
            && self.start_seconds.is_none()
            && self.nesting.is_none()
            && self.total_distance.is_none()
            && self.sub_sets.is_none()
    }

    fn order_error(&self, level: SetLevel) -> Option<&FieldError> {
        match level {
            SetLevel::Top => self.set_order.as_ref(),
            SetLevel::Sub => self.sub_set_order.as_ref(),
        }
    }

    fn set_order_error(&mut self, level: SetLevel, error: FieldError) {
        match level {
            SetLevel::Top => self.set_order = Some(error),
            SetLevel::Sub => self.sub_set_order = Some(error),
        }
    }
}

/// Validate a training submitted for creation
pub fn validate(training: &Training) -> Result<(), InvalidTraining> {
    let invalid = check_training(training);
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}

/// Validate a training submitted as an edit of a stored one
///
/// Edits additionally carry the version they were based on, which is returned
/// on success.
pub fn validate_edit(training: &Training) -> Result<i32, InvalidTraining> {
    let mut invalid = check_training(training);
    if training.version.is_none() {
        invalid.version = Some(FieldError::VersionRequired);
    }
    match training.version {
        Some(version) if invalid.is_empty() => Ok(version),
        _ => Err(invalid),
    }
}

fn check_training(training: &Training) -> InvalidTraining {
    let mut invalid = InvalidTraining::default();

    if training.duration_min <= 0 {
        invalid.duration_min = Some(FieldError::DurationNotPositive);
    }

    if training.sets.is_empty() {
        invalid.sets = Some(FieldError::NoSets);
        invalid.invalid_sets = Some(Vec::new());
        return invalid;
    }

    let mut node_errors = Vec::with_capacity(training.node_count());
    training.walk(|set, ctx| node_errors.push(check_set(set, &ctx)));

    let sum = training
        .sets
        .iter()
        .try_fold(0i32, |acc, set| acc.checked_add(checked_total(set)?));
    if sum.is_none() {
        invalid.total_distance = Some(FieldError::TotalDistanceTooLarge);
    }

    let mut node_errors = node_errors.into_iter();
    invalid.invalid_sets = mirror(&training.sets, &mut node_errors);
    invalid
}

/// Rebuild the pre-order error list into the shape of `siblings`
fn mirror(
    siblings: &[TrainingSet],
    errors: &mut impl Iterator<Item = InvalidSet>,
) -> Option<Vec<InvalidSet>> {
    let mut mirrored = Vec::with_capacity(siblings.len());
    for set in siblings {
        let mut error = errors.next().unwrap_or_default();
        error.sub_sets = mirror(set.children(), errors);
        mirrored.push(error);
    }

    mirrored.iter().any(|e| !e.is_empty()).then_some(mirrored)
}

fn check_set(set: &TrainingSet, ctx: &WalkContext<'_>) -> InvalidSet {
    let level = ctx.level();
    let mut error = check_order(set, level);

    if error.order_error(level).is_none() {
        if let Some(order) = set.order_at(level) {
            // First occurrence wins, only later siblings are flagged
            let seen_before = ctx.siblings[..ctx.index]
                .iter()
                .any(|earlier| has_usable_order(earlier, level) && earlier.order_at(level) == Some(order));
            if seen_before {
                let duplicate = match level {
                    SetLevel::Top => FieldError::DuplicateSetOrder(order),
                    SetLevel::Sub => FieldError::DuplicateSubSetOrder(order),
                };
                error.set_order_error(level, duplicate);
            }
        }
    }

    if set.repeat <= 0 {
        error.repeat = Some(FieldError::RepeatNotPositive);
    }

    match set.distance_meters {
        Some(distance) if distance <= 0 => {
            error.distance_meters = Some(FieldError::DistanceNotPositive);
        },
        None if set.is_leaf() => {
            error.distance_meters = Some(FieldError::DistanceRequired);
        },
        _ => {},
    }

    if !set.start_type.is_known() {
        error.start_type = Some(FieldError::UnknownStartType(set.start_type.to_string()));
    } else if set.start_type.requires_seconds() && set.start_seconds.is_none() {
        error.start_seconds = Some(FieldError::StartSecondsRequired(set.start_type.to_string()));
    }

    if ctx.depth > MAX_PARENT_DEPTH && !set.is_leaf() {
        error.nesting = Some(FieldError::NestedSubSets);
    }

    if checked_total(set).is_none() {
        error.total_distance = Some(FieldError::TotalDistanceTooLarge);
    }

    error
}

/// Total distance of `set`, or `None` when it does not fit the stored `i32`
fn checked_total(set: &TrainingSet) -> Option<i32> {
    let per_repeat = if set.is_leaf() {
        set.distance_meters.unwrap_or(0)
    } else {
        set.children()
            .iter()
            .try_fold(0i32, |acc, child| acc.checked_add(checked_total(child)?))?
    };
    set.repeat.checked_mul(per_repeat)
}

fn check_order(set: &TrainingSet, level: SetLevel) -> InvalidSet {
    let mut error = InvalidSet::default();

    if set.set_order.is_none() && set.sub_set_order.is_none() {
        error.set_order = Some(FieldError::OrderNotSet);
        error.sub_set_order = Some(FieldError::OrderNotSet);
        return error;
    }

    match level {
        SetLevel::Top => {
            error.set_order = match set.set_order {
                None => Some(FieldError::SetOrderRequired),
                Some(order) if order < 0 => Some(FieldError::NegativeSetOrder),
                Some(_) => None,
            };
            if set.sub_set_order.is_some() {
                error.sub_set_order = Some(FieldError::SubSetOrderOnTopLevel);
            }
        },
        SetLevel::Sub => {
            error.sub_set_order = match set.sub_set_order {
                None => Some(FieldError::SubSetOrderRequired),
                Some(order) if order < 0 => Some(FieldError::NegativeSubSetOrder),
                Some(_) => None,
            };
            if set.set_order.is_some() {
                error.set_order = Some(FieldError::SetOrderOnSubSet);
            }
        },
    }

    error
}

/// Whether a sibling's order value takes part in duplicate detection
fn has_usable_order(set: &TrainingSet, level: SetLevel) -> bool {
    set.order_at(level).is_some() && check_order(set, level).order_error(level).is_none()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::super::types::fixtures::*;
    use super::*;
    use swimlogs_common::StartType;

    fn invalid_sets(invalid: &InvalidTraining) -> &[InvalidSet] {
        invalid.invalid_sets.as_deref().expect("invalid sets present")
    }

    #[test]
    fn test_sample_training_is_valid() {
        assert_eq!(validate(&sample_training()), Ok(()));
    }

    #[test]
    fn test_duplicate_order_first_wins() {
        let training = training(vec![leaf(0, 1, 100), leaf(-1, 1, 100), leaf(0, 1, 100)]);

        let invalid = validate(&training).unwrap_err();
        let sets = invalid_sets(&invalid);

        assert_eq!(sets.len(), 3);
        assert!(sets[0].is_empty());
        assert_eq!(sets[1].set_order, Some(FieldError::NegativeSetOrder));
        assert_eq!(sets[2].set_order, Some(FieldError::DuplicateSetOrder(0)));
        assert!(invalid.duration_min.is_none());
        assert!(invalid.sets.is_none());
    }

    #[test]
    fn test_every_repeat_of_a_duplicate_is_flagged() {
        let training = training(vec![leaf(2, 1, 100), leaf(2, 1, 100), leaf(2, 1, 100)]);

        let invalid = validate(&training).unwrap_err();
        let orders: Vec<_> = invalid_sets(&invalid).iter().map(|s| s.set_order.clone()).collect();

        assert_eq!(
            orders,
            vec![
                None,
                Some(FieldError::DuplicateSetOrder(2)),
                Some(FieldError::DuplicateSetOrder(2)),
            ]
        );
    }

    #[test]
    fn test_interval_without_seconds_fails() {
        let mut set = leaf(0, 1, 100);
        set.start_type = StartType::Interval;

        let invalid = validate(&training(vec![set])).unwrap_err();
        let error = &invalid_sets(&invalid)[0];

        assert_eq!(
            error.start_seconds,
            Some(FieldError::StartSecondsRequired("Interval".to_string()))
        );
        assert_eq!(
            error.start_seconds.as_ref().unwrap().to_string(),
            "Type 'Interval' must have seconds set"
        );
    }

    #[test]
    fn test_none_with_seconds_passes() {
        let mut set = leaf(0, 1, 100);
        set.start_type = StartType::None;
        set.start_seconds = Some(30);

        assert_eq!(validate(&training(vec![set])), Ok(()));
    }

    #[test]
    fn test_pause_with_seconds_passes() {
        let mut set = leaf(0, 1, 100);
        set.start_type = StartType::Pause;
        set.start_seconds = Some(20);

        assert_eq!(validate(&training(vec![set])), Ok(()));
    }

    #[test]
    fn test_unknown_start_type_echoes_literal() {
        let mut set = leaf(0, 1, 100);
        set.start_type = StartType::from("Sprint");

        let invalid = validate(&training(vec![set])).unwrap_err();
        let error = &invalid_sets(&invalid)[0];

        assert_eq!(error.start_type, Some(FieldError::UnknownStartType("Sprint".to_string())));
        assert!(error.start_seconds.is_none());
    }

    #[test]
    fn test_empty_training_reports_empty_list() {
        let invalid = validate(&training(vec![])).unwrap_err();

        assert_eq!(invalid.sets, Some(FieldError::NoSets));
        assert_eq!(invalid.invalid_sets, Some(vec![]));

        let json = serde_json::to_value(&invalid).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sets": "Training must have at least one set",
                "invalidSets": []
            })
        );
    }

    #[test]
    fn test_valid_sets_omit_invalid_sets() {
        let mut training = sample_training();
        training.duration_min = 0;

        let invalid = validate(&training).unwrap_err();
        assert_eq!(invalid.duration_min, Some(FieldError::DurationNotPositive));
        assert!(invalid.invalid_sets.is_none());
    }

    #[test]
    fn test_missing_order_reports_both_fields() {
        let mut set = leaf(0, 1, 100);
        set.set_order = None;

        let invalid = validate(&training(vec![set])).unwrap_err();
        let error = &invalid_sets(&invalid)[0];

        assert_eq!(error.set_order, Some(FieldError::OrderNotSet));
        assert_eq!(error.sub_set_order, Some(FieldError::OrderNotSet));
    }

    #[test]
    fn test_order_field_must_match_level() {
        let top_with_sub_order = TrainingSet {
            set_order: None,
            sub_set_order: Some(0),
            ..leaf(0, 1, 100)
        };
        let mut sub_with_set_order = sub_leaf(0, 1, 50);
        sub_with_set_order.set_order = Some(0);
        let training = training(vec![
            top_with_sub_order,
            parent(1, 1, vec![sub_with_set_order]),
        ]);

        let invalid = validate(&training).unwrap_err();
        let sets = invalid_sets(&invalid);

        assert_eq!(sets[0].set_order, Some(FieldError::SetOrderRequired));
        assert_eq!(sets[0].sub_set_order, Some(FieldError::SubSetOrderOnTopLevel));
        let subs = sets[1].sub_sets.as_deref().unwrap();
        assert_eq!(subs[0].set_order, Some(FieldError::SetOrderOnSubSet));
        assert!(subs[0].sub_set_order.is_none());
    }

    #[test]
    fn test_sub_set_duplicates_are_scoped_to_parent() {
        let training = training(vec![
            parent(0, 2, vec![sub_leaf(0, 1, 50), sub_leaf(1, 1, 25)]),
            parent(1, 2, vec![sub_leaf(0, 1, 50), sub_leaf(1, 1, 25)]),
        ]);

        assert_eq!(validate(&training), Ok(()));
    }

    #[test]
    fn test_invalid_sub_set_mirrors_structure() {
        let training = training(vec![
            leaf(0, 1, 100),
            parent(1, 2, vec![sub_leaf(0, 1, 50), sub_leaf(0, 0, 25), sub_leaf(1, 1, -5)]),
        ]);

        let invalid = validate(&training).unwrap_err();
        let sets = invalid_sets(&invalid);

        assert!(sets[0].is_empty());
        assert!(sets[0].sub_sets.is_none());
        assert!(sets[1].set_order.is_none());

        let subs = sets[1].sub_sets.as_deref().unwrap();
        assert_eq!(subs.len(), 3);
        assert!(subs[0].is_empty());
        assert_eq!(subs[1].sub_set_order, Some(FieldError::DuplicateSubSetOrder(0)));
        assert_eq!(subs[1].repeat, Some(FieldError::RepeatNotPositive));
        assert_eq!(subs[2].distance_meters, Some(FieldError::DistanceNotPositive));

        let json = serde_json::to_value(&invalid).unwrap();
        assert_eq!(json["invalidSets"][0], serde_json::json!({}));
        assert_eq!(
            json["invalidSets"][1]["subSets"][1]["subSetOrder"],
            "Duplicate sub set order '0'"
        );
    }

    #[test]
    fn test_negative_order_is_not_a_duplicate_source() {
        let training = training(vec![leaf(-1, 1, 100), leaf(-1, 1, 100)]);

        let invalid = validate(&training).unwrap_err();
        let sets = invalid_sets(&invalid);

        assert_eq!(sets[0].set_order, Some(FieldError::NegativeSetOrder));
        assert_eq!(sets[1].set_order, Some(FieldError::NegativeSetOrder));
    }

    #[test]
    fn test_leaf_requires_distance() {
        let mut set = leaf(0, 1, 100);
        set.distance_meters = None;

        let invalid = validate(&training(vec![set])).unwrap_err();
        assert_eq!(invalid_sets(&invalid)[0].distance_meters, Some(FieldError::DistanceRequired));

        let parent_without_distance = parent(0, 4, vec![sub_leaf(0, 1, 50)]);
        assert_eq!(validate(&training(vec![parent_without_distance])), Ok(()));
    }

    #[test]
    fn test_sub_sets_cannot_nest_further() {
        let grandchild = sub_leaf(0, 1, 25);
        let child = TrainingSet {
            sub_set_order: Some(0),
            repeat: 1,
            sub_sets: Some(vec![grandchild]),
            ..Default::default()
        };

        let invalid = validate(&training(vec![parent(0, 1, vec![child])])).unwrap_err();
        let subs = invalid_sets(&invalid)[0].sub_sets.as_deref().unwrap();

        assert_eq!(subs[0].nesting, Some(FieldError::NestedSubSets));
        assert!(subs[0].sub_sets.is_none());
    }

    #[test]
    fn test_edit_requires_version() {
        let mut training = sample_training();
        assert_eq!(validate(&training), Ok(()));

        let invalid = validate_edit(&training).unwrap_err();
        assert_eq!(invalid.version, Some(FieldError::VersionRequired));

        training.version = Some(3);
        assert_eq!(validate_edit(&training), Ok(3));
    }

    #[test]
    fn test_oversized_set_total_is_rejected() {
        let training = training(vec![leaf(0, 50_000, 50_000), leaf(1, 1, 100)]);

        let invalid = validate(&training).unwrap_err();
        let sets = invalid_sets(&invalid);

        assert_eq!(sets[0].total_distance, Some(FieldError::TotalDistanceTooLarge));
        assert!(sets[1].is_empty());
        assert_eq!(invalid.total_distance, Some(FieldError::TotalDistanceTooLarge));
        assert_eq!(
            serde_json::to_value(&invalid).unwrap()["invalidSets"][0]["totalDistance"],
            "Total distance is too large"
        );
    }

    #[test]
    fn test_oversized_parent_total_is_rejected() {
        let training = training(vec![parent(
            0,
            50_000,
            vec![sub_leaf(0, 1, 25_000), sub_leaf(1, 1, 25_000)],
        )]);

        let invalid = validate(&training).unwrap_err();
        let set = &invalid_sets(&invalid)[0];

        assert_eq!(set.total_distance, Some(FieldError::TotalDistanceTooLarge));
        assert!(set.sub_sets.is_none());
    }

    #[test]
    fn test_oversized_training_sum_is_rejected() {
        let training = training(vec![leaf(0, 1, 2_000_000_000), leaf(1, 1, 2_000_000_000)]);

        let invalid = validate(&training).unwrap_err();

        assert_eq!(invalid.total_distance, Some(FieldError::TotalDistanceTooLarge));
        assert!(invalid.invalid_sets.is_none());
    }

    #[test]
    fn test_largest_representable_total_passes() {
        let training = training(vec![leaf(0, 1, i32::MAX - 100), leaf(1, 1, 100)]);
        assert_eq!(validate(&training), Ok(()));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut set = leaf(-2, 0, 0);
        set.start_type = StartType::Pause;
        let mut training = training(vec![set]);
        training.duration_min = -10;

        let invalid = validate(&training).unwrap_err();
        let error = &invalid_sets(&invalid)[0];

        assert_eq!(invalid.duration_min, Some(FieldError::DurationNotPositive));
        assert_eq!(error.set_order, Some(FieldError::NegativeSetOrder));
        assert_eq!(error.repeat, Some(FieldError::RepeatNotPositive));
        assert_eq!(error.distance_meters, Some(FieldError::DistanceNotPositive));
        assert_eq!(error.start_seconds, Some(FieldError::StartSecondsRequired("Pause".into())));
    }
}
