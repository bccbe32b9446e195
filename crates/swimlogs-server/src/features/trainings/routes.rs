//! Training API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/trainings` - Create a training
//! - `GET /api/v1/trainings/details` - Page through training summaries
//! - `GET /api/v1/trainings/details/week` - Training summaries of one calendar week
//! - `GET /api/v1/trainings/:id` - Fetch a training with its full set tree
//! - `PUT /api/v1/trainings/:id` - Edit a training
//! - `DELETE /api/v1/trainings/:id` - Delete a training
//!
//! ```rust,ignore
//! use axum::Router;
//! use swimlogs_server::features::trainings::routes::trainings_routes;
//!
//! let app = Router::new()
//!     .nest("/api/v1/trainings", trainings_routes())
//!     .with_state(feature_state);
//! ```

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::{ConstraintViolation, PageLimits, PaginationParams};
use crate::features::FeatureState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    commands::{
        CreateTrainingCommand, CreateTrainingError, DeleteTrainingCommand, DeleteTrainingError,
        UpdateTrainingCommand, UpdateTrainingError,
    },
    queries::{
        GetTrainingError, GetTrainingQuery, ListTrainingDetailsError,
        ListTrainingDetailsInRangeError, ListTrainingDetailsInRangeQuery, ListTrainingDetailsQuery,
    },
    types::Training,
    validation::InvalidTraining,
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn trainings_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(create_training))
        .route("/details", get(list_training_details))
        .route("/details/week", get(list_week_training_details))
        .route(
            "/:id",
            get(get_training).put(update_training).delete(delete_training),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a training
///
/// # Endpoint
///
/// `POST /api/v1/trainings`
///
/// # Request Body
///
/// ```json
/// {
///   "start": "2024-03-01T18:30:00Z",
///   "durationMin": 60,
///   "sets": [
///     { "setOrder": 0, "repeat": 1, "distanceMeters": 400, "startType": "None" },
///     {
///       "setOrder": 1,
///       "repeat": 4,
///       "startType": "Interval",
///       "startSeconds": 90,
///       "subSets": [
///         { "subSetOrder": 0, "repeat": 1, "distanceMeters": 50 },
///         { "subSetOrder": 1, "repeat": 1, "distanceMeters": 25, "equipment": ["Fins"] }
///       ]
///     }
///   ]
/// }
/// ```
///
/// # Response
///
/// - `201 Created` - Training stored, body is its summary
/// - `400 Bad Request` - Validation error, `details` holds the error tree
/// - `422 Unprocessable Entity` - A storage constraint rejected the write
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool, training), fields(sets = training.sets.len()))]
async fn create_training(
    State(pool): State<PgPool>,
    Json(training): Json<Training>,
) -> Result<Response, TrainingsApiError> {
    let detail = super::commands::create::handle(pool, CreateTrainingCommand { training }).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))).into_response())
}

/// Edit a training
///
/// # Endpoint
///
/// `PUT /api/v1/trainings/:id`
///
/// The body has the create shape plus the `version` it was read at. Sets
/// carrying the id of a stored set of this training update that set; every
/// other set is inserted.
///
/// # Response
///
/// - `200 OK` - Training updated, body is its new summary
/// - `400 Bad Request` - Validation error
/// - `404 Not Found` - No training with this id
/// - `409 Conflict` - The training was modified since `version`
/// - `422 Unprocessable Entity` - A storage constraint rejected the write
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool, training), fields(training_id = %id, version = ?training.version))]
async fn update_training(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(training): Json<Training>,
) -> Result<Response, TrainingsApiError> {
    let command = UpdateTrainingCommand {
        id,
        training: Training {
            id: Some(id),
            ..training
        },
    };
    let detail = super::commands::update::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(detail))).into_response())
}

/// Delete a training and all of its sets
///
/// # Endpoint
///
/// `DELETE /api/v1/trainings/:id`
///
/// # Response
///
/// - `204 No Content` - Training deleted
/// - `404 Not Found` - No training with this id
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool))]
async fn delete_training(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, TrainingsApiError> {
    super::commands::delete::handle(pool, DeleteTrainingCommand { id }).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Fetch a training with its set tree
///
/// # Endpoint
///
/// `GET /api/v1/trainings/:id`
///
/// # Response
///
/// - `200 OK` - The training, sets ordered by `setOrder` and sub-sets by `subSetOrder`
/// - `404 Not Found` - No training with this id
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool))]
async fn get_training(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, TrainingsApiError> {
    let training = super::queries::get::handle(pool, GetTrainingQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(training))).into_response())
}

/// Page through training summaries, most recent first
///
/// # Endpoint
///
/// `GET /api/v1/trainings/details?page=1&per_page=20`
///
/// # Response
///
/// - `200 OK` - Summaries, with pagination in `meta`
/// - `400 Bad Request` - Page or page size out of range
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(
    skip(pool, limits, pagination),
    fields(page = ?pagination.page, per_page = ?pagination.per_page)
)]
async fn list_training_details(
    State(pool): State<PgPool>,
    State(limits): State<PageLimits>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, TrainingsApiError> {
    let query = ListTrainingDetailsQuery { pagination, limits };
    let response = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Training details listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

#[derive(Debug, Deserialize)]
struct WeekParams {
    date: Option<NaiveDate>,
}

/// Training summaries of the Monday to Sunday week containing `date`
///
/// # Endpoint
///
/// `GET /api/v1/trainings/details/week?date=2024-03-06`
///
/// Without `date` the current UTC week is listed. Items are ordered by start.
///
/// # Response
///
/// - `200 OK` - Summaries, with the covered `from`/`to` dates in `meta`
/// - `400 Bad Request` - `date` is not a `YYYY-MM-DD` date
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool))]
async fn list_week_training_details(
    State(pool): State<PgPool>,
    Query(params): Query<WeekParams>,
) -> Result<Response, TrainingsApiError> {
    let day = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let query = ListTrainingDetailsInRangeQuery::week_of(day)?;
    let response = super::queries::list_in_range::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        from = %response.from,
        to = %response.to,
        "Week training details listed via API"
    );

    let meta = json!({
        "from": response.from,
        "to": response.to,
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for training API endpoints
#[derive(Debug)]
enum TrainingsApiError {
    Create(CreateTrainingError),
    Update(UpdateTrainingError),
    Delete(DeleteTrainingError),
    Get(GetTrainingError),
    List(ListTrainingDetailsError),
    Range(ListTrainingDetailsInRangeError),
}

impl From<CreateTrainingError> for TrainingsApiError {
    fn from(err: CreateTrainingError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateTrainingError> for TrainingsApiError {
    fn from(err: UpdateTrainingError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteTrainingError> for TrainingsApiError {
    fn from(err: DeleteTrainingError) -> Self {
        Self::Delete(err)
    }
}

impl From<GetTrainingError> for TrainingsApiError {
    fn from(err: GetTrainingError) -> Self {
        Self::Get(err)
    }
}

impl From<ListTrainingDetailsError> for TrainingsApiError {
    fn from(err: ListTrainingDetailsError) -> Self {
        Self::List(err)
    }
}

impl From<ListTrainingDetailsInRangeError> for TrainingsApiError {
    fn from(err: ListTrainingDetailsInRangeError) -> Self {
        Self::Range(err)
    }
}

impl IntoResponse for TrainingsApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            TrainingsApiError::Create(CreateTrainingError::Validation(invalid))
            | TrainingsApiError::Update(UpdateTrainingError::Validation(invalid)) => {
                validation_response(&invalid)
            },
            TrainingsApiError::List(ListTrainingDetailsError::Pagination(_))
            | TrainingsApiError::Range(ListTrainingDetailsInRangeError::InvalidRange { .. })
            | TrainingsApiError::Range(ListTrainingDetailsInRangeError::OutOfRange(_)) => {
                tracing::debug!(error = %message, "Rejected listing request");
                let error = ErrorResponse::new("VALIDATION_ERROR", message);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            TrainingsApiError::Update(UpdateTrainingError::NotFound(_))
            | TrainingsApiError::Delete(DeleteTrainingError::NotFound(_))
            | TrainingsApiError::Get(GetTrainingError::NotFound(_)) => {
                tracing::debug!(error = %message, "Training not found");
                let error = ErrorResponse::new("NOT_FOUND", message);
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },

            TrainingsApiError::Update(UpdateTrainingError::Conflict { .. }) => {
                tracing::debug!(error = %message, "Stale training edit");
                let error = ErrorResponse::new("CONFLICT", message);
                (StatusCode::CONFLICT, Json(error)).into_response()
            },

            TrainingsApiError::Create(CreateTrainingError::Constraint(violation))
            | TrainingsApiError::Update(UpdateTrainingError::Constraint(violation)) => {
                constraint_response(violation)
            },

            TrainingsApiError::Create(CreateTrainingError::Database(_))
            | TrainingsApiError::Update(UpdateTrainingError::Database(_))
            | TrainingsApiError::Delete(DeleteTrainingError::Database(_))
            | TrainingsApiError::Get(GetTrainingError::Database(_))
            | TrainingsApiError::List(ListTrainingDetailsError::Database(_))
            | TrainingsApiError::Range(ListTrainingDetailsInRangeError::Database(_)) => {
                tracing::error!(error = %message, "Database error in training endpoint");
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

fn validation_response(invalid: &InvalidTraining) -> Response {
    tracing::debug!(?invalid, "Rejected invalid training");
    let error = match serde_json::to_value(invalid) {
        Ok(details) => ErrorResponse::with_details("VALIDATION_ERROR", invalid.to_string(), details),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize validation errors");
            ErrorResponse::new("VALIDATION_ERROR", invalid.to_string())
        },
    };
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

fn constraint_response(violation: ConstraintViolation) -> Response {
    tracing::warn!(
        kind = ?violation.kind,
        constraint = ?violation.constraint,
        "Training write rejected by a storage constraint"
    );
    let error = ErrorResponse::with_details(
        "CONSTRAINT_VIOLATION",
        violation.to_string(),
        json!({
            "kind": violation.kind,
            "constraint": violation.constraint,
        }),
    );
    (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
}

impl std::fmt::Display for TrainingsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
            Self::Update(e) => write!(f, "{}", e),
            Self::Delete(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
            Self::Range(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::features::shared::ConstraintKind;
    use crate::features::trainings::types::fixtures::*;
    use crate::features::trainings::validation;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = TrainingsApiError::Get(GetTrainingError::NotFound(Uuid::nil()));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_routes_structure() {
        let router = trainings_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }

    #[tokio::test]
    async fn test_validation_error_carries_tree() {
        let mut training = sample_training();
        training.duration_min = 0;
        training.sets[2].sub_sets.as_mut().unwrap()[1].repeat = 0;
        let invalid = validation::validate(&training).unwrap_err();

        let response =
            TrainingsApiError::Create(CreateTrainingError::Validation(invalid)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["details"]["durationMin"],
            "Duration must be greater than 0"
        );
        let sets = body["error"]["details"]["invalidSets"].as_array().unwrap();
        assert_eq!(sets.len(), 6);
        assert_eq!(
            sets[2]["subSets"][1]["repeat"],
            "Repeat must be greater than 0"
        );
    }

    #[tokio::test]
    async fn test_status_codes() {
        let id = Uuid::new_v4();
        let cases = [
            (
                TrainingsApiError::Delete(DeleteTrainingError::NotFound(id)),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                TrainingsApiError::Update(UpdateTrainingError::Conflict { id, expected: 1 }),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                TrainingsApiError::Create(CreateTrainingError::Constraint(ConstraintViolation {
                    kind: ConstraintKind::Check,
                    constraint: Some("sets_start_seconds_non_negative".to_string()),
                })),
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONSTRAINT_VIOLATION",
            ),
            (
                TrainingsApiError::Range(ListTrainingDetailsInRangeError::InvalidRange {
                    from: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                    to: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                }),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                TrainingsApiError::Get(GetTrainingError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_json(response).await["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = TrainingsApiError::List(ListTrainingDetailsError::Database(
            sqlx::Error::PoolTimedOut,
        ))
        .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "A database error occurred");
        assert!(body["error"].get("details").is_none());
    }
}
