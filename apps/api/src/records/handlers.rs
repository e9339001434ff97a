use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::kids::fetch_owned_kid;
use crate::models::enums::RecordType;
use crate::models::record::{
    GrowthFields, HealthFields, JoinedRecord, MealFields, RecordDetail, RecordRow, SleepFields,
    StoolFields,
};
use crate::records::store::{self, NewRecordCommon, RecordFilter};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    pub user_id: i64,
    pub record_type: Option<RecordType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TypedListQuery {
    pub user_id: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

/// Body of a typed-record creation: the shared base fields plus the
/// discriminant-specific fields at the same level, split here according
/// to the path discriminant.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub user_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub typed: serde_json::Value,
}

/// GET /api/v1/kids/:kid_id/records
pub async fn list_records(
    State(state): State<AppState>,
    Path(kid_id): Path<i64>,
    Query(params): Query<ListRecordsQuery>,
) -> Result<Json<Vec<RecordRow>>, AppError> {
    fetch_owned_kid(&state.db, kid_id, params.user_id).await?;

    let limit = store::effective_limit(params.limit).map_err(AppError::Validation)?;
    let filter = RecordFilter {
        record_type: params.record_type,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let records = store::list_records(&state.db, kid_id, &filter, limit).await?;
    Ok(Json(records))
}

/// GET /api/v1/kids/:kid_id/records/:record_type
pub async fn list_typed_records(
    State(state): State<AppState>,
    Path((kid_id, record_type)): Path<(i64, String)>,
    Query(params): Query<TypedListQuery>,
) -> Result<Json<Vec<JoinedRecord>>, AppError> {
    let record_type = parse_record_type(&record_type)?;
    fetch_owned_kid(&state.db, kid_id, params.user_id).await?;

    let limit = store::effective_limit(params.limit).map_err(AppError::Validation)?;
    let records = store::list_typed(&state.db, kid_id, record_type, limit).await?;
    Ok(Json(records))
}

/// POST /api/v1/kids/:kid_id/records/:record_type
pub async fn create_typed_record(
    State(state): State<AppState>,
    Path((kid_id, record_type)): Path<(i64, String)>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<JoinedRecord>), AppError> {
    let record_type = parse_record_type(&record_type)?;
    fetch_owned_kid(&state.db, kid_id, req.user_id).await?;

    let mut detail = parse_detail(record_type, req.typed)?;
    detail.validate().map_err(AppError::Validation)?;

    let common = NewRecordCommon {
        title: req.title,
        memo: req.memo,
        image_url: req.image_url,
    };

    let created = store::create_typed_record(&state.db, kid_id, common, detail).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/kids/:kid_id/records/:record_id
pub async fn delete_record(
    State(state): State<AppState>,
    Path((kid_id, record_id)): Path<(i64, String)>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let record_id: i64 = record_id
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid record id '{record_id}'")))?;
    fetch_owned_kid(&state.db, kid_id, params.user_id).await?;

    if store::delete_record(&state.db, kid_id, record_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Record {record_id} not found")))
    }
}

fn parse_record_type(segment: &str) -> Result<RecordType, AppError> {
    RecordType::parse(segment)
        .ok_or_else(|| AppError::Validation(format!("unknown record type '{segment}'")))
}

/// Deserializes the discriminant-specific fields. Exhaustive over the
/// closed discriminant set; a new record kind will not compile without
/// an arm here.
fn parse_detail(record_type: RecordType, typed: serde_json::Value) -> Result<RecordDetail, AppError> {
    let detail = match record_type {
        RecordType::Meal => serde_json::from_value::<MealFields>(typed).map(RecordDetail::Meal),
        RecordType::Sleep => serde_json::from_value::<SleepFields>(typed).map(RecordDetail::Sleep),
        RecordType::Health => {
            serde_json::from_value::<HealthFields>(typed).map(RecordDetail::Health)
        }
        RecordType::Growth => {
            serde_json::from_value::<GrowthFields>(typed).map(RecordDetail::Growth)
        }
        RecordType::Stool => serde_json::from_value::<StoolFields>(typed).map(RecordDetail::Stool),
    };

    detail.map_err(|e| {
        AppError::Validation(format!("invalid {} payload: {e}", record_type.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_detail_rejects_unknown_enum_value() {
        let err = parse_detail(
            RecordType::Meal,
            json!({"meal_type": "pizza", "meal_detail": null, "burp": null}),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_detail_accepts_valid_stool_payload() {
        let detail = parse_detail(
            RecordType::Stool,
            json!({"amount": "medium", "condition": "soft", "color": "yellow"}),
        )
        .unwrap();
        assert_eq!(detail.record_type(), RecordType::Stool);
    }

    #[test]
    fn test_create_request_splits_common_and_typed_fields() {
        let req: CreateRecordRequest = serde_json::from_value(json!({
            "user_id": 7,
            "title": "lunch",
            "meal_type": "baby_food",
            "burp": true
        }))
        .unwrap();
        assert_eq!(req.user_id, 7);
        assert_eq!(req.title.as_deref(), Some("lunch"));
        let detail = parse_detail(RecordType::Meal, req.typed).unwrap();
        match detail {
            RecordDetail::Meal(m) => {
                assert_eq!(m.burp, Some(true));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_unknown_discriminant_is_a_validation_error() {
        assert!(matches!(
            parse_record_type("vaccine"),
            Err(AppError::Validation(_))
        ));
    }
}
