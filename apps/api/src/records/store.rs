//! Record store — all reads and writes for the base `records` table and
//! its satellite tables. A typed record is always written as one
//! transaction: base row first to obtain the id, satellite row keyed by
//! that id second, committed together or not at all. The store never
//! leaves a base row without its satellite.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::models::enums::RecordType;
use crate::models::record::{
    GrowthFields, HealthFields, JoinedRecord, MealFields, RecordDetail, RecordRow, SleepFields,
    StoolFields,
};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Fields shared by every record creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRecordCommon {
    pub title: Option<String>,
    pub memo: Option<String>,
    pub image_url: Option<String>,
}

/// Conjunctive filters for the flat record listing.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub record_type: Option<RecordType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// Resolves a requested page size: default 50, hard cap 100.
pub fn effective_limit(requested: Option<i64>) -> Result<i64, String> {
    match requested {
        None => Ok(DEFAULT_LIMIT),
        Some(l) if (1..=MAX_LIMIT).contains(&l) => Ok(l),
        Some(l) => Err(format!("limit must be between 1 and {MAX_LIMIT}, got {l}")),
    }
}

/// Inserts the base row and its satellite inside one transaction and
/// returns the joined representation. The caller validates the payload
/// and has already checked kid ownership.
pub async fn create_typed_record(
    pool: &PgPool,
    kid_id: i64,
    common: NewRecordCommon,
    detail: RecordDetail,
) -> Result<JoinedRecord, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let record: RecordRow = sqlx::query_as(
        r#"
        INSERT INTO records (kid_id, record_type, title, memo, image_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, kid_id, record_type, title, memo, image_url, created_at
        "#,
    )
    .bind(kid_id)
    .bind(detail.record_type())
    .bind(&common.title)
    .bind(&common.memo)
    .bind(&common.image_url)
    .fetch_one(&mut *tx)
    .await?;

    match &detail {
        RecordDetail::Meal(m) => {
            sqlx::query(
                "INSERT INTO meal_records (id, meal_type, meal_detail, burp) VALUES ($1, $2, $3, $4)",
            )
            .bind(record.id)
            .bind(m.meal_type)
            .bind(&m.meal_detail)
            .bind(m.burp)
            .execute(&mut *tx)
            .await?;
        }
        RecordDetail::Sleep(s) => {
            sqlx::query(
                "INSERT INTO sleep_records (id, start_at, end_at, sleep_quality) VALUES ($1, $2, $3, $4)",
            )
            .bind(record.id)
            .bind(s.start_at)
            .bind(s.end_at)
            .bind(s.sleep_quality)
            .execute(&mut *tx)
            .await?;
        }
        RecordDetail::Health(h) => {
            sqlx::query(
                "INSERT INTO health_records (id, temperature, symptom, symptom_other) VALUES ($1, $2, $3, $4)",
            )
            .bind(record.id)
            .bind(h.temperature)
            .bind(h.symptom)
            .bind(&h.symptom_other)
            .execute(&mut *tx)
            .await?;
        }
        RecordDetail::Growth(g) => {
            sqlx::query("INSERT INTO growth_records (id, height_cm, weight_kg) VALUES ($1, $2, $3)")
                .bind(record.id)
                .bind(g.height_cm)
                .bind(g.weight_kg)
                .execute(&mut *tx)
                .await?;
        }
        RecordDetail::Stool(s) => {
            sqlx::query(
                "INSERT INTO stool_records (id, amount, condition, color) VALUES ($1, $2, $3, $4)",
            )
            .bind(record.id)
            .bind(s.amount)
            .bind(s.condition)
            .bind(s.color)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    Ok(JoinedRecord { record, detail })
}

/// Base rows for one kid, newest first, with conjunctive filters. The
/// limit must already be resolved via `effective_limit`.
pub async fn list_records(
    pool: &PgPool,
    kid_id: i64,
    filter: &RecordFilter,
    limit: i64,
) -> Result<Vec<RecordRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, kid_id, record_type, title, memo, image_url, created_at
        FROM records
        WHERE kid_id = $1
          AND ($2::record_type IS NULL OR record_type = $2)
          AND ($3::timestamptz IS NULL OR created_at >= $3)
          AND ($4::timestamptz IS NULL OR created_at <= $4)
        ORDER BY created_at DESC, id DESC
        LIMIT $5
        "#,
    )
    .bind(kid_id)
    .bind(filter.record_type)
    .bind(filter.date_from)
    .bind(filter.date_to)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Joined records of one discriminant for one kid, newest first.
pub async fn list_typed(
    pool: &PgPool,
    kid_id: i64,
    record_type: RecordType,
    limit: i64,
) -> Result<Vec<JoinedRecord>, sqlx::Error> {
    let rows = sqlx::query(&joined_select(record_type))
        .bind(kid_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    rows.iter().map(|row| joined_from_row(record_type, row)).collect()
}

/// The single most recent joined record of one discriminant, if any.
/// Feeds the dashboard and the context assembler.
pub async fn most_recent(
    pool: &PgPool,
    kid_id: i64,
    record_type: RecordType,
) -> Result<Option<JoinedRecord>, sqlx::Error> {
    let row = sqlx::query(&joined_select(record_type))
        .bind(kid_id)
        .bind(1i64)
        .fetch_optional(pool)
        .await?;

    row.map(|r| joined_from_row(record_type, &r)).transpose()
}

/// Deletes a record under a kid. The satellite row goes with it via the
/// FK cascade. Returns false when no such record exists under that kid.
pub async fn delete_record(
    pool: &PgPool,
    kid_id: i64,
    record_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM records WHERE id = $1 AND kid_id = $2")
        .bind(record_id)
        .bind(kid_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// SELECT of base columns plus the satellite columns of one discriminant.
/// Table and column names come from the closed `RecordType` enum, never
/// from request input.
fn joined_select(record_type: RecordType) -> String {
    format!(
        "SELECT r.id, r.kid_id, r.record_type, r.title, r.memo, r.image_url, r.created_at, {} \
         FROM {} t JOIN records r ON r.id = t.id \
         WHERE r.kid_id = $1 \
         ORDER BY r.created_at DESC, r.id DESC \
         LIMIT $2",
        record_type.satellite_columns(),
        record_type.satellite_table(),
    )
}

fn joined_from_row(record_type: RecordType, row: &PgRow) -> Result<JoinedRecord, sqlx::Error> {
    let record = RecordRow::from_row(row)?;
    let detail = match record_type {
        RecordType::Meal => RecordDetail::Meal(MealFields::from_row(row)?),
        RecordType::Sleep => RecordDetail::Sleep(SleepFields::from_row(row)?),
        RecordType::Health => RecordDetail::Health(HealthFields::from_row(row)?),
        RecordType::Growth => RecordDetail::Growth(GrowthFields::from_row(row)?),
        RecordType::Stool => RecordDetail::Stool(StoolFields::from_row(row)?),
    };
    Ok(JoinedRecord { record, detail })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_to_fifty() {
        assert_eq!(effective_limit(None), Ok(50));
    }

    #[test]
    fn test_limit_accepts_up_to_one_hundred() {
        assert_eq!(effective_limit(Some(1)), Ok(1));
        assert_eq!(effective_limit(Some(100)), Ok(100));
    }

    #[test]
    fn test_limit_rejects_out_of_range() {
        assert!(effective_limit(Some(0)).is_err());
        assert!(effective_limit(Some(101)).is_err());
        assert!(effective_limit(Some(-5)).is_err());
    }

    #[test]
    fn test_joined_select_targets_the_satellite_table() {
        let sql = joined_select(RecordType::Stool);
        assert!(sql.contains("FROM stool_records t"));
        assert!(sql.contains("t.amount, t.condition, t.color"));
        assert!(sql.contains("ORDER BY r.created_at DESC"));
    }
}

/// Database-bound tests. `#[sqlx::test]` provisions a fresh Postgres
/// database per test from `DATABASE_URL`; the schema is applied the same
/// way the binary applies it at startup.
#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::enums::{MealType, StoolAmount, StoolColor, StoolCondition};

    async fn seed_kid(pool: &PgPool) -> i64 {
        init_schema(pool).await.unwrap();
        let (user_id,): (i64,) =
            sqlx::query_as("INSERT INTO users (username) VALUES ('alice_mom') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let (kid_id,): (i64,) = sqlx::query_as(
            "INSERT INTO kids (user_id, name, birth_date, gender) \
             VALUES ($1, 'Alice', DATE '2024-05-01', 'female') RETURNING id",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();
        kid_id
    }

    fn meal(detail: &str) -> RecordDetail {
        RecordDetail::Meal(MealFields {
            meal_type: MealType::BabyFood,
            meal_detail: Some(detail.to_string()),
            burp: Some(true),
        })
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_created_record_is_retrievable_with_both_halves(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        let common = NewRecordCommon {
            title: Some("lunch".to_string()),
            memo: Some("ate well".to_string()),
            image_url: None,
        };
        let created = create_typed_record(&pool, kid_id, common, meal("carrot puree"))
            .await
            .unwrap();

        let listed = list_typed(&pool, kid_id, RecordType::Meal, DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record.id, created.record.id);
        assert_eq!(listed[0].record.title.as_deref(), Some("lunch"));
        match &listed[0].detail {
            RecordDetail::Meal(m) => {
                assert_eq!(m.meal_type, MealType::BabyFood);
                assert_eq!(m.meal_detail.as_deref(), Some("carrot puree"));
                assert_eq!(m.burp, Some(true));
            }
            other => panic!("expected meal detail, got {other:?}"),
        }
    }

    #[sqlx::test]
    async fn test_failed_satellite_insert_leaves_no_base_row(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        // Make the second insert of the transaction fail after the base
        // insert has already succeeded.
        sqlx::query("DROP TABLE meal_records")
            .execute(&pool)
            .await
            .unwrap();

        let result = create_typed_record(&pool, kid_id, NewRecordCommon::default(), meal("x")).await;
        assert!(result.is_err());
        assert_eq!(count(&pool, "records").await, 0);
    }

    #[sqlx::test]
    async fn test_listing_is_newest_first_and_capped_at_limit(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        for i in 0..5 {
            create_typed_record(
                &pool,
                kid_id,
                NewRecordCommon::default(),
                meal(&format!("meal {i}")),
            )
            .await
            .unwrap();
        }

        let rows = list_records(&pool, kid_id, &RecordFilter::default(), 3)
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        for pair in rows.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[sqlx::test]
    async fn test_type_filter_is_conjunctive(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        create_typed_record(&pool, kid_id, NewRecordCommon::default(), meal("m"))
            .await
            .unwrap();
        create_typed_record(
            &pool,
            kid_id,
            NewRecordCommon::default(),
            RecordDetail::Stool(StoolFields {
                amount: StoolAmount::Medium,
                condition: StoolCondition::Normal,
                color: StoolColor::Yellow,
            }),
        )
        .await
        .unwrap();

        let filter = RecordFilter {
            record_type: Some(RecordType::Stool),
            ..Default::default()
        };
        let rows = list_records(&pool, kid_id, &filter, DEFAULT_LIMIT).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record_type, RecordType::Stool);
    }

    #[sqlx::test]
    async fn test_delete_removes_base_and_satellite(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;
        let created = create_typed_record(&pool, kid_id, NewRecordCommon::default(), meal("m"))
            .await
            .unwrap();

        assert!(delete_record(&pool, kid_id, created.record.id).await.unwrap());
        assert_eq!(count(&pool, "records").await, 0);
        assert_eq!(count(&pool, "meal_records").await, 0);

        // A second delete finds nothing: the handler turns this into 404.
        assert!(!delete_record(&pool, kid_id, created.record.id).await.unwrap());
    }

    #[sqlx::test]
    async fn test_dashboard_recents_for_growth_only_kid(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        create_typed_record(
            &pool,
            kid_id,
            NewRecordCommon::default(),
            RecordDetail::Growth(GrowthFields {
                height_cm: Some(70.5),
                weight_kg: None,
            }),
        )
        .await
        .unwrap();

        let growth = most_recent(&pool, kid_id, RecordType::Growth).await.unwrap();
        match growth.map(|g| g.detail) {
            Some(RecordDetail::Growth(g)) => {
                assert_eq!(g.height_cm, Some(70.5));
                assert_eq!(g.weight_kg, None);
            }
            other => panic!("expected growth detail, got {other:?}"),
        }
        assert!(most_recent(&pool, kid_id, RecordType::Meal)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test]
    async fn test_most_recent_picks_the_latest_row(pool: PgPool) {
        let kid_id = seed_kid(&pool).await;

        create_typed_record(&pool, kid_id, NewRecordCommon::default(), meal("first"))
            .await
            .unwrap();
        let second = create_typed_record(&pool, kid_id, NewRecordCommon::default(), meal("second"))
            .await
            .unwrap();

        let latest = most_recent(&pool, kid_id, RecordType::Meal)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.record.id, second.record.id);
    }
}
