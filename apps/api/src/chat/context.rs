//! Context assembler — a bounded, deterministic text summary of one kid's
//! profile and recent growth/health/sleep history, used to ground the
//! assistant's persona prompt. Read-only; a racing write only changes
//! which records the summary sees, never its validity.

use sqlx::PgPool;

use crate::models::enums::RecordType;
use crate::models::kid::Kid;
use crate::models::record::{GrowthFields, HealthFields, RecordDetail, SleepFields};
use crate::records::store;

/// How many recent health records contribute symptom labels.
const HEALTH_WINDOW: i64 = 3;
/// How many recent sleep records contribute to the average duration.
const SLEEP_WINDOW: i64 = 7;

/// Fetches the relevant record windows and renders the context blob.
pub async fn build_kid_context(pool: &PgPool, kid: &Kid) -> Result<String, sqlx::Error> {
    let latest_growth = store::most_recent(pool, kid.id, RecordType::Growth)
        .await?
        .and_then(|r| match r.detail {
            RecordDetail::Growth(g) => Some(g),
            _ => None,
        });

    let recent_health: Vec<HealthFields> =
        store::list_typed(pool, kid.id, RecordType::Health, HEALTH_WINDOW)
            .await?
            .into_iter()
            .filter_map(|r| match r.detail {
                RecordDetail::Health(h) => Some(h),
                _ => None,
            })
            .collect();

    let recent_sleep: Vec<SleepFields> =
        store::list_typed(pool, kid.id, RecordType::Sleep, SLEEP_WINDOW)
            .await?
            .into_iter()
            .filter_map(|r| match r.detail {
                RecordDetail::Sleep(s) => Some(s),
                _ => None,
            })
            .collect();

    Ok(render_kid_context(
        kid,
        latest_growth.as_ref(),
        &recent_health,
        &recent_sleep,
    ))
}

/// Renders the summary lines in fixed order: profile, growth, health,
/// sleep. Lines for absent data are omitted entirely, never emitted
/// empty or zeroed.
pub fn render_kid_context(
    kid: &Kid,
    latest_growth: Option<&GrowthFields>,
    recent_health: &[HealthFields],
    recent_sleep: &[SleepFields],
) -> String {
    let mut lines = vec![
        format!("- Name: {}", kid.name),
        format!("- Birth date: {}", kid.birth_date),
        format!("- Gender: {}", kid.gender.label()),
    ];

    // Two fixed decimals, matching how measurements are stored.
    if let Some(growth) = latest_growth {
        if let Some(height) = growth.height_cm {
            lines.push(format!("- Recent height: {height:.2}cm"));
        }
        if let Some(weight) = growth.weight_kg {
            lines.push(format!("- Recent weight: {weight:.2}kg"));
        }
    }

    // Distinct symptom labels, first-seen order.
    let mut symptoms: Vec<&str> = Vec::new();
    for health in recent_health {
        let label = health.symptom.label();
        if !symptoms.contains(&label) {
            symptoms.push(label);
        }
    }
    if !symptoms.is_empty() {
        lines.push(format!("- Recent symptoms: {}", symptoms.join(", ")));
    }

    if !recent_sleep.is_empty() {
        let total_hours: f64 = recent_sleep.iter().map(|s| s.duration_hours()).sum();
        let avg = total_hours / recent_sleep.len() as f64;
        lines.push(format!("- Average sleep: {avg:.1} hours"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Gender, SleepQuality, Symptom};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn kid() -> Kid {
        Kid {
            id: 1,
            user_id: 1,
            name: "Alice".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            gender: Gender::Female,
        }
    }

    fn sleep_of(hours_x10: i64) -> SleepFields {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        SleepFields {
            start_at: start,
            end_at: start + chrono::Duration::minutes(hours_x10 * 6),
            sleep_quality: SleepQuality::Normal,
        }
    }

    fn health_of(symptom: Symptom) -> HealthFields {
        HealthFields {
            temperature: None,
            symptom,
            symptom_other: None,
        }
    }

    #[test]
    fn test_bare_profile_has_exactly_three_lines() {
        let ctx = render_kid_context(&kid(), None, &[], &[]);
        assert_eq!(
            ctx,
            "- Name: Alice\n- Birth date: 2024-05-01\n- Gender: girl"
        );
    }

    #[test]
    fn test_unset_growth_fields_are_omitted() {
        let growth = GrowthFields {
            height_cm: Some(70.5),
            weight_kg: None,
        };
        let ctx = render_kid_context(&kid(), Some(&growth), &[], &[]);
        assert!(ctx.contains("- Recent height: 70.50cm"));
        assert!(!ctx.contains("weight"));
    }

    #[test]
    fn test_measurements_render_with_two_decimals() {
        let growth = GrowthFields {
            height_cm: Some(70.0),
            weight_kg: Some(8.2),
        };
        let ctx = render_kid_context(&kid(), Some(&growth), &[], &[]);
        assert!(ctx.contains("- Recent height: 70.00cm"));
        assert!(ctx.contains("- Recent weight: 8.20kg"));
    }

    #[test]
    fn test_duplicate_symptoms_collapse_to_set() {
        let health = vec![
            health_of(Symptom::Fever),
            health_of(Symptom::Fever),
            health_of(Symptom::Cough),
        ];
        let ctx = render_kid_context(&kid(), None, &health, &[]);
        assert!(ctx.contains("- Recent symptoms: fever, cough"));
        assert_eq!(ctx.matches("fever").count(), 1);
    }

    #[test]
    fn test_average_sleep_rounded_to_one_decimal() {
        // 8h, 7.5h, 8.5h -> 8.0
        let sleep = vec![sleep_of(80), sleep_of(75), sleep_of(85)];
        let ctx = render_kid_context(&kid(), None, &[], &sleep);
        assert!(ctx.contains("- Average sleep: 8.0 hours"));
    }

    #[test]
    fn test_line_order_is_profile_growth_health_sleep() {
        let growth = GrowthFields {
            height_cm: Some(70.0),
            weight_kg: Some(8.2),
        };
        let ctx = render_kid_context(
            &kid(),
            Some(&growth),
            &[health_of(Symptom::Rash)],
            &[sleep_of(80)],
        );
        let height = ctx.find("Recent height").unwrap();
        let symptoms = ctx.find("Recent symptoms").unwrap();
        let sleep = ctx.find("Average sleep").unwrap();
        assert!(ctx.find("Name").unwrap() < height);
        assert!(height < symptoms);
        assert!(symptoms < sleep);
    }
}
