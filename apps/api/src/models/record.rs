//! The polymorphic record model: one base `records` row per care event,
//! plus exactly one satellite row in the table named by the discriminant,
//! sharing the base row's primary key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::enums::{
    MealType, RecordType, SleepQuality, StoolAmount, StoolColor, StoolCondition, Symptom,
};

/// Base row shared by every care event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecordRow {
    pub id: i64,
    pub kid_id: i64,
    pub record_type: RecordType,
    pub title: Option<String>,
    pub memo: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealFields {
    pub meal_type: MealType,
    pub meal_detail: Option<String>,
    pub burp: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SleepFields {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub sleep_quality: SleepQuality,
}

impl SleepFields {
    /// Interval length in hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end_at - self.start_at).num_seconds() as f64 / 3600.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthFields {
    pub temperature: Option<f64>,
    pub symptom: Symptom,
    pub symptom_other: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GrowthFields {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoolFields {
    pub amount: StoolAmount,
    pub condition: StoolCondition,
    pub color: StoolColor,
}

/// Satellite payload of one record, tagged by the same discriminant the
/// base row carries. Untagged on the wire: the joined representation
/// already exposes `record_type`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecordDetail {
    Meal(MealFields),
    Sleep(SleepFields),
    Health(HealthFields),
    Growth(GrowthFields),
    Stool(StoolFields),
}

impl RecordDetail {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordDetail::Meal(_) => RecordType::Meal,
            RecordDetail::Sleep(_) => RecordType::Sleep,
            RecordDetail::Health(_) => RecordType::Health,
            RecordDetail::Growth(_) => RecordType::Growth,
            RecordDetail::Stool(_) => RecordType::Stool,
        }
    }

    /// Range checks and decimal normalization for typed fields. The sleep
    /// interval check is deliberately here rather than in the schema.
    pub fn validate(&mut self) -> Result<(), String> {
        match self {
            RecordDetail::Sleep(s) => {
                if s.end_at < s.start_at {
                    return Err("sleep end_at must not precede start_at".into());
                }
            }
            RecordDetail::Health(h) => {
                if let Some(t) = h.temperature {
                    if !(30.0..=45.0).contains(&t) {
                        return Err("temperature out of plausible range (30.0-45.0)".into());
                    }
                    h.temperature = Some(round_to(t, 1));
                }
            }
            RecordDetail::Growth(g) => {
                if let Some(h) = g.height_cm {
                    if h <= 0.0 {
                        return Err("height_cm must be positive".into());
                    }
                    g.height_cm = Some(round_to(h, 2));
                }
                if let Some(w) = g.weight_kg {
                    if w <= 0.0 {
                        return Err("weight_kg must be positive".into());
                    }
                    g.weight_kg = Some(round_to(w, 2));
                }
            }
            RecordDetail::Meal(_) | RecordDetail::Stool(_) => {}
        }
        Ok(())
    }
}

fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

/// A base row and its satellite presented as one logical entity.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedRecord {
    #[serde(flatten)]
    pub record: RecordRow,
    #[serde(flatten)]
    pub detail: RecordDetail,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sleep(start_h: u32, end_h: u32) -> RecordDetail {
        RecordDetail::Sleep(SleepFields {
            start_at: Utc.with_ymd_and_hms(2025, 3, 1, start_h, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2025, 3, 1, end_h, 0, 0).unwrap(),
            sleep_quality: SleepQuality::Good,
        })
    }

    #[test]
    fn test_inverted_sleep_interval_rejected() {
        assert!(sleep(9, 7).validate().is_err());
        assert!(sleep(7, 9).validate().is_ok());
    }

    #[test]
    fn test_temperature_rounded_to_one_decimal() {
        let mut d = RecordDetail::Health(HealthFields {
            temperature: Some(37.456),
            symptom: Symptom::Fever,
            symptom_other: None,
        });
        d.validate().unwrap();
        match d {
            RecordDetail::Health(h) => assert_eq!(h.temperature, Some(37.5)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_growth_rounded_to_two_decimals() {
        let mut d = RecordDetail::Growth(GrowthFields {
            height_cm: Some(70.504),
            weight_kg: Some(8.119),
        });
        d.validate().unwrap();
        match d {
            RecordDetail::Growth(g) => {
                assert_eq!(g.height_cm, Some(70.5));
                assert_eq!(g.weight_kg, Some(8.12));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_sleep_duration_hours() {
        match sleep(21, 22) {
            RecordDetail::Sleep(s) => assert_eq!(s.duration_hours(), 1.0),
            _ => unreachable!(),
        }
    }
}
