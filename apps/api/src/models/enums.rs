//! Closed vocabularies shared by the record store, the chat layer and the
//! HTTP schemas. Every enumerated column in Postgres has a matching enum
//! type here; unknown values are rejected at deserialization instead of
//! being coerced.

use serde::{Deserialize, Serialize};

/// Discriminant of a care record. Names the satellite table that extends
/// the base `records` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "record_type", rename_all = "snake_case")]
pub enum RecordType {
    Meal,
    Sleep,
    Health,
    Growth,
    Stool,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Meal => "meal",
            RecordType::Sleep => "sleep",
            RecordType::Health => "health",
            RecordType::Growth => "growth",
            RecordType::Stool => "stool",
        }
    }

    /// Parses a path segment into a discriminant.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meal" => Some(RecordType::Meal),
            "sleep" => Some(RecordType::Sleep),
            "health" => Some(RecordType::Health),
            "growth" => Some(RecordType::Growth),
            "stool" => Some(RecordType::Stool),
            _ => None,
        }
    }

    pub fn satellite_table(&self) -> &'static str {
        match self {
            RecordType::Meal => "meal_records",
            RecordType::Sleep => "sleep_records",
            RecordType::Health => "health_records",
            RecordType::Growth => "growth_records",
            RecordType::Stool => "stool_records",
        }
    }

    /// Column list of the satellite table, used when selecting the joined
    /// representation.
    pub fn satellite_columns(&self) -> &'static str {
        match self {
            RecordType::Meal => "t.meal_type, t.meal_detail, t.burp",
            RecordType::Sleep => "t.start_at, t.end_at, t.sleep_quality",
            RecordType::Health => "t.temperature, t.symptom, t.symptom_other",
            RecordType::Growth => "t.height_cm, t.weight_kg",
            RecordType::Stool => "t.amount, t.condition, t.color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Label used in the assistant grounding context.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "boy",
            Gender::Female => "girl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "meal_type", rename_all = "snake_case")]
pub enum MealType {
    BreastMilk,
    Formula,
    BabyFood,
    Snack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "sleep_quality", rename_all = "snake_case")]
pub enum SleepQuality {
    Good,
    Normal,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "symptom", rename_all = "snake_case")]
pub enum Symptom {
    Fever,
    Cough,
    RunnyNose,
    Vomiting,
    Diarrhea,
    Rash,
    Other,
}

impl Symptom {
    pub fn label(&self) -> &'static str {
        match self {
            Symptom::Fever => "fever",
            Symptom::Cough => "cough",
            Symptom::RunnyNose => "runny nose",
            Symptom::Vomiting => "vomiting",
            Symptom::Diarrhea => "diarrhea",
            Symptom::Rash => "rash",
            Symptom::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "stool_amount", rename_all = "snake_case")]
pub enum StoolAmount {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "stool_condition", rename_all = "snake_case")]
pub enum StoolCondition {
    Hard,
    Normal,
    Soft,
    Watery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "stool_color", rename_all = "snake_case")]
pub enum StoolColor {
    Yellow,
    Brown,
    Green,
    Black,
    Red,
    White,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "sender_type", rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parse_roundtrip() {
        for rt in [
            RecordType::Meal,
            RecordType::Sleep,
            RecordType::Health,
            RecordType::Growth,
            RecordType::Stool,
        ] {
            assert_eq!(RecordType::parse(rt.as_str()), Some(rt));
        }
    }

    #[test]
    fn test_record_type_parse_rejects_unknown() {
        assert_eq!(RecordType::parse("vaccine"), None);
        assert_eq!(RecordType::parse(""), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&MealType::BreastMilk).unwrap(),
            "\"breast_milk\""
        );
        let s: Symptom = serde_json::from_str("\"runny_nose\"").unwrap();
        assert_eq!(s, Symptom::RunnyNose);
    }
}
