// src/models.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// --- 1. Farmer ---

#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: NaiveDate,
}

/// Public projection of a farmer, as returned by the admin listing.
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerOut {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmerCreate {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 3, max = 32, message = "phone number must be 3-32 characters"))]
    pub phone_number: String,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "gender must not be empty"))]
    pub gender: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmerLogin {
    pub phone_number: String,
    pub password: String,
}

// Mixed casing on this payload is load-bearing for existing clients:
// farmerId is camelCase, jwt_access_token is not.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(rename = "farmerId")]
    pub farmer_id: i32,
    pub jwt_access_token: String,
}

// --- 2. Farm ---

#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: i32,
    pub farmer_id: i32,
    pub name: String,
    pub size_acres: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmCreate {
    pub farmer_id: i32,
    #[validate(length(min = 1, max = 255, message = "farm name must not be empty"))]
    pub name: String,
    pub size_acres: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdate {
    #[validate(length(min = 1, max = 255, message = "farm name must not be empty"))]
    pub name: Option<String>,
    pub size_acres: Option<Decimal>,
}

// Mixed casing here too: the farmerId parameter is camelCase, admin_key
// is not.
#[derive(Debug, Deserialize)]
pub struct FarmListQuery {
    #[serde(rename = "farmerId")]
    pub farmer_id: Option<i32>,
    pub admin_key: Option<String>,
}

// --- 3. Season plan ---

#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonPlan {
    pub id: i32,
    pub farm_id: i32,
    pub crop_name: String,
    pub season_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonCreate {
    pub farm_id: i32,
    #[validate(length(min = 1, max = 120, message = "crop name must not be empty"))]
    pub crop_name: String,
    #[validate(length(min = 1, max = 120, message = "season name must not be empty"))]
    pub season_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonUpdate {
    #[validate(length(min = 1, max = 120, message = "crop name must not be empty"))]
    pub crop_name: Option<String>,
    #[validate(length(min = 1, max = 120, message = "season name must not be empty"))]
    pub season_name: Option<String>,
}

// --- 4. Activities ---

/// Lifecycle state of a planned activity. The stored value is a cache of the
/// last derivation; see [`ActivityStatus::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "activity_status", rename_all = "UPPERCASE")]
pub enum ActivityStatus {
    Upcoming,
    Completed,
    Overdue,
}

impl ActivityStatus {
    /// Status is a pure function of the target date, the current civil date
    /// and whether any actual activity fulfills the plan. Completion wins
    /// unconditionally; a completed activity never reverts on later reads.
    pub fn derive(target_date: NaiveDate, today: NaiveDate, fulfilled: bool) -> Self {
        if fulfilled {
            ActivityStatus::Completed
        } else if target_date < today {
            ActivityStatus::Overdue
        } else {
            ActivityStatus::Upcoming
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedActivity {
    pub id: i32,
    pub season_plan_id: i32,
    pub activity_type: String,
    pub target_date: NaiveDate,
    pub estimated_cost_ugx: Decimal,
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualActivity {
    pub id: i32,
    pub season_plan_id: i32,
    pub activity_type: String,
    pub actual_date: NaiveDate,
    pub actual_cost_ugx: Decimal,
    pub notes: Option<String>,
    pub planned_activity_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlannedActivityCreate {
    #[validate(length(min = 1, max = 50, message = "activity type must not be empty"))]
    pub activity_type: String,
    pub target_date: NaiveDate,
    pub estimated_cost_ugx: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActualActivityCreate {
    #[validate(length(min = 1, max = 50, message = "activity type must not be empty"))]
    pub activity_type: String,
    pub actual_date: NaiveDate,
    pub actual_cost_ugx: Decimal,
    pub notes: Option<String>,
    pub planned_activity_id: Option<i32>,
}

// --- 5. Read models ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetails {
    pub farm_id: i32,
    pub farm_name: String,
}

#[derive(Debug, Serialize)]
pub struct SeasonHeader {
    pub id: i32,
    pub farm_details: FarmDetails,
    #[serde(rename = "cropName")]
    pub crop_name: String,
    #[serde(rename = "seasonName")]
    pub season_name: String,
}

#[derive(Debug, Serialize)]
pub struct SeasonDetails {
    pub season: SeasonHeader,
    pub planned_activities: Vec<PlannedActivity>,
    pub actual_activities: Vec<ActualActivity>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season_id: i32,
    pub total_estimated_cost_ugx: Decimal,
    pub total_actual_cost_ugx: Decimal,
    pub activities_upcoming_count: u32,
    pub activities_completed_count: u32,
    pub activities_overdue_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn derive_is_a_pure_function_of_date_and_linkage() {
        // Past target, not fulfilled: overdue no matter what was stored.
        assert_eq!(
            ActivityStatus::derive(d("2024-01-01"), d("2024-06-01"), false),
            ActivityStatus::Overdue
        );
        // Future target: upcoming.
        assert_eq!(
            ActivityStatus::derive(d("2024-06-02"), d("2024-06-01"), false),
            ActivityStatus::Upcoming
        );
        // Due today is not yet overdue; the comparison is strict.
        assert_eq!(
            ActivityStatus::derive(d("2024-06-01"), d("2024-06-01"), false),
            ActivityStatus::Upcoming
        );
    }

    #[test]
    fn completion_takes_precedence_over_any_date() {
        assert_eq!(
            ActivityStatus::derive(d("2020-01-01"), d("2024-06-01"), true),
            ActivityStatus::Completed
        );
        assert_eq!(
            ActivityStatus::derive(d("2030-01-01"), d("2024-06-01"), true),
            ActivityStatus::Completed
        );
    }

    #[test]
    fn status_serializes_in_wire_casing() {
        assert_eq!(
            serde_json::to_string(&ActivityStatus::Overdue).unwrap(),
            "\"OVERDUE\""
        );
    }
}
