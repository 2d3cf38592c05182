// src/engine.rs
//! Season lifecycle engine.
//!
//! Owns every mutation and read of season plans and their activities:
//! ownership traversal (season → farm → farmer), batch inserts, the lazy
//! status refresh on reads, and summary aggregation. Handlers map onto these
//! functions 1:1 and add nothing but extraction.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{
    ActivityStatus, ActualActivity, ActualActivityCreate, Farm, FarmDetails, PlannedActivity,
    PlannedActivityCreate, SeasonCreate, SeasonDetails, SeasonHeader, SeasonPlan, SeasonSummary,
    SeasonUpdate,
};
use crate::AppError;

pub async fn create_season(
    db: &PgPool,
    farmer_id: i32,
    payload: SeasonCreate,
) -> Result<SeasonPlan, AppError> {
    let farm = sqlx::query_as::<_, Farm>("SELECT * FROM farms WHERE id = $1")
        .bind(payload.farm_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm not found".to_string()))?;

    if farm.farmer_id != farmer_id {
        return Err(AppError::Forbidden(
            "You can only create seasons for your own farms".to_string(),
        ));
    }

    let season = sqlx::query_as::<_, SeasonPlan>(
        "INSERT INTO season_plans (farm_id, crop_name, season_name)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(payload.farm_id)
    .bind(payload.crop_name)
    .bind(payload.season_name)
    .fetch_one(db)
    .await?;

    Ok(season)
}

pub async fn update_season(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    patch: SeasonUpdate,
) -> Result<SeasonPlan, AppError> {
    owned_season(db, season_id, farmer_id, "update").await?;

    // Partial update: absent fields stay as they are.
    let season = sqlx::query_as::<_, SeasonPlan>(
        "UPDATE season_plans SET
            crop_name = COALESCE($1, crop_name),
            season_name = COALESCE($2, season_name)
         WHERE id = $3
         RETURNING *",
    )
    .bind(patch.crop_name)
    .bind(patch.season_name)
    .bind(season_id)
    .fetch_one(db)
    .await?;

    Ok(season)
}

pub async fn add_planned_activities(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    items: Vec<PlannedActivityCreate>,
    today: NaiveDate,
) -> Result<(), AppError> {
    owned_season(db, season_id, farmer_id, "add activities to").await?;

    for item in &items {
        ensure_non_negative(item.estimated_cost_ugx, "estimatedCostUgx")?;
    }

    // All-or-nothing: the whole batch goes through one transaction.
    let mut tx = db.begin().await?;
    for item in items {
        let status = ActivityStatus::derive(item.target_date, today, false);
        sqlx::query(
            "INSERT INTO planned_activities
                 (season_plan_id, activity_type, target_date, estimated_cost_ugx, status)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(season_id)
        .bind(item.activity_type)
        .bind(item.target_date)
        .bind(item.estimated_cost_ugx)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(())
}

pub async fn add_actual_activities(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    items: Vec<ActualActivityCreate>,
) -> Result<(), AppError> {
    owned_season(db, season_id, farmer_id, "add activities to").await?;

    for item in &items {
        ensure_non_negative(item.actual_cost_ugx, "actualCostUgx")?;
    }

    // Every link is checked against this season's planned activities before
    // anything is written, so one bad reference aborts the whole batch.
    let ids: Vec<i32> =
        sqlx::query_scalar("SELECT id FROM planned_activities WHERE season_plan_id = $1")
            .bind(season_id)
            .fetch_all(db)
            .await?;
    let in_season: HashSet<i32> = ids.into_iter().collect();
    for item in &items {
        check_link(item.planned_activity_id, &in_season)?;
    }

    let mut tx = db.begin().await?;
    for item in items {
        if let Some(planned_id) = item.planned_activity_id {
            // A fulfilled plan is completed for good; the status refresh
            // never reverts a COMPLETED row.
            sqlx::query("UPDATE planned_activities SET status = $1 WHERE id = $2")
                .bind(ActivityStatus::Completed)
                .bind(planned_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            "INSERT INTO actual_activities
                 (season_plan_id, activity_type, actual_date, actual_cost_ugx, notes, planned_activity_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(season_id)
        .bind(item.activity_type)
        .bind(item.actual_date)
        .bind(item.actual_cost_ugx)
        .bind(item.notes)
        .bind(item.planned_activity_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(())
}

pub async fn season_details(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    today: NaiveDate,
) -> Result<SeasonDetails, AppError> {
    let season = owned_season(db, season_id, farmer_id, "access").await?;

    let farm_name: String = sqlx::query_scalar("SELECT name FROM farms WHERE id = $1")
        .bind(season.farm_id)
        .fetch_one(db)
        .await?;

    let planned = refresh_planned_statuses(db, season_id, today).await?;
    let actual = sqlx::query_as::<_, ActualActivity>(
        "SELECT * FROM actual_activities WHERE season_plan_id = $1 ORDER BY id",
    )
    .bind(season_id)
    .fetch_all(db)
    .await?;

    Ok(SeasonDetails {
        season: SeasonHeader {
            id: season.id,
            farm_details: FarmDetails {
                farm_id: season.farm_id,
                farm_name,
            },
            crop_name: season.crop_name,
            season_name: season.season_name,
        },
        planned_activities: planned,
        actual_activities: actual,
    })
}

pub async fn season_summary(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    today: NaiveDate,
) -> Result<SeasonSummary, AppError> {
    owned_season(db, season_id, farmer_id, "access").await?;

    let planned = refresh_planned_statuses(db, season_id, today).await?;
    let actual = sqlx::query_as::<_, ActualActivity>(
        "SELECT * FROM actual_activities WHERE season_plan_id = $1 ORDER BY id",
    )
    .bind(season_id)
    .fetch_all(db)
    .await?;

    Ok(summarize(season_id, &planned, &actual))
}

/// Existence first, then ownership: an absent season is NotFound, someone
/// else's season is Forbidden. Nothing beyond that boolean leaks.
async fn owned_season(
    db: &PgPool,
    season_id: i32,
    farmer_id: i32,
    action: &str,
) -> Result<SeasonPlan, AppError> {
    let season = sqlx::query_as::<_, SeasonPlan>("SELECT * FROM season_plans WHERE id = $1")
        .bind(season_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Season not found".to_string()))?;

    let owner_id: i32 = sqlx::query_scalar("SELECT farmer_id FROM farms WHERE id = $1")
        .bind(season.farm_id)
        .fetch_one(db)
        .await?;

    if owner_id != farmer_id {
        return Err(AppError::Forbidden(format!(
            "You can only {} your own seasons",
            action
        )));
    }

    Ok(season)
}

/// The lazy recomputation point: re-derive every status against the current
/// date and persist the rows that changed. The stored status is only a cache
/// of the last read. Rewriting is idempotent, so concurrent readers may race
/// on the flip but only ever write the same value.
async fn refresh_planned_statuses(
    db: &PgPool,
    season_id: i32,
    today: NaiveDate,
) -> Result<Vec<PlannedActivity>, AppError> {
    let mut tx = db.begin().await?;

    let mut planned = sqlx::query_as::<_, PlannedActivity>(
        "SELECT * FROM planned_activities WHERE season_plan_id = $1 ORDER BY id",
    )
    .bind(season_id)
    .fetch_all(&mut *tx)
    .await?;

    for activity in &mut planned {
        let fulfilled = activity.status == ActivityStatus::Completed;
        let fresh = ActivityStatus::derive(activity.target_date, today, fulfilled);
        if fresh != activity.status {
            sqlx::query("UPDATE planned_activities SET status = $1 WHERE id = $2")
                .bind(fresh)
                .bind(activity.id)
                .execute(&mut *tx)
                .await?;
            activity.status = fresh;
        }
    }

    tx.commit().await?;

    Ok(planned)
}

fn ensure_non_negative(amount: Decimal, field: &str) -> Result<(), AppError> {
    if amount < Decimal::ZERO {
        return Err(AppError::BadRequest(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

fn check_link(link: Option<i32>, in_season: &HashSet<i32>) -> Result<(), AppError> {
    match link {
        Some(id) if !in_season.contains(&id) => Err(AppError::InvalidReference(format!(
            "Invalid plannedActivityId: {}",
            id
        ))),
        _ => Ok(()),
    }
}

/// Counts are partitioned over the already-refreshed statuses; totals are
/// exact fixed-point sums. Actual costs count whether or not the activity
/// fulfills a plan.
pub fn summarize(
    season_id: i32,
    planned: &[PlannedActivity],
    actual: &[ActualActivity],
) -> SeasonSummary {
    let mut upcoming = 0;
    let mut completed = 0;
    let mut overdue = 0;
    for activity in planned {
        match activity.status {
            ActivityStatus::Upcoming => upcoming += 1,
            ActivityStatus::Completed => completed += 1,
            ActivityStatus::Overdue => overdue += 1,
        }
    }

    let total_estimated: Decimal = planned.iter().map(|a| a.estimated_cost_ugx).sum();
    let total_actual: Decimal = actual.iter().map(|a| a.actual_cost_ugx).sum();

    SeasonSummary {
        season_id,
        total_estimated_cost_ugx: total_estimated,
        total_actual_cost_ugx: total_actual,
        activities_upcoming_count: upcoming,
        activities_completed_count: completed,
        activities_overdue_count: overdue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn planned(id: i32, cost: Decimal, status: ActivityStatus) -> PlannedActivity {
        PlannedActivity {
            id,
            season_plan_id: 7,
            activity_type: "Planting".to_string(),
            target_date: d("2024-09-01"),
            estimated_cost_ugx: cost,
            status,
        }
    }

    fn actual(id: i32, cost: Decimal, link: Option<i32>) -> ActualActivity {
        ActualActivity {
            id,
            season_plan_id: 7,
            activity_type: "Weeding".to_string(),
            actual_date: d("2024-08-15"),
            actual_cost_ugx: cost,
            notes: None,
            planned_activity_id: link,
        }
    }

    #[test]
    fn links_outside_the_season_are_rejected() {
        let in_season: HashSet<i32> = [1, 2, 3].into_iter().collect();

        assert!(check_link(Some(2), &in_season).is_ok());
        assert!(check_link(None, &in_season).is_ok());

        match check_link(Some(99), &in_season) {
            Err(AppError::InvalidReference(msg)) => {
                assert!(msg.contains("99"));
            }
            other => panic!("Expected InvalidReference, got {:?}", other.err()),
        }
    }

    #[test]
    fn negative_costs_are_rejected() {
        assert!(ensure_non_negative(dec!(0.00), "estimatedCostUgx").is_ok());
        assert!(ensure_non_negative(dec!(-0.01), "estimatedCostUgx").is_err());
    }

    #[test]
    fn summary_counts_and_totals() {
        // One completed plan (100.00), one upcoming (200.00), one unlinked
        // actual activity (150.00).
        let planned = vec![
            planned(1, dec!(100.00), ActivityStatus::Completed),
            planned(2, dec!(200.00), ActivityStatus::Upcoming),
        ];
        let actual = vec![actual(1, dec!(150.00), None)];

        let summary = summarize(7, &planned, &actual);
        assert_eq!(
            summary,
            SeasonSummary {
                season_id: 7,
                total_estimated_cost_ugx: dec!(300.00),
                total_actual_cost_ugx: dec!(150.00),
                activities_upcoming_count: 1,
                activities_completed_count: 1,
                activities_overdue_count: 0,
            }
        );
    }

    #[test]
    fn linked_actuals_still_count_toward_the_actual_total() {
        let planned = vec![planned(1, dec!(50.00), ActivityStatus::Completed)];
        let actual = vec![
            actual(1, dec!(40.00), Some(1)),
            actual(2, dec!(25.50), None),
        ];

        let summary = summarize(7, &planned, &actual);
        assert_eq!(summary.total_actual_cost_ugx, dec!(65.50));
        assert_eq!(summary.activities_completed_count, 1);
    }

    #[test]
    fn empty_season_summarizes_to_zeros() {
        let summary = summarize(7, &[], &[]);
        assert_eq!(summary.total_estimated_cost_ugx, Decimal::ZERO);
        assert_eq!(summary.total_actual_cost_ugx, Decimal::ZERO);
        assert_eq!(summary.activities_upcoming_count, 0);
        assert_eq!(summary.activities_completed_count, 0);
        assert_eq!(summary.activities_overdue_count, 0);
    }
}
