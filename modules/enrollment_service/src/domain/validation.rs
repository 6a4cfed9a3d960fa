//! Input validation for catalog, ledger and fee operations

use crate::config::Config;
use crate::contract::{ActivityInput, EnrollmentError, Page, SlotInput, StudentInput};
use chrono::{Datelike, NaiveDate};

/// Oldest and newest fee periods accepted by the generator
const MIN_FEE_YEAR: i32 = 2000;
const MAX_FEE_YEAR: i32 = 2100;

pub fn validate_student(input: &StudentInput) -> Result<(), EnrollmentError> {
    if input.full_name.trim().is_empty() {
        return Err(EnrollmentError::validation("student name cannot be empty"));
    }
    if let Some(phone) = &input.phone {
        let valid = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
        if !valid {
            return Err(EnrollmentError::validation(format!(
                "phone '{}' contains invalid characters",
                phone
            )));
        }
    }
    Ok(())
}

pub fn validate_activity(input: &ActivityInput) -> Result<(), EnrollmentError> {
    if input.name.trim().is_empty() {
        return Err(EnrollmentError::validation("activity name cannot be empty"));
    }
    if input.kind.trim().is_empty() {
        return Err(EnrollmentError::validation("activity type cannot be empty"));
    }
    if input.monthly_fee_cents < 0 {
        return Err(EnrollmentError::validation(format!(
            "monthly fee cannot be negative: {}",
            input.monthly_fee_cents
        )));
    }
    Ok(())
}

pub fn validate_slot(input: &SlotInput) -> Result<(), EnrollmentError> {
    if !(1..=7).contains(&input.weekday) {
        return Err(EnrollmentError::validation(format!(
            "weekday must be between 1 and 7, got {}",
            input.weekday
        )));
    }
    if input.start_time >= input.end_time {
        return Err(EnrollmentError::validation(format!(
            "slot must start before it ends ({} >= {})",
            input.start_time, input.end_time
        )));
    }
    if input.total_seats < 1 {
        return Err(EnrollmentError::validation(format!(
            "slot needs at least one seat, got {}",
            input.total_seats
        )));
    }
    Ok(())
}

pub fn validate_period(month: u32, year: i32) -> Result<(), EnrollmentError> {
    if !(1..=12).contains(&month) {
        return Err(EnrollmentError::validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if !(MIN_FEE_YEAR..=MAX_FEE_YEAR).contains(&year) {
        return Err(EnrollmentError::validation(format!(
            "year {} is outside {}..={}",
            year, MIN_FEE_YEAR, MAX_FEE_YEAR
        )));
    }
    Ok(())
}

/// Last calendar day of `month/year`; the due date of every fee in that period
pub fn last_day_of_month(month: u32, year: i32) -> Result<NaiveDate, EnrollmentError> {
    validate_period(month, year)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| EnrollmentError::validation(format!("invalid period {}/{}", month, year)))
}

/// Resolve a requested page against the configured bounds into `(limit, offset)`
pub fn resolve_page(page: Page, config: &Config) -> (u64, u64) {
    let limit = page
        .limit
        .unwrap_or(config.default_page_size)
        .clamp(1, config.max_page_size);
    (limit, page.offset)
}

/// Date range sanity check for reports
pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<(), EnrollmentError> {
    if from > to {
        return Err(EnrollmentError::validation(format!(
            "range start {} is after range end {}",
            from, to
        )));
    }
    if to.year() - from.year() > 5 {
        return Err(EnrollmentError::validation("range cannot span more than five years"));
    }
    Ok(())
}
