//! Monthly fee generation, payments and overdue sweeps
//!
//! Generation and sweeping are explicit operations; nothing here runs on a timer.

use super::repository::{FeeCancelOutcome, FeeRepository, PaymentOutcome};
use super::service::store_failure;
use super::validation::{last_day_of_month, resolve_page};
use crate::config::Config;
use crate::contract::{EnrollmentError, Fee, FeeFilter, Page, PaymentMethod};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

pub struct FeeGenerator {
    fees: Arc<dyn FeeRepository>,
    config: Config,
}

impl FeeGenerator {
    pub fn new(fees: Arc<dyn FeeRepository>, config: Config) -> Self {
        Self { fees, config }
    }

    /// Create the missing fees of `month/year` for every active enrollment.
    /// Safe to re-run: existing (student, activity, month, year) rows are skipped.
    #[tracing::instrument(skip(self))]
    pub async fn generate_monthly(&self, month: u32, year: i32) -> Result<Vec<Fee>, EnrollmentError> {
        let due_date = last_day_of_month(month, year)?;

        let created = self
            .fees
            .generate(month, year, due_date)
            .await
            .map_err(store_failure)?;

        tracing::info!(created = created.len(), %due_date, "monthly fees generated");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn register_payment(
        &self,
        fee_id: Uuid,
        paid_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Fee, EnrollmentError> {
        match self
            .fees
            .mark_paid(fee_id, paid_date, method)
            .await
            .map_err(store_failure)?
        {
            PaymentOutcome::Paid(fee) => {
                tracing::info!(fee_id = %fee_id, method = method.as_str(), "fee paid");
                Ok(fee)
            }
            PaymentOutcome::NotFound => Err(EnrollmentError::not_found("fee", fee_id)),
            PaymentOutcome::AlreadyPaid => Err(EnrollmentError::AlreadyPaid { fee_id }),
            PaymentOutcome::Cancelled => Err(EnrollmentError::InvalidTransition {
                from: "cancelled".to_string(),
                to: "paid".to_string(),
            }),
        }
    }

    pub async fn cancel(&self, fee_id: Uuid) -> Result<Fee, EnrollmentError> {
        match self.fees.cancel(fee_id).await.map_err(store_failure)? {
            FeeCancelOutcome::Cancelled(fee) => {
                tracing::info!(fee_id = %fee_id, "fee cancelled");
                Ok(fee)
            }
            FeeCancelOutcome::NotFound => Err(EnrollmentError::not_found("fee", fee_id)),
            FeeCancelOutcome::AlreadyPaid => Err(EnrollmentError::AlreadyPaid { fee_id }),
        }
    }

    /// Mark pending fees due before `as_of` as overdue
    #[tracing::instrument(skip(self))]
    pub async fn sweep_overdue(&self, as_of: NaiveDate) -> Result<u64, EnrollmentError> {
        let swept = self.fees.sweep_overdue(as_of).await.map_err(store_failure)?;
        tracing::info!(swept, "overdue sweep finished");
        Ok(swept)
    }

    pub async fn get(&self, fee_id: Uuid) -> Result<Fee, EnrollmentError> {
        self.fees
            .find_by_id(fee_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("fee", fee_id))
    }

    pub async fn list(&self, filter: FeeFilter, page: Page) -> Result<Vec<Fee>, EnrollmentError> {
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(EnrollmentError::validation(format!(
                    "month must be between 1 and 12, got {}",
                    month
                )));
            }
        }
        let (limit, offset) = resolve_page(page, &self.config);
        self.fees
            .list(&filter, limit, offset)
            .await
            .map_err(store_failure)
    }
}
