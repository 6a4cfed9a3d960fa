use super::begin_write;
use crate::contract::{Fee, FeeFilter, FeeStatus, PaymentMethod};
use crate::domain::repository::{FeeCancelOutcome, FeeRepository, PaymentOutcome};
use crate::infra::storage::entity::{activity, enrollment, fee};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    prelude::Expr, sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Fees that can still be settled or cancelled
const OPEN: [fee::Status; 2] = [fee::Status::Pending, fee::Status::Overdue];

pub struct SeaOrmFeeRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmFeeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeeRepository for SeaOrmFeeRepository {
    async fn generate(&self, month: u32, year: i32, due_date: NaiveDate) -> Result<Vec<Fee>> {
        let period_month = i32::try_from(month)?;
        let txn = begin_write(&self.db).await?;

        let active = enrollment::Entity::find()
            .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
            .find_also_related(activity::Entity)
            .order_by_asc(enrollment::Column::CreatedAt)
            .all(&txn)
            .await?;

        let mut billed: HashSet<(Uuid, Uuid)> = fee::Entity::find()
            .filter(fee::Column::Month.eq(period_month))
            .filter(fee::Column::Year.eq(year))
            .all(&txn)
            .await?
            .into_iter()
            .map(|f| (f.student_id, f.activity_id))
            .collect();

        let mut created = Vec::new();
        for (enrollment, activity) in active {
            let Some(activity) = activity else { continue };
            if !billed.insert((enrollment.student_id, enrollment.activity_id)) {
                continue;
            }

            let now = Utc::now();
            let fee = Fee {
                id: Uuid::new_v4(),
                enrollment_id: enrollment.id,
                student_id: enrollment.student_id,
                activity_id: enrollment.activity_id,
                month,
                year,
                amount_cents: activity.monthly_fee_cents,
                status: FeeStatus::Pending,
                due_date,
                paid_date: None,
                payment_method: None,
                created_at: now,
                updated_at: now,
            };

            // A concurrent generator may have inserted the same period meanwhile
            let inserted = fee::Entity::insert(fee::ActiveModel::from(&fee))
                .on_conflict(
                    OnConflict::columns([
                        fee::Column::StudentId,
                        fee::Column::ActivityId,
                        fee::Column::Month,
                        fee::Column::Year,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;

            if inserted == 1 {
                created.push(fee);
            }
        }

        txn.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Fee>> {
        let result = fee::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &FeeFilter, limit: u64, offset: u64) -> Result<Vec<Fee>> {
        let mut query = fee::Entity::find();

        if let Some(student_id) = filter.student_id {
            query = query.filter(fee::Column::StudentId.eq(student_id));
        }
        if let Some(activity_id) = filter.activity_id {
            query = query.filter(fee::Column::ActivityId.eq(activity_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(fee::Column::Status.eq(fee::Status::from(status)));
        }
        if let Some(month) = filter.month {
            query = query.filter(fee::Column::Month.eq(i32::try_from(month)?));
        }
        if let Some(year) = filter.year {
            query = query.filter(fee::Column::Year.eq(year));
        }

        let results = query
            .order_by_desc(fee::Column::Year)
            .order_by_desc(fee::Column::Month)
            .order_by_asc(fee::Column::DueDate)
            .order_by_asc(fee::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        paid_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome> {
        let txn = begin_write(&self.db).await?;

        let result = fee::Entity::update_many()
            .col_expr(fee::Column::Status, Expr::value(fee::Status::Paid))
            .col_expr(fee::Column::PaidDate, Expr::value(paid_date))
            .col_expr(fee::Column::PaymentMethod, Expr::value(fee::Method::from(method)))
            .col_expr(fee::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(fee::Column::Id.eq(id))
            .filter(fee::Column::Status.is_in(OPEN))
            .exec(&txn)
            .await?;

        let current = fee::Entity::find_by_id(id).one(&txn).await?;
        txn.commit().await?;

        let Some(current) = current else {
            return Ok(PaymentOutcome::NotFound);
        };
        Ok(match (result.rows_affected, current.status) {
            (1, _) => PaymentOutcome::Paid(current.into()),
            (_, fee::Status::Cancelled) => PaymentOutcome::Cancelled,
            _ => PaymentOutcome::AlreadyPaid,
        })
    }

    async fn cancel(&self, id: Uuid) -> Result<FeeCancelOutcome> {
        let txn = begin_write(&self.db).await?;

        let result = fee::Entity::update_many()
            .col_expr(fee::Column::Status, Expr::value(fee::Status::Cancelled))
            .col_expr(fee::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(fee::Column::Id.eq(id))
            .filter(fee::Column::Status.is_in(OPEN))
            .exec(&txn)
            .await?;

        let current = fee::Entity::find_by_id(id).one(&txn).await?;
        txn.commit().await?;

        let Some(current) = current else {
            return Ok(FeeCancelOutcome::NotFound);
        };
        Ok(match (result.rows_affected, current.status) {
            // Cancelling twice is a no-op
            (1, _) | (_, fee::Status::Cancelled) => FeeCancelOutcome::Cancelled(current.into()),
            _ => FeeCancelOutcome::AlreadyPaid,
        })
    }

    async fn sweep_overdue(&self, as_of: NaiveDate) -> Result<u64> {
        let result = fee::Entity::update_many()
            .col_expr(fee::Column::Status, Expr::value(fee::Status::Overdue))
            .col_expr(fee::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(fee::Column::Status.eq(fee::Status::Pending))
            .filter(fee::Column::DueDate.lt(as_of))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
