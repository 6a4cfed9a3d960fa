//! SeaORM repository implementations
//!
//! Seat counters are only written by the helpers below, always inside the
//! transaction that also writes the enrollment row. Row locks are taken in a
//! fixed order (enrollment, student, slots by id) so that concurrent ledger
//! operations cannot deadlock each other.
//!
//! SQLite has no row locks. Every write transaction starts through
//! [`begin_write`], which takes the database write lock before the first read,
//! so competing writers wait on the busy timeout instead of failing to upgrade
//! a read lock mid-transaction.

mod attendance;
mod catalog;
mod fees;
mod ledger;

pub use attendance::SeaOrmAttendanceRepository;
pub use catalog::{SeaOrmActivityRepository, SeaOrmSlotRepository, SeaOrmStudentRepository};
pub use fees::SeaOrmFeeRepository;
pub use ledger::SeaOrmEnrollmentRepository;

use super::entity::{enrollment, schedule_slot};
use chrono::Utc;
use sea_orm::{
    prelude::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

/// Begin a transaction that is allowed to write
async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    if txn.get_database_backend() == DbBackend::Sqlite {
        // A write as the first statement claims the lock up front (BEGIN IMMEDIATE)
        txn.execute_unprepared("UPDATE schedule_slots SET updated_at = updated_at WHERE 0")
            .await?;
    }
    Ok(txn)
}

/// Load a slot holding its row lock until the transaction ends
async fn lock_slot<C: ConnectionTrait>(
    conn: &C,
    slot_id: Uuid,
) -> Result<Option<schedule_slot::Model>, DbErr> {
    schedule_slot::Entity::find_by_id(slot_id)
        .lock_exclusive()
        .one(conn)
        .await
}

/// Guarded decrement; `false` when the slot has no seat left
async fn take_seat<C: ConnectionTrait>(conn: &C, slot_id: Uuid) -> Result<bool, DbErr> {
    let result = schedule_slot::Entity::update_many()
        .col_expr(
            schedule_slot::Column::AvailableSeats,
            Expr::col(schedule_slot::Column::AvailableSeats).sub(1),
        )
        .col_expr(schedule_slot::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(schedule_slot::Column::Id.eq(slot_id))
        .filter(schedule_slot::Column::AvailableSeats.gt(0))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Guarded increment; never lets the counter pass the slot capacity
async fn release_seat<C: ConnectionTrait>(conn: &C, slot_id: Uuid) -> Result<(), DbErr> {
    let result = schedule_slot::Entity::update_many()
        .col_expr(
            schedule_slot::Column::AvailableSeats,
            Expr::col(schedule_slot::Column::AvailableSeats).add(1),
        )
        .col_expr(schedule_slot::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(schedule_slot::Column::Id.eq(slot_id))
        .filter(
            Expr::col(schedule_slot::Column::AvailableSeats)
                .lt(Expr::col(schedule_slot::Column::TotalSeats)),
        )
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        // Counter already at capacity: the slot drifted, reconcile fixes it
        tracing::warn!(slot_id = %slot_id, "seat release skipped, counter already at capacity");
    }
    Ok(())
}

/// Number of active enrollments holding a seat on the slot
async fn active_on_slot<C: ConnectionTrait>(conn: &C, slot_id: Uuid) -> Result<i64, DbErr> {
    let count = enrollment::Entity::find()
        .filter(enrollment::Column::SlotId.eq(slot_id))
        .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
        .count(conn)
        .await?;

    Ok(i64::try_from(count).unwrap_or(i64::MAX))
}

/// Active enrollment for the pair, other than `exclude`
async fn active_for_pair<C: ConnectionTrait>(
    conn: &C,
    student_id: Uuid,
    activity_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>, DbErr> {
    let mut query = enrollment::Entity::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ActivityId.eq(activity_id))
        .filter(enrollment::Column::Status.eq(enrollment::Status::Active));

    if let Some(id) = exclude {
        query = query.filter(enrollment::Column::Id.ne(id));
    }

    Ok(query.one(conn).await?.map(|e| e.id))
}
