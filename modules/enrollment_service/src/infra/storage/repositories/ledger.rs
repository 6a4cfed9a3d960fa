use super::{
    active_for_pair, active_on_slot, begin_write, lock_slot, release_seat, take_seat,
};
use crate::contract::{
    Enrollment, EnrollmentFilter, EnrollmentStatus, SlotOccupancy, SlotReconciliation,
};
use crate::domain::repository::{
    EnrollCommand, EnrollOutcome, EnrollmentRepository, MoveOutcome, StatusChange,
    TransitionOutcome,
};
use crate::domain::transitions::{plan, SeatEffect};
use crate::infra::storage::entity::{activity, enrollment, schedule_slot, student};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct SeaOrmEnrollmentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmEnrollmentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for SeaOrmEnrollmentRepository {
    async fn enroll(&self, command: &EnrollCommand) -> Result<EnrollOutcome> {
        let request = &command.enrollment;
        let txn = begin_write(&self.db).await?;

        // Student row lock serializes concurrent enrollments of the same student
        let student = student::Entity::find_by_id(request.student_id)
            .lock_exclusive()
            .one(&txn)
            .await?;
        if !student.is_some_and(|s| s.active) {
            return Ok(EnrollOutcome::StudentUnavailable);
        }

        let activity = activity::Entity::find_by_id(request.activity_id)
            .one(&txn)
            .await?;
        if !activity.is_some_and(|a| a.active) {
            return Ok(EnrollOutcome::ActivityUnavailable);
        }

        match request.slot_id {
            Some(slot_id) => {
                let Some(slot) = lock_slot(&txn, slot_id).await? else {
                    return Ok(EnrollOutcome::SlotNotFound);
                };
                if slot.activity_id != request.activity_id {
                    return Ok(EnrollOutcome::SlotOfOtherActivity);
                }
            }
            None if command.require_slot_when_scheduled => {
                let slots = schedule_slot::Entity::find()
                    .filter(schedule_slot::Column::ActivityId.eq(request.activity_id))
                    .count(&txn)
                    .await?;
                if slots > 0 {
                    return Ok(EnrollOutcome::SlotRequired);
                }
            }
            None => {}
        }

        if let Some(existing_id) =
            active_for_pair(&txn, request.student_id, request.activity_id, None).await?
        {
            return Ok(EnrollOutcome::AlreadyEnrolled { existing_id });
        }

        if let Some(slot_id) = request.slot_id {
            if !take_seat(&txn, slot_id).await? {
                return Ok(EnrollOutcome::NoSeats { slot_id });
            }
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id: request.student_id,
            activity_id: request.activity_id,
            slot_id: request.slot_id,
            status: EnrollmentStatus::Active,
            start_date: request.start_date,
            end_date: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let active: enrollment::ActiveModel = (&enrollment).into();
        let inserted = active.insert(&txn).await?;
        txn.commit().await?;

        Ok(EnrollOutcome::Enrolled(inserted.into()))
    }

    async fn transition(&self, id: Uuid, change: &StatusChange) -> Result<TransitionOutcome> {
        let txn = begin_write(&self.db).await?;

        let Some(current) = enrollment::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(TransitionOutcome::NotFound);
        };

        let previous = EnrollmentStatus::from(current.status);
        let effect = match plan(previous, change.target) {
            Ok(effect) => effect,
            Err(rejected) => return Ok(TransitionOutcome::Rejected(rejected)),
        };

        match effect {
            SeatEffect::Acquire => {
                student::Entity::find_by_id(current.student_id)
                    .lock_exclusive()
                    .one(&txn)
                    .await?;

                if let Some(existing_id) = active_for_pair(
                    &txn,
                    current.student_id,
                    current.activity_id,
                    Some(current.id),
                )
                .await?
                {
                    return Ok(TransitionOutcome::AlreadyEnrolled { existing_id });
                }

                if let Some(slot_id) = current.slot_id {
                    lock_slot(&txn, slot_id).await?;
                    if !take_seat(&txn, slot_id).await? {
                        return Ok(TransitionOutcome::NoSeats { slot_id });
                    }
                }
            }
            SeatEffect::Release => {
                if let Some(slot_id) = current.slot_id {
                    lock_slot(&txn, slot_id).await?;
                    release_seat(&txn, slot_id).await?;
                }
            }
            SeatEffect::Keep => {}
        }

        let mut model: enrollment::ActiveModel = current.clone().into();
        model.status = Set(change.target.into());
        match change.target {
            EnrollmentStatus::Active => {
                if effect == SeatEffect::Acquire {
                    model.end_date = Set(None);
                }
            }
            EnrollmentStatus::Inactive | EnrollmentStatus::Cancelled => {
                if current.end_date.is_none() {
                    model.end_date = Set(Some(change.effective_date));
                }
            }
        }
        if change.target == EnrollmentStatus::Cancelled {
            model.cancellation_reason = Set(change.reason.clone());
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(TransitionOutcome::Applied {
            enrollment: updated.into(),
            previous,
        })
    }

    async fn move_slot(&self, id: Uuid, slot_id: Uuid) -> Result<MoveOutcome> {
        let txn = begin_write(&self.db).await?;

        let Some(current) = enrollment::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(MoveOutcome::NotFound);
        };

        if current.status == enrollment::Status::Cancelled {
            return Ok(MoveOutcome::Terminal);
        }

        let previous_slot_id = current.slot_id;
        if previous_slot_id == Some(slot_id) {
            return Ok(MoveOutcome::Moved {
                enrollment: current.into(),
                previous_slot_id,
            });
        }

        // Lock both slots in id order
        let mut ids: Vec<Uuid> = previous_slot_id.into_iter().chain([slot_id]).collect();
        ids.sort();
        let mut target = None;
        for locked_id in ids {
            let slot = lock_slot(&txn, locked_id).await?;
            if locked_id == slot_id {
                target = slot;
            }
        }

        let Some(target) = target else {
            return Ok(MoveOutcome::SlotNotFound);
        };
        if target.activity_id != current.activity_id {
            return Ok(MoveOutcome::SlotOfOtherActivity);
        }

        if current.status == enrollment::Status::Active {
            if !take_seat(&txn, slot_id).await? {
                return Ok(MoveOutcome::NoSeats { slot_id });
            }
            if let Some(old) = previous_slot_id {
                release_seat(&txn, old).await?;
            }
        }

        let mut model: enrollment::ActiveModel = current.into();
        model.slot_id = Set(Some(slot_id));
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(MoveOutcome::Moved {
            enrollment: updated.into(),
            previous_slot_id,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>> {
        let result = enrollment::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(
        &self,
        filter: &EnrollmentFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Enrollment>> {
        let mut query = enrollment::Entity::find();

        if let Some(student_id) = filter.student_id {
            query = query.filter(enrollment::Column::StudentId.eq(student_id));
        }
        if let Some(activity_id) = filter.activity_id {
            query = query.filter(enrollment::Column::ActivityId.eq(activity_id));
        }
        if let Some(slot_id) = filter.slot_id {
            query = query.filter(enrollment::Column::SlotId.eq(slot_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(enrollment::Column::Status.eq(enrollment::Status::from(status)));
        }

        let results = query
            .order_by_asc(enrollment::Column::CreatedAt)
            .order_by_asc(enrollment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn occupancy(&self, slot_id: Uuid) -> Result<Option<SlotOccupancy>> {
        let Some(slot) = schedule_slot::Entity::find_by_id(slot_id)
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        let active_enrollments = active_on_slot(&*self.db, slot_id).await?;
        Ok(Some(SlotOccupancy {
            slot_id,
            total_seats: slot.total_seats,
            available_seats: slot.available_seats,
            active_enrollments,
        }))
    }

    async fn reconcile(&self, slot_id: Uuid) -> Result<Option<SlotReconciliation>> {
        let txn = begin_write(&self.db).await?;

        let Some(slot) = lock_slot(&txn, slot_id).await? else {
            return Ok(None);
        };

        let active = active_on_slot(&txn, slot_id).await?;
        let held = i32::try_from(active)?;
        let available_seats = (slot.total_seats - held).max(0);
        let previous_available = slot.available_seats;

        if available_seats != previous_available {
            let mut model: schedule_slot::ActiveModel = slot.into();
            model.available_seats = Set(available_seats);
            model.updated_at = Set(Utc::now());
            model.update(&txn).await?;
        }
        txn.commit().await?;

        Ok(Some(SlotReconciliation {
            slot_id,
            previous_available,
            available_seats,
        }))
    }
}
