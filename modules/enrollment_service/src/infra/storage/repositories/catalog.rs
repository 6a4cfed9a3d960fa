use super::{active_on_slot, begin_write, lock_slot};
use crate::contract::{
    Activity, ActivityFilter, ActivityInput, ScheduleSlot, SlotInput, Student, StudentFilter,
    StudentInput,
};
use crate::domain::repository::{
    ActivityRepository, SlotDeleteOutcome, SlotRepository, SlotUpdateOutcome, StudentRepository,
};
use crate::infra::storage::entity::{activity, enrollment, schedule_slot, student};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use uuid::Uuid;

// ===== Students =====

pub struct SeaOrmStudentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStudentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn create(&self, student: &Student) -> Result<Student> {
        let active: student::ActiveModel = student.into();
        let inserted = active.insert(&*self.db).await?;
        Ok(inserted.into())
    }

    async fn update(&self, id: Uuid, input: &StudentInput) -> Result<Option<Student>> {
        let Some(existing) = student::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: student::ActiveModel = existing.into();
        active.full_name = Set(input.full_name.trim().to_string());
        active.birth_date = Set(input.birth_date);
        active.guardian_name = Set(input.guardian_name.clone());
        active.phone = Set(input.phone.clone());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let result = student::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &StudentFilter, limit: u64, offset: u64) -> Result<Vec<Student>> {
        let mut query = student::Entity::find();

        if let Some(active) = filter.active {
            query = query.filter(student::Column::Active.eq(active));
        }
        if let Some(name) = &filter.name_contains {
            query = query.filter(student::Column::FullName.contains(name.as_str()));
        }

        let results = query
            .order_by_asc(student::Column::FullName)
            .order_by_asc(student::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let result = student::Entity::update_many()
            .col_expr(student::Column::Active, Expr::value(active))
            .col_expr(student::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(student::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

// ===== Activities =====

pub struct SeaOrmActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmActivityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for SeaOrmActivityRepository {
    async fn create(&self, activity: &Activity) -> Result<Activity> {
        let active: activity::ActiveModel = activity.into();
        let inserted = active.insert(&*self.db).await?;
        Ok(inserted.into())
    }

    async fn update(&self, id: Uuid, input: &ActivityInput) -> Result<Option<Activity>> {
        let Some(existing) = activity::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: activity::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.kind = Set(input.kind.trim().to_string());
        active.description = Set(input.description.clone());
        active.monthly_fee_cents = Set(input.monthly_fee_cents);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Activity>> {
        let result = activity::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(
        &self,
        filter: &ActivityFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Activity>> {
        let mut query = activity::Entity::find();

        if let Some(active) = filter.active {
            query = query.filter(activity::Column::Active.eq(active));
        }
        if let Some(kind) = &filter.kind {
            query = query.filter(activity::Column::Kind.eq(kind.as_str()));
        }
        if let Some(name) = &filter.name_contains {
            query = query.filter(activity::Column::Name.contains(name.as_str()));
        }

        let results = query
            .order_by_asc(activity::Column::Name)
            .order_by_asc(activity::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let result = activity::Entity::update_many()
            .col_expr(activity::Column::Active, Expr::value(active))
            .col_expr(activity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(activity::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

// ===== Schedule slots =====

pub struct SeaOrmSlotRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSlotRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SlotRepository for SeaOrmSlotRepository {
    async fn create(&self, slot: &ScheduleSlot) -> Result<ScheduleSlot> {
        let active: schedule_slot::ActiveModel = slot.into();
        let inserted = active.insert(&*self.db).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduleSlot>> {
        let result = schedule_slot::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list_by_activity(&self, activity_id: Uuid) -> Result<Vec<ScheduleSlot>> {
        let results = schedule_slot::Entity::find()
            .filter(schedule_slot::Column::ActivityId.eq(activity_id))
            .order_by_asc(schedule_slot::Column::Weekday)
            .order_by_asc(schedule_slot::Column::StartTime)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: &SlotInput) -> Result<SlotUpdateOutcome> {
        let txn = begin_write(&self.db).await?;

        let Some(existing) = lock_slot(&txn, id).await? else {
            return Ok(SlotUpdateOutcome::NotFound);
        };

        let active = active_on_slot(&txn, id).await?;
        if i64::from(input.total_seats) < active {
            return Ok(SlotUpdateOutcome::BelowActiveCount { active });
        }
        let held = i32::try_from(active)?;

        let mut model: schedule_slot::ActiveModel = existing.into();
        model.weekday = Set(i16::from(input.weekday));
        model.start_time = Set(input.start_time);
        model.end_time = Set(input.end_time);
        model.total_seats = Set(input.total_seats);
        model.available_seats = Set(input.total_seats - held);
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(SlotUpdateOutcome::Updated(updated.into()))
    }

    async fn delete(&self, id: Uuid) -> Result<SlotDeleteOutcome> {
        let txn = begin_write(&self.db).await?;

        if lock_slot(&txn, id).await?.is_none() {
            return Ok(SlotDeleteOutcome::NotFound);
        }

        let active = active_on_slot(&txn, id).await?;
        if active > 0 {
            return Ok(SlotDeleteOutcome::InUse { active });
        }

        // Inactive and cancelled enrollments lose their reference
        enrollment::Entity::update_many()
            .col_expr(enrollment::Column::SlotId, Expr::value(Option::<Uuid>::None))
            .filter(enrollment::Column::SlotId.eq(id))
            .exec(&txn)
            .await?;

        schedule_slot::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(SlotDeleteOutcome::Deleted)
    }
}
