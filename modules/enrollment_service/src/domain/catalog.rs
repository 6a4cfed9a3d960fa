//! Activity catalog - students, activities and schedule slots

use super::repository::{
    ActivityRepository, SlotDeleteOutcome, SlotRepository, SlotUpdateOutcome, StudentRepository,
};
use super::service::store_failure;
use super::validation::{resolve_page, validate_activity, validate_slot, validate_student};
use crate::config::Config;
use crate::contract::{
    Activity, ActivityFilter, ActivityInput, EnrollmentError, Page, ScheduleSlot, SlotInput,
    Student, StudentFilter, StudentInput,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct CatalogService {
    students: Arc<dyn StudentRepository>,
    activities: Arc<dyn ActivityRepository>,
    slots: Arc<dyn SlotRepository>,
    config: Config,
}

impl CatalogService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        activities: Arc<dyn ActivityRepository>,
        slots: Arc<dyn SlotRepository>,
        config: Config,
    ) -> Self {
        Self {
            students,
            activities,
            slots,
            config,
        }
    }

    // ===== Students =====

    pub async fn create_student(&self, input: StudentInput) -> Result<Student, EnrollmentError> {
        validate_student(&input)?;

        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            full_name: input.full_name.trim().to_string(),
            birth_date: input.birth_date,
            guardian_name: input.guardian_name,
            phone: input.phone,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.students.create(&student).await.map_err(store_failure)?;
        tracing::info!(student_id = %created.id, "student created");
        Ok(created)
    }

    pub async fn update_student(
        &self,
        id: Uuid,
        input: StudentInput,
    ) -> Result<Student, EnrollmentError> {
        validate_student(&input)?;

        self.students
            .update(id, &input)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("student", id))
    }

    pub async fn get_student(&self, id: Uuid) -> Result<Student, EnrollmentError> {
        self.students
            .find_by_id(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("student", id))
    }

    pub async fn list_students(
        &self,
        filter: StudentFilter,
        page: Page,
    ) -> Result<Vec<Student>, EnrollmentError> {
        let (limit, offset) = resolve_page(page, &self.config);
        self.students
            .list(&filter, limit, offset)
            .await
            .map_err(store_failure)
    }

    /// Soft delete; existing enrollments are left untouched
    pub async fn deactivate_student(&self, id: Uuid) -> Result<(), EnrollmentError> {
        if !self.students.set_active(id, false).await.map_err(store_failure)? {
            return Err(EnrollmentError::not_found("student", id));
        }
        tracing::info!(student_id = %id, "student deactivated");
        Ok(())
    }

    // ===== Activities =====

    pub async fn create_activity(&self, input: ActivityInput) -> Result<Activity, EnrollmentError> {
        validate_activity(&input)?;

        let now = Utc::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            kind: input.kind.trim().to_string(),
            description: input.description,
            monthly_fee_cents: input.monthly_fee_cents,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .activities
            .create(&activity)
            .await
            .map_err(store_failure)?;
        tracing::info!(activity_id = %created.id, name = %created.name, "activity created");
        Ok(created)
    }

    pub async fn update_activity(
        &self,
        id: Uuid,
        input: ActivityInput,
    ) -> Result<Activity, EnrollmentError> {
        validate_activity(&input)?;

        self.activities
            .update(id, &input)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("activity", id))
    }

    pub async fn get_activity(&self, id: Uuid) -> Result<Activity, EnrollmentError> {
        self.activities
            .find_by_id(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("activity", id))
    }

    pub async fn list_activities(
        &self,
        filter: ActivityFilter,
        page: Page,
    ) -> Result<Vec<Activity>, EnrollmentError> {
        let (limit, offset) = resolve_page(page, &self.config);
        self.activities
            .list(&filter, limit, offset)
            .await
            .map_err(store_failure)
    }

    pub async fn deactivate_activity(&self, id: Uuid) -> Result<(), EnrollmentError> {
        if !self
            .activities
            .set_active(id, false)
            .await
            .map_err(store_failure)?
        {
            return Err(EnrollmentError::not_found("activity", id));
        }
        tracing::info!(activity_id = %id, "activity deactivated");
        Ok(())
    }

    // ===== Schedule slots =====

    pub async fn create_slot(
        &self,
        activity_id: Uuid,
        input: SlotInput,
    ) -> Result<ScheduleSlot, EnrollmentError> {
        validate_slot(&input)?;

        let activity = self.get_activity(activity_id).await?;
        if !activity.active {
            return Err(EnrollmentError::not_found("activity", activity_id));
        }

        let now = Utc::now();
        let slot = ScheduleSlot {
            id: Uuid::new_v4(),
            activity_id,
            weekday: input.weekday,
            start_time: input.start_time,
            end_time: input.end_time,
            total_seats: input.total_seats,
            available_seats: input.total_seats,
            created_at: now,
            updated_at: now,
        };

        let created = self.slots.create(&slot).await.map_err(store_failure)?;
        tracing::info!(
            slot_id = %created.id,
            activity_id = %activity_id,
            seats = created.total_seats,
            "schedule slot created"
        );
        Ok(created)
    }

    pub async fn get_slot(&self, id: Uuid) -> Result<ScheduleSlot, EnrollmentError> {
        self.slots
            .find_by_id(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("schedule slot", id))
    }

    pub async fn list_slots(&self, activity_id: Uuid) -> Result<Vec<ScheduleSlot>, EnrollmentError> {
        self.get_activity(activity_id).await?;
        self.slots
            .list_by_activity(activity_id)
            .await
            .map_err(store_failure)
    }

    /// Edit a slot; a new capacity below the seats currently held is refused
    pub async fn update_slot(
        &self,
        id: Uuid,
        input: SlotInput,
    ) -> Result<ScheduleSlot, EnrollmentError> {
        validate_slot(&input)?;

        match self.slots.update(id, &input).await.map_err(store_failure)? {
            SlotUpdateOutcome::Updated(slot) => {
                tracing::info!(
                    slot_id = %id,
                    total = slot.total_seats,
                    available = slot.available_seats,
                    "schedule slot updated"
                );
                Ok(slot)
            }
            SlotUpdateOutcome::NotFound => Err(EnrollmentError::not_found("schedule slot", id)),
            SlotUpdateOutcome::BelowActiveCount { active } => Err(EnrollmentError::conflict(
                format!(
                    "slot {} has {} active enrollments, cannot shrink to {} seats",
                    id, active, input.total_seats
                ),
            )),
        }
    }

    pub async fn delete_slot(&self, id: Uuid) -> Result<(), EnrollmentError> {
        match self.slots.delete(id).await.map_err(store_failure)? {
            SlotDeleteOutcome::Deleted => {
                tracing::info!(slot_id = %id, "schedule slot deleted");
                Ok(())
            }
            SlotDeleteOutcome::NotFound => Err(EnrollmentError::not_found("schedule slot", id)),
            SlotDeleteOutcome::InUse { active } => Err(EnrollmentError::conflict(format!(
                "slot {} is referenced by {} active enrollments",
                id, active
            ))),
        }
    }
}
