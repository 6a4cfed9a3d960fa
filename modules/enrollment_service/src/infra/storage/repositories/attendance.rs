use super::begin_write;
use crate::contract::{AttendanceEntry, AttendanceOutcome, AttendanceRecord, Enrollment};
use crate::domain::repository::AttendanceRepository;
use crate::infra::storage::entity::{attendance_record, enrollment};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct SeaOrmAttendanceRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAttendanceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn register_batch(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
        entries: &[AttendanceEntry],
    ) -> Result<Vec<AttendanceOutcome>> {
        let txn = begin_write(&self.db).await?;

        let enrolled: HashSet<Uuid> = enrollment::Entity::find()
            .filter(enrollment::Column::ActivityId.eq(activity_id))
            .filter(enrollment::Column::Status.eq(enrollment::Status::Active))
            .all(&txn)
            .await?
            .into_iter()
            .map(Enrollment::from)
            .filter(|e| e.is_active_on(class_date))
            .map(|e| e.student_id)
            .collect();

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            if !enrolled.contains(&entry.student_id) {
                outcomes.push(AttendanceOutcome::NotEnrolled {
                    student_id: entry.student_id,
                });
                continue;
            }

            let existing = attendance_record::Entity::find()
                .filter(attendance_record::Column::StudentId.eq(entry.student_id))
                .filter(attendance_record::Column::ActivityId.eq(activity_id))
                .filter(attendance_record::Column::ClassDate.eq(class_date))
                .one(&txn)
                .await?;

            let now = Utc::now();
            let (record, created) = match existing {
                Some(row) => {
                    let mut model: attendance_record::ActiveModel = row.into();
                    model.present = Set(entry.present);
                    model.justification = Set(entry.justification.clone());
                    model.updated_at = Set(now);
                    (model.update(&txn).await?, false)
                }
                None => {
                    let model = attendance_record::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        student_id: Set(entry.student_id),
                        activity_id: Set(activity_id),
                        class_date: Set(class_date),
                        present: Set(entry.present),
                        justification: Set(entry.justification.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    (model.insert(&txn).await?, true)
                }
            };

            outcomes.push(AttendanceOutcome::Recorded {
                record: record.into(),
                created,
            });
        }

        txn.commit().await?;
        Ok(outcomes)
    }

    async fn list_for_class(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let results = attendance_record::Entity::find()
            .filter(attendance_record::Column::ActivityId.eq(activity_id))
            .filter(attendance_record::Column::ClassDate.eq(class_date))
            .order_by_asc(attendance_record::Column::StudentId)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let results = attendance_record::Entity::find()
            .filter(attendance_record::Column::StudentId.eq(student_id))
            .filter(attendance_record::Column::ActivityId.eq(activity_id))
            .filter(attendance_record::Column::ClassDate.between(from, to))
            .order_by_asc(attendance_record::Column::ClassDate)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}
