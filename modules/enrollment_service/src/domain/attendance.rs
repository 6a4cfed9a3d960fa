//! Attendance batch registrar

use super::repository::{ActivityRepository, AttendanceRepository};
use super::service::store_failure;
use super::validation::validate_range;
use crate::config::Config;
use crate::contract::{
    AttendanceEntry, AttendanceOutcome, AttendanceRecord, AttendanceSummary, EnrollmentError,
};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

pub struct AttendanceRegistrar {
    records: Arc<dyn AttendanceRepository>,
    activities: Arc<dyn ActivityRepository>,
    config: Config,
}

impl AttendanceRegistrar {
    pub fn new(
        records: Arc<dyn AttendanceRepository>,
        activities: Arc<dyn ActivityRepository>,
        config: Config,
    ) -> Self {
        Self {
            records,
            activities,
            config,
        }
    }

    /// Record one class. Students without an active enrollment on `class_date`
    /// come back as `NotEnrolled`; everyone else is committed together.
    #[tracing::instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn register_batch(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
        entries: Vec<AttendanceEntry>,
    ) -> Result<Vec<AttendanceOutcome>, EnrollmentError> {
        if entries.len() > self.config.max_attendance_batch {
            return Err(EnrollmentError::validation(format!(
                "attendance batch has {} records, limit is {}",
                entries.len(),
                self.config.max_attendance_batch
            )));
        }

        self.activities
            .find_by_id(activity_id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EnrollmentError::not_found("activity", activity_id))?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = self
            .records
            .register_batch(activity_id, class_date, &entries)
            .await
            .map_err(store_failure)?;

        for outcome in &outcomes {
            if let AttendanceOutcome::NotEnrolled { student_id } = outcome {
                tracing::debug!(student_id = %student_id, "attendance skipped: not enrolled");
            }
        }
        let recorded = outcomes.iter().filter(|o| o.is_recorded()).count();
        tracing::info!(
            recorded,
            not_enrolled = outcomes.len() - recorded,
            "attendance batch registered"
        );

        Ok(outcomes)
    }

    pub async fn list_for_class(
        &self,
        activity_id: Uuid,
        class_date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EnrollmentError> {
        self.records
            .list_for_class(activity_id, class_date)
            .await
            .map_err(store_failure)
    }

    pub async fn student_summary(
        &self,
        student_id: Uuid,
        activity_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AttendanceSummary, EnrollmentError> {
        validate_range(from, to)?;

        let records = self
            .records
            .list_for_student(student_id, activity_id, from, to)
            .await
            .map_err(store_failure)?;

        Ok(summarize(student_id, activity_id, from, to, &records))
    }
}

fn summarize(
    student_id: Uuid,
    activity_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    records: &[AttendanceRecord],
) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        student_id,
        activity_id,
        from,
        to,
        present: 0,
        absent: 0,
        justified: 0,
    };
    for record in records {
        if record.present {
            summary.present += 1;
        } else {
            summary.absent += 1;
            if record
                .justification
                .as_deref()
                .is_some_and(|j| !j.trim().is_empty())
            {
                summary.justified += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(present: bool, justification: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::nil(),
            activity_id: Uuid::nil(),
            class_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            present,
            justification: justification.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_counts() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let records = vec![
            record(true, None),
            record(true, None),
            record(false, Some("atestado médico")),
            record(false, Some("  ")),
            record(false, None),
        ];

        let s = summarize(Uuid::nil(), Uuid::nil(), from, to, &records);
        assert_eq!(s.present, 2);
        assert_eq!(s.absent, 3);
        assert_eq!(s.justified, 1);
    }
}
