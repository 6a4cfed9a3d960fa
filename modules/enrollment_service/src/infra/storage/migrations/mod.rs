//! Database migrations for the enrollment service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog::Migration),
            Box::new(m20250301_000002_create_enrollments::Migration),
            Box::new(m20250301_000003_create_attendance::Migration),
            Box::new(m20250301_000004_create_fees::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    FullName,
    BirthDate,
    GuardianName,
    Phone,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    Name,
    Kind,
    Description,
    MonthlyFeeCents,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ScheduleSlots {
    Table,
    Id,
    ActivityId,
    Weekday,
    StartTime,
    EndTime,
    TotalSeats,
    AvailableSeats,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    ActivityId,
    SlotId,
    Status,
    StartDate,
    EndDate,
    CancellationReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    StudentId,
    ActivityId,
    ClassDate,
    Present,
    Justification,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Fees {
    Table,
    Id,
    EnrollmentId,
    StudentId,
    ActivityId,
    Month,
    Year,
    AmountCents,
    Status,
    DueDate,
    PaidDate,
    PaymentMethod,
    CreatedAt,
    UpdatedAt,
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_catalog"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Students::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Students::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Students::FullName).string().not_null())
                        .col(ColumnDef::new(Students::BirthDate).date())
                        .col(ColumnDef::new(Students::GuardianName).string())
                        .col(ColumnDef::new(Students::Phone).string_len(32))
                        .col(
                            ColumnDef::new(Students::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Students::CreatedAt))
                        .col(created_at(Students::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Activities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Activities::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Activities::Name).string().not_null())
                        .col(ColumnDef::new(Activities::Kind).string_len(64).not_null())
                        .col(ColumnDef::new(Activities::Description).text())
                        .col(
                            ColumnDef::new(Activities::MonthlyFeeCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Activities::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Activities::CreatedAt))
                        .col(created_at(Activities::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ScheduleSlots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ScheduleSlots::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ScheduleSlots::ActivityId).uuid().not_null())
                        .col(
                            ColumnDef::new(ScheduleSlots::Weekday)
                                .small_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ScheduleSlots::StartTime).time().not_null())
                        .col(ColumnDef::new(ScheduleSlots::EndTime).time().not_null())
                        .col(
                            ColumnDef::new(ScheduleSlots::TotalSeats)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ScheduleSlots::AvailableSeats)
                                .integer()
                                .not_null(),
                        )
                        .col(created_at(ScheduleSlots::CreatedAt))
                        .col(created_at(ScheduleSlots::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_schedule_slots_activity")
                                .from(ScheduleSlots::Table, ScheduleSlots::ActivityId)
                                .to(Activities::Table, Activities::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_schedule_slots_activity_id")
                        .table(ScheduleSlots::Table)
                        .col(ScheduleSlots::ActivityId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ScheduleSlots::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Activities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Students::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_enrollments {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_enrollments"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Enrollments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Enrollments::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Enrollments::StudentId).uuid().not_null())
                        .col(ColumnDef::new(Enrollments::ActivityId).uuid().not_null())
                        .col(ColumnDef::new(Enrollments::SlotId).uuid())
                        .col(ColumnDef::new(Enrollments::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Enrollments::StartDate).date().not_null())
                        .col(ColumnDef::new(Enrollments::EndDate).date())
                        .col(ColumnDef::new(Enrollments::CancellationReason).text())
                        .col(created_at(Enrollments::CreatedAt))
                        .col(created_at(Enrollments::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_enrollments_student")
                                .from(Enrollments::Table, Enrollments::StudentId)
                                .to(Students::Table, Students::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_enrollments_activity")
                                .from(Enrollments::Table, Enrollments::ActivityId)
                                .to(Activities::Table, Activities::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_enrollments_slot")
                                .from(Enrollments::Table, Enrollments::SlotId)
                                .to(ScheduleSlots::Table, ScheduleSlots::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_enrollments_pair_status")
                        .table(Enrollments::Table)
                        .col(Enrollments::StudentId)
                        .col(Enrollments::ActivityId)
                        .col(Enrollments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_enrollments_slot_status")
                        .table(Enrollments::Table)
                        .col(Enrollments::SlotId)
                        .col(Enrollments::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Enrollments::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000003_create_attendance {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_attendance"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AttendanceRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AttendanceRecords::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AttendanceRecords::StudentId).uuid().not_null())
                        .col(ColumnDef::new(AttendanceRecords::ActivityId).uuid().not_null())
                        .col(ColumnDef::new(AttendanceRecords::ClassDate).date().not_null())
                        .col(ColumnDef::new(AttendanceRecords::Present).boolean().not_null())
                        .col(ColumnDef::new(AttendanceRecords::Justification).text())
                        .col(created_at(AttendanceRecords::CreatedAt))
                        .col(created_at(AttendanceRecords::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_attendance_student")
                                .from(AttendanceRecords::Table, AttendanceRecords::StudentId)
                                .to(Students::Table, Students::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_attendance_activity")
                                .from(AttendanceRecords::Table, AttendanceRecords::ActivityId)
                                .to(Activities::Table, Activities::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ux_attendance_student_activity_date")
                        .table(AttendanceRecords::Table)
                        .col(AttendanceRecords::StudentId)
                        .col(AttendanceRecords::ActivityId)
                        .col(AttendanceRecords::ClassDate)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_attendance_activity_date")
                        .table(AttendanceRecords::Table)
                        .col(AttendanceRecords::ActivityId)
                        .col(AttendanceRecords::ClassDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000004_create_fees {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_fees"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Fees::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Fees::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Fees::EnrollmentId).uuid().not_null())
                        .col(ColumnDef::new(Fees::StudentId).uuid().not_null())
                        .col(ColumnDef::new(Fees::ActivityId).uuid().not_null())
                        .col(ColumnDef::new(Fees::Month).integer().not_null())
                        .col(ColumnDef::new(Fees::Year).integer().not_null())
                        .col(ColumnDef::new(Fees::AmountCents).big_integer().not_null())
                        .col(ColumnDef::new(Fees::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Fees::DueDate).date().not_null())
                        .col(ColumnDef::new(Fees::PaidDate).date())
                        .col(ColumnDef::new(Fees::PaymentMethod).string_len(16))
                        .col(created_at(Fees::CreatedAt))
                        .col(created_at(Fees::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_fees_enrollment")
                                .from(Fees::Table, Fees::EnrollmentId)
                                .to(Enrollments::Table, Enrollments::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ux_fees_student_activity_period")
                        .table(Fees::Table)
                        .col(Fees::StudentId)
                        .col(Fees::ActivityId)
                        .col(Fees::Month)
                        .col(Fees::Year)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_fees_status_due_date")
                        .table(Fees::Table)
                        .col(Fees::Status)
                        .col(Fees::DueDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Fees::Table).to_owned())
                .await
        }
    }
}
