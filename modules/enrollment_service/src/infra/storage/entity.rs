//! SeaORM entities for database tables

/// Students table entity
pub mod student {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "students")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub full_name: String,
        pub birth_date: Option<Date>,
        pub guardian_name: Option<String>,
        pub phone: Option<String>,
        /// Soft delete flag
        pub active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::enrollment::Entity")]
        Enrollments,
    }

    impl Related<super::enrollment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Enrollments.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Activities table entity
pub mod activity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "activities")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub kind: String,
        pub description: Option<String>,
        /// Monthly fee in cents
        pub monthly_fee_cents: i64,
        /// Soft delete flag
        pub active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::schedule_slot::Entity")]
        Slots,
        #[sea_orm(has_many = "super::enrollment::Entity")]
        Enrollments,
    }

    impl Related<super::schedule_slot::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Slots.def()
        }
    }

    impl Related<super::enrollment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Enrollments.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Schedule slots table entity
pub mod schedule_slot {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "schedule_slots")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub activity_id: Uuid,
        /// ISO weekday 1..=7
        pub weekday: i16,
        pub start_time: Time,
        pub end_time: Time,
        pub total_seats: i32,
        /// Written only inside ledger transactions
        pub available_seats: i32,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::activity::Entity",
            from = "Column::ActivityId",
            to = "super::activity::Column::Id"
        )]
        Activity,
    }

    impl Related<super::activity::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Activity.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Enrollments table entity
pub mod enrollment {
    use sea_orm::entity::prelude::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "Text")]
    pub enum Status {
        #[sea_orm(string_value = "active")]
        Active,
        #[sea_orm(string_value = "inactive")]
        Inactive,
        #[sea_orm(string_value = "cancelled")]
        Cancelled,
    }

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "enrollments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub student_id: Uuid,
        pub activity_id: Uuid,
        pub slot_id: Option<Uuid>,
        pub status: Status,
        pub start_date: Date,
        pub end_date: Option<Date>,
        pub cancellation_reason: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::student::Entity",
            from = "Column::StudentId",
            to = "super::student::Column::Id"
        )]
        Student,
        #[sea_orm(
            belongs_to = "super::activity::Entity",
            from = "Column::ActivityId",
            to = "super::activity::Column::Id"
        )]
        Activity,
        #[sea_orm(
            belongs_to = "super::schedule_slot::Entity",
            from = "Column::SlotId",
            to = "super::schedule_slot::Column::Id"
        )]
        Slot,
    }

    impl Related<super::student::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Student.def()
        }
    }

    impl Related<super::activity::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Activity.def()
        }
    }

    impl Related<super::schedule_slot::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Slot.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Attendance records table entity
pub mod attendance_record {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "attendance_records")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub student_id: Uuid,
        pub activity_id: Uuid,
        pub class_date: Date,
        pub present: bool,
        pub justification: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Monthly fees table entity
pub mod fee {
    use sea_orm::entity::prelude::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "Text")]
    pub enum Status {
        #[sea_orm(string_value = "pending")]
        Pending,
        #[sea_orm(string_value = "paid")]
        Paid,
        #[sea_orm(string_value = "overdue")]
        Overdue,
        #[sea_orm(string_value = "cancelled")]
        Cancelled,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
    #[sea_orm(rs_type = "String", db_type = "Text")]
    pub enum Method {
        #[sea_orm(string_value = "cash")]
        Cash,
        #[sea_orm(string_value = "pix")]
        Pix,
        #[sea_orm(string_value = "card")]
        Card,
        #[sea_orm(string_value = "transfer")]
        Transfer,
        #[sea_orm(string_value = "other")]
        Other,
    }

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "fees")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub enrollment_id: Uuid,
        pub student_id: Uuid,
        pub activity_id: Uuid,
        pub month: i32,
        pub year: i32,
        pub amount_cents: i64,
        pub status: Status,
        pub due_date: Date,
        pub paid_date: Option<Date>,
        pub payment_method: Option<Method>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::enrollment::Entity",
            from = "Column::EnrollmentId",
            to = "super::enrollment::Column::Id"
        )]
        Enrollment,
    }

    impl Related<super::enrollment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Enrollment.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
