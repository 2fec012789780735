use sea_orm::entity::prelude::*;

/// User identity record. `is_verified` flips exactly once, on the first
/// successful OTP verification; accounts stay unverified (and unable to log
/// in) until then.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::credentials::Entity")]
    Credentials,
    #[sea_orm(has_many = "super::refresh_sessions::Entity")]
    RefreshSessions,
    #[sea_orm(has_many = "super::otp_challenges::Entity")]
    OtpChallenges,
}

impl Related<super::credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credentials.def()
    }
}

impl Related<super::refresh_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshSessions.def()
    }
}

impl Related<super::otp_challenges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpChallenges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
