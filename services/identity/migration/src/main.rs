use sea_orm_migration::prelude::*;

mod m20260501_000001_create_users;
mod m20260501_000002_create_credentials;
mod m20260501_000003_create_refresh_sessions;
mod m20260501_000004_create_otp_challenges;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260501_000001_create_users::Migration),
            Box::new(m20260501_000002_create_credentials::Migration),
            Box::new(m20260501_000003_create_refresh_sessions::Migration),
            Box::new(m20260501_000004_create_otp_challenges::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
