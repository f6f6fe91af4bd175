use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Serves the active listing: WHERE is_active ORDER BY created_at DESC
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_active_created ON recommendations(is_active, created_at DESC)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_users_created ON users(created DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_users_created")
            .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_recommendations_active_created")
            .await?;

        Ok(())
    }
}
