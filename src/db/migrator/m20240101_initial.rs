use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// SQLite expression matching the `SecondsFormat::Millis` RFC 3339 strings
/// written by the repositories, so defaulted and explicit rows sort together.
const NOW_RFC3339: &str = "DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admin::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Admin::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Admin::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Admin::MustChangePassword)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Admin::CreatedAt)
                            .string()
                            .not_null()
                            .extra(NOW_RFC3339.to_owned()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Recommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recommendations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::MovieId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::MovieTitle)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Recommendations::Description).string().null())
                    .col(ColumnDef::new(Recommendations::ImageUrl).string().null())
                    .col(ColumnDef::new(Recommendations::Category).string().null())
                    .col(
                        ColumnDef::new(Recommendations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Recommendations::CreatedAt)
                            .string()
                            .not_null()
                            .extra(NOW_RFC3339.to_owned()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Users::Created)
                            .string()
                            .not_null()
                            .extra(NOW_RFC3339.to_owned()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recommendations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
    Username,
    PasswordHash,
    MustChangePassword,
    CreatedAt,
}

#[derive(Iden)]
enum Recommendations {
    Table,
    Id,
    MovieId,
    MovieTitle,
    Description,
    ImageUrl,
    Category,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Created,
}
