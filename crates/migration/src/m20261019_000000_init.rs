//! Initial schema.
//!
//! - `users`: authentication
//! - `balances`: one running balance per user, versioned for compare-and-swap
//! - `categories`: transaction labels owned by users
//! - `transactions`: incomes and expenses
//! - `projects`, `tasks`: project tracking
//! - `teams`, `team_members`: user groups

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
}

#[derive(Iden)]
enum Balances {
    Table,
    Id,
    UserId,
    AmountMinor,
    Version,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    TransactionType,
    AmountMinor,
    CreatedAt,
    UpdatedAt,
    Description,
    CategoryId,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    UserId,
    Name,
    Description,
    EndDate,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    ProjectId,
    UserId,
    OwnerId,
    Name,
    Description,
    Status,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    UserId,
}

#[derive(Iden)]
enum TeamMembers {
    Table,
    TeamId,
    UserId,
}

/// Cascading foreign key from an owner column to `users.username`.
fn owner_fk(
    name: &str,
    table: impl IntoIden + 'static,
    column: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Username)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Balances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Balances::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Balances::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Balances::AmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Balances::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(&mut owner_fk(
                        "fk-balances-user_id",
                        Balances::Table,
                        Balances::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balances-user_id-unique")
                    .table(Balances::Table)
                    .col(Balances::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .foreign_key(&mut owner_fk(
                        "fk-categories-user_id",
                        Categories::Table,
                        Categories::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CreatedAt).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(ColumnDef::new(Transactions::CategoryId).integer())
                    .foreign_key(&mut owner_fk(
                        "fk-transactions-user_id",
                        Transactions::Table,
                        Transactions::UserId,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::UserId).string().not_null())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).string())
                    .col(ColumnDef::new(Projects::EndDate).date())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(&mut owner_fk(
                        "fk-projects-user_id",
                        Projects::Table,
                        Projects::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Tasks::UserId).string().not_null())
                    .col(ColumnDef::new(Tasks::OwnerId).string())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).string())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string()
                            .not_null()
                            .default("N"),
                    )
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Tasks::DueDate).date())
                    .col(
                        ColumnDef::new(Tasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tasks-project_id")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut owner_fk(
                        "fk-tasks-user_id",
                        Tasks::Table,
                        Tasks::UserId,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tasks-owner_id")
                            .from(Tasks::Table, Tasks::OwnerId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teams::UserId).string().not_null())
                    .foreign_key(&mut owner_fk(
                        "fk-teams-user_id",
                        Teams::Table,
                        Teams::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeamMembers::TeamId).integer().not_null())
                    .col(ColumnDef::new(TeamMembers::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(TeamMembers::TeamId)
                            .col(TeamMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-team_members-team_id")
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut owner_fk(
                        "fk-team_members-user_id",
                        TeamMembers::Table,
                        TeamMembers::UserId,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Balances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
