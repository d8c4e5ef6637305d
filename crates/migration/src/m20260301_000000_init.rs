//! Initial schema.
//!
//! Every table carries a `user_id` column: rows are scoped to their owner by
//! the gateway, never shared. Dependents cascade on delete:
//!
//! - `expenses` and `budgets` follow their pet and their category;
//! - `user_category_preferences` follow their category.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    UserId,
    DefaultCurrency,
    AvailableCurrencies,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExpenseCategories {
    Table,
    Id,
    UserId,
    Name,
    Color,
    Icon,
    BuildingBlock,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Pets {
    Table,
    Id,
    UserId,
    Name,
    Species,
    Breed,
    BirthDate,
    PhotoUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    PetId,
    CategoryId,
    Amount,
    Currency,
    Description,
    Date,
    ReceiptUrl,
    RecurringType,
    NextDueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    UserId,
    PetId,
    CategoryId,
    Amount,
    Currency,
    Period,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserCategoryPreferences {
    Table,
    Id,
    UserId,
    CategoryId,
    IsEnabled,
    CreatedAt,
    UpdatedAt,
}

fn id(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .string()
        .not_null()
        .primary_key()
        .to_owned()
}

fn timestamp(column: impl IntoIden) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn cascade(
    name: &str,
    from: (impl IntoIden + 'static, impl IntoIden + 'static),
    to: (impl IntoIden + 'static, impl IntoIden + 'static),
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Settings (one row per user)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(id(Settings::Id))
                    .col(ColumnDef::new(Settings::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Settings::DefaultCurrency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Settings::AvailableCurrencies).json().not_null())
                    .col(timestamp(Settings::CreatedAt))
                    .col(timestamp(Settings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-settings-user_id-unique")
                    .table(Settings::Table)
                    .col(Settings::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Expense categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseCategories::Table)
                    .if_not_exists()
                    .col(id(ExpenseCategories::Id))
                    .col(ColumnDef::new(ExpenseCategories::UserId).string().not_null())
                    .col(ColumnDef::new(ExpenseCategories::Name).string().not_null())
                    .col(ColumnDef::new(ExpenseCategories::Color).string().not_null())
                    .col(ColumnDef::new(ExpenseCategories::Icon).string())
                    .col(ColumnDef::new(ExpenseCategories::BuildingBlock).string())
                    .col(timestamp(ExpenseCategories::CreatedAt))
                    .col(timestamp(ExpenseCategories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_categories-user_id")
                    .table(ExpenseCategories::Table)
                    .col(ExpenseCategories::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Pets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(id(Pets::Id))
                    .col(ColumnDef::new(Pets::UserId).string().not_null())
                    .col(ColumnDef::new(Pets::Name).string().not_null())
                    .col(ColumnDef::new(Pets::Species).string().not_null())
                    .col(ColumnDef::new(Pets::Breed).string())
                    .col(ColumnDef::new(Pets::BirthDate).date())
                    .col(ColumnDef::new(Pets::PhotoUrl).string())
                    .col(timestamp(Pets::CreatedAt))
                    .col(timestamp(Pets::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pets-user_id")
                    .table(Pets::Table)
                    .col(Pets::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(id(Expenses::Id))
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::PetId).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::ReceiptUrl).string())
                    .col(
                        ColumnDef::new(Expenses::RecurringType)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(Expenses::NextDueDate).date())
                    .col(timestamp(Expenses::CreatedAt))
                    .col(timestamp(Expenses::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk-expenses-pet_id",
                        (Expenses::Table, Expenses::PetId),
                        (Pets::Table, Pets::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk-expenses-category_id",
                        (Expenses::Table, Expenses::CategoryId),
                        (ExpenseCategories::Table, ExpenseCategories::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(id(Budgets::Id))
                    .col(ColumnDef::new(Budgets::UserId).string().not_null())
                    .col(ColumnDef::new(Budgets::PetId).string().not_null())
                    .col(ColumnDef::new(Budgets::CategoryId).string().not_null())
                    .col(ColumnDef::new(Budgets::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::Currency).string().not_null())
                    .col(ColumnDef::new(Budgets::Period).string().not_null())
                    .col(ColumnDef::new(Budgets::StartDate).date().not_null())
                    .col(ColumnDef::new(Budgets::EndDate).date().not_null())
                    .col(timestamp(Budgets::CreatedAt))
                    .col(timestamp(Budgets::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk-budgets-pet_id",
                        (Budgets::Table, Budgets::PetId),
                        (Pets::Table, Pets::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk-budgets-category_id",
                        (Budgets::Table, Budgets::CategoryId),
                        (ExpenseCategories::Table, ExpenseCategories::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Category preferences
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserCategoryPreferences::Table)
                    .if_not_exists()
                    .col(id(UserCategoryPreferences::Id))
                    .col(
                        ColumnDef::new(UserCategoryPreferences::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCategoryPreferences::CategoryId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCategoryPreferences::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(UserCategoryPreferences::CreatedAt))
                    .col(timestamp(UserCategoryPreferences::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk-user_category_preferences-category_id",
                        (
                            UserCategoryPreferences::Table,
                            UserCategoryPreferences::CategoryId,
                        ),
                        (ExpenseCategories::Table, ExpenseCategories::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_category_preferences-user_id-category_id-unique")
                    .table(UserCategoryPreferences::Table)
                    .col(UserCategoryPreferences::UserId)
                    .col(UserCategoryPreferences::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(UserCategoryPreferences::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}
