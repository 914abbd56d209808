use sea_orm_migration::{
    prelude::*,
    schema::{date_null, string_len, text_null},
    sea_orm::DbBackend,
};

/// Maximum length of a version name, in characters
const NAME_MAX_LEN: u32 = 255;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // sqlite only autoincrements columns declared exactly as `INTEGER PRIMARY KEY`
        let mut id = ColumnDef::new(Version::Id);
        if manager.get_database_backend() == DbBackend::Sqlite {
            id.integer();
        } else {
            id.big_integer();
        }
        id.not_null().auto_increment().primary_key();

        manager
            .create_table(
                Table::create()
                    .table(Version::Table)
                    .if_not_exists()
                    .col(id)
                    .col(string_len(Version::Name, NAME_MAX_LEN).unique_key())
                    .col(text_null(Version::Description))
                    .col(date_null(Version::ReleaseDate))
                    .col(date_null(Version::DeprecationDate))
                    .check(
                        Expr::col(Version::DeprecationDate).gte(Expr::col(Version::ReleaseDate)),
                    )
                    .take(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Version::Table).if_exists().take())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Version {
    Table,
    Id,
    Name,
    Description,
    ReleaseDate,
    DeprecationDate,
}
