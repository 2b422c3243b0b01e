//! 交互事件表迁移
//!
//! 创建 interaction_events 表，一行对应一次离散的用户操作，只写不改。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InteractionEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InteractionEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::SessionId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::Fingerprint)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::EventType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::ElementId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::ElementType)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(InteractionEvents::PageX).integer().null())
                    .col(ColumnDef::new(InteractionEvents::PageY).integer().null())
                    .col(
                        ColumnDef::new(InteractionEvents::PagePath)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InteractionEvents::ProjectId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(InteractionEvents::Metadata).text().null())
                    .col(
                        ColumnDef::new(InteractionEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_interaction_events_created_at")
                    .table(InteractionEvents::Table)
                    .col(InteractionEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_interaction_events_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(InteractionEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InteractionEvents {
    #[sea_orm(iden = "interaction_events")]
    Table,
    Id,
    SessionId,
    Fingerprint,
    EventType,
    ElementId,
    ElementType,
    PageX,
    PageY,
    PagePath,
    ProjectId,
    Metadata,
    CreatedAt,
}
