//! 页面访问表迁移
//!
//! 创建 visitor_analytics 表，每次页面加载写入一行，
//! 离开页面时按行 ID 回填滚动深度、停留时长和点击数，
//! patched_at 记录回填时间，每行只允许回填一次。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitorAnalytics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitorAnalytics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::SessionId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::Fingerprint)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::PagePath)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::DeviceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VisitorAnalytics::Referrer).text().null())
                    .col(
                        ColumnDef::new(VisitorAnalytics::ScrollDepth)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::TimeOnPage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::Clicks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitorAnalytics::PatchedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 报表按时间窗口拉取
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitor_analytics_created_at")
                    .table(VisitorAnalytics::Table)
                    .col(VisitorAnalytics::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitor_analytics_session")
                    .table(VisitorAnalytics::Table)
                    .col(VisitorAnalytics::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_visitor_analytics_session")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_visitor_analytics_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(VisitorAnalytics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VisitorAnalytics {
    #[sea_orm(iden = "visitor_analytics")]
    Table,
    Id,
    SessionId,
    Fingerprint,
    PagePath,
    DeviceType,
    Referrer,
    ScrollDepth,
    TimeOnPage,
    Clicks,
    CreatedAt,
    PatchedAt,
}
