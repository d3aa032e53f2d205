use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users_table::Migration),
            Box::new(m20260101_000002_create_catalog_tables::Migration),
            Box::new(m20260101_000003_create_cart_items_table::Migration),
            Box::new(m20260101_000004_create_bookings_tables::Migration),
            Box::new(m20260101_000005_create_payments_table::Migration),
            Box::new(m20260101_000006_create_reviews_table::Migration),
        ]
    }
}

// Migration implementations

mod m20260101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Username).string().not_null())
                        .col(
                            ColumnDef::new(Users::Phone)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Username,
        Phone,
        Email,
        CreatedAt,
    }
}

mod m20260101_000002_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cities::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cities::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Cities::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
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
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Services::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Services::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Services::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Services::Name).string().not_null())
                        .col(
                            ColumnDef::new(Services::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Services::Duration).string().not_null())
                        .col(ColumnDef::new(Services::Description).text().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_services_category")
                                .from(Services::Table, Services::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Services::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Cities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Cities {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    pub enum Categories {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    pub enum Services {
        Table,
        Id,
        CategoryId,
        Name,
        Price,
        Duration,
        Description,
    }
}

mod m20260101_000003_create_cart_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_cart_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CartItems::UserId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::ServiceId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(CartItems::AddedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // One row per (user, service); add-to-cart increments quantity
            manager
                .create_index(
                    Index::create()
                        .name("idx_cart_items_user_service")
                        .table(CartItems::Table)
                        .col(CartItems::UserId)
                        .col(CartItems::ServiceId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum CartItems {
        Table,
        Id,
        UserId,
        ServiceId,
        Quantity,
        AddedAt,
    }
}

mod m20260101_000004_create_bookings_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_bookings_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bookings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bookings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bookings::UserId).uuid().not_null())
                        // Storage-level uniqueness is the final authority for
                        // booking-code collisions; the generator pre-check is
                        // only an optimization.
                        .col(
                            ColumnDef::new(Bookings::BookingCode)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Bookings::Date).date().not_null())
                        .col(ColumnDef::new(Bookings::Timeslot).string().not_null())
                        .col(ColumnDef::new(Bookings::Address).text().not_null())
                        .col(
                            ColumnDef::new(Bookings::TotalAmount)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Bookings::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Bookings::BookedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BookingServices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BookingServices::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BookingServices::BookingId).uuid().not_null())
                        .col(ColumnDef::new(BookingServices::ServiceId).uuid().not_null())
                        .col(
                            ColumnDef::new(BookingServices::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BookingServices::PriceAtBooking)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_booking_services_booking")
                                .from(BookingServices::Table, BookingServices::BookingId)
                                .to(Bookings::Table, Bookings::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_booking_services_booking_service")
                        .table(BookingServices::Table)
                        .col(BookingServices::BookingId)
                        .col(BookingServices::ServiceId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BookingServices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Bookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Bookings {
        Table,
        Id,
        UserId,
        BookingCode,
        Date,
        Timeslot,
        Address,
        TotalAmount,
        Status,
        BookedAt,
    }

    #[derive(DeriveIden)]
    pub enum BookingServices {
        Table,
        Id,
        BookingId,
        ServiceId,
        Quantity,
        PriceAtBooking,
    }
}

mod m20260101_000005_create_payments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000005_create_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        // One payment per booking; re-initiation overwrites
                        .col(
                            ColumnDef::new(Payments::BookingId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Payments::Method).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Payments::TransactionId)
                                .string()
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Payments::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Payments {
        Table,
        Id,
        BookingId,
        Method,
        TransactionId,
        Status,
        PaidAt,
    }
}

mod m20260101_000006_create_reviews_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000006_create_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Reviews::BookingId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Reviews::UserId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                        .col(ColumnDef::new(Reviews::ReviewText).text().null())
                        .col(ColumnDef::new(Reviews::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Reviews {
        Table,
        Id,
        BookingId,
        UserId,
        Rating,
        ReviewText,
        CreatedAt,
    }
}
