//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Farms, the root of every ownership chain.
    farms (id) {
        id -> Uuid,
        name -> Varchar,
        location -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User accounts with their salted password digest.
    accounts (id) {
        id -> Uuid,
        /// Unique login name (`accounts_username_key`).
        username -> Varchar,
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// `admin` or `farmer`.
        role -> Varchar,
        /// Nulled when the farm is deleted.
        assigned_farm -> Nullable<Uuid>,
        phone -> Varchar,
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cattle. `mother_id` is a self reference nulled on the mother's deletion.
    animals (id) {
        id -> Uuid,
        farm_id -> Uuid,
        name -> Varchar,
        stage -> Varchar,
        mother_id -> Nullable<Uuid>,
        birth_date -> Date,
        ai_date -> Nullable<Date>,
        estimated_birth -> Nullable<Date>,
        actual_birth -> Nullable<Date>,
        notes -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Poultry batches, unique per (farm_id, batch_number).
    chicken_batches (id) {
        id -> Uuid,
        farm_id -> Uuid,
        batch_name -> Varchar,
        batch_number -> Int4,
        initial_count -> Int4,
        current_count -> Int4,
        purchase_date -> Date,
        hatch_date -> Nullable<Date>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Milk yield per cow and session, unique per (cow_id, date, session).
    milk_production (id) {
        id -> Uuid,
        cow_id -> Uuid,
        date -> Date,
        session -> Varchar,
        quantity -> Numeric,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    milk_sales (id) {
        id -> Uuid,
        farm_id -> Uuid,
        date -> Date,
        quantity_sold -> Numeric,
        price_per_liter -> Numeric,
        total_amount -> Numeric,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cattle feed purchases.
    feeds (id) {
        id -> Uuid,
        farm_id -> Uuid,
        feed_type -> Varchar,
        quantity_purchased -> Numeric,
        quantity_remaining -> Numeric,
        unit_price -> Numeric,
        transport_cost -> Numeric,
        purchase_date -> Date,
        is_finished -> Bool,
        needs_restock -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Poultry feed purchases.
    chicken_feeds (id) {
        id -> Uuid,
        farm_id -> Uuid,
        feed_name -> Varchar,
        quantity_purchased -> Numeric,
        quantity_remaining -> Numeric,
        cost -> Numeric,
        purchase_date -> Date,
        is_finished -> Bool,
        needs_restock -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    feed_consumption (id) {
        id -> Uuid,
        cow_id -> Uuid,
        feed_id -> Uuid,
        date -> Date,
        quantity_consumed -> Numeric,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    health_records (id) {
        id -> Uuid,
        cow_id -> Uuid,
        date_sick -> Date,
        disease_name -> Varchar,
        date_treated -> Date,
        medicine_used -> Varchar,
        medicine_cost -> Numeric,
        vet_name -> Varchar,
        vet_contact -> Varchar,
        notes -> Text,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    egg_production (id) {
        id -> Uuid,
        batch_id -> Uuid,
        date -> Date,
        eggs_collected -> Int4,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restock alerts. A partial unique index (`restock_alerts_open_item_key`)
    /// allows one unresolved alert per (farm_id, item_name).
    restock_alerts (id) {
        id -> Uuid,
        farm_id -> Uuid,
        alert_type -> Varchar,
        item_name -> Varchar,
        message -> Text,
        is_resolved -> Bool,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(accounts -> farms (assigned_farm));
diesel::joinable!(animals -> farms (farm_id));
diesel::joinable!(chicken_batches -> farms (farm_id));
diesel::joinable!(milk_production -> animals (cow_id));
diesel::joinable!(milk_sales -> farms (farm_id));
diesel::joinable!(feeds -> farms (farm_id));
diesel::joinable!(chicken_feeds -> farms (farm_id));
diesel::joinable!(feed_consumption -> animals (cow_id));
diesel::joinable!(feed_consumption -> feeds (feed_id));
diesel::joinable!(health_records -> animals (cow_id));
diesel::joinable!(egg_production -> chicken_batches (batch_id));
diesel::joinable!(restock_alerts -> farms (farm_id));

diesel::allow_tables_to_appear_in_same_query!(
    farms,
    accounts,
    animals,
    chicken_batches,
    milk_production,
    milk_sales,
    feeds,
    chicken_feeds,
    feed_consumption,
    health_records,
    egg_production,
    restock_alerts,
);
