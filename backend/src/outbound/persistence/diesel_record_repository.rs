//! Generic scoped CRUD over the record tables.
//!
//! Each record type implements [`PgRecord`] through `pg_record!`, naming its
//! table, row struct and the column that holds the owning farm. Records
//! owned through an animal or a batch join the parent table to reach that
//! column. A `changes` struct narrows the columns an update writes; it
//! defaults to the row struct. Deletes rely on the schema's
//! `ON DELETE CASCADE` and `ON DELETE SET NULL` references.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, ReferenceLookup, StoreError};
use crate::domain::{
    Animal, CalfSummary, ChickenBatch, ChickenFeed, EggProduction, Farm, Feed, FeedConsumption,
    HealthRecord, MilkProduction, MilkSale, Record, Reference, Scope,
};

use super::diesel_farm_store::DieselFarmStore;
use super::models::{
    AnimalRow, ChickenBatchChanges, ChickenBatchRow, ChickenFeedRow, EggProductionRow, FarmRow,
    FeedConsumptionRow, FeedRow, HealthRecordRow, MilkProductionRow, MilkSaleRow,
};
use super::schema::{
    animals, chicken_batches, chicken_feeds, egg_production, farms, feed_consumption, feeds,
    health_records, milk_production, milk_sales,
};

/// Restriction applied to record reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFilter {
    id: Option<Uuid>,
    farm: Option<Uuid>,
}

impl RowFilter {
    /// Filter for `scope`, or `None` when the scope admits no farm records.
    fn scoped(scope: &Scope, id: Option<Uuid>) -> Option<Self> {
        match scope {
            Scope::All => Some(Self { id, farm: None }),
            Scope::Farm(farm) => Some(Self {
                id,
                farm: Some(*farm),
            }),
            Scope::Account(_) | Scope::Nothing => None,
        }
    }

    fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            farm: None,
        }
    }
}

/// Table access for one record type.
#[async_trait]
pub trait PgRecord: Record {
    async fn load(conn: &mut AsyncPgConnection, filter: RowFilter)
    -> Result<Vec<Self>, StoreError>;

    async fn insert_row(conn: &mut AsyncPgConnection, record: &Self) -> Result<(), StoreError>;

    /// Returns the number of rows written.
    async fn update_row(conn: &mut AsyncPgConnection, record: &Self) -> Result<usize, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_row(conn: &mut AsyncPgConnection, id: Uuid) -> Result<usize, StoreError>;
}

macro_rules! pg_record {
    (
        $record:ty => $row:ty,
        table = $table:ident,
        from = $from:expr,
        farm = $farm_col:expr
        $(, read = $read:path)? $(,)?
    ) => {
        pg_record!(
            $record => $row,
            changes = $row,
            table = $table,
            from = $from,
            farm = $farm_col
            $(, read = $read)?
        );
    };
    (
        $record:ty => $row:ty,
        changes = $changes:ty,
        table = $table:ident,
        from = $from:expr,
        farm = $farm_col:expr
        $(, read = $read:path)? $(,)?
    ) => {
        #[async_trait]
        impl PgRecord for $record {
            async fn load(
                conn: &mut AsyncPgConnection,
                filter: RowFilter,
            ) -> Result<Vec<Self>, StoreError> {
                let mut query = $from
                    .select(<$row>::as_select())
                    .order_by(($table::created_at.asc(), $table::id.asc()))
                    .into_boxed();
                if let Some(id) = filter.id {
                    query = query.filter($table::id.eq(id));
                }
                if let Some(farm) = filter.farm {
                    query = query.filter($farm_col.eq(farm));
                }
                let rows: Vec<$row> = query.load(&mut *conn).await?;
                let records = rows
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<Vec<Self>, StoreError>>()?;
                $( let records = $read(conn, records).await?; )?
                Ok(records)
            }

            async fn insert_row(
                conn: &mut AsyncPgConnection,
                record: &Self,
            ) -> Result<(), StoreError> {
                let row = <$row>::try_from(record)?;
                diesel::insert_into($table::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }

            async fn update_row(
                conn: &mut AsyncPgConnection,
                record: &Self,
            ) -> Result<usize, StoreError> {
                let changes = <$changes>::try_from(record)?;
                Ok(diesel::update($table::table.find(record.id()))
                    .set(&changes)
                    .execute(conn)
                    .await?)
            }

            async fn delete_row(
                conn: &mut AsyncPgConnection,
                id: Uuid,
            ) -> Result<usize, StoreError> {
                Ok(diesel::delete($table::table.find(id)).execute(conn).await?)
            }
        }
    };
}

pg_record!(
    Farm => FarmRow,
    table = farms,
    from = farms::table,
    farm = farms::id,
);
pg_record!(
    Animal => AnimalRow,
    table = animals,
    from = animals::table,
    farm = animals::farm_id,
    read = with_calves,
);
pg_record!(
    ChickenBatch => ChickenBatchRow,
    changes = ChickenBatchChanges,
    table = chicken_batches,
    from = chicken_batches::table,
    farm = chicken_batches::farm_id,
);
pg_record!(
    MilkSale => MilkSaleRow,
    table = milk_sales,
    from = milk_sales::table,
    farm = milk_sales::farm_id,
);
pg_record!(
    Feed => FeedRow,
    table = feeds,
    from = feeds::table,
    farm = feeds::farm_id,
);
pg_record!(
    ChickenFeed => ChickenFeedRow,
    table = chicken_feeds,
    from = chicken_feeds::table,
    farm = chicken_feeds::farm_id,
);
pg_record!(
    MilkProduction => MilkProductionRow,
    table = milk_production,
    from = milk_production::table.inner_join(animals::table),
    farm = animals::farm_id,
);
pg_record!(
    FeedConsumption => FeedConsumptionRow,
    table = feed_consumption,
    from = feed_consumption::table.inner_join(animals::table),
    farm = animals::farm_id,
);
pg_record!(
    HealthRecord => HealthRecordRow,
    table = health_records,
    from = health_records::table.inner_join(animals::table),
    farm = animals::farm_id,
);
pg_record!(
    EggProduction => EggProductionRow,
    table = egg_production,
    from = egg_production::table.inner_join(chicken_batches::table),
    farm = chicken_batches::farm_id,
);

/// Fill each animal's calves read model.
async fn with_calves(
    conn: &mut AsyncPgConnection,
    mut herd: Vec<Animal>,
) -> Result<Vec<Animal>, StoreError> {
    if herd.is_empty() {
        return Ok(herd);
    }
    let mother_ids: Vec<Uuid> = herd.iter().map(|animal| animal.id).collect();
    let calves: Vec<(Uuid, String, Option<Uuid>)> = animals::table
        .filter(animals::mother_id.eq_any(mother_ids))
        .select((animals::id, animals::name, animals::mother_id))
        .order_by((animals::created_at.asc(), animals::id.asc()))
        .load(conn)
        .await?;
    for (id, name, mother_id) in calves {
        let mother = herd.iter_mut().find(|animal| Some(animal.id) == mother_id);
        if let Some(mother) = mother {
            mother.calves.push(CalfSummary { id, name });
        }
    }
    Ok(herd)
}

async fn reload<R: PgRecord>(conn: &mut AsyncPgConnection, id: Uuid) -> Result<R, StoreError> {
    R::load(conn, RowFilter::by_id(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::query(format!("{} {id} vanished after write", R::KIND.label())))
}

#[async_trait]
impl<R: PgRecord> RecordRepository<R> for DieselFarmStore {
    async fn list(&self, scope: &Scope) -> Result<Vec<R>, StoreError> {
        let Some(filter) = RowFilter::scoped(scope, None) else {
            return Ok(Vec::new());
        };
        let mut conn = self.conn().await?;
        R::load(&mut conn, filter).await
    }

    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<R>, StoreError> {
        let Some(filter) = RowFilter::scoped(scope, Some(id)) else {
            return Ok(None);
        };
        let mut conn = self.conn().await?;
        Ok(R::load(&mut conn, filter).await?.into_iter().next())
    }

    async fn insert(&self, record: &R) -> Result<R, StoreError> {
        let mut conn = self.conn().await?;
        R::insert_row(&mut conn, record).await?;
        reload(&mut conn, record.id()).await
    }

    async fn update(&self, record: &R) -> Result<R, StoreError> {
        let mut conn = self.conn().await?;
        if R::update_row(&mut conn, record).await? == 0 {
            return Err(StoreError::query(format!(
                "{} {} does not exist",
                R::KIND.label(),
                record.id()
            )));
        }
        reload(&mut conn, record.id()).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        Ok(R::delete_row(&mut conn, id).await? > 0)
    }
}

#[async_trait]
impl ReferenceLookup for DieselFarmStore {
    async fn farm_of(&self, reference: Reference) -> Result<Option<Uuid>, StoreError> {
        let mut conn = self.conn().await?;
        let farm = match reference {
            Reference::Farm(id) => {
                farms::table
                    .find(id)
                    .select(farms::id)
                    .first::<Uuid>(&mut conn)
                    .await
            }
            Reference::Animal(id) | Reference::Mother(id) => {
                animals::table
                    .find(id)
                    .select(animals::farm_id)
                    .first::<Uuid>(&mut conn)
                    .await
            }
            Reference::Batch(id) => {
                chicken_batches::table
                    .find(id)
                    .select(chicken_batches::farm_id)
                    .first::<Uuid>(&mut conn)
                    .await
            }
            Reference::Feed(id) => {
                feeds::table
                    .find(id)
                    .select(feeds::farm_id)
                    .first::<Uuid>(&mut conn)
                    .await
            }
        };
        Ok(farm.optional()?)
    }

    async fn mother_of(&self, animal_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let mut conn = self.conn().await?;
        let mother = animals::table
            .find(animal_id)
            .select(animals::mother_id)
            .first::<Option<Uuid>>(&mut conn)
            .await
            .optional()?;
        Ok(mother.flatten())
    }
}
