//! Behaviour of the in-memory entity store.

use chrono::{NaiveDate, TimeZone};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::{
    Animal, EggProduction, Farm, Feed, FeedConsumption, FeedType, LifecycleStage, MilkProduction,
    MilkSession, Period,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn farm(name: &str) -> Farm {
    Farm {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        location: "Nakuru".to_owned(),
        created_at: now(),
    }
}

fn cow(farm_id: Uuid, name: &str, mother_id: Option<Uuid>) -> Animal {
    Animal {
        id: Uuid::new_v4(),
        farm_id,
        name: name.to_owned(),
        stage: LifecycleStage::Lactating,
        mother_id,
        birth_date: date(2020, 1, 1),
        ai_date: None,
        estimated_birth: None,
        actual_birth: None,
        notes: String::new(),
        created_at: now(),
        calves: Vec::new(),
    }
}

fn batch(farm_id: Uuid, number: u32, count: u32) -> ChickenBatch {
    ChickenBatch {
        id: Uuid::new_v4(),
        farm_id,
        batch_name: format!("Batch {number}"),
        batch_number: number,
        initial_count: count,
        current_count: count,
        purchase_date: date(2024, 1, 10),
        hatch_date: None,
        created_at: now(),
    }
}

fn milk(cow_id: Uuid, day: NaiveDate, session: MilkSession, litres: i64) -> MilkProduction {
    MilkProduction {
        id: Uuid::new_v4(),
        cow_id,
        date: day,
        session,
        quantity: Decimal::new(litres, 0),
        recorded_by: UserId::random(),
        created_at: now(),
    }
}

fn eggs(batch_id: Uuid, day: NaiveDate, collected: u32) -> EggProduction {
    EggProduction {
        id: Uuid::new_v4(),
        batch_id,
        date: day,
        eggs_collected: collected,
        recorded_by: UserId::random(),
        created_at: now(),
    }
}

fn feed(farm_id: Uuid) -> Feed {
    Feed {
        id: Uuid::new_v4(),
        farm_id,
        feed_type: FeedType::DairyMeal,
        quantity_purchased: Decimal::new(70, 0),
        quantity_remaining: Decimal::new(20, 0),
        unit_price: Decimal::new(2850, 0),
        transport_cost: Decimal::ZERO,
        purchase_date: date(2024, 5, 1),
        is_finished: false,
        needs_restock: false,
        created_at: now(),
    }
}

fn account(role: Role, username: &str, assigned_farm: Option<Uuid>) -> Account {
    Account {
        id: UserId::random(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        role,
        assigned_farm,
        phone: String::new(),
        created_at: now(),
    }
}

struct Seeded {
    store: InMemoryFarmStore,
    farm: Farm,
    other: Farm,
}

#[fixture]
async fn seeded() -> Seeded {
    let store = InMemoryFarmStore::default();
    let (farm, other) = (farm("Kiambu Dairy"), farm("Limuru Poultry"));
    RecordRepository::<Farm>::insert(&store, &farm).await.expect("farm");
    RecordRepository::<Farm>::insert(&store, &other).await.expect("farm");
    Seeded { store, farm, other }
}

#[rstest]
#[tokio::test]
async fn listing_respects_farm_scope(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    RecordRepository::<Animal>::insert(&store, &cow(farm.id, "Daisy", None))
        .await
        .expect("cow");
    RecordRepository::<Animal>::insert(&store, &cow(other.id, "Bella", None))
        .await
        .expect("cow");

    let mine = RecordRepository::<Animal>::list(&store, &Scope::Farm(farm.id)).await.expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine.first().map(|a| a.name.as_str()), Some("Daisy"));
    let all = RecordRepository::<Animal>::list(&store, &Scope::All).await.expect("list");
    assert_eq!(all.len(), 2);
}

#[rstest]
#[tokio::test]
async fn child_records_follow_their_animal(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    let daisy = cow(farm.id, "Daisy", None);
    RecordRepository::<Animal>::insert(&store, &daisy).await.expect("cow");
    let record = milk(daisy.id, date(2024, 6, 1), MilkSession::Morning, 12);
    RecordRepository::<MilkProduction>::insert(&store, &record)
        .await
        .expect("milk");

    let seen = RecordRepository::<MilkProduction>::find(&store, record.id, &Scope::Farm(farm.id))
        .await
        .expect("find");
    assert!(seen.is_some());
    let hidden = RecordRepository::<MilkProduction>::find(&store, record.id, &Scope::Farm(other.id))
        .await
        .expect("find");
    assert!(hidden.is_none());
}

#[rstest]
#[tokio::test]
async fn reads_include_calves(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let mother = cow(farm.id, "Daisy", None);
    RecordRepository::<Animal>::insert(&store, &mother).await.expect("mother");
    let calf = cow(farm.id, "Clover", Some(mother.id));
    RecordRepository::<Animal>::insert(&store, &calf).await.expect("calf");

    let read = RecordRepository::<Animal>::find(&store, mother.id, &Scope::All).await.expect("find");
    let read = read.expect("mother exists");
    assert_eq!(read.calves.len(), 1);
    assert_eq!(read.calves.first().map(|c| c.id), Some(calf.id));
}

#[rstest]
#[tokio::test]
async fn deleting_a_mother_orphans_her_calves(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let mother = cow(farm.id, "Daisy", None);
    let calf = cow(farm.id, "Clover", Some(mother.id));
    RecordRepository::<Animal>::insert(&store, &mother).await.expect("mother");
    RecordRepository::<Animal>::insert(&store, &calf).await.expect("calf");
    RecordRepository::<MilkProduction>::insert(
        &store,
        &milk(mother.id, date(2024, 6, 1), MilkSession::Morning, 9),
    )
    .await
    .expect("milk");

    assert!(RecordRepository::<Animal>::delete(&store, mother.id).await.expect("delete"));
    let calf = RecordRepository::<Animal>::find(&store, calf.id, &Scope::All).await.expect("find");
    assert_eq!(calf.expect("calf survives").mother_id, None);
    let milk = RecordRepository::<MilkProduction>::list(&store, &Scope::All).await.expect("list");
    assert!(milk.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_a_farm_cascades(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    let daisy = cow(farm.id, "Daisy", None);
    let flock = batch(farm.id, 1, 100);
    let stock = feed(farm.id);
    RecordRepository::<Animal>::insert(&store, &daisy).await.expect("cow");
    RecordRepository::<ChickenBatch>::insert(&store, &flock).await.expect("batch");
    RecordRepository::<Feed>::insert(&store, &stock).await.expect("feed");
    RecordRepository::<EggProduction>::insert(&store, &eggs(flock.id, date(2024, 6, 1), 40))
        .await
        .expect("eggs");
    RecordRepository::<FeedConsumption>::insert(
        &store,
        &FeedConsumption {
            id: Uuid::new_v4(),
            cow_id: daisy.id,
            feed_id: stock.id,
            date: date(2024, 6, 1),
            quantity_consumed: Decimal::new(5, 0),
            recorded_by: UserId::random(),
            created_at: now(),
        },
    )
    .await
    .expect("consumption");
    let farmer = account(Role::Farmer, "otieno", Some(farm.id));
    AccountRepository::insert(&store, &farmer, &PasswordDigest::derive("pw"))
        .await
        .expect("farmer");

    assert!(RecordRepository::<Farm>::delete(&store, farm.id).await.expect("delete"));

    let animals = RecordRepository::<Animal>::list(&store, &Scope::All).await.expect("animals");
    let batches = RecordRepository::<ChickenBatch>::list(&store, &Scope::All).await.expect("batches");
    let laid = RecordRepository::<EggProduction>::list(&store, &Scope::All).await.expect("eggs");
    let eaten = RecordRepository::<FeedConsumption>::list(&store, &Scope::All).await.expect("consumption");
    assert!(animals.is_empty() && batches.is_empty() && laid.is_empty() && eaten.is_empty());
    let farms = RecordRepository::<Farm>::list(&store, &Scope::All).await.expect("farms");
    assert_eq!(farms, vec![other]);
    let farmer = store.find_by_id(farmer.id).await.expect("find").expect("farmer kept");
    assert_eq!(farmer.assigned_farm, None);
}

#[rstest]
#[tokio::test]
async fn batch_numbers_are_unique_per_farm(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    RecordRepository::<ChickenBatch>::insert(&store, &batch(farm.id, 7, 50))
        .await
        .expect("first");
    RecordRepository::<ChickenBatch>::insert(&store, &batch(other.id, 7, 50))
        .await
        .expect("other farm may reuse the number");
    let err = RecordRepository::<ChickenBatch>::insert(&store, &batch(farm.id, 7, 10))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[rstest]
#[tokio::test]
async fn milk_sessions_are_unique(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let daisy = cow(farm.id, "Daisy", None);
    RecordRepository::<Animal>::insert(&store, &daisy).await.expect("cow");
    let day = date(2024, 6, 1);
    RecordRepository::<MilkProduction>::insert(&store, &milk(daisy.id, day, MilkSession::Morning, 8))
        .await
        .expect("morning");
    RecordRepository::<MilkProduction>::insert(&store, &milk(daisy.id, day, MilkSession::Evening, 6))
        .await
        .expect("evening");
    let err = RecordRepository::<MilkProduction>::insert(
        &store,
        &milk(daisy.id, day, MilkSession::Morning, 3),
    )
    .await
    .expect_err("second morning");
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[rstest]
#[case(CountAdjustment::Deaths(30), 0)]
#[case(CountAdjustment::Deaths(5), 20)]
#[case(CountAdjustment::Hatched(12), 37)]
#[tokio::test]
async fn head_counts_adjust_in_place(
    #[future] seeded: Seeded,
    #[case] adjustment: CountAdjustment,
    #[case] expected: u32,
) {
    let Seeded { store, farm, .. } = seeded.await;
    let flock = batch(farm.id, 1, 25);
    RecordRepository::<ChickenBatch>::insert(&store, &flock).await.expect("batch");
    let updated = store
        .adjust_count(flock.id, &Scope::Farm(farm.id), adjustment)
        .await
        .expect("adjust")
        .expect("batch visible");
    assert_eq!(updated.current_count, expected);
}

#[rstest]
#[tokio::test]
async fn out_of_scope_batches_are_untouched(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    let flock = batch(farm.id, 1, 25);
    RecordRepository::<ChickenBatch>::insert(&store, &flock).await.expect("batch");
    let result = store
        .adjust_count(flock.id, &Scope::Farm(other.id), CountAdjustment::Deaths(1))
        .await
        .expect("adjust");
    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn overflowing_hatch_is_rejected(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let flock = batch(farm.id, 1, crate::domain::livestock::MAX_BIRD_COUNT);
    RecordRepository::<ChickenBatch>::insert(&store, &flock).await.expect("batch");
    let err = store
        .adjust_count(flock.id, &Scope::All, CountAdjustment::Hatched(1))
        .await
        .expect_err("overflow");
    assert!(matches!(err, StoreError::Rejected { .. }));
    let kept = RecordRepository::<ChickenBatch>::find(&store, flock.id, &Scope::All).await.expect("find");
    assert_eq!(kept.map(|b| b.current_count), Some(flock.current_count));
}

#[rstest]
#[tokio::test]
async fn replacing_a_batch_keeps_the_live_count(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let flock = batch(farm.id, 1, 25);
    RecordRepository::<ChickenBatch>::insert(&store, &flock).await.expect("batch");
    let stale = RecordRepository::<ChickenBatch>::find(&store, flock.id, &Scope::All)
        .await
        .expect("find")
        .expect("batch visible");
    store
        .adjust_count(flock.id, &Scope::All, CountAdjustment::Deaths(10))
        .await
        .expect("adjust")
        .expect("batch visible");

    let renamed = ChickenBatch {
        batch_name: "Layers".into(),
        ..stale
    };
    let stored = RecordRepository::<ChickenBatch>::update(&store, &renamed).await.expect("update");

    assert_eq!(stored.batch_name, "Layers");
    assert_eq!(stored.current_count, 15);
}

#[rstest]
#[tokio::test]
async fn completing_feed_raises_one_open_alert(#[future] seeded: Seeded) {
    let Seeded { store, farm, .. } = seeded.await;
    let stock = feed(farm.id);
    RecordRepository::<Feed>::insert(&store, &stock).await.expect("feed");
    let actor = UserId::random();

    let first = store
        .complete_feed(FeedKind::CowFeed, stock.id, &Scope::All, actor, now())
        .await
        .expect("complete")
        .expect("feed visible");
    assert!(first.alert_created);
    assert_eq!(first.alert.item_name, "Dairy Meal");
    assert_eq!(
        first.alert.message,
        "Dairy Meal is finished and needs restocking at Kiambu Dairy"
    );

    let second = store
        .complete_feed(FeedKind::CowFeed, stock.id, &Scope::All, actor, now())
        .await
        .expect("complete")
        .expect("feed visible");
    assert!(!second.alert_created);
    assert_eq!(second.alert.id, first.alert.id);

    store.resolve(first.alert.id).await.expect("resolve");
    let third = store
        .complete_feed(FeedKind::CowFeed, stock.id, &Scope::All, actor, now())
        .await
        .expect("complete")
        .expect("feed visible");
    assert!(third.alert_created);
    assert_ne!(third.alert.id, first.alert.id);
}

#[rstest]
#[tokio::test]
async fn completing_feed_checks_kind_and_scope(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    let stock = feed(farm.id);
    RecordRepository::<Feed>::insert(&store, &stock).await.expect("feed");
    let actor = UserId::random();

    let wrong_kind = store
        .complete_feed(FeedKind::ChickenFeed, stock.id, &Scope::All, actor, now())
        .await
        .expect("complete");
    assert!(wrong_kind.is_none());
    let wrong_farm = store
        .complete_feed(FeedKind::CowFeed, stock.id, &Scope::Farm(other.id), actor, now())
        .await
        .expect("complete");
    assert!(wrong_farm.is_none());
    let untouched = RecordRepository::<Feed>::find(&store, stock.id, &Scope::All).await.expect("find");
    assert!(!untouched.expect("feed").is_finished);
}

#[rstest]
#[tokio::test]
async fn totals_sum_one_farm_within_the_window(#[future] seeded: Seeded) {
    let Seeded { store, farm, other } = seeded.await;
    let daisy = cow(farm.id, "Daisy", None);
    let bella = cow(other.id, "Bella", None);
    RecordRepository::<Animal>::insert(&store, &daisy).await.expect("cow");
    RecordRepository::<Animal>::insert(&store, &bella).await.expect("cow");
    for record in [
        milk(daisy.id, date(2024, 3, 8), MilkSession::Morning, 10),
        milk(daisy.id, date(2024, 3, 15), MilkSession::Evening, 5),
        milk(daisy.id, date(2024, 3, 7), MilkSession::Morning, 100),
        milk(bella.id, date(2024, 3, 10), MilkSession::Morning, 100),
    ] {
        RecordRepository::<MilkProduction>::insert(&store, &record)
            .await
            .expect("milk");
    }

    let window = AggregationWindow::ending(Period::Weekly, date(2024, 3, 15)).expect("window");
    let totals = store
        .totals(Metric::Milk, farm.id, window)
        .await
        .expect("totals");
    assert_eq!(totals.total, Decimal::new(15, 0));
    assert_eq!(totals.count, 2);

    let empty = store
        .totals(Metric::Eggs, farm.id, window)
        .await
        .expect("totals");
    assert_eq!(empty, ProductionTotals::default());
}

#[rstest]
#[tokio::test]
async fn usernames_are_unique() {
    let store = InMemoryFarmStore::default();
    let digest = PasswordDigest::derive("pw");
    AccountRepository::insert(&store, &account(Role::Admin, "root", None), &digest)
        .await
        .expect("first");
    let err = AccountRepository::insert(&store, &account(Role::Farmer, "root", None), &digest)
        .await
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict { .. }));
}

#[rstest]
#[tokio::test]
async fn admin_contacts_skip_farmers_and_blank_emails() {
    let store = InMemoryFarmStore::default();
    let digest = PasswordDigest::derive("pw");
    let mut silent = account(Role::Admin, "silent", None);
    silent.email = "  ".to_owned();
    for account in [
        account(Role::Admin, "root", None),
        account(Role::Farmer, "otieno", None),
        silent,
    ] {
        AccountRepository::insert(&store, &account, &digest)
            .await
            .expect("insert");
    }
    assert_eq!(
        store.admin_contacts().await.expect("contacts"),
        vec!["root@example.com".to_owned()]
    );
}
