use chrono::NaiveDate;
use gateway::{SeaGateway, entities};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait};
use store::{
    Budget, BudgetPeriod, Currency, Expense, ExpenseCategory, GatewayError, Money, NewBudget,
    NewCategory, NewExpense, NewPet, NewPreference, NewSettings, Pet, PetPatch, Recurrence,
    Remote, Settings, Species, Store, UserCategoryPreference,
};
use uuid::Uuid;

async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

fn gateway(db: &DatabaseConnection, user: &str) -> SeaGateway {
    SeaGateway::builder()
        .database(db.clone())
        .user(user)
        .build()
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_pet(gateway: &SeaGateway, name: &str) -> Pet {
    Remote::<Pet>::create(
        gateway,
        NewPet {
            name: name.to_string(),
            species: Species::Cat,
            breed: Some("Maine Coon".to_string()),
            birth_date: Some(date(2020, 5, 17)),
            photo_ref: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_category(gateway: &SeaGateway, name: &str, key: Option<&str>) -> ExpenseCategory {
    Remote::<ExpenseCategory>::create(
        gateway,
        NewCategory {
            name: name.to_string(),
            color: "#ff8800".to_string(),
            icon: Some("bowl".to_string()),
            builtin_key: key.map(ToString::to_string),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn expenses_round_trip_field_for_field() {
    let db = database().await;
    let gateway = gateway(&db, "alice");
    let pet = seed_pet(&gateway, "Miso").await;
    let category = seed_category(&gateway, "Food", Some("food")).await;

    let fields = NewExpense {
        pet_id: pet.id,
        category_id: category.id,
        amount: Money::new(4_250),
        currency: Currency::Chf,
        description: Some("Kibble, 12kg".to_string()),
        date: date(2024, 1, 31),
        receipt_ref: Some("receipts/2024-01-31.jpg".to_string()),
        recurrence: Recurrence::Monthly,
        next_due_date: Some(date(2024, 2, 29)),
    };
    let created = Remote::<Expense>::create(&gateway, fields.clone()).await.unwrap();

    let stored = Remote::<Expense>::get_all(&gateway).await.unwrap();
    assert_eq!(stored, [created.clone()]);

    let expense = &stored[0];
    assert_eq!(expense.pet_id, fields.pet_id);
    assert_eq!(expense.category_id, fields.category_id);
    assert_eq!(expense.amount, fields.amount);
    assert_eq!(expense.currency, fields.currency);
    assert_eq!(expense.description, fields.description);
    assert_eq!(expense.date, fields.date);
    assert_eq!(expense.receipt_ref, fields.receipt_ref);
    assert_eq!(expense.recurrence, fields.recurrence);
    assert_eq!(expense.next_due_date, fields.next_due_date);
    assert_eq!(expense.created_at, expense.updated_at);

    let row = entities::expenses::Entity::find_by_id(created.id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.user_id, "alice");
    assert_eq!(row.recurring_type, "monthly");
    assert_eq!(row.receipt_url.as_deref(), Some("receipts/2024-01-31.jpg"));
    assert_eq!(row.amount, 4_250);
}

#[tokio::test]
async fn rows_are_scoped_to_their_owner() {
    let db = database().await;
    let alice = gateway(&db, "alice");
    let bob = gateway(&db, "bob");
    let pet = seed_pet(&alice, "Miso").await;

    assert!(Remote::<Pet>::get_all(&bob).await.unwrap().is_empty());
    assert_eq!(Remote::<Pet>::get_by_id(&bob, pet.id).await.unwrap(), None);
    assert!(matches!(
        Remote::<Pet>::update(&bob, pet.id, PetPatch::default()).await,
        Err(GatewayError::NotFound(_))
    ));
    assert!(matches!(
        Remote::<Pet>::delete(&bob, pet.id).await,
        Err(GatewayError::NotFound(_))
    ));

    assert_eq!(
        Remote::<Pet>::get_by_id(&alice, pet.id).await.unwrap(),
        Some(pet)
    );
}

#[tokio::test]
async fn updates_apply_only_the_patched_columns() {
    let db = database().await;
    let gateway = gateway(&db, "alice");
    let pet = seed_pet(&gateway, "Miso").await;

    let updated = Remote::<Pet>::update(
        &gateway,
        pet.id,
        PetPatch {
            name: Some("Mochi".to_string()),
            breed: Some(None),
            ..PetPatch::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.id, pet.id);
    assert_eq!(updated.name, "Mochi");
    assert_eq!(updated.breed, None);
    assert_eq!(updated.birth_date, pet.birth_date);
    assert_eq!(updated.species, Species::Cat);
    assert_eq!(updated.created_at, pet.created_at);
    assert!(updated.updated_at >= pet.updated_at);

    let missing = Remote::<Pet>::update(&gateway, Uuid::new_v4(), PetPatch::default()).await;
    assert!(matches!(missing, Err(GatewayError::NotFound(_))));
}

#[tokio::test]
async fn deleting_a_pet_cascades_in_the_database() {
    let db = database().await;
    let gateway = gateway(&db, "alice");
    let pet = seed_pet(&gateway, "Miso").await;
    let other = seed_pet(&gateway, "Tofu").await;
    let category = seed_category(&gateway, "Food", Some("food")).await;

    for owner in [&pet, &other] {
        Remote::<Expense>::create(
            &gateway,
            NewExpense {
                pet_id: owner.id,
                category_id: category.id,
                amount: Money::new(1_000),
                currency: Currency::Eur,
                description: None,
                date: date(2024, 3, 1),
                receipt_ref: None,
                recurrence: Recurrence::None,
                next_due_date: None,
            },
        )
        .await
        .unwrap();
    }
    Remote::<Budget>::create(
        &gateway,
        NewBudget {
            pet_id: pet.id,
            category_id: category.id,
            amount: Money::new(20_000),
            currency: Currency::Eur,
            period: BudgetPeriod::Monthly,
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 31),
        },
    )
    .await
    .unwrap();

    Remote::<Pet>::delete(&gateway, pet.id).await.unwrap();

    let expenses = Remote::<Expense>::get_all(&gateway).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].pet_id, other.id);
    assert!(Remote::<Budget>::get_all(&gateway).await.unwrap().is_empty());
    assert_eq!(
        Remote::<ExpenseCategory>::get_all(&gateway).await.unwrap(),
        [category]
    );
}

#[tokio::test]
async fn settings_and_preferences_use_their_column_names() {
    let db = database().await;
    let gateway = gateway(&db, "alice");
    let category = seed_category(&gateway, "Food", Some("food")).await;

    let settings = Remote::<Settings>::create(&gateway, NewSettings::bootstrap(Currency::Gbp))
        .await
        .unwrap();
    assert_eq!(settings.default_currency, Currency::Gbp);
    assert_eq!(settings.available_currencies, Currency::ALL);

    let preference = Remote::<UserCategoryPreference>::create(
        &gateway,
        NewPreference {
            user_id: "someone-else".to_string(),
            category_id: category.id,
            enabled: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(preference.user_id, "alice");
    assert!(preference.enabled);

    let row = entities::user_category_preferences::Entity::find_by_id(preference.id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_enabled);

    let row = entities::expense_categories::Entity::find_by_id(category.id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.building_block.as_deref(), Some("food"));
}

#[tokio::test]
async fn store_runs_end_to_end_over_the_database() {
    let db = database().await;

    let mut store = Store::builder(gateway(&db, "alice")).build();
    store.initialize().await.unwrap();
    assert_eq!(store.settings().unwrap().default_currency, Currency::Eur);

    let food = store
        .add_category_from_building_block("food")
        .await
        .unwrap();
    store
        .add_category(NewCategory {
            name: "Agility classes".to_string(),
            color: "#00aa00".to_string(),
            ..NewCategory::default()
        })
        .await
        .unwrap();
    let pet = store
        .add_pet(NewPet {
            name: "Miso".to_string(),
            ..NewPet::default()
        })
        .await
        .unwrap();
    store
        .add_expense(NewExpense {
            pet_id: pet.id,
            category_id: food.id,
            amount: Money::new(1_999),
            currency: Currency::Eur,
            description: None,
            date: date(2024, 1, 31),
            receipt_ref: None,
            recurrence: Recurrence::Quarterly,
            next_due_date: None,
        })
        .await
        .unwrap();

    let mut reopened = Store::builder(gateway(&db, "alice")).build();
    reopened.initialize().await.unwrap();

    assert_eq!(reopened.error(), None);
    assert_eq!(reopened.settings(), store.settings());
    assert_eq!(reopened.pets(), [pet]);
    assert_eq!(reopened.expenses()[0].next_due_date, Some(date(2024, 4, 30)));
    let visible: Vec<&str> = reopened
        .get_user_selected_categories()
        .into_iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(visible, ["Food"]);
    assert_eq!(reopened.preferences().len(), 2);

    let mut stranger = Store::builder(gateway(&db, "bob")).build();
    stranger.initialize().await.unwrap();
    assert!(stranger.pets().is_empty());
    assert!(stranger.categories().is_empty());
}
