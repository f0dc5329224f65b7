//! Services wired to real stores over an in-memory SQLite database.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Set,
};
use sea_orm_migration::MigratorTrait;

use pemmob_api::config::Config;
use pemmob_api::domain::{CartItem, CategoryFilter, Checkout, NewTransaction, TransactionFilter};
use pemmob_api::errors::{AppError, AppResult};
use pemmob_api::infra::repositories::entities::{category, product, transaction, transaction_item};
use pemmob_api::infra::{Migrator, Persistence, UnitOfWork};
use pemmob_api::services::{
    AuthService, CategoryService, CurrentUser, ProfileUpdate, RegisterUser, ServiceContainer,
    Services, TransactionService, UserService,
};
use pemmob_api::types::PageRequest;
use pemmob_api::{with_transaction, TransactionStatus};

const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";
const PASSWORD: &str = "SecurePass123!";

async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

fn services(db: &DatabaseConnection) -> Services {
    let config = Config::new("sqlite::memory:", TEST_SECRET).unwrap();
    Services::from_connection(db.clone(), config)
}

async fn seed_category(db: &DatabaseConnection, name: &str, parent_id: Option<i32>) -> i32 {
    let now = Utc::now();
    category::ActiveModel {
        name: Set(name.to_string()),
        parent_id: Set(parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

async fn seed_product(db: &DatabaseConnection, name: &str, price: f64, category_id: i32) -> i32 {
    let now = Utc::now();
    product::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        description: Set(None),
        category_id: Set(Some(category_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

fn registration(username: &str) -> RegisterUser {
    RegisterUser {
        name: "Budi".to_string(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        phone: Some("08123456".to_string()),
        password: PASSWORD.to_string(),
    }
}

/// Register a user and resolve their bearer token.
async fn signed_in(services: &Services, username: &str) -> CurrentUser {
    let payload = services.users().register(registration(username)).await.unwrap();
    services
        .auth()
        .authenticate(&payload.access_token)
        .await
        .unwrap()
}

fn checkout(items: Vec<CartItem>) -> Checkout {
    Checkout {
        items,
        address: Some("Jl. Merdeka 1".to_string()),
        total_price: 250.0,
        shipping_price: 15.0,
        status: TransactionStatus::Pending,
    }
}

#[tokio::test]
async fn test_checkout_persists_order_and_lines() {
    let db = setup_db().await;
    let services = services(&db);
    let category_id = seed_category(&db, "Electronics", None).await;
    let product_id = seed_product(&db, "Headphones", 125.0, category_id).await;
    let current = signed_in(&services, "budi").await;

    let order = services
        .transactions()
        .checkout(
            &current,
            checkout(vec![CartItem {
                product_id,
                quantity: 2,
            }]),
        )
        .await
        .unwrap();

    assert_eq!(order.user_id, current.id());
    assert_eq!(order.status, TransactionStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(
        order.items[0].product.as_ref().map(|p| p.name.as_str()),
        Some("Headphones")
    );

    assert_eq!(transaction::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(transaction_item::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_checkout_with_unknown_product_leaves_no_rows() {
    let db = setup_db().await;
    let services = services(&db);
    let category_id = seed_category(&db, "Electronics", None).await;
    let product_id = seed_product(&db, "Headphones", 125.0, category_id).await;
    let current = signed_in(&services, "budi").await;

    let result = services
        .transactions()
        .checkout(
            &current,
            checkout(vec![
                CartItem {
                    product_id,
                    quantity: 1,
                },
                CartItem {
                    product_id: 999,
                    quantity: 1,
                },
            ]),
        )
        .await;

    match result {
        Err(AppError::Validation(errors)) => assert!(errors.contains("items.1.id")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(transaction::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_unit_of_work_rolls_back() {
    let db = setup_db().await;
    let services = services(&db);
    let current = signed_in(&services, "budi").await;
    let uow = Persistence::new(db.clone());

    let header = NewTransaction {
        user_id: current.id(),
        address: None,
        total_price: 10.0,
        shipping_price: 1.0,
        status: TransactionStatus::Pending,
    };

    let result: AppResult<i32> = with_transaction!(uow, |ctx| {
        ctx.checkout().create_transaction(&header).await?;
        Err::<i32, AppError>(AppError::internal("line insert failed"))
    });

    assert!(result.is_err());
    assert_eq!(transaction::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_transaction_listing_is_scoped_to_caller() {
    let db = setup_db().await;
    let services = services(&db);
    let category_id = seed_category(&db, "Electronics", None).await;
    let product_id = seed_product(&db, "Headphones", 125.0, category_id).await;
    let budi = signed_in(&services, "budi").await;
    let siti = signed_in(&services, "siti").await;

    let cart = || {
        checkout(vec![CartItem {
            product_id,
            quantity: 1,
        }])
    };
    let transactions = services.transactions();
    transactions.checkout(&budi, cart()).await.unwrap();
    transactions.checkout(&budi, cart()).await.unwrap();
    let foreign = transactions.checkout(&siti, cart()).await.unwrap();

    let page = transactions
        .list(&budi, TransactionFilter::default(), PageRequest::new(None, None, 6))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert!(page.data.iter().all(|t| t.user_id == budi.id()));
    assert!(page.data[0].id > page.data[1].id);

    let shipped = transactions
        .list(
            &budi,
            TransactionFilter {
                status: Some(TransactionStatus::Shipped),
            },
            PageRequest::new(None, None, 6),
        )
        .await
        .unwrap();
    assert_eq!(shipped.total, 0);

    assert!(matches!(
        transactions.get(&budi, foreign.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_name_filter_is_case_insensitive() {
    let db = setup_db().await;
    let services = services(&db);
    let electronics = seed_category(&db, "Electronics", None).await;
    seed_category(&db, "Fashion", None).await;
    seed_product(&db, "Headphones", 125.0, electronics).await;

    let filter = CategoryFilter {
        name: Some("elect".to_string()),
        with_products: true,
    };
    let page = services
        .categories()
        .list(filter, PageRequest::new(None, None, 15))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].name, "Electronics");
    assert_eq!(page.data[0].products.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_category_filter_treats_wildcards_literally() {
    let db = setup_db().await;
    let services = services(&db);
    seed_category(&db, "Electronics", None).await;
    seed_category(&db, "Fashion", None).await;
    seed_category(&db, "100% Cotton", None).await;
    seed_category(&db, "Home_Living", None).await;

    let search = |name: &str| CategoryFilter {
        name: Some(name.to_string()),
        with_products: false,
    };
    let categories = services.categories();

    let percent = categories
        .list(search("%"), PageRequest::new(None, None, 15))
        .await
        .unwrap();
    assert_eq!(percent.total, 1);
    assert_eq!(percent.data[0].name, "100% Cotton");

    let underscore = categories
        .list(search("_"), PageRequest::new(None, None, 15))
        .await
        .unwrap();
    assert_eq!(underscore.total, 1);
    assert_eq!(underscore.data[0].name, "Home_Living");
}

#[tokio::test]
async fn test_far_page_returns_empty_list() {
    let db = setup_db().await;
    let services = services(&db);
    seed_category(&db, "Electronics", None).await;

    let page = services
        .categories()
        .list(
            CategoryFilter::default(),
            PageRequest::new(Some(u64::MAX), Some(100), 15),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_category_lookup_includes_parent() {
    let db = setup_db().await;
    let services = services(&db);
    let parent_id = seed_category(&db, "Electronics", None).await;
    let child_id = seed_category(&db, "Audio", Some(parent_id)).await;

    let found = services.categories().get(child_id).await.unwrap();

    assert_eq!(found.parent_id, Some(parent_id));
    assert_eq!(found.parent.map(|p| p.name), Some("Electronics".to_string()));
    assert!(matches!(
        services.categories().get(child_id + 100).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let db = setup_db().await;
    let services = services(&db);
    services.users().register(registration("budi")).await.unwrap();

    let mut duplicate = registration("budi2");
    duplicate.email = "budi@example.com".to_string();
    let result = services.users().register(duplicate).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert_eq!(
                errors.get("email"),
                Some(&["The email has already been taken.".to_string()][..])
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_profile_update_changes_only_given_fields() {
    let db = setup_db().await;
    let services = services(&db);
    let current = signed_in(&services, "budi").await;

    let update = ProfileUpdate {
        phone: Some("0899".to_string()),
        ..Default::default()
    };
    let updated = services
        .users()
        .update_profile(&current, update)
        .await
        .unwrap();

    assert_eq!(updated.phone.as_deref(), Some("0899"));
    assert_eq!(updated.username, "budi");
    assert_eq!(updated.email, "budi@example.com");

    // Password untouched, so the old credentials still work
    let login = services
        .users()
        .login("budi@example.com".to_string(), PASSWORD.to_string())
        .await;
    assert!(login.is_ok());
}

#[tokio::test]
async fn test_logout_revokes_only_the_used_token() {
    let db = setup_db().await;
    let services = services(&db);
    let first = services.users().register(registration("budi")).await.unwrap();
    let second = services
        .users()
        .login("budi@example.com".to_string(), PASSWORD.to_string())
        .await
        .unwrap();

    let auth = services.auth();
    let current = auth.authenticate(&first.access_token).await.unwrap();
    let revoked = services.users().logout(&current).await.unwrap();

    assert!(revoked.revoked);
    assert!(matches!(
        auth.authenticate(&first.access_token).await,
        Err(AppError::Unauthorized)
    ));
    assert!(auth.authenticate(&second.access_token).await.is_ok());
}
