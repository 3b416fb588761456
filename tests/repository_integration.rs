//! Integration tests for the Postgres repositories
//!
//! These need a reachable database at `DATABASE_URL` and run with
//! `cargo test -- --ignored`. Each test creates its own tenant and removes it
//! afterwards; dependent rows go with it through `ON DELETE CASCADE`.

use chrono::{Duration, TimeZone, Utc};
use cgk_platform_api::auth::password::hash_password;
use cgk_platform_api::domain::contact::{ContactChannel, ContactConsent};
use cgk_platform_api::domain::drive::{AssetKind, DriveAsset, DriveFile, UpsertOutcome};
use cgk_platform_api::domain::email::{EmailStatus, NewEmail, SenderAddress, SenderPurpose};
use cgk_platform_api::domain::platform_log::{LogFilter, LogLevel, NewLogEntry};
use cgk_platform_api::domain::repositories::{
    ConsentRepository, DriveRepository, EmailQueueRepository, PlatformLogRepository,
    SenderRepository, SessionRepository, TenantRepository, User, UserRepository,
    VideoRepository,
};
use cgk_platform_api::domain::tenant::{Session, TenantRole};
use cgk_platform_api::domain::user::value_objects::Email;
use cgk_platform_api::domain::video::{ReactionToggle, Video};
use cgk_platform_api::infrastructure::repositories::{
    PostgresConsentRepository, PostgresDriveRepository, PostgresEmailQueueRepository,
    PostgresPlatformLogRepository, PostgresSenderRepository, PostgresSessionRepository,
    PostgresTenantRepository, PostgresUserRepository, PostgresVideoRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Set up test database connection pool
async fn setup_test_db() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Create a tenant for isolation
async fn create_test_tenant(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tenants (id, slug, name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(format!("repo-{}", &id.simple().to_string()[..12]))
        .bind("Repository Test Store")
        .execute(pool)
        .await
        .expect("Failed to create test tenant");
    id
}

async fn cleanup_test_tenant(pool: &PgPool, tenant_id: Uuid) {
    sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup test tenant");
}

async fn create_test_user(pool: &PgPool) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: Email::new(format!("repo-{}@example.com", Uuid::new_v4())).unwrap(),
        password_hash: hash_password("testpass123").expect("hash password"),
        full_name: "Repository Tester".into(),
        is_active: true,
    };
    PostgresUserRepository::new(pool.clone())
        .create(user.clone())
        .await
        .expect("Failed to create user");
    user
}

async fn cleanup_user(pool: &PgPool, user_id: Uuid) {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_roundtrip_and_duplicate_email() {
    let pool = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let found = repo
        .find_by_email(&user.email)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(found.id, user.id);
    assert_eq!(found.full_name, "Repository Tester");

    let mut duplicate = user.clone();
    duplicate.id = Uuid::new_v4();
    let err = repo.create(duplicate).await.unwrap_err();
    assert!(err.contains("duplicate") || err.contains("unique"));

    cleanup_user(&pool, user.id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_memberships_and_sessions() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let user = create_test_user(&pool).await;
    let tenants = PostgresTenantRepository::new(pool.clone());
    let sessions = PostgresSessionRepository::new(pool.clone());

    tenants.add_membership(user.id, tenant_id, TenantRole::Admin).await.unwrap();
    // Idempotent
    tenants.add_membership(user.id, tenant_id, TenantRole::Viewer).await.unwrap();

    let membership = tenants
        .find_membership(user.id, tenant_id)
        .await
        .unwrap()
        .expect("membership exists");
    assert_eq!(membership.role, TenantRole::Admin);
    assert!(membership.last_used_at.is_none());

    tenants.touch_membership(user.id, tenant_id).await.unwrap();
    let listed = tenants.list_memberships(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].last_used_at.is_some());

    let session = Session::start(user.id, Some(tenant_id), Duration::hours(8));
    sessions.create(&session).await.unwrap();
    assert!(sessions.find_by_id(session.id).await.unwrap().unwrap().is_active());

    sessions.revoke(session.id).await.unwrap();
    sessions.revoke(session.id).await.unwrap();
    assert!(!sessions.find_by_id(session.id).await.unwrap().unwrap().is_active());

    cleanup_user(&pool, user.id).await;
    cleanup_test_tenant(&pool, tenant_id).await;
}

fn sender(tenant_id: Uuid, email: &str, purpose: SenderPurpose) -> SenderAddress {
    SenderAddress {
        id: Uuid::new_v4(),
        tenant_id,
        email: email.into(),
        display_name: "Brand".into(),
        purpose,
        is_default: false,
        is_verified: false,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_sender_single_default_per_purpose() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresSenderRepository::new(pool.clone());

    let first = repo
        .create(&sender(tenant_id, "orders@brand.com", SenderPurpose::Transactional))
        .await
        .unwrap();
    let second = repo
        .create(&sender(tenant_id, "hello@brand.com", SenderPurpose::Transactional))
        .await
        .unwrap();
    let marketing = repo
        .create(&sender(tenant_id, "news@brand.com", SenderPurpose::Marketing))
        .await
        .unwrap();

    assert!(first.is_default);
    assert!(!second.is_default);
    assert!(marketing.is_default);

    repo.set_default(tenant_id, second.id).await.unwrap();
    let all = repo.list(tenant_id).await.unwrap();
    let defaults: Vec<_> = all
        .iter()
        .filter(|s| s.purpose == SenderPurpose::Transactional && s.is_default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second.id);

    repo.mark_verified(tenant_id, second.id).await.unwrap();
    assert!(repo.find_by_id(tenant_id, second.id).await.unwrap().unwrap().is_verified);
    assert_eq!(
        repo.count_for_purpose(tenant_id, SenderPurpose::Transactional).await.unwrap(),
        2
    );

    cleanup_test_tenant(&pool, tenant_id).await;
}

fn new_email(to: &str) -> NewEmail {
    NewEmail {
        to: to.into(),
        purpose: SenderPurpose::Transactional,
        subject: "Your order shipped".into(),
        html_body: Some("<p>On its way</p>".into()),
        text_body: None,
        reply_to: None,
        send_at: None,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_email_claim_and_retry() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresEmailQueueRepository::new(pool.clone());

    let due = repo
        .enqueue(tenant_id, &new_email("due@example.com").validate().unwrap(), 5)
        .await
        .unwrap();
    let mut scheduled = new_email("later@example.com");
    scheduled.send_at = Some(Utc::now() + Duration::hours(1));
    let later = repo
        .enqueue(tenant_id, &scheduled.validate().unwrap(), 5)
        .await
        .unwrap();
    assert_eq!(due.status, EmailStatus::Pending);

    let claimed = repo.claim_batch("worker-1", 500).await.unwrap();
    assert!(claimed.iter().any(|e| e.id == due.id && e.status == EmailStatus::Processing));
    assert!(claimed.iter().all(|e| e.id != later.id));

    // Claimed rows are not handed out twice
    let second = repo.claim_batch("worker-2", 500).await.unwrap();
    assert!(second.iter().all(|e| e.id != due.id));

    repo.mark_retry(due.id, 1, Utc::now() - Duration::seconds(1), "busy")
        .await
        .unwrap();
    let stats = repo.stats(tenant_id).await.unwrap();
    assert_eq!(stats.pending, 2);

    let reclaimed = repo.claim_batch("worker-3", 500).await.unwrap();
    let email = reclaimed.iter().find(|e| e.id == due.id).expect("retry is due");
    assert_eq!(email.attempts, 1);

    repo.mark_sent(due.id, "re_123").await.unwrap();
    let stats = repo.stats(tenant_id).await.unwrap();
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.pending, 1);

    cleanup_test_tenant(&pool, tenant_id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_error_groups_by_signature() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresPlatformLogRepository::new(pool.clone());

    for order in ["1001", "1002", "1003"] {
        let entry = NewLogEntry {
            level: LogLevel::Error,
            service: "checkout".into(),
            message: format!("Payment failed for order {}", order),
            context: None,
            request_id: None,
        }
        .into_entry(Some(tenant_id))
        .unwrap();
        repo.insert(&entry).await.unwrap();
    }
    let info = NewLogEntry {
        level: LogLevel::Info,
        service: "checkout".into(),
        message: "Checkout started".into(),
        context: None,
        request_id: None,
    }
    .into_entry(Some(tenant_id))
    .unwrap();
    repo.insert(&info).await.unwrap();

    let groups = repo
        .error_groups(Some(tenant_id), Utc::now() - Duration::hours(1), 10)
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].occurrences, 3);
    assert_eq!(groups[0].services, vec!["checkout".to_string()]);

    let errors_only = repo
        .query(&LogFilter {
            tenant_id: Some(tenant_id),
            min_level: Some(LogLevel::Warn),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(errors_only.len(), 3);

    let searched = repo
        .query(&LogFilter {
            tenant_id: Some(tenant_id),
            search: Some("1002".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);

    cleanup_test_tenant(&pool, tenant_id).await;
}

fn drive_file(id: &str, day: u32) -> DriveFile {
    DriveFile {
        id: id.into(),
        name: "hero.png".into(),
        mime_type: "image/png".into(),
        size: Some("2048".into()),
        modified_time: Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
        web_view_link: None,
        md5_checksum: None,
        thumbnail_link: None,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_drive_asset_upsert_outcomes() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresDriveRepository::new(pool.clone());

    repo.upsert_connection(tenant_id, "folder-1", "token").await.unwrap();
    repo.mark_needs_reauth(tenant_id, "token expired").await.unwrap();
    assert!(repo.find_connection(tenant_id).await.unwrap().unwrap().needs_reauth);

    // Reconnecting clears the flag
    let conn = repo.upsert_connection(tenant_id, "folder-1", "token-2").await.unwrap();
    assert!(!conn.needs_reauth);

    let first = DriveAsset::from_file(tenant_id, &drive_file("file-1", 1)).unwrap();
    assert_eq!(repo.upsert_asset(&first).await.unwrap(), UpsertOutcome::Inserted);
    assert_eq!(repo.upsert_asset(&first).await.unwrap(), UpsertOutcome::Unchanged);

    let newer = DriveAsset::from_file(tenant_id, &drive_file("file-1", 2)).unwrap();
    assert_eq!(repo.upsert_asset(&newer).await.unwrap(), UpsertOutcome::Updated);

    let images = repo.list_assets(tenant_id, Some(AssetKind::Image)).await.unwrap();
    assert_eq!(images.len(), 1);
    assert!(repo
        .list_assets(tenant_id, Some(AssetKind::Video))
        .await
        .unwrap()
        .is_empty());

    cleanup_test_tenant(&pool, tenant_id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_consent_opt_out_and_back_in() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresConsentRepository::new(pool.clone());

    let mut consent = ContactConsent {
        tenant_id,
        channel: ContactChannel::Email,
        address: "shopper@example.com".into(),
        opted_out: true,
        source_keyword: None,
        updated_at: Utc::now(),
    };
    repo.upsert(&consent).await.unwrap();
    assert!(repo
        .is_opted_out(tenant_id, ContactChannel::Email, "Shopper@Example.com")
        .await
        .unwrap());
    assert!(!repo
        .is_opted_out(tenant_id, ContactChannel::Sms, "shopper@example.com")
        .await
        .unwrap());

    consent.opted_out = false;
    repo.upsert(&consent).await.unwrap();
    assert!(!repo
        .is_opted_out(tenant_id, ContactChannel::Email, "shopper@example.com")
        .await
        .unwrap());

    cleanup_test_tenant(&pool, tenant_id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_registration_is_all_or_nothing() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresUserRepository::new(pool.clone());

    let user = User {
        id: Uuid::new_v4(),
        email: Email::new(format!("reg-{}@example.com", Uuid::new_v4())).unwrap(),
        password_hash: hash_password("testpass123").expect("hash password"),
        full_name: "Registration Tester".into(),
        is_active: true,
    };

    // Unknown tenant fails the membership insert and rolls back the user
    let err = repo
        .create_with_membership(user.clone(), Uuid::new_v4(), TenantRole::Member)
        .await
        .unwrap_err();
    assert!(err.contains("membership"));
    assert!(repo.find_by_email(&user.email).await.unwrap().is_none());

    let user_id = repo
        .create_with_membership(user.clone(), tenant_id, TenantRole::Member)
        .await
        .unwrap();
    let membership = PostgresTenantRepository::new(pool.clone())
        .find_membership(user_id, tenant_id)
        .await
        .unwrap()
        .expect("membership exists");
    assert_eq!(membership.role, TenantRole::Member);

    cleanup_user(&pool, user_id).await;
    cleanup_test_tenant(&pool, tenant_id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_claims_return_to_pending() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let repo = PostgresEmailQueueRepository::new(pool.clone());

    let email = repo
        .enqueue(tenant_id, &new_email("stale@example.com").validate().unwrap(), 5)
        .await
        .unwrap();
    let claimed = repo.claim_batch("crashed-worker", 500).await.unwrap();
    assert!(claimed.iter().any(|e| e.id == email.id));

    // A fresh claim survives the sweep
    repo.release_stale_claims(Utc::now() - Duration::minutes(15))
        .await
        .unwrap();
    assert_eq!(repo.stats(tenant_id).await.unwrap().processing, 1);

    sqlx::query("UPDATE email_queue SET claimed_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(email.id)
        .execute(&pool)
        .await
        .expect("Failed to age claim");

    let released = repo
        .release_stale_claims(Utc::now() - Duration::minutes(15))
        .await
        .unwrap();
    assert!(released >= 1);
    let stats = repo.stats(tenant_id).await.unwrap();
    assert_eq!(stats.processing, 0);
    assert_eq!(stats.pending, 1);

    let reclaimed = repo.claim_batch("worker-2", 500).await.unwrap();
    let row = reclaimed.iter().find(|e| e.id == email.id).expect("released row is claimable");
    assert_eq!(row.claimed_by.as_deref(), Some("worker-2"));

    cleanup_test_tenant(&pool, tenant_id).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_reaction_toggle_and_counts() {
    let pool = setup_test_db().await;
    let tenant_id = create_test_tenant(&pool).await;
    let alice = create_test_user(&pool).await;
    let bob = create_test_user(&pool).await;
    let repo = PostgresVideoRepository::new(pool.clone());

    let video = Video::new(tenant_id, "Unboxing", alice.id).unwrap();
    repo.create(&video).await.unwrap();

    assert_eq!(repo.toggle_reaction(video.id, alice.id, "🔥").await.unwrap(), ReactionToggle::Added);
    assert_eq!(repo.toggle_reaction(video.id, bob.id, "🔥").await.unwrap(), ReactionToggle::Added);
    assert_eq!(repo.toggle_reaction(video.id, bob.id, "👏").await.unwrap(), ReactionToggle::Added);

    let counts = repo.reaction_counts(video.id, alice.id).await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!((counts[0].emoji.as_str(), counts[0].count, counts[0].reacted), ("🔥", 2, true));
    assert_eq!((counts[1].emoji.as_str(), counts[1].count, counts[1].reacted), ("👏", 1, false));

    // Toggling again removes only the caller's reaction
    assert_eq!(repo.toggle_reaction(video.id, alice.id, "🔥").await.unwrap(), ReactionToggle::Removed);
    let counts = repo.reaction_counts(video.id, alice.id).await.unwrap();
    let fire = counts.iter().find(|c| c.emoji == "🔥").expect("bob still reacted");
    assert_eq!(fire.count, 1);
    assert!(!fire.reacted);

    cleanup_test_tenant(&pool, tenant_id).await;
    cleanup_user(&pool, alice.id).await;
    cleanup_user(&pool, bob.id).await;
}
