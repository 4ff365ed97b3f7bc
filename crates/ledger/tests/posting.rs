use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection, EntityTrait};

use ledger::{Account, AccountKind, Ledger, LedgerError, LineSpec, PostEntryCmd};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

async fn new_user(db: &DatabaseConnection, username: &str) {
    ledger::users::ActiveModel {
        username: ActiveValue::Set(username.to_string()),
        full_name: ActiveValue::Set(None),
        role: ActiveValue::Set("USER".to_string()),
    }
    .insert(db)
    .await
    .unwrap();
}

async fn new_account(db: &DatabaseConnection, owner: &str, daily_limit_cents: i64) -> Account {
    let account = Account::new(owner.to_string(), AccountKind::Checking, daily_limit_cents);
    ledger::accounts::ActiveModel::from(&account)
        .insert(db)
        .await
        .unwrap();
    account
}

#[tokio::test]
async fn post_moves_money_between_accounts() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    let entry = ledger
        .post(PostEntryCmd::new(
            "posting-test-0001",
            vec![LineSpec::new(a.id, -2500), LineSpec::new(b.id, 2500)],
        ))
        .await
        .unwrap();

    assert!(entry.is_posted());
    assert_eq!(entry.lines.len(), 2);
    assert_eq!(ledger.balance(a.id).await.unwrap(), -2500);
    assert_eq!(ledger.balance(b.id).await.unwrap(), 2500);
}

#[tokio::test]
async fn unbalanced_entry_is_rejected_with_nothing_persisted() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;

    let err = ledger
        .post(PostEntryCmd::new(
            "posting-test-0002",
            vec![LineSpec::new(a.id, 100)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnbalancedEntry(_)));

    let entries = ledger::entries::Entity::find().all(&db).await.unwrap();
    assert!(entries.is_empty());
    let lines = ledger::lines::Entity::find().all(&db).await.unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn replay_returns_the_same_entry_and_one_set_of_lines() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    let cmd = PostEntryCmd::new(
        "posting-test-0003",
        vec![LineSpec::new(a.id, -400), LineSpec::new(b.id, 400)],
    );
    let first = ledger.post(cmd.clone()).await.unwrap();
    let second = ledger.post(cmd).await.unwrap();

    assert_eq!(first.id, second.id);
    let lines = ledger::lines::Entity::find().all(&db).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(ledger.balance(a.id).await.unwrap(), -400);
    assert_eq!(ledger.balance(b.id).await.unwrap(), 400);
}

#[tokio::test]
async fn token_length_is_validated_before_any_ledger_logic() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    let err = ledger
        .post(PostEntryCmd::new(
            "short",
            vec![LineSpec::new(a.id, -100), LineSpec::new(b.id, 100)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));
}

#[tokio::test]
async fn zero_amount_lines_are_rejected() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    let err = ledger
        .post(PostEntryCmd::new(
            "posting-test-0004",
            vec![
                LineSpec::new(a.id, 0),
                LineSpec::new(b.id, 0),
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRequest(_)));
}

#[tokio::test]
async fn balance_is_zero_for_account_with_no_activity() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;

    assert_eq!(ledger.balance(a.id).await.unwrap(), 0);
    assert_eq!(
        ledger
            .today_outgoing(a.id, chrono::Utc::now())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn today_outgoing_counts_only_debits() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    ledger
        .post(PostEntryCmd::new(
            "posting-test-0005",
            vec![LineSpec::new(a.id, -3000), LineSpec::new(b.id, 3000)],
        ))
        .await
        .unwrap();
    ledger
        .post(PostEntryCmd::new(
            "posting-test-0006",
            vec![LineSpec::new(b.id, -1000), LineSpec::new(a.id, 1000)],
        ))
        .await
        .unwrap();

    let now = chrono::Utc::now();
    assert_eq!(ledger.today_outgoing(a.id, now).await.unwrap(), 3000);
    assert_eq!(ledger.today_outgoing(b.id, now).await.unwrap(), 1000);
}

#[tokio::test]
async fn account_entries_page_paginates_newest_first() {
    let (ledger, db) = ledger_with_db().await;
    new_user(&db, "alice").await;
    let a = new_account(&db, "alice", 1_000_000).await;
    let b = new_account(&db, "alice", 1_000_000).await;

    for i in 0..5 {
        ledger
            .post(
                PostEntryCmd::new(
                    format!("posting-page-{i:04}"),
                    vec![
                        LineSpec::new(a.id, -(100 + i)),
                        LineSpec::new(b.id, 100 + i),
                    ],
                )
                .description(format!("movement {i}")),
            )
            .await
            .unwrap();
    }

    let first_page = ledger.account_entries_page(a.id, 3, None).await.unwrap();
    assert_eq!(first_page.entries.len(), 3);
    let cursor = first_page.next_cursor.clone().unwrap();

    let second_page = ledger
        .account_entries_page(a.id, 3, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(second_page.entries.len(), 2);
    assert!(second_page.next_cursor.is_none());

    // Every line on account A's statement is one of its debits.
    for item in first_page.entries.iter().chain(second_page.entries.iter()) {
        assert!(item.amount_cents < 0);
        assert!(item.posted_at.is_some());
    }
}
