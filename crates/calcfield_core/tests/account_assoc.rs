use calcfield_core::db::open_db_in_memory;
use calcfield_core::{
    AccountRepoError, AccountRepository, AccountService, SqliteAccountRepository, User, Wallet,
};
use uuid::Uuid;

#[test]
fn user_without_wallets_reads_back_with_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    let user = User::new("foo");
    repo.create_user(&user).unwrap();

    let loaded = repo.find_user_with_wallets("foo").unwrap().unwrap();
    assert_eq!(loaded.user.name, "foo");
    assert_eq!(loaded.user.uuid, user.uuid);
    assert!(loaded.wallets.is_empty());
}

#[test]
fn wallets_resolve_to_their_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    let alice = User::new("alice");
    let bob = User::new("bob");
    repo.create_user(&alice).unwrap();
    repo.create_user(&bob).unwrap();

    let wallet_a = wallet_with_fixed_id(
        "00000000-0000-4000-8000-000000000001",
        Some(alice.uuid),
        "daily",
    );
    let wallet_b = wallet_with_fixed_id(
        "00000000-0000-4000-8000-000000000002",
        Some(alice.uuid),
        "savings",
    );
    let wallet_c = wallet_with_fixed_id(
        "00000000-0000-4000-8000-000000000003",
        Some(bob.uuid),
        "daily",
    );
    repo.create_wallet(&wallet_a).unwrap();
    repo.create_wallet(&wallet_b).unwrap();
    repo.create_wallet(&wallet_c).unwrap();

    let loaded = repo.find_user_with_wallets("alice").unwrap().unwrap();
    let labels: Vec<&str> = loaded
        .wallets
        .iter()
        .map(|wallet| wallet.label.as_str())
        .collect();
    assert_eq!(labels, vec!["daily", "savings"]);
    assert!(loaded
        .wallets
        .iter()
        .all(|wallet| wallet.user_uuid == Some(alice.uuid)));
}

#[test]
fn unattached_wallet_is_permitted_and_stays_unlisted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    let user = User::new("carol");
    repo.create_user(&user).unwrap();

    let loose = Wallet::new(None, "floating");
    repo.create_wallet(&loose).unwrap();
    assert!(!loose.is_attached());

    let loaded = repo.find_user_with_wallets("carol").unwrap().unwrap();
    assert!(loaded.wallets.is_empty());
}

#[test]
fn dangling_wallet_reference_is_rejected_by_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    let dangling = Wallet::new(Some(Uuid::new_v4()), "orphan");
    let err = repo.create_wallet(&dangling).unwrap_err();
    assert!(matches!(err, AccountRepoError::Db(_)));
}

#[test]
fn duplicate_user_name_is_rejected_by_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    repo.create_user(&User::new("foo")).unwrap();
    let err = repo.create_user(&User::new("foo")).unwrap_err();
    assert!(matches!(err, AccountRepoError::Db(_)));
}

#[test]
fn missing_user_reads_back_as_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();

    assert!(repo.find_user_with_wallets("nobody").unwrap().is_none());
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::try_new(&conn).unwrap();
    let service = AccountService::new(repo);

    let user = service.create_user("foo").unwrap();
    service
        .create_wallet(Some(user.uuid), "primary")
        .unwrap();

    let loaded = service.find_user_with_wallets("foo").unwrap().unwrap();
    assert_eq!(loaded.wallets.len(), 1);
    assert_eq!(loaded.wallets[0].label, "primary");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();

    let result = SqliteAccountRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(AccountRepoError::UninitializedConnection { .. })
    ));
}

fn wallet_with_fixed_id(id: &str, user_uuid: Option<Uuid>, label: &str) -> Wallet {
    Wallet::with_id(Uuid::parse_str(id).unwrap(), user_uuid, label)
}
