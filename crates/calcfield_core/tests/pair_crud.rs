use calcfield_core::db::migrations::latest_version;
use calcfield_core::db::open_db_in_memory;
use calcfield_core::{
    DeriveError, DivisionError, Pair, PairPlan, PairRepoError, PairRepository, PairService,
    SqlitePairRepository,
};
use rusqlite::Connection;

#[test]
fn construct_save_read_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::new(PairPlan::full(), 3, 2);
    let id = repo.save_pair(&mut pair).unwrap();
    assert_eq!(id, pair.uuid);

    let loaded = repo.find_first_pair().unwrap().unwrap();
    assert_eq!(loaded.uuid, pair.uuid);
    assert_eq!(loaded.sum().unwrap(), 5);
    assert_eq!(loaded.product().unwrap(), 6);
    assert_eq!(loaded.dividend().unwrap(), 1.5);
    assert_eq!(loaded.exponent().unwrap(), 9);

    // The save step froze the computed-on-read exponent into its column.
    assert_eq!(loaded.stored_values().exponent, 9);
}

#[test]
fn repeated_reads_observe_identical_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::new(PairPlan::full(), 7, 4);
    repo.save_pair(&mut pair).unwrap();

    let first = repo.find_first_pair().unwrap().unwrap();
    let second = repo.find_first_pair().unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.dividend().unwrap(), 1.75);
}

#[test]
fn reduced_variant_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::sum_product()).unwrap();

    let mut pair = Pair::new(repo.plan(), 2, 3);
    repo.save_pair(&mut pair).unwrap();

    let loaded = repo.find_first_pair().unwrap().unwrap();
    assert_eq!(loaded.sum().unwrap(), 5);
    assert_eq!(loaded.product().unwrap(), 6);
    assert!(matches!(
        loaded.dividend().unwrap_err(),
        DeriveError::NotInPlan(_)
    ));
    assert!(matches!(
        loaded.exponent().unwrap_err(),
        DeriveError::NotInPlan(_)
    ));
}

#[test]
fn zero_divisor_blocks_save_of_full_variant() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::new(PairPlan::full(), 3, 0);
    let err = repo.save_pair(&mut pair).unwrap_err();
    assert!(matches!(
        err,
        PairRepoError::Derive(DeriveError::Division(DivisionError::ZeroDivisor {
            numerator: 3
        }))
    ));

    assert!(repo.find_first_pair().unwrap().is_none());
}

#[test]
fn zero_divisor_is_accepted_when_dividend_is_not_planned() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::sum_product()).unwrap();

    let mut pair = Pair::new(repo.plan(), 3, 0);
    repo.save_pair(&mut pair).unwrap();

    let loaded = repo.find_first_pair().unwrap().unwrap();
    assert_eq!(loaded.sum().unwrap(), 3);
    assert_eq!(loaded.product().unwrap(), 0);
}

#[test]
fn missing_operand_blocks_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::empty(PairPlan::full());
    let err = repo.save_pair(&mut pair).unwrap_err();
    assert!(matches!(err, PairRepoError::Validation(_)));
}

#[test]
fn saving_again_updates_the_same_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::new(PairPlan::full(), 3, 2);
    repo.save_pair(&mut pair).unwrap();

    pair.set_a(4);
    repo.save_pair(&mut pair).unwrap();

    let all = repo.list_pairs().unwrap();
    assert_eq!(all.len(), 1);
    let loaded = &all[0];
    assert_eq!(loaded.sum().unwrap(), 6);
    assert_eq!(loaded.product().unwrap(), 8);
    assert_eq!(loaded.dividend().unwrap(), 2.0);
    assert_eq!(loaded.exponent().unwrap(), 16);
}

#[test]
fn get_pair_by_id_and_missing_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();

    let mut pair = Pair::new(PairPlan::full(), 5, 5);
    let id = repo.save_pair(&mut pair).unwrap();

    let loaded = repo.get_pair(id).unwrap().unwrap();
    assert_eq!(loaded.sum().unwrap(), 10);

    let missing = repo.get_pair(uuid::Uuid::new_v4()).unwrap();
    assert!(missing.is_none());
}

#[test]
fn service_parses_text_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePairRepository::try_new(&conn, PairPlan::full()).unwrap();
    let service = PairService::new(repo);

    let saved = service.create_pair_from_text("3", "2").unwrap();
    assert_eq!(saved.sum().unwrap(), 5);
    assert_eq!(saved.exponent().unwrap(), 9);

    let loaded = service.find_first_pair().unwrap().unwrap();
    assert_eq!(loaded, saved);

    let err = service.create_pair_from_text("three", "2").unwrap_err();
    assert!(matches!(err, PairRepoError::Validation(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqlitePairRepository::try_new(&conn, PairPlan::full());
    match result {
        Err(PairRepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_pairs_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePairRepository::try_new(&conn, PairPlan::full());
    assert!(matches!(
        result,
        Err(PairRepoError::MissingRequiredTable("pairs"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_pairs_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE pairs (
            uuid TEXT PRIMARY KEY NOT NULL,
            a INTEGER NOT NULL,
            b INTEGER NOT NULL,
            sum INTEGER NOT NULL DEFAULT 0,
            product INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePairRepository::try_new(&conn, PairPlan::full());
    assert!(matches!(
        result,
        Err(PairRepoError::MissingRequiredColumn {
            table: "pairs",
            column: "dividend"
        })
    ));
}
