use diesel::prelude::*;
use pushkind_eventos::schema::permissions;

mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    let conn = pool.get();
    assert!(conn.is_ok());
}

#[test]
fn migrations_seed_permission_codes() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should acquire DB connection");
    let mut codes = permissions::table
        .select(permissions::code)
        .load::<String>(&mut conn)
        .expect("should load permission codes");
    codes.sort();
    assert_eq!(
        codes,
        vec!["admin", "contracts", "finance", "projects", "registry", "tickets"]
    );
}
