//! Helpers for integration tests.

use chrono::NaiveDate;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_eventos::db::{DbPool, establish_connection_pool};
use pushkind_eventos::domain::auth::AuthenticatedUser;
use pushkind_eventos::domain::project::{NewProject, Project};
use pushkind_eventos::domain::types::{Money, ProjectName, ProjectStatus};
use pushkind_eventos::repository::{DieselRepository, RecordWriter};
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    #[allow(dead_code)]
    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[allow(dead_code)]
pub fn user(roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "1".into(),
        email: "ana@arena.com".into(),
        name: "Ana".into(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: usize::MAX,
    }
}

#[allow(dead_code)]
pub fn project(repo: &DieselRepository, name: &str) -> Project {
    repo.create_record(&NewProject {
        company_id: None,
        venue_id: None,
        client_id: None,
        name: ProjectName::new(name).expect("valid name"),
        description: None,
        status: ProjectStatus::Confirmed,
        start_date: date(2025, 3, 1),
        end_date: date(2025, 3, 2),
        budget: Money::ZERO,
    })
    .expect("should create project")
}
