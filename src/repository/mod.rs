//! The Gateway: persistence traits and their Diesel implementation.

use crate::db::{DbConnection, DbPool};
use crate::domain::access::{Permission, PermissionChanges};
use crate::domain::record::{Record, SoftDelete};
use crate::domain::ticket::{NewTicketSale, TicketSale, TicketType};
use crate::domain::types::{GroupId, PermissionId, TicketTypeId};

pub mod access;
pub mod errors;
pub mod finance;
pub mod projects;
pub mod registry;
pub mod tickets;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Options accepted by every `list_records` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Restrict to children of this parent (company, project, ticket type or
    /// group, depending on the record family).
    pub parent_id: Option<i32>,
    /// Include deactivated users and groups.
    pub include_inactive: bool,
    /// Populate embedded relation references.
    pub with_relations: bool,
}

impl ListQuery {
    pub fn parent(mut self, parent_id: impl Into<i32>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    pub fn with_relations(mut self) -> Self {
        self.with_relations = true;
        self
    }
}

/// Read-only operations for one record family.
pub trait RecordReader<R: Record> {
    /// Full collection matching `query`, ordered by the family's stable key.
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<R>>;
    fn get_record(&self, id: R::Id) -> RepositoryResult<Option<R>>;
}

/// Insert and update for one record family. Both return the row as
/// persisted, including generated ids and timestamps.
pub trait RecordWriter<R: Record> {
    fn create_record(&self, new: &R::New) -> RepositoryResult<R>;
    /// Fails with [`RepositoryError::NotFound`] when `id` does not exist.
    fn update_record(&self, id: R::Id, patch: &R::Patch) -> RepositoryResult<R>;
}

/// Hard deletion, for families that are not soft-deleted.
pub trait RecordDeleter<R: Record> {
    fn delete_record(&self, id: R::Id) -> RepositoryResult<()>;
}

/// Flips the active flag of soft-deleted families.
pub trait RecordDeactivator<R: SoftDelete> {
    fn set_record_active(&self, id: R::Id, active: bool) -> RepositoryResult<R>;
}

/// Sale recording keeps the inventory counter pair consistent.
pub trait TicketSalesWriter {
    /// Re-checks availability, inserts the sale and recomputes `sold` from
    /// the sales table, all in one transaction. Returns the sale and the
    /// updated ticket type.
    fn record_sale(&self, sale: &NewTicketSale) -> RepositoryResult<(TicketSale, TicketType)>;
    /// Recomputes `sold` as the summed quantity of the ticket's sales.
    fn resync_sold(&self, ticket_type_id: TicketTypeId) -> RepositoryResult<TicketType>;
}

pub trait GroupPermissionReader {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>>;
    fn list_group_permissions(&self, group_id: GroupId) -> RepositoryResult<Vec<PermissionId>>;
    /// Permission codes granted to the active groups of the user with `email`.
    fn list_permission_codes_for_email(&self, email: &str) -> RepositoryResult<Vec<String>>;
}

pub trait GroupPermissionWriter {
    /// Applies both sides of `changes` in one transaction.
    fn apply_permission_changes(
        &self,
        group_id: GroupId,
        changes: &PermissionChanges,
    ) -> RepositoryResult<()>;
}

/// Implements [`RecordWriter`] and [`RecordDeleter`] for a family whose
/// rows map one-to-one onto a table.
macro_rules! diesel_record_writer {
    ($record:ty, $table:ident, $row:ty, $new_row:ty, $changeset:ty) => {
        impl $crate::repository::RecordWriter<$record> for $crate::repository::DieselRepository {
            fn create_record(
                &self,
                new: &<$record as $crate::domain::record::Record>::New,
            ) -> $crate::repository::RepositoryResult<$record> {
                use diesel::prelude::*;

                let mut conn = self.conn()?;
                let row = diesel::insert_into($crate::schema::$table::table)
                    .values(<$new_row>::from(new))
                    .returning(<$row>::as_returning())
                    .get_result::<$row>(&mut conn)?;
                Ok(<$record>::try_from(row)?)
            }

            fn update_record(
                &self,
                id: <$record as $crate::domain::record::Record>::Id,
                patch: &<$record as $crate::domain::record::Record>::Patch,
            ) -> $crate::repository::RepositoryResult<$record> {
                use diesel::prelude::*;

                let mut conn = self.conn()?;
                let row = diesel::update($crate::schema::$table::table.find(id.get()))
                    .set(<$changeset>::from(patch))
                    .returning(<$row>::as_returning())
                    .get_result::<$row>(&mut conn)?;
                Ok(<$record>::try_from(row)?)
            }
        }
    };
    ($record:ty, $table:ident, $row:ty, $new_row:ty, $changeset:ty, deletable) => {
        $crate::repository::diesel_record_writer!($record, $table, $row, $new_row, $changeset);

        impl $crate::repository::RecordDeleter<$record> for $crate::repository::DieselRepository {
            fn delete_record(
                &self,
                id: <$record as $crate::domain::record::Record>::Id,
            ) -> $crate::repository::RepositoryResult<()> {
                use diesel::prelude::*;

                let mut conn = self.conn()?;
                let affected = diesel::delete($crate::schema::$table::table.find(id.get()))
                    .execute(&mut conn)?;
                if affected == 0 {
                    return Err($crate::repository::RepositoryError::NotFound);
                }
                Ok(())
            }
        }
    };
}

/// Implements [`RecordReader::get_record`]-style lookup by primary key.
macro_rules! diesel_find {
    ($self:ident, $record:ty, $table:ident, $row:ty, $id:expr) => {{
        use diesel::prelude::*;

        let mut conn = $self.conn()?;
        let row = $crate::schema::$table::table
            .find($id.get())
            .select(<$row>::as_select())
            .first::<$row>(&mut conn)
            .optional()?;
        row.map(<$record>::try_from)
            .transpose()
            .map_err($crate::repository::RepositoryError::from)
    }};
}

pub(crate) use {diesel_find, diesel_record_writer};
