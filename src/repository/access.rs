use diesel::prelude::*;

use crate::domain::access::{Group, Permission, PermissionChanges, User};
use crate::domain::types::{GroupId, PermissionId, UserId};
use crate::models::access::{
    Group as DbGroup, GroupChangeset, GroupPermission, NewGroup as DbNewGroup,
    NewUser as DbNewUser, Permission as DbPermission, User as DbUser, UserChangeset,
};
use crate::models::touch;
use crate::repository::{
    DieselRepository, GroupPermissionReader, GroupPermissionWriter, ListQuery, RecordDeactivator,
    RecordReader, RepositoryError, RepositoryResult, diesel_find, diesel_record_writer,
};

impl RecordReader<User> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let mut items = users::table
            .select(DbUser::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(group_id) = query.parent_id {
            items = items.filter(users::group_id.eq(Some(group_id)));
        }
        if !query.include_inactive {
            items = items.filter(users::active.eq(true));
        }

        items
            .order((users::name.asc(), users::id.asc()))
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: UserId) -> RepositoryResult<Option<User>> {
        diesel_find!(self, User, users, DbUser, id)
    }
}

diesel_record_writer!(User, users, DbUser, DbNewUser, UserChangeset);

impl RecordDeactivator<User> for DieselRepository {
    fn set_record_active(&self, id: UserId, active: bool) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let row = diesel::update(users::table.find(id.get()))
            .set((users::active.eq(active), users::updated_at.eq(touch())))
            .returning(DbUser::as_returning())
            .get_result::<DbUser>(&mut conn)?;
        Ok(User::try_from(row)?)
    }
}

impl RecordReader<Group> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<Group>> {
        use crate::schema::user_groups;

        let mut conn = self.conn()?;

        let mut items = user_groups::table
            .select(DbGroup::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if !query.include_inactive {
            items = items.filter(user_groups::active.eq(true));
        }

        items
            .order((user_groups::name.asc(), user_groups::id.asc()))
            .load::<DbGroup>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Group>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: GroupId) -> RepositoryResult<Option<Group>> {
        diesel_find!(self, Group, user_groups, DbGroup, id)
    }
}

diesel_record_writer!(Group, user_groups, DbGroup, DbNewGroup, GroupChangeset);

impl RecordDeactivator<Group> for DieselRepository {
    /// Deactivation is refused while the group still has active members;
    /// the check and the update share one transaction.
    fn set_record_active(&self, id: GroupId, active: bool) -> RepositoryResult<Group> {
        use crate::schema::{user_groups, users};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            if !active {
                let members = users::table
                    .filter(users::group_id.eq(Some(id.get())))
                    .filter(users::active.eq(true))
                    .count()
                    .get_result::<i64>(conn)?;
                if members > 0 {
                    return Err(RepositoryError::Conflict(format!(
                        "group has {members} active members"
                    )));
                }
            }

            let row = diesel::update(user_groups::table.find(id.get()))
                .set((
                    user_groups::active.eq(active),
                    user_groups::updated_at.eq(touch()),
                ))
                .returning(DbGroup::as_returning())
                .get_result::<DbGroup>(conn)?;
            Ok(Group::try_from(row)?)
        })
    }
}

impl GroupPermissionReader for DieselRepository {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>> {
        use crate::schema::permissions;

        let mut conn = self.conn()?;
        permissions::table
            .select(DbPermission::as_select())
            .order(permissions::code.asc())
            .load::<DbPermission>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Permission>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_group_permissions(&self, group_id: GroupId) -> RepositoryResult<Vec<PermissionId>> {
        use crate::schema::group_permissions;

        let mut conn = self.conn()?;
        group_permissions::table
            .filter(group_permissions::group_id.eq(group_id.get()))
            .select(group_permissions::permission_id)
            .order(group_permissions::permission_id.asc())
            .load::<i32>(&mut conn)?
            .into_iter()
            .map(PermissionId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_permission_codes_for_email(&self, email: &str) -> RepositoryResult<Vec<String>> {
        use crate::schema::{group_permissions, permissions, user_groups, users};

        let mut conn = self.conn()?;
        let codes = users::table
            .inner_join(user_groups::table)
            .inner_join(
                group_permissions::table
                    .on(group_permissions::group_id.eq(user_groups::id)),
            )
            .inner_join(permissions::table.on(permissions::id.eq(group_permissions::permission_id)))
            .filter(users::email.eq(email.trim().to_lowercase()))
            .filter(users::active.eq(true))
            .filter(user_groups::active.eq(true))
            .select(permissions::code)
            .distinct()
            .order(permissions::code.asc())
            .load::<String>(&mut conn)?;
        Ok(codes)
    }
}

impl GroupPermissionWriter for DieselRepository {
    fn apply_permission_changes(
        &self,
        group_id: GroupId,
        changes: &PermissionChanges,
    ) -> RepositoryResult<()> {
        use crate::schema::group_permissions;

        if changes.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            if !changes.removed.is_empty() {
                let removed: Vec<i32> = changes.removed.iter().map(|id| id.get()).collect();
                diesel::delete(
                    group_permissions::table
                        .filter(group_permissions::group_id.eq(group_id.get()))
                        .filter(group_permissions::permission_id.eq_any(removed)),
                )
                .execute(conn)?;
            }

            if !changes.added.is_empty() {
                let rows: Vec<GroupPermission> = changes
                    .added
                    .iter()
                    .map(|id| GroupPermission {
                        group_id: group_id.get(),
                        permission_id: id.get(),
                    })
                    .collect();
                diesel::insert_or_ignore_into(group_permissions::table)
                    .values(&rows)
                    .execute(conn)?;
            }
            Ok(())
        })
    }
}
