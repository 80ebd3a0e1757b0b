use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::access::{
    Group as DomainGroup, GroupPatch as DomainGroupPatch, NewGroup as DomainNewGroup,
    NewUser as DomainNewUser, Permission as DomainPermission, User as DomainUser,
    UserPatch as DomainUserPatch,
};
use crate::domain::types::{Email, GroupId, GroupName, PersonName, TypeConstraintError};
use crate::models::touch;

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub group_id: Option<i32>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub group_id: Option<i32>,
    pub active: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangeset {
    pub email: Option<String>,
    pub name: Option<String>,
    pub group_id: Option<Option<i32>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.try_into()?,
            email: Email::new(user.email)?,
            name: PersonName::new(user.name)?,
            group_id: user.group_id.map(GroupId::new).transpose()?,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl From<&DomainNewUser> for NewUser {
    fn from(user: &DomainNewUser) -> Self {
        Self {
            email: user.email.to_string(),
            name: user.name.to_string(),
            group_id: user.group_id.map(GroupId::get),
            active: true,
        }
    }
}

impl From<&DomainUserPatch> for UserChangeset {
    fn from(patch: &DomainUserPatch) -> Self {
        Self {
            email: patch.email.as_ref().map(ToString::to_string),
            name: patch.name.as_ref().map(ToString::to_string),
            group_id: patch.group_id.map(|id| id.map(GroupId::get)),
            updated_at: touch(),
        }
    }
}

/// Diesel model representing the `user_groups` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::user_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::user_groups)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::user_groups)]
pub struct GroupChangeset {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Group> for DomainGroup {
    type Error = TypeConstraintError;

    fn try_from(group: Group) -> Result<Self, Self::Error> {
        Ok(Self {
            id: group.id.try_into()?,
            name: GroupName::new(group.name)?,
            description: group.description,
            active: group.active,
            created_at: group.created_at,
            updated_at: group.updated_at,
        })
    }
}

impl From<&DomainNewGroup> for NewGroup {
    fn from(group: &DomainNewGroup) -> Self {
        Self {
            name: group.name.to_string(),
            description: group.description.clone(),
            active: true,
        }
    }
}

impl From<&DomainGroupPatch> for GroupChangeset {
    fn from(patch: &DomainGroupPatch) -> Self {
        Self {
            name: patch.name.as_ref().map(ToString::to_string),
            description: patch.description.clone(),
            updated_at: touch(),
        }
    }
}

/// Diesel model representing the `permissions` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::permissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Permission {
    pub id: i32,
    pub code: String,
    pub description: String,
}

impl TryFrom<Permission> for DomainPermission {
    type Error = TypeConstraintError;

    fn try_from(permission: Permission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: permission.id.try_into()?,
            code: permission.code,
            description: permission.description,
        })
    }
}

/// Row of the `group_permissions` association table.
#[derive(Debug, Clone, Copy, Insertable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::group_permissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GroupPermission {
    pub group_id: i32,
    pub permission_id: i32,
}
