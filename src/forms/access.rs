//! Forms for users, groups and group permissions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::access::{Group, GroupPatch, NewGroup, NewUser, User, UserPatch};
use crate::domain::types::{Email, GroupId, GroupName, PermissionId, PersonName};
use crate::forms::{FieldCheck, FormError, RelationChoice, blank_to_none, record_form};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UserForm {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub group_id: RelationChoice,
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            name: user.name.to_string(),
            group_id: RelationChoice::from_optional(user.group_id),
        }
    }
}

impl UserForm {
    pub fn into_new(self) -> Result<NewUser, FormError> {
        let mut check = FieldCheck::validate(&self);
        let email = check.take("email", Email::new(&self.email));
        let name = check.take("name", PersonName::new(&self.name));
        let group_id = check.take("group_id", self.group_id.optional(GroupId::new));
        let (Some(email), Some(name), Some(group_id)) = (email, name, group_id) else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewUser {
            email,
            name,
            group_id,
        })
    }

    pub fn into_patch(self) -> Result<UserPatch, FormError> {
        let new = self.into_new()?;
        Ok(UserPatch {
            email: Some(new.email),
            name: Some(new.name),
            group_id: Some(new.group_id),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct GroupForm {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub description: Option<String>,
}

impl From<&Group> for GroupForm {
    fn from(group: &Group) -> Self {
        Self {
            name: group.name.to_string(),
            description: group.description.clone(),
        }
    }
}

impl GroupForm {
    pub fn into_new(self) -> Result<NewGroup, FormError> {
        let mut check = FieldCheck::validate(&self);
        let Some(name) = check.take("name", GroupName::new(&self.name)) else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewGroup {
            name,
            description: blank_to_none(self.description.as_deref()),
        })
    }

    pub fn into_patch(self) -> Result<GroupPatch, FormError> {
        let new = self.into_new()?;
        Ok(GroupPatch {
            name: Some(new.name),
            description: Some(new.description),
        })
    }
}

/// Full set of permissions the group should end up with.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct GroupPermissionsForm {
    #[serde(default)]
    pub permission_ids: Vec<i32>,
}

impl GroupPermissionsForm {
    /// Checks every id against the seeded registry.
    pub fn into_selection(self, known: &[PermissionId]) -> Result<Vec<PermissionId>, FormError> {
        let mut check = FieldCheck::validate(&self);
        let mut selected = Vec::with_capacity(self.permission_ids.len());
        for raw in self.permission_ids {
            match PermissionId::new(raw) {
                Ok(id) if known.contains(&id) => selected.push(id),
                _ => check.push("permission_ids", format!("unknown permission: {raw}")),
            }
        }
        check.finish()?;
        Ok(selected)
    }
}

record_form!(UserForm => User);
record_form!(GroupForm => Group);
