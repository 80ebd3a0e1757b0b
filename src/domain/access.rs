use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::record::{Parented, Record, SoftDelete};
use crate::domain::types::{Email, GroupId, GroupName, PermissionId, PersonName, UserId};

/// Back-office operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: PersonName,
    pub group_id: Option<GroupId>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub name: PersonName,
    pub group_id: Option<GroupId>,
}

/// Partial update of a [`User`]. The active flag is only changed through
/// deactivation and reactivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub name: Option<PersonName>,
    pub group_id: Option<Option<GroupId>>,
}

impl Record for User {
    type Id = UserId;
    type New = NewUser;
    type Patch = UserPatch;

    const ENTITY: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(group_id) = patch.group_id {
            self.group_id = group_id;
        }
    }
}

impl SoftDelete for User {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Parented for User {
    type ParentId = GroupId;

    fn parent_id(&self) -> Option<GroupId> {
        self.group_id
    }
}

/// Permission group users belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: GroupName,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGroup {
    pub name: GroupName,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupPatch {
    pub name: Option<GroupName>,
    pub description: Option<Option<String>>,
}

impl Record for Group {
    type Id = GroupId;
    type New = NewGroup;
    type Patch = GroupPatch;

    const ENTITY: &'static str = "group";

    fn id(&self) -> GroupId {
        self.id
    }

    fn apply_patch(&mut self, patch: &GroupPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

impl SoftDelete for Group {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Seeded, read-only permission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub id: PermissionId,
    pub code: String,
    pub description: String,
}

/// Association rows to insert and delete for a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionChanges {
    pub added: Vec<PermissionId>,
    pub removed: Vec<PermissionId>,
}

impl PermissionChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Editing state of a group's permissions.
///
/// `initial` is what the Gateway returned when the editor opened; saving
/// persists only the difference with `selected`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSelection {
    initial: BTreeSet<PermissionId>,
    selected: BTreeSet<PermissionId>,
}

impl PermissionSelection {
    pub fn new(initial: impl IntoIterator<Item = PermissionId>) -> Self {
        let initial: BTreeSet<PermissionId> = initial.into_iter().collect();
        Self {
            selected: initial.clone(),
            initial,
        }
    }

    /// Flips one permission and returns whether it is now selected.
    pub fn toggle(&mut self, id: PermissionId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: PermissionId, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// Replaces the whole selection.
    pub fn select_only(&mut self, ids: impl IntoIterator<Item = PermissionId>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn is_selected(&self, id: PermissionId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> impl Iterator<Item = PermissionId> + '_ {
        self.selected.iter().copied()
    }

    pub fn changes(&self) -> PermissionChanges {
        PermissionChanges {
            added: self.selected.difference(&self.initial).copied().collect(),
            removed: self.initial.difference(&self.selected).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i32]) -> Vec<PermissionId> {
        raw.iter().map(|id| PermissionId::new(*id).unwrap()).collect()
    }

    #[test]
    fn toggling_reports_only_the_difference() {
        let mut selection = PermissionSelection::new(ids(&[1, 2]));
        assert!(!selection.toggle(PermissionId::new(1).unwrap()));
        assert!(selection.toggle(PermissionId::new(3).unwrap()));

        let changes = selection.changes();
        assert_eq!(changes.added, ids(&[3]));
        assert_eq!(changes.removed, ids(&[1]));
    }

    #[test]
    fn toggling_twice_is_a_no_op() {
        let mut selection = PermissionSelection::new(ids(&[1, 2]));
        selection.toggle(PermissionId::new(2).unwrap());
        selection.toggle(PermissionId::new(2).unwrap());
        assert!(selection.changes().is_empty());
    }
}
