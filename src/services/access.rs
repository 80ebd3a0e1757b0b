//! User, group and permission administration.

use serde::Serialize;

use crate::domain::access::{Group, Permission, PermissionChanges, PermissionSelection};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::record::SoftDelete;
use crate::domain::types::{GroupId, PermissionId};
use crate::filters::Confirmation;
use crate::forms::access::GroupPermissionsForm;
use crate::repository::{
    GroupPermissionReader, GroupPermissionWriter, RecordDeactivator, RecordReader,
};
use crate::services::records::{get_record, require_confirmation};
use crate::services::{
    AccessControlled, ServiceResult, authorize, repository_failure, store_failure,
};
use crate::store::EntityStore;

/// Marks a user or group inactive. Groups with active members are refused.
pub fn deactivate_record<R, G>(
    user: &AuthenticatedUser,
    repo: &G,
    id: R::Id,
    confirmation: Confirmation,
) -> ServiceResult<R>
where
    R: SoftDelete + AccessControlled,
    G: RecordDeactivator<R>,
{
    authorize(user, R::PERMISSION)?;
    require_confirmation(confirmation)?;

    let mut store = EntityStore::<R>::new();
    let record = store
        .deactivate(repo, id)
        .map_err(|e| store_failure("deactivate", R::ENTITY, e))?;
    log::info!("Deactivated {} {id}", R::ENTITY);
    Ok(record)
}

pub fn reactivate_record<R, G>(user: &AuthenticatedUser, repo: &G, id: R::Id) -> ServiceResult<R>
where
    R: SoftDelete + AccessControlled,
    G: RecordDeactivator<R>,
{
    authorize(user, R::PERMISSION)?;

    let mut store = EntityStore::<R>::new();
    let record = store
        .reactivate(repo, id)
        .map_err(|e| store_failure("reactivate", R::ENTITY, e))?;
    log::info!("Reactivated {} {id}", R::ENTITY);
    Ok(record)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PermissionOption {
    #[serde(flatten)]
    pub permission: Permission,
    pub selected: bool,
}

/// A group together with every permission and whether the group holds it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupPermissions {
    pub group: Group,
    pub permissions: Vec<PermissionOption>,
}

fn load_selection<R>(repo: &R, group_id: GroupId) -> ServiceResult<PermissionSelection>
where
    R: GroupPermissionReader,
{
    repo.list_group_permissions(group_id)
        .map(PermissionSelection::new)
        .map_err(|e| repository_failure("list", "group permissions", e))
}

fn load_permissions<R>(repo: &R) -> ServiceResult<Vec<Permission>>
where
    R: GroupPermissionReader,
{
    repo.list_permissions()
        .map_err(|e| repository_failure("list", "permissions", e))
}

pub fn show_group_permissions<R>(
    user: &AuthenticatedUser,
    repo: &R,
    group_id: GroupId,
) -> ServiceResult<GroupPermissions>
where
    R: RecordReader<Group> + GroupPermissionReader,
{
    let group = get_record::<Group, R>(user, repo, group_id)?;
    let selection = load_selection(repo, group_id)?;
    let permissions = load_permissions(repo)?
        .into_iter()
        .map(|permission| PermissionOption {
            selected: selection.is_selected(permission.id),
            permission,
        })
        .collect();

    Ok(GroupPermissions { group, permissions })
}

/// Replaces a group's permissions, persisting only the difference with
/// what it held before.
pub fn save_group_permissions<R>(
    user: &AuthenticatedUser,
    repo: &R,
    group_id: GroupId,
    form: GroupPermissionsForm,
) -> ServiceResult<PermissionChanges>
where
    R: RecordReader<Group> + GroupPermissionReader + GroupPermissionWriter,
{
    get_record::<Group, R>(user, repo, group_id)?;

    let mut selection = load_selection(repo, group_id)?;
    let known: Vec<PermissionId> = load_permissions(repo)?.iter().map(|p| p.id).collect();
    let requested = form.into_selection(&known)?;
    selection.select_only(requested);

    let changes = selection.changes();
    if changes.is_empty() {
        return Ok(changes);
    }
    repo.apply_permission_changes(group_id, &changes)
        .map_err(|e| repository_failure("save", "group permissions", e))?;
    log::info!(
        "Group {group_id} permissions: {} added, {} removed",
        changes.added.len(),
        changes.removed.len()
    );
    Ok(changes)
}

/// Adds the permission codes of the user's active group to the roles
/// carried by the token.
pub fn resolve_permissions<R>(
    repo: &R,
    mut user: AuthenticatedUser,
) -> ServiceResult<AuthenticatedUser>
where
    R: GroupPermissionReader,
{
    let codes = repo
        .list_permission_codes_for_email(&user.email)
        .map_err(|e| repository_failure("resolve", "permissions", e))?;
    for code in codes {
        if !user.roles.contains(&code) {
            user.roles.push(code);
        }
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::{NewGroup, NewUser, User};
    use crate::domain::types::{Email, GroupName, PersonName};
    use crate::repository::test::TestRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::user_with;

    fn group(repo: &TestRepository, name: &str) -> Group {
        repo.seed::<Group>(&NewGroup {
            name: GroupName::new(name).unwrap(),
            description: None,
        })
    }

    fn member(repo: &TestRepository, email: &str, group_id: GroupId) -> User {
        repo.seed::<User>(&NewUser {
            email: Email::new(email).unwrap(),
            name: PersonName::new("Bia").unwrap(),
            group_id: Some(group_id),
        })
    }

    fn ids(raw: &[i32]) -> Vec<PermissionId> {
        raw.iter().map(|id| PermissionId::new(*id).unwrap()).collect()
    }

    #[test]
    fn saving_persists_only_the_difference() {
        let repo = TestRepository::with_permissions();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Bilheteria");

        let changes = save_group_permissions(
            &admin,
            &repo,
            crew.id,
            GroupPermissionsForm {
                permission_ids: vec![3, 5, 6],
            },
        )
        .unwrap();
        assert_eq!(changes.added, ids(&[3, 5, 6]));
        assert_eq!(repo.group_permission_rows(crew.id), ids(&[3, 5, 6]));

        let changes = save_group_permissions(
            &admin,
            &repo,
            crew.id,
            GroupPermissionsForm {
                permission_ids: vec![5, 6, 2],
            },
        )
        .unwrap();
        assert_eq!(changes.added, ids(&[2]));
        assert_eq!(changes.removed, ids(&[3]));
        assert_eq!(repo.group_permission_rows(crew.id), ids(&[2, 5, 6]));
    }

    #[test]
    fn unchanged_selection_skips_the_write() {
        let repo = TestRepository::with_permissions();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Bilheteria");
        let form = GroupPermissionsForm {
            permission_ids: vec![6],
        };
        save_group_permissions(&admin, &repo, crew.id, form.clone()).unwrap();

        let before = repo.calls();
        let changes = save_group_permissions(&admin, &repo, crew.id, form).unwrap();
        assert!(changes.is_empty());
        // group lookup, association listing and permission listing only
        assert_eq!(repo.calls(), before + 3);
    }

    #[test]
    fn show_marks_held_permissions() {
        let repo = TestRepository::with_permissions();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Financeiro");
        save_group_permissions(
            &admin,
            &repo,
            crew.id,
            GroupPermissionsForm {
                permission_ids: vec![3],
            },
        )
        .unwrap();

        let shown = show_group_permissions(&admin, &repo, crew.id).unwrap();
        let selected: Vec<&str> = shown
            .permissions
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.permission.code.as_str())
            .collect();
        assert_eq!(selected, vec!["finance"]);
        assert_eq!(shown.permissions.len(), 6);
    }

    #[test]
    fn group_with_active_members_is_not_deactivated() {
        let repo = TestRepository::with_permissions();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Bilheteria");
        let bia = member(&repo, "bia@arena.com", crew.id);

        let err = deactivate_record::<Group, _>(&admin, &repo, crew.id, Confirmation::confirmed())
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict(message) if message.contains("active members")
        ));

        deactivate_record::<User, _>(&admin, &repo, bia.id, Confirmation::confirmed()).unwrap();
        let group = deactivate_record::<Group, _>(&admin, &repo, crew.id, Confirmation::confirmed())
            .unwrap();
        assert!(!group.active);

        let group = reactivate_record::<Group, _>(&admin, &repo, crew.id).unwrap();
        assert!(group.active);
    }

    #[test]
    fn deactivation_requires_confirmation() {
        let repo = TestRepository::new();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Bilheteria");
        let err = deactivate_record::<Group, _>(&admin, &repo, crew.id, Confirmation::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Form(_)));
        assert_eq!(repo.calls(), 0);
    }

    #[test]
    fn group_codes_extend_token_roles() {
        let repo = TestRepository::with_permissions();
        let admin = user_with(&["admin"]);
        let crew = group(&repo, "Bilheteria");
        member(&repo, "ana@arena.com", crew.id);
        save_group_permissions(
            &admin,
            &repo,
            crew.id,
            GroupPermissionsForm {
                permission_ids: vec![3, 6],
            },
        )
        .unwrap();

        let user = resolve_permissions(&repo, user_with(&["tickets"])).unwrap();
        assert_eq!(user.roles, vec!["tickets".to_string(), "finance".to_string()]);
        assert!(!user.has_role("admin"));
    }

    #[test]
    fn only_admins_edit_permissions() {
        let repo = TestRepository::with_permissions();
        let crew = group(&repo, "Bilheteria");
        let err = save_group_permissions(
            &user_with(&["finance"]),
            &repo,
            crew.id,
            GroupPermissionsForm::default(),
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized);
    }
}
