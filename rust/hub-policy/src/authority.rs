//! Structural rights of the current user over an entity.
//!
//! These back the `entityOwner`, `entityEdit`, `entityDelete` and
//! `entityConfigurable` flags of a [`PermissionPolicy`].

use std::fmt::{Display, Formatter};

use crate::{CurrentUser, Entity, ItemControl, PermissionPolicy};

/// A right a permission rule may require over its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRight {
    Owner,
    Edit,
    Delete,
    Configurable,
}

impl EntityRight {
    /// Whether `user` holds this right over `entity`.
    ///
    /// - `Edit`: admin or update item control, ownership, org admin of the
    ///   entity's org, or membership in an update-capable group the entity is
    ///   shared with.
    /// - `Owner` and `Delete`: ownership or admin item control.
    /// - `Configurable`: ownership or org admin of the entity's org.
    pub fn is_held_by(&self, user: &CurrentUser, entity: &Entity) -> bool {
        let owner = entity.is_owned_by(&user.username);
        match self {
            EntityRight::Owner | EntityRight::Delete => {
                owner || entity.item_control == Some(ItemControl::Admin)
            }
            EntityRight::Edit => {
                owner
                    || entity.item_control.is_some()
                    || user.is_org_admin_of(entity.org_id.as_deref())
                    || user.groups.iter().any(|group| {
                        group.can_update_items() && entity.is_associated_with_group(&group.id)
                    })
            }
            EntityRight::Configurable => {
                owner || user.is_org_admin_of(entity.org_id.as_deref())
            }
        }
    }
}

impl Display for EntityRight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityRight::Owner => "own",
            EntityRight::Edit => "edit",
            EntityRight::Delete => "delete",
            EntityRight::Configurable => "configure",
        })
    }
}

impl PermissionPolicy {
    /// Rights this policy requires, in checking order.
    pub fn required_rights(&self) -> impl Iterator<Item = EntityRight> {
        [
            (self.entity_owner, EntityRight::Owner),
            (self.entity_edit, EntityRight::Edit),
            (self.entity_delete, EntityRight::Delete),
            (self.entity_configurable, EntityRight::Configurable),
        ]
        .into_iter()
        .filter_map(|(required, right)| required.then_some(right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityType, OrgRole, UPDATE_ITEM_CONTROL, UserGroup};

    fn entity() -> Entity {
        Entity::new("p-1", EntityType::HubProject, "owner")
            .with_org("org-1")
            .with_group("shared")
            .with_collaboration_group("collab")
    }

    fn user() -> CurrentUser {
        CurrentUser::new("someone").with_org("org-1")
    }

    #[test]
    fn it_grants_every_right_to_the_owner() {
        let owner = CurrentUser::new("owner");
        for right in [
            EntityRight::Owner,
            EntityRight::Edit,
            EntityRight::Delete,
            EntityRight::Configurable,
        ] {
            assert!(right.is_held_by(&owner, &entity()), "{right}");
        }
    }

    #[test]
    fn it_scopes_update_control_to_edit() {
        let entity = entity().with_item_control(ItemControl::Update);
        assert!(EntityRight::Edit.is_held_by(&user(), &entity));
        assert!(!EntityRight::Delete.is_held_by(&user(), &entity));
        assert!(!EntityRight::Owner.is_held_by(&user(), &entity));
    }

    #[test]
    fn it_lets_admin_control_delete() {
        let entity = entity().with_item_control(ItemControl::Admin);
        assert!(EntityRight::Delete.is_held_by(&user(), &entity));
        assert!(EntityRight::Owner.is_held_by(&user(), &entity));
        assert!(!EntityRight::Configurable.is_held_by(&user(), &entity));
    }

    #[test]
    fn it_lets_org_admins_edit_and_configure_within_their_org() {
        let admin = user().with_role(OrgRole::OrgAdmin);
        assert!(EntityRight::Edit.is_held_by(&admin, &entity()));
        assert!(EntityRight::Configurable.is_held_by(&admin, &entity()));
        assert!(!EntityRight::Delete.is_held_by(&admin, &entity()));

        let foreign = CurrentUser::new("admin")
            .with_org("org-2")
            .with_role(OrgRole::OrgAdmin);
        assert!(!EntityRight::Edit.is_held_by(&foreign, &entity()));
    }

    #[test]
    fn it_requires_update_capable_associated_groups() {
        let plain_member = user().with_group(UserGroup::new("shared"));
        assert!(!EntityRight::Edit.is_held_by(&plain_member, &entity()));

        let shared =
            user().with_group(UserGroup::new("shared").with_capability(UPDATE_ITEM_CONTROL));
        assert!(EntityRight::Edit.is_held_by(&shared, &entity()));

        let collaborator =
            user().with_group(UserGroup::new("collab").with_capability(UPDATE_ITEM_CONTROL));
        assert!(EntityRight::Edit.is_held_by(&collaborator, &entity()));
        assert!(!EntityRight::Delete.is_held_by(&collaborator, &entity()));

        let unrelated =
            user().with_group(UserGroup::new("elsewhere").with_capability(UPDATE_ITEM_CONTROL));
        assert!(!EntityRight::Edit.is_held_by(&unrelated, &entity()));
    }

    #[test]
    fn it_lists_required_rights_in_order() {
        let policy = PermissionPolicy::new("x").requires_configurable().requires_edit();
        assert_eq!(
            policy.required_rights().collect::<Vec<_>>(),
            vec![EntityRight::Edit, EntityRight::Configurable]
        );
    }
}
