//! Traits shared by every persisted record family.
//!
//! The Entity Store, the repository traits and the generic services are all
//! written against these traits so that a new record family only has to
//! describe its identity and its create/patch shapes.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A persisted entity with an immutable identity.
pub trait Record: Clone + Debug {
    /// Identity assigned by the Gateway on insert.
    type Id: Copy + Eq + Hash + Debug + Display;
    /// Shape sent on insert. Carries no id and no audit timestamps.
    type New: Clone + Debug;
    /// Partial shape sent on update. `None` fields are left untouched.
    type Patch: Clone + Debug + Default;

    /// Singular name used in log lines and error messages.
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    /// Merge `patch` over `self`, leaving identity and audit fields alone.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Records that are deactivated instead of deleted.
pub trait SoftDelete: Record {
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

/// Records owned by a parent record through a foreign key.
pub trait Parented: Record {
    type ParentId: Copy + Eq + Debug;

    fn parent_id(&self) -> Option<Self::ParentId>;
}
