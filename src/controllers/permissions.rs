//! Permission gate - Azioni CRUD consentite su una risorsa

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four actions a controller can gate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudAction {
    pub const ALL: [CrudAction; 4] = [
        CrudAction::Create,
        CrudAction::Read,
        CrudAction::Update,
        CrudAction::Delete,
    ];

    fn bit(self) -> u8 {
        match self {
            CrudAction::Create => 1 << 0,
            CrudAction::Read => 1 << 1,
            CrudAction::Update => 1 << 2,
            CrudAction::Delete => 1 << 3,
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrudAction::Create => "Create",
            CrudAction::Read => "Read",
            CrudAction::Update => "Update",
            CrudAction::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Immutable set of [`CrudAction`]s allowed on one resource.
///
/// Fixed when the controller is built; the default allows everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet {
    bits: u8,
}

impl PermissionSet {
    pub fn all() -> Self {
        Self::only(CrudAction::ALL)
    }

    /// Allows exactly the given actions (an empty list forbids everything)
    pub fn only(actions: impl IntoIterator<Item = CrudAction>) -> Self {
        let bits = actions
            .into_iter()
            .fold(0u8, |bits, action| bits | action.bit());
        Self { bits }
    }

    pub fn allows(&self, action: CrudAction) -> bool {
        self.bits & action.bit() != 0
    }

    /// Allowed actions, in declaration order
    pub fn actions(&self) -> impl Iterator<Item = CrudAction> + '_ {
        CrudAction::ALL
            .into_iter()
            .filter(move |action| self.allows(*action))
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::all()
    }
}
