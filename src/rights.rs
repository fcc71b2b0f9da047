//!
//! Action-mask algebra.
//! A permission set stores, per resource kind, a small bit mask of the CRUD
//! actions granted on it. This module defines the bits and the helpers that
//! combine and test them.

use crate::types::Action;

/// Bit mask over the four CRUD actions. Bits 4-7 are unused and always zero.
pub type ActionMask = u8;

/// Action bit flags.
pub mod core {
    use super::ActionMask;

    /// Permission to list and search records.
    pub const VIEW: ActionMask = 1 << 0;
    /// Permission to create records.
    pub const ADD: ActionMask = 1 << 1;
    /// Permission to edit existing records.
    pub const CHANGE: ActionMask = 1 << 2;
    /// Permission to remove records.
    pub const DELETE: ActionMask = 1 << 3;

    pub const ALL: ActionMask = VIEW | ADD | CHANGE | DELETE;
}

/// Returns the bit for a single action.
#[inline]
pub fn bit(action: Action) -> ActionMask {
    match action {
        Action::View => core::VIEW,
        Action::Add => core::ADD,
        Action::Change => core::CHANGE,
        Action::Delete => core::DELETE,
    }
}

/// Builds a mask from a list of actions.
pub fn mask_of(actions: &[Action]) -> ActionMask {
    actions.iter().fold(0, |m, a| m | bit(*a))
}

/// Lists the actions set in `mask`, in catalog order.
pub fn actions_in(mask: ActionMask) -> impl Iterator<Item = Action> {
    Action::ALL.into_iter().filter(move |a| mask & bit(*a) != 0)
}

/// Checks if `have` grants every action in `need`: `(have & need) == need`.
///
/// Actions do not imply one another: holding `CHANGE` does not grant `VIEW`.
#[inline]
pub fn sufficient(have: ActionMask, need: ActionMask) -> bool {
    (have & need) == need
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sufficient_basic() {
        assert!(sufficient(core::VIEW, core::VIEW));
        assert!(!sufficient(0, core::VIEW));
        assert!(sufficient(core::ALL, core::DELETE));
        assert!(sufficient(core::VIEW | core::ADD, core::ADD));
    }

    #[test]
    fn test_no_implied_actions() {
        assert!(!sufficient(core::CHANGE, core::VIEW));
        assert!(!sufficient(core::DELETE, core::CHANGE));
        assert!(!sufficient(core::VIEW, core::VIEW | core::ADD));
    }

    #[test]
    fn test_mask_of_and_actions_in() {
        let mask = mask_of(&[Action::View, Action::Delete]);
        assert_eq!(mask, core::VIEW | core::DELETE);
        assert_eq!(actions_in(mask).collect::<Vec<_>>(), vec![Action::View, Action::Delete]);
        assert_eq!(actions_in(0).count(), 0);
        assert_eq!(actions_in(core::ALL).count(), 4);
    }
}
