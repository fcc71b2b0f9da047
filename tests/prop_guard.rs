use proptest::prelude::*;
use voyage_core::access::authorize_resolved;
use voyage_core::{authorize, Action, Anonymous, AuthError, Decision, PermissionId, PermissionSet, RecordId, ResourceKind, User};

fn any_permission() -> impl Strategy<Value = PermissionId> {
    (
        prop::sample::select(Action::ALL.to_vec()),
        prop::sample::select(ResourceKind::ALL.to_vec()),
    )
        .prop_map(|(a, r)| PermissionId::new(a, r))
}

fn any_user() -> impl Strategy<Value = User> {
    (any::<bool>(), prop::collection::vec(any_permission(), 0..16)).prop_map(|(superuser, perms)| User {
        id: RecordId(1),
        email: "prop@agency.test".into(),
        superuser,
        permissions: perms.into_iter().collect::<PermissionSet>(),
    })
}

proptest! {
    /// Unauthenticated callers are always sent to login, whatever the requirement.
    #[test]
    fn prop_anonymous_always_login(required in prop::option::of(any_permission())) {
        prop_assert_eq!(authorize(&Anonymous, required.as_ref()), Decision::RedirectToLogin);
    }

    /// Superusers always proceed.
    #[test]
    fn prop_superuser_always_proceeds(mut user in any_user(), required in prop::option::of(any_permission())) {
        user.superuser = true;
        prop_assert_eq!(authorize(&user, required.as_ref()), Decision::Proceed);
    }

    /// Authenticated users never see the login redirect, and proceed exactly
    /// when they are superuser, the operation is open, or they hold the permission.
    #[test]
    fn prop_decision_table(user in any_user(), required in prop::option::of(any_permission())) {
        let expected = match &required {
            _ if user.superuser => Decision::Proceed,
            None => Decision::Proceed,
            Some(p) if user.permissions.contains(p) => Decision::Proceed,
            Some(_) => Decision::RedirectToDenied,
        };
        prop_assert_eq!(authorize(&user, required.as_ref()), expected);
    }

    /// The decision depends only on the inputs.
    #[test]
    fn prop_deterministic(user in any_user(), required in prop::option::of(any_permission())) {
        prop_assert_eq!(authorize(&user, required.as_ref()), authorize(&user, required.as_ref()));
    }

    /// A failed resolution behaves like an anonymous caller.
    #[test]
    fn prop_resolution_failure_is_login(required in prop::option::of(any_permission())) {
        let err = AuthError::UnknownSession;
        prop_assert_eq!(
            authorize_resolved::<User>(Err(&err), required.as_ref()),
            Decision::RedirectToLogin
        );
    }
}
