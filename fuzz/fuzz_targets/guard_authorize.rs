#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voyage_core::{authorize, Action, Anonymous, Decision, PermissionId, PermissionSet, RecordId, ResourceKind, User};

#[derive(Debug, Arbitrary)]
struct Input {
    authenticated: bool,
    superuser: bool,
    granted: Vec<(u8, u8)>,
    required: Option<(u8, u8)>,
}

fn permission((action, resource): (u8, u8)) -> PermissionId {
    PermissionId::new(
        Action::ALL[action as usize % Action::ALL.len()],
        ResourceKind::ALL[resource as usize % ResourceKind::ALL.len()],
    )
}

fuzz_target!(|input: Input| {
    let required = input.required.map(permission);
    if !input.authenticated {
        assert_eq!(authorize(&Anonymous, required.as_ref()), Decision::RedirectToLogin);
        return;
    }
    let permissions: PermissionSet = input.granted.iter().copied().map(permission).collect();
    let user = User {
        id: RecordId(1),
        email: "fuzz@agency.test".into(),
        superuser: input.superuser,
        permissions,
    };
    let decision = authorize(&user, required.as_ref());
    assert_ne!(decision, Decision::RedirectToLogin);
    let expected = input.superuser || required.map(|p| user.permissions.contains(&p)).unwrap_or(true);
    assert_eq!(decision.is_proceed(), expected);
});
