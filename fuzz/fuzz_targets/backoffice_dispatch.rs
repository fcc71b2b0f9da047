#![no_main]

//! Feeds arbitrary JSON requests to the dispatcher as a permission-less
//! employee: every one must be refused without touching the store.

use libfuzzer_sys::fuzz_target;
use voyage_core::testing::Agency;
use voyage_core::{Request, Response};

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<Request>(data) else {
        return;
    };
    let Ok(mut agency) = Agency::new() else {
        return;
    };
    agency.seed_catalog();
    let Ok(token) = agency.login(agency.clerk) else {
        return;
    };
    let before = agency.office.store.clone();
    let response = agency.office.handle(Some(&token), &request);
    if matches!(request, Request::Dashboard) {
        return;
    }
    assert!(matches!(response, Ok(Response::Redirect(_))));
    assert_eq!(agency.office.store, before);
});
