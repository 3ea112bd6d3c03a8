//! Integration test: Controller rotation and revocation across crates.
//!
//! Exercises authorization, revocation monotonicity, controller
//! exclusivity, and the append-only document/audit history.

use std::sync::Arc;

use unum_anchor::{InMemoryLedger, LedgerSubmitter};
use unum_core::types::{Controller, Did, RevocationReason};
use unum_engine::{EnrollmentEngine, ErrorCategory};
use unum_integration_tests::{commitment, engine, engine_with};
use unum_registry::LedgerEvent;

async fn enrolled(engine: &EnrollmentEngine, seed: u8, controller: &str) -> Did {
    engine
        .enroll(&commitment(seed), "mainnet", Controller::new(controller))
        .await
        .expect("enrollment should succeed")
}

// =========================================================================
// Controller rotation
// =========================================================================

#[tokio::test]
async fn test_rotation_by_current_controller() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    let document = engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1aaa"), Controller::new("addr1bbb")],
        )
        .await
        .expect("rotation by a current controller");

    assert_eq!(document.controllers.len(), 2);
    let record = engine.identity(&did).unwrap();
    assert!(record.controllers.contains(&Controller::new("addr1bbb")));
}

#[tokio::test]
async fn test_rotation_by_stranger_rejected() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    let error = engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1stranger"),
            vec![Controller::new("addr1stranger")],
        )
        .await
        .expect_err("a stranger cannot rotate");
    assert_eq!(error.category(), ErrorCategory::Conflict);

    // No state change on rejection.
    let record = engine.identity(&did).unwrap();
    assert_eq!(record.controllers.len(), 1);
    assert!(record.controllers.contains(&Controller::new("addr1aaa")));
}

#[tokio::test]
async fn test_rotated_out_controller_loses_authority() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1bbb")],
        )
        .await
        .unwrap();

    // The old controller was replaced; it cannot act anymore.
    let error = engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1ccc")],
        )
        .await
        .expect_err("replaced controller has no authority");
    assert_eq!(error.category(), ErrorCategory::Conflict);

    // The new one can.
    engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1bbb"),
            vec![Controller::new("addr1bbb"), Controller::new("addr1ccc")],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rotation_cannot_take_controller_of_other_identity() {
    let engine = engine();
    let did_a = enrolled(&engine, 0x01, "addr1aaa").await;
    let _did_b = enrolled(&engine, 0x02, "addr1bbb").await;

    let error = engine
        .rotate_controllers(
            &did_a,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1aaa"), Controller::new("addr1bbb")],
        )
        .await
        .expect_err("addr1bbb belongs to another active identity");
    assert_eq!(error.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_rotation_appends_document_version() {
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = engine_with(Arc::clone(&ledger) as Arc<dyn LedgerSubmitter>);
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1bbb")],
        )
        .await
        .unwrap();

    // History never mutates: the enrollment document is still first and
    // unchanged, the rotation document follows it.
    let history = engine.document_history(&did);
    assert_eq!(history.len(), 2);
    assert!(history[0].controllers.contains(&Controller::new("addr1aaa")));
    assert!(history[1].controllers.contains(&Controller::new("addr1bbb")));
    assert_eq!(history[0].enrolled_at, history[1].enrolled_at);

    // Both documents were anchored.
    assert_eq!(ledger.documents(&did).len(), 2);
}

// =========================================================================
// Revocation
// =========================================================================

#[tokio::test]
async fn test_revoke_then_rotate_rejected() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .revoke_identity(&did, &Controller::new("addr1aaa"), RevocationReason::UserRequest)
        .await
        .expect("revocation by the controller");

    let error = engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1bbb")],
        )
        .await
        .expect_err("no transition leaves Revoked");
    assert_eq!(error.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_revoke_twice_rejected() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .revoke_identity(&did, &Controller::new("addr1aaa"), RevocationReason::UserRequest)
        .await
        .unwrap();

    let error = engine
        .revoke_identity(&did, &Controller::new("addr1aaa"), RevocationReason::UserRequest)
        .await
        .expect_err("revocation is terminal");
    assert_eq!(error.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_revoke_by_stranger_rejected() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    let error = engine
        .revoke_identity(
            &did,
            &Controller::new("addr1stranger"),
            RevocationReason::UserRequest,
        )
        .await
        .expect_err("a stranger cannot revoke");
    assert_eq!(error.category(), ErrorCategory::Conflict);

    let record = engine.identity(&did).unwrap();
    assert!(record.revoked_at.is_none());
}

#[tokio::test]
async fn test_revoke_unknown_identity() {
    let engine = engine();
    let ghost = Did::from_parts(unum_core::types::Network::Mainnet, "zGhost");

    let error = engine
        .revoke_identity(&ghost, &Controller::new("addr1aaa"), RevocationReason::UserRequest)
        .await
        .expect_err("nothing to revoke");
    assert_eq!(error.category(), ErrorCategory::Input);
}

#[tokio::test]
async fn test_revocation_document_carries_revoked_at() {
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = engine_with(Arc::clone(&ledger) as Arc<dyn LedgerSubmitter>);
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    let record = engine
        .revoke_identity(
            &did,
            &Controller::new("addr1aaa"),
            RevocationReason::RightToErasure,
        )
        .await
        .unwrap();

    assert!(record.document.is_revoked());
    assert_eq!(record.document.revoked_at, Some(record.revoked_at));

    // Latest anchored document is the revocation; history is intact.
    let anchored = ledger.latest(&did).unwrap();
    assert!(anchored.is_revoked());
    assert_eq!(engine.document_history(&did).len(), 2);
}

#[tokio::test]
async fn test_revocation_keeps_the_did_and_its_history() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .revoke_identity(
            &did,
            &Controller::new("addr1aaa"),
            RevocationReason::RightToErasure,
        )
        .await
        .unwrap();

    // Logical revocation: the record and its audit trail survive.
    let record = engine.identity(&did).expect("record is never deleted");
    assert!(record.revoked_at.is_some());
    assert!(!engine.ledger_history(&did).is_empty());

    // And the commitment can never enroll again.
    let error = engine
        .enroll(&commitment(0x42), "mainnet", Controller::new("addr1new"))
        .await
        .expect_err("revocation does not reopen the uniqueness slot");
    assert_eq!(error.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn test_revocation_frees_controllers() {
    let engine = engine();
    let did_a = enrolled(&engine, 0x01, "addr1shared").await;

    engine
        .revoke_identity(
            &did_a,
            &Controller::new("addr1shared"),
            RevocationReason::KeyCompromise,
        )
        .await
        .unwrap();

    // The controller is no longer bound to an active identity, so a
    // different person can enroll with it.
    let did_b = enrolled(&engine, 0x02, "addr1shared").await;
    assert_ne!(did_a, did_b);
}

// =========================================================================
// Audit history
// =========================================================================

#[tokio::test]
async fn test_audit_trail_orders_events() {
    let engine = engine();
    let did = enrolled(&engine, 0x42, "addr1aaa").await;

    engine
        .rotate_controllers(
            &did,
            &Controller::new("addr1aaa"),
            vec![Controller::new("addr1aaa"), Controller::new("addr1bbb")],
        )
        .await
        .unwrap();
    engine
        .revoke_identity(&did, &Controller::new("addr1bbb"), RevocationReason::UserRequest)
        .await
        .unwrap();

    let events = engine.ledger_history(&did);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], LedgerEvent::ControllersRotated { .. }));
    assert!(matches!(events[1], LedgerEvent::Revoked { .. }));

    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("ControllersRotated"));
    assert!(json.contains("Revoked"));
}
