//! Purchase gating scenarios.

use clicker_core::data::{UpgradeId, WorkerId};
use clicker_core::error::GameError;
use clicker_core::math::Bytes;
use clicker_test_utils::fixtures::{bytes, state_with_bytes};

#[test]
fn test_cannot_buy_when_short() {
    let mut state = state_with_bytes(100);
    // Mechanical keyboards cost 512.
    let err = state.buy_upgrade(UpgradeId::MechanicalKeyboards).unwrap_err();
    assert!(matches!(err, GameError::InsufficientBytes { .. }));
    assert_eq!(state.bytes(), &bytes(100));
    assert_eq!(state.upgrade_count(UpgradeId::MechanicalKeyboards), 0);
}

#[test]
fn test_purchase_deducts_exact_cost() {
    let mut state = state_with_bytes(600);
    let paid = state.buy_upgrade(UpgradeId::MechanicalKeyboards).unwrap();
    assert_eq!(paid, bytes(512));
    assert_eq!(state.bytes(), &bytes(88));
    assert_eq!(state.upgrade_count(UpgradeId::MechanicalKeyboards), 1);
}

#[test]
fn test_worker_price_sequence() {
    let mut state = state_with_bytes(10 + 12 + 14 + 17);
    for expected in [10u32, 12, 14, 17] {
        assert_eq!(state.buy_worker(WorkerId::Intern).unwrap(), Bytes::from(expected));
    }
    assert_eq!(state.worker_count(WorkerId::Intern), 4);
    assert_eq!(state.bytes(), &bytes(0));
    assert!(state.buy_worker(WorkerId::Intern).is_err());
}

#[test]
fn test_rate_tracks_every_purchase() {
    let mut state = state_with_bytes(1_000_000);
    state.buy_worker(WorkerId::Intern).unwrap();
    state.buy_worker(WorkerId::JuniorDev).unwrap();
    assert_eq!(state.rate(), &bytes(17));
    state.buy_upgrade(UpgradeId::FreePizza).unwrap();
    assert_eq!(state.rate(), &bytes(18));
    state.buy_upgrade(UpgradeId::PairProgramming).unwrap();
    assert_eq!(state.rate(), &bytes(34));
}
