//! End-to-end session behaviour against an in-memory store and a recording
//! sink.

use std::sync::Arc;

use clicker_core::data::WorkerId;
use clicker_core::identity::Identity;
use clicker_core::persistence::{MemoryStore, StoreEvent};
use clicker_game::scroll::ListCursor;
use clicker_game::state::{Focus, Screen};
use clicker_game::terminal::{MemorySink, MAX_HEIGHT, MAX_WIDTH};
use clicker_game::{Farewell, InputOutcome, Session, SessionConfig, SessionError, SessionId};
use clicker_test_utils::fixtures::{bytes, player};

const MEDIUM: (u16, u16) = (100, 30);
const SMALL: (u16, u16) = (60, 23);

struct Harness {
    store: Arc<MemoryStore>,
    sink: MemorySink,
    session: Session,
}

impl Harness {
    fn new(identity: Identity, size: (u16, u16)) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_store(store, identity, size)
    }

    fn with_store(store: Arc<MemoryStore>, identity: Identity, size: (u16, u16)) -> Self {
        let sink = MemorySink::new();
        let mut session = Session::new(
            SessionId(7),
            identity,
            store.clone(),
            Box::new(sink.clone()),
            size,
            SessionConfig::default(),
        );
        session.init().unwrap();
        Self { store, sink, session }
    }

    fn key(&self) -> String {
        self.session.identity().storage_key().to_string()
    }

    fn press(&mut self, keys: &str) -> InputOutcome {
        self.session.feed_input_at(keys.as_bytes(), 0)
    }

    fn game(&self) -> &clicker_game::controls::Game {
        self.session.game().unwrap()
    }

    fn game_mut(&mut self) -> &mut clicker_game::controls::Game {
        self.session.game_mut().unwrap()
    }
}

#[test]
fn test_purchase_requires_bytes() {
    let mut h = Harness::new(player("alice"), MEDIUM);
    assert_eq!(h.game().ui.focus, Focus::Workers);

    h.press("b");
    assert_eq!(h.game().sim.worker_count(WorkerId::Intern), 0);

    h.game_mut().sim.set_bytes(bytes(100));
    h.press("b");
    assert_eq!(h.game().sim.worker_count(WorkerId::Intern), 1);
    assert_eq!(*h.game().sim.bytes(), bytes(90));
    assert_eq!(*h.game().sim.rate(), bytes(1));
}

#[test]
fn test_worker_list_scrolls_with_selection() {
    let mut h = Harness::new(player("bob"), SMALL);
    h.press("w");
    assert_eq!(h.game().ui.screen, Screen::Workers);

    h.press(&"j".repeat(11));
    let cursor = h.game().ui.workers;
    assert_eq!(cursor.selected, 11);
    assert_eq!(cursor.offset, 7);

    // Clamped at the end of the list.
    h.press("jjj");
    assert_eq!(h.game().ui.workers.selected, WorkerId::COUNT - 1);

    h.press("\x7f");
    assert_eq!(h.game().ui.screen, Screen::Main);
}

#[test]
fn test_list_cursor_follows_selection() {
    let mut cursor = ListCursor::default();
    cursor.select(19, 20, 5);
    assert_eq!(cursor.offset, 15);
    cursor.step(-10, 20, 5);
    assert_eq!(cursor.selected, 9);
    assert_eq!(cursor.offset, 9);
}

#[test]
fn test_prestige_needs_confirmation() {
    let mut h = Harness::new(player("carol"), MEDIUM);
    let cost = h.game().sim.prestige_cost();
    h.game_mut().sim.set_bytes(cost);

    h.press("p");
    assert!(h.game().ui.confirm_prestige);

    // Any other key disarms.
    h.press("j");
    assert!(!h.game().ui.confirm_prestige);
    assert_eq!(h.game().sim.prestige(), 0);

    h.press("py");
    assert_eq!(h.game().sim.prestige(), 1);
    assert_eq!(*h.game().sim.bytes(), bytes(0));
    assert!(!h.game().ui.confirm_prestige);
}

#[test]
fn test_prestige_not_armed_when_unaffordable() {
    let mut h = Harness::new(player("dave"), MEDIUM);
    h.press("p");
    assert!(!h.game().ui.confirm_prestige);
    h.press("y");
    assert_eq!(h.game().sim.prestige(), 0);
}

#[test]
fn test_render_is_differential() {
    let mut h = Harness::new(player("erin"), MEDIUM);
    h.sink.take();

    assert!(h.session.render().unwrap() > 0);
    let frame = h.sink.take_string();
    assert!(frame.contains("Press [space] to bake!"));

    assert_eq!(h.session.render().unwrap(), 0);
    assert!(h.sink.is_empty());
}

#[test]
fn test_resize_switches_layout_and_repaints() {
    let mut h = Harness::new(player("frank"), MEDIUM);
    h.session.render().unwrap();
    h.sink.take();

    h.session.resize(SMALL.0, SMALL.1);
    assert_eq!(h.session.surface().size(), SMALL);
    assert_eq!(h.game().ui.focus, Focus::Main);

    h.session.render().unwrap();
    let out = h.sink.take_string();
    assert!(out.contains("\x1b[2J"));
    assert!(out.contains("[W]orkers  [U]pgrades  [S]ettings"));
}

#[test]
fn test_huge_resize_is_clamped() {
    let mut h = Harness::new(player("frank"), MEDIUM);
    h.session.resize(u16::MAX, u16::MAX);
    assert_eq!(h.session.surface().size(), (MAX_WIDTH, MAX_HEIGHT));
    assert!(h.session.render().unwrap() > 0);
    assert!(h.session.is_active());
}

#[test]
fn test_interrupt_saves_and_closes() {
    let mut h = Harness::new(player("grace"), MEDIUM);
    h.game_mut().sim.set_bytes(bytes(1234));

    let outcome = h.press("\x03");
    assert_eq!(outcome, InputOutcome::Closed(Farewell::Interrupted));
    assert!(h.sink.is_closed());
    assert!(!h.session.is_active());
    assert!(h.sink.take_string().contains("Thanks for playing"));

    let key = h.key();
    let journal = h.store.journal();
    assert!(journal.ends_with(&[StoreEvent::Saved(key.clone()), StoreEvent::Released(key.clone())]));
    assert!(h.store.document(&key).unwrap().contains("1234"));
    assert!(!h.store.is_locked(&key));

    // Later input reports the same ending.
    assert_eq!(h.press("x"), InputOutcome::Closed(Farewell::Interrupted));
}

#[test]
fn test_account_deletion_removes_data_without_saving() {
    let mut h = Harness::new(player("heidi"), MEDIUM);
    let key = h.key();
    assert!(h.store.document(&key).is_some());

    h.press("s");
    assert_eq!(h.game().ui.screen, Screen::Settings);
    h.press("jj");
    h.press("d");
    assert!(h.game().ui.settings_cursor.deleting_account);

    let outcome = h.press("y");
    assert_eq!(outcome, InputOutcome::Closed(Farewell::AccountDeleted));
    assert!(h.store.document(&key).is_none());
    assert!(h.sink.take_string().contains("All your data has been deleted."));

    let journal = h.store.journal();
    assert!(!journal.contains(&StoreEvent::Saved(key.clone())));
    let deleted = journal.iter().position(|e| *e == StoreEvent::Deleted(key.clone())).unwrap();
    let released = journal.iter().position(|e| *e == StoreEvent::Released(key.clone())).unwrap();
    assert!(deleted < released);
}

#[test]
fn test_account_deletion_cancelled() {
    let mut h = Harness::new(player("ivan"), MEDIUM);
    h.press("sjjd");
    assert_eq!(h.press("n"), InputOutcome::Continue);
    assert!(!h.game().ui.settings_cursor.deleting_account);
    assert!(h.store.document(&h.key()).is_some());
}

#[test]
fn test_anonymous_session_has_no_delete_action() {
    let mut h = Harness::new(Identity::Anonymous, MEDIUM);
    assert_eq!(h.press("sjjjjdy"), InputOutcome::Continue);
    assert!(h.store.document("anonymous").is_some());
}

#[test]
fn test_locked_save_refuses_second_session() {
    let store = Arc::new(MemoryStore::new());
    let first = Harness::with_store(store.clone(), Identity::Anonymous, MEDIUM);
    assert!(first.session.is_active());

    let mut second = Session::new(
        SessionId(8),
        Identity::Anonymous,
        store.clone(),
        Box::new(MemorySink::new()),
        MEDIUM,
        SessionConfig::default(),
    );
    assert!(matches!(second.init(), Err(SessionError::SaveLocked(_))));
    assert_eq!(store.journal().last(), Some(&StoreEvent::Refused("anonymous".to_string())));
}

#[test]
fn test_evicted_session_gets_notice() {
    let mut h = Harness::new(player("judy"), MEDIUM);
    assert!(h.session.destroy(Farewell::Evicted));
    let out = h.sink.take_string();
    assert!(out.contains("another location"));
    assert!(out.contains("\x1b[?1049l"));
}

#[test]
fn test_ticks_accumulate_bytes() {
    let mut h = Harness::new(player("kim"), MEDIUM);
    h.game_mut().sim.set_bytes(bytes(10));
    h.press("b");
    for _ in 0..40 {
        h.session.tick();
    }
    assert_eq!(*h.game().sim.bytes(), bytes(2));
}
