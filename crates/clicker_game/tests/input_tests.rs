//! Byte decoding and key dispatch.

use std::sync::{Arc, Mutex};

use clicker_game::input::{Dispatch, InputChannel, Key, KeyHandler};

#[derive(Default)]
struct Recorder(Vec<Key>);

impl KeyHandler for Recorder {
    fn handle_key(&mut self, key: Key) {
        self.0.push(key);
    }
}

fn feed_all(chunks: &[&[u8]]) -> (Vec<Key>, Dispatch) {
    let mut channel = InputChannel::new();
    let mut recorder = Recorder::default();
    let mut last = Dispatch::Continue;
    for chunk in chunks {
        last = channel.feed(chunk, &mut recorder);
    }
    (recorder.0, last)
}

#[test]
fn test_paste_dispatches_every_character() {
    let (keys, dispatch) = feed_all(&[b"wjjb".as_slice()]);
    assert_eq!(dispatch, Dispatch::Continue);
    assert_eq!(
        keys,
        vec![Key::Char('w'), Key::Char('j'), Key::Char('j'), Key::Char('b')]
    );
}

#[test]
fn test_arrow_keys() {
    let (keys, _) = feed_all(&[b"\x1b[A\x1b[B\x1bOC\x1b[D".as_slice()]);
    assert_eq!(keys, vec![Key::Up, Key::Down, Key::Right, Key::Left]);
}

#[test]
fn test_partial_csi_carried_across_chunks() {
    let (keys, _) = feed_all(&[b"j\x1b[".as_slice(), b"Ak".as_slice()]);
    assert_eq!(keys, vec![Key::Char('j'), Key::Up, Key::Char('k')]);
}

#[test]
fn test_lone_escape_at_chunk_end() {
    let (keys, _) = feed_all(&[b"\x1b".as_slice()]);
    assert_eq!(keys, vec![Key::Escape]);
}

#[test]
fn test_split_utf8_is_reassembled() {
    let bytes = "é".as_bytes();
    let (keys, _) = feed_all(&[&bytes[..1], &bytes[1..]]);
    assert_eq!(keys, vec![Key::Char('é')]);
}

#[test]
fn test_control_keys() {
    let (keys, _) = feed_all(&[b"\r\t\x7f ".as_slice()]);
    assert_eq!(keys, vec![Key::Enter, Key::Tab, Key::Backspace, Key::Char(' ')]);
}

#[test]
fn test_etx_interrupts_and_stops_dispatch() {
    let (keys, dispatch) = feed_all(&[b"ab\x03cd".as_slice()]);
    assert_eq!(dispatch, Dispatch::Interrupted);
    assert_eq!(keys, vec![Key::Char('a'), Key::Char('b')]);
}

#[test]
fn test_etx_cannot_be_observed() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut channel = InputChannel::new();
    let log = seen.clone();
    channel.on_key(move |key| log.lock().unwrap().push(key));

    let mut recorder = Recorder::default();
    assert_eq!(channel.feed(b"\x03", &mut recorder), Dispatch::Interrupted);
    assert!(recorder.0.is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_observers_run_after_primary_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut channel = InputChannel::new();
    for name in ["first", "second"] {
        let order = order.clone();
        channel.on_key(move |_| order.lock().unwrap().push(name));
    }

    let primary_order = order.clone();
    let mut primary = move |_key: Key| primary_order.lock().unwrap().push("primary");
    channel.feed(b"x", &mut primary);

    assert_eq!(*order.lock().unwrap(), vec!["primary", "first", "second"]);
}
