//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use chatwho_app::{App, AppAction, AppEvent, KeyInput, RoomCode};
use chatwho_core::{Frame, Message, ReconcilerConfig};
use chatwho_harness::{ClientSnapshot, InvariantRegistry, SimEnv, SystemSnapshot};
use proptest::prelude::*;

/// Generate random printable characters for input (multi-byte included).
fn printable_char() -> impl Strategy<Value = char> {
    prop_oneof![
        8 => prop::char::range(' ', '~'),
        1 => Just('é'),
        1 => Just('✓'),
    ]
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => printable_char().prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
    ]
}

fn frame_strategy() -> impl Strategy<Value = String> {
    let message = ("[a-c]", "[a-z` ]{0,6}")
        .prop_map(|(id, content)| Message::user(id, content, "Bob"));
    prop_oneof![
        3 => message.clone().prop_map(|m| Frame::Add(m).encode()),
        2 => message.clone().prop_map(|m| Frame::Update(m).encode()),
        1 => prop::collection::vec(message, 0..4)
            .prop_map(|messages| Frame::All { messages }.encode()),
        1 => "\\PC{0,12}",
    ]
}

/// Generate random app events (never Esc, so the session keeps going).
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        8 => key_strategy().prop_map(AppEvent::Key),
        3 => frame_strategy().prop_map(AppEvent::FrameReceived),
        1 => Just(AppEvent::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
    ]
}

fn app(seed: u64) -> App<SimEnv> {
    let room = RoomCode::parse("lobby").unwrap();
    App::new(SimEnv::with_seed(seed), room, "Alice", ReconcilerConfig::default())
}

proptest! {
    /// Transcript invariants hold under arbitrary event sequences.
    #[test]
    fn prop_app_invariants_hold(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut app = app(1);
        let invariants = InvariantRegistry::standard();

        for event in events {
            let _ = app.handle(event.clone());

            // No hub here: report a pending frame so convergence is skipped
            let snapshot = SystemSnapshot {
                hub: Vec::new(),
                clients: vec![ClientSnapshot::capture(0, app.transcript(), 1)],
            };
            prop_assert!(
                invariants.check_all(&snapshot).is_ok(),
                "Invariant violated after {:?}", event
            );
        }
    }

    /// Input buffer clears on enter when it held non-blank text.
    #[test]
    fn prop_input_buffer_clears_on_enter(chars in prop::collection::vec(printable_char(), 1..20)) {
        let mut app = app(2);

        for c in &chars {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(*c)));
        }
        prop_assert_eq!(app.input().len(), chars.len());

        let blank = chars.iter().all(|c| c.is_whitespace());
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        if blank {
            prop_assert!(actions.is_empty());
            prop_assert_eq!(app.input().len(), chars.len());
        } else {
            let typed: String = chars.iter().collect();
            prop_assert!(app.input_buffer().is_empty());
            prop_assert!(
                actions.iter().any(|a| matches!(a, AppAction::SendFrame(Frame::Add(m)) if m.content == typed))
            );
        }
    }

    /// Cursor stays within buffer bounds.
    #[test]
    fn prop_cursor_within_bounds(events in prop::collection::vec(key_strategy(), 0..100)) {
        let mut app = app(3);

        for key in events {
            let _ = app.handle(AppEvent::Key(key));

            let cursor = app.input_cursor();
            let len = app.input().len();
            prop_assert!(cursor <= len, "Cursor {} exceeds buffer length {}", cursor, len);
        }
    }

    /// Submitted messages are never duplicated (a sync may drop them).
    #[test]
    fn prop_submissions_are_kept(events in prop::collection::vec(event_strategy(), 0..60)) {
        let mut app = app(4);
        let mut sent = Vec::new();

        for event in events {
            for action in app.handle(event) {
                if let AppAction::SendFrame(Frame::Add(m)) = action {
                    sent.push(m.id);
                }
            }
        }

        // Foreign frames use ids a-c; local ids are 8 chars and never collide
        for id in sent {
            prop_assert!(app.transcript().iter().filter(|m| m.id == id).count() <= 1);
        }
    }
}
