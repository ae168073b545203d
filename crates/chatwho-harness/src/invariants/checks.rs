//! Standard invariant checks.

use std::collections::{HashMap, HashSet};

use chatwho_core::Message;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Transcripts hold each id at most once and their index is consistent.
///
/// Duplicate ids would render an echoed message twice; a stale index would
/// make the next `add` or `update` land on the wrong entry.
pub struct TranscriptIntegrity;

impl Invariant for TranscriptIntegrity {
    fn name(&self) -> &'static str {
        "transcript_integrity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if let Some(id) = first_duplicate(&state.hub) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("hub history holds id {id} twice"),
            });
        }

        for client in &state.clients {
            if !client.index_consistent {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: id index out of sync", client.id),
                });
            }
            if let Some(id) = first_duplicate(&client.messages) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: id {id} appears twice", client.id),
                });
            }
        }
        Ok(())
    }
}

/// Once every frame is delivered, each client holds the hub's messages.
///
/// Compared as id → message maps: a client's own optimistic appends sit
/// where they were typed, which can differ from the hub's order.
pub struct Convergence;

impl Invariant for Convergence {
    fn name(&self) -> &'static str {
        "convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if !state.is_quiescent() {
            return Ok(());
        }

        let hub = by_id(&state.hub);
        for client in &state.clients {
            let view = by_id(&client.messages);
            if view == hub {
                continue;
            }

            let missing: Vec<_> = hub.keys().filter(|id| !view.contains_key(*id)).collect();
            let extra: Vec<_> = view.keys().filter(|id| !hub.contains_key(*id)).collect();
            let stale: Vec<_> = view
                .iter()
                .filter(|(id, m)| hub.get(*id).is_some_and(|h| h != *m))
                .map(|(id, _)| id)
                .collect();

            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "client {}: missing {missing:?}, extra {extra:?}, stale {stale:?}",
                    client.id
                ),
            });
        }
        Ok(())
    }
}

fn first_duplicate(messages: &[Message]) -> Option<&str> {
    let mut seen = HashSet::new();
    messages.iter().map(|m| m.id.as_str()).find(|id| !seen.insert(*id))
}

fn by_id(messages: &[Message]) -> HashMap<&str, &Message> {
    messages.iter().map(|m| (m.id.as_str(), m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientSnapshot;

    fn client(id: usize, messages: Vec<Message>, pending_frames: usize) -> ClientSnapshot {
        ClientSnapshot { id, messages, index_consistent: true, pending_frames }
    }

    #[test]
    fn duplicate_ids_violate_integrity() {
        let m = Message::user("a", "x", "Ann");
        let state = SystemSnapshot {
            hub: vec![],
            clients: vec![client(0, vec![m.clone(), m], 0)],
        };
        assert!(TranscriptIntegrity.check(&state).is_err());
    }

    #[test]
    fn convergence_ignores_order() {
        let a = Message::user("a", "1", "Ann");
        let b = Message::user("b", "2", "Bob");
        let state = SystemSnapshot {
            hub: vec![a.clone(), b.clone()],
            clients: vec![client(0, vec![b, a], 0)],
        };
        assert!(Convergence.check(&state).is_ok());
    }

    #[test]
    fn convergence_waits_for_quiescence() {
        let a = Message::user("a", "1", "Ann");
        let state = SystemSnapshot { hub: vec![a], clients: vec![client(0, vec![], 1)] };
        assert!(Convergence.check(&state).is_ok());

        let state = SystemSnapshot { clients: vec![client(0, vec![], 0)], ..state };
        let violation = Convergence.check(&state).unwrap_err();
        assert!(violation.message.contains("missing [\"a\"]"));
    }

    #[test]
    fn stale_content_is_reported() {
        let state = SystemSnapshot {
            hub: vec![Message::user("a", "new", "Ann")],
            clients: vec![client(3, vec![Message::user("a", "old", "Ann")], 0)],
        };
        let violation = Convergence.check(&state).unwrap_err();
        assert_eq!(violation.to_string(), "convergence: client 3: missing [], extra [], stale [\"a\"]");
    }
}
