//! Display names for anonymous participants.

use chatwho_core::env::Environment;

/// Names handed out to participants who did not pick one.
pub const NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy",
    "Kevin", "Linda", "Mallory", "Nancy", "Oscar", "Peggy", "Quentin", "Rupert", "Sybil",
    "Trent", "Ursula", "Victor", "Walter", "Xavier", "Yvonne", "Zoe",
];

/// Pick a display name for this session.
pub fn pick_name<E: Environment>(env: &E) -> &'static str {
    let index = (env.random_u64() % NAMES.len() as u64) as usize;
    NAMES.get(index).copied().unwrap_or("Anonymous")
}
