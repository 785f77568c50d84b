use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// Generates a transaction reference of the form `{prefix}-{millis}-{suffix}`, e.g. `esc-1718012345678-x3Fb9Q`.
///
/// The timestamp makes references sortable and the random suffix makes collisions within the same millisecond
/// vanishingly unlikely. The transactions table enforces uniqueness regardless.
pub fn new_transaction_reference(prefix: &str) -> String {
    let suffix = rand::thread_rng().sample_iter(&Alphanumeric).take(6).map(char::from).collect::<String>();
    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}
