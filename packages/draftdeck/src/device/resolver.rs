use rand::Rng;

use super::fingerprint::to_base36;
use crate::error::Result;
use crate::storage::KeyValueStore;

const RANDOM_SEGMENT_LEN: usize = 9;
const UA_SEGMENT_LEN: usize = 10;

/// Return the persisted device id, creating and persisting one if absent
pub fn get_or_create_device_id(
    store: &mut dyn KeyValueStore,
    key: &str,
    user_agent: &str,
) -> Result<String> {
    if let Some(existing) = store.get_item(key).filter(|id| !id.is_empty()) {
        return Ok(existing);
    }

    let device_id = generate_device_id(user_agent);
    store.set_item(key, &device_id)?;
    tracing::info!("Created new device id: {}", device_id);

    Ok(device_id)
}

/// Build `<millis base36>_<9 random base36>_<sanitized ua prefix>`
pub fn generate_device_id(user_agent: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    format!(
        "{}_{}_{}",
        to_base36(millis),
        random_base36(RANDOM_SEGMENT_LEN),
        user_agent_segment(user_agent)
    )
}

fn random_base36(len: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
        .collect()
}

/// Strip non-word characters, then keep the first ten
pub fn user_agent_segment(user_agent: &str) -> String {
    user_agent
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(UA_SEGMENT_LEN)
        .collect()
}
