//! Push identifier generation.
//!
//! Identifiers use the Firebase push-key layout: eight characters of
//! millisecond timestamp followed by twelve random characters, all drawn from
//! an alphabet whose byte order matches its value order. Keys produced by one
//! generator therefore sort lexicographically in the order they were made.

use std::sync::Mutex;

use rand::Rng;

/// Alphabet for push identifiers, in ascending byte order.
pub const PUSH_CHARS: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Length of a generated identifier.
pub const PUSH_ID_LEN: usize = 20;

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

#[derive(Debug, Default)]
struct State {
    last_time: i64,
    last_random: [u8; RANDOM_CHARS],
}

/// Generates strictly increasing push identifiers.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    state: Mutex<State>,
}

impl PushIdGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the identifier for a write made at `now_ms`.
    ///
    /// A clock that moves backwards is clamped to the last seen time so the
    /// output stays ordered.
    pub fn next_id(&self, now_ms: i64) -> String {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut now = now_ms.max(state.last_time);
        if now == state.last_time && state.last_time != 0 {
            if !increment(&mut state.last_random) {
                now += 1;
                state.last_random = random_chars();
            }
        } else {
            state.last_random = random_chars();
        }
        state.last_time = now;

        let mut id = String::with_capacity(PUSH_ID_LEN);
        id.push_str(&encode_time(now));
        id.extend(state.last_random.iter().map(|&v| char::from(PUSH_CHARS[v as usize])));
        id
    }
}

/// Extract the millisecond timestamp encoded in a push identifier.
#[must_use]
pub fn decode_time(id: &str) -> Option<i64> {
    if id.len() != PUSH_ID_LEN {
        return None;
    }
    id.bytes().take(TIME_CHARS).try_fold(0_i64, |acc, b| {
        let value = PUSH_CHARS.iter().position(|&c| c == b)?;
        Some(acc * 64 + i64::try_from(value).ok()?)
    })
}

fn encode_time(mut now: i64) -> String {
    let mut chars = [0_u8; TIME_CHARS];
    for slot in chars.iter_mut().rev() {
        // rem_euclid keeps the index in 0..64 even for pre-epoch clocks
        let index = usize::try_from(now.rem_euclid(64)).unwrap_or(0);
        *slot = PUSH_CHARS[index];
        now = now.div_euclid(64);
    }
    chars.iter().map(|&b| char::from(b)).collect()
}

fn random_chars() -> [u8; RANDOM_CHARS] {
    let mut rng = rand::thread_rng();
    let mut out = [0_u8; RANDOM_CHARS];
    for slot in &mut out {
        *slot = rng.gen_range(0..64);
    }
    out
}

/// Add one to the base-64 suffix. Returns `false` on overflow.
fn increment(random: &mut [u8; RANDOM_CHARS]) -> bool {
    for digit in random.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return true;
        }
    }
    false
}
