//! Pure derivation rules shared by the mutation pipeline and its clients.
//! Everything here is deterministic and side-effect free.

/// Energy percentage at which the locker opens.
pub const UNLOCK_THRESHOLD: i32 = 100;

/// Map an activation count to its display tier.
///
/// Tiers: 0 for no activations, 1 for 1-2, 2 for 3-5, 3 for 6 and above.
/// Counts never go negative through the API, but the mapping is total
/// anyway.
pub fn glow_band_of(activation_count: i64) -> i32 {
    match activation_count {
        i64::MIN..=0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        _ => 3,
    }
}

/// Whether an energy change crosses the unlock threshold upward.
///
/// Only the upward crossing counts; once unlocked the flag is terminal and
/// later drops below the threshold never relock.
pub fn crosses_unlock_threshold(previous: i32, next: i32) -> bool {
    previous < UNLOCK_THRESHOLD && next >= UNLOCK_THRESHOLD
}
