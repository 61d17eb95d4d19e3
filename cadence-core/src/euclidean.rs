// Copyright (c) 2026 Cadence Authors. All rights reserved.

//! Euclidean rhythm distribution: spreading N events as evenly as possible
//! over M ticks.

/// Distributes `num_events` evenly over `num_ticks` positions using a
/// Bresenham-style algorithm: walk `i` from `0` to `num_ticks`, and mark a
/// tick whenever `floor(i * slope)` differs from the previous tick's value,
/// where `slope = num_events / num_ticks`.
///
/// The "previous value" before index 0 is treated as absent (not merely
/// zero), so index 0 always marks an event whenever `num_events > 0` — this
/// is what guarantees the pattern always starts on the downbeat.
///
/// `num_events == 0` yields all zeros; `num_events >= num_ticks` yields all
/// ones (silently clamped, matching "more events than ticks" being asked for
/// a fully dense pattern rather than an error).
pub fn distribute(num_ticks: u32, num_events: u32) -> Vec<bool> {
    if num_ticks == 0 {
        return Vec::new();
    }
    if num_events == 0 {
        return vec![false; num_ticks as usize];
    }
    let num_events = num_events.min(num_ticks);

    let slope = num_events as f64 / num_ticks as f64;
    let mut previous: Option<i64> = None;
    let mut result = Vec::with_capacity(num_ticks as usize);
    for i in 0..num_ticks {
        let current = (i as f64 * slope).floor() as i64;
        result.push(Some(current) != previous);
        previous = Some(current);
    }
    result
}
