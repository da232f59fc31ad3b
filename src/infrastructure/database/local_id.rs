use std::sync::atomic::{AtomicI64, Ordering};

/// Issues ids for locally created tasks: the current unix time in
/// milliseconds, pushed past the previously issued id (and past any id the
/// caller already observed) so ids stay strictly increasing even when
/// several tasks are created within one millisecond.
#[derive(Debug, Default)]
pub struct LocalIdSequence {
    last: AtomicI64,
}

impl LocalIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_after(&self, floor: i64) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1).max(floor + 1))
            }) {
            Ok(prev) => now.max(prev + 1).max(floor + 1),
            // The closure never declines, so this branch is unreachable;
            // returning the observed value keeps the signature total.
            Err(prev) => prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing() {
        let seq = LocalIdSequence::new();
        let mut previous = 0;
        for _ in 0..1000 {
            let id = seq.next_after(0);
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn ids_stay_above_the_observed_floor() {
        let seq = LocalIdSequence::new();
        let floor = chrono::Utc::now().timestamp_millis() + 60_000;
        assert!(seq.next_after(floor) > floor);
    }

    #[test]
    fn ids_track_the_clock() {
        let seq = LocalIdSequence::new();
        let before = chrono::Utc::now().timestamp_millis();
        assert!(seq.next_after(0) >= before);
    }
}
