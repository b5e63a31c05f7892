use std::time::{Duration, Instant};

/// DMG LCD refresh rate: 4 194 304 Hz master clock / 70 224 cycles per frame.
pub const DMG_REFRESH_HZ: f64 = 4_194_304.0 / 70_224.0;

/// Fixed-rate frame pacer.
///
/// Schedules frames on an absolute timeline so rounding does not accumulate.
/// After a stall (debugger, suspended window) the pacer resynchronizes instead
/// of bursting: at most one frame is produced late, the rest are skipped and
/// counted.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    next: Instant,
    frame_index: u64,
    skipped: u64,
}

impl FramePacer {
    /// Creates a pacer whose first deadline is now.
    pub fn new(hz: f64) -> Self {
        Self::with_start(hz, Instant::now())
    }

    /// Creates a pacer whose first deadline is `start`.
    ///
    /// Non-finite or non-positive rates are clamped to 1 Hz.
    pub fn with_start(hz: f64, start: Instant) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 1.0 };
        Self {
            period: Duration::from_secs_f64(1.0 / hz),
            next: start,
            frame_index: 0,
            skipped: 0,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Frames produced so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Frames abandoned after stalls.
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Marks one frame as produced at `now` and returns how long to wait
    /// before producing the next.
    pub fn advance(&mut self, now: Instant) -> Duration {
        self.frame_index = self.frame_index.wrapping_add(1);
        self.next += self.period;

        if now > self.next {
            let behind = now - self.next;
            let missed = (behind.as_nanos() / self.period.as_nanos().max(1)) as u64;
            if missed > 0 {
                log::debug!("pacer: {missed} frames behind, resynchronizing");
                self.skipped += missed;
            }
            self.next = now;
        }

        self.next.saturating_duration_since(now)
    }

    /// [`advance`](Self::advance) with the current time, then sleeps.
    pub fn wait(&mut self) {
        let sleep = self.advance(Instant::now());
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dmg_rate_is_just_under_sixty() {
        assert!((DMG_REFRESH_HZ - 59.7275).abs() < 1e-4);
    }

    #[test]
    fn on_schedule_waits_one_period() {
        let t0 = Instant::now();
        let mut p = FramePacer::with_start(50.0, t0);
        let period = p.period();
        assert_eq!(period, Duration::from_millis(20));

        assert_eq!(p.advance(t0), period);
        assert_eq!(p.advance(t0 + period), period);
        assert_eq!(p.frame_index(), 2);
        assert_eq!(p.skipped(), 0);
    }

    #[test]
    fn late_frame_shortens_the_wait() {
        let t0 = Instant::now();
        let mut p = FramePacer::with_start(50.0, t0);
        assert_eq!(p.advance(t0 + Duration::from_millis(5)), Duration::from_millis(15));
    }

    #[test]
    fn stall_does_not_burst() {
        let t0 = Instant::now();
        let mut p = FramePacer::with_start(50.0, t0);
        let period = p.period();

        p.advance(t0);
        // Frame 1 was due at t0 + 20ms; we come back 200ms later.
        let now = t0 + Duration::from_millis(220);
        assert_eq!(p.advance(now), Duration::ZERO);
        assert_eq!(p.skipped(), 9);

        // The next frame is a full period away, not zero.
        assert_eq!(p.advance(now), period);
    }

    #[test]
    fn invalid_rate_is_clamped() {
        assert_eq!(FramePacer::new(0.0).period(), Duration::from_secs(1));
        assert_eq!(FramePacer::new(f64::NAN).period(), Duration::from_secs(1));
    }
}
