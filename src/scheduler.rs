//! Debounced render scheduling.
//!
//! Payload edits restart a debounce timer; style edits render at once.
//! Time is passed in explicitly so callers (and tests) own the clock.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::content::ContentType;
use crate::readiness::is_ready;
use crate::style::StyleSpec;

/// Monotonic request number. Later requests always supersede earlier ones.
pub type RequestSeq = u64;

/// One unit of render work.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub seq: RequestSeq,
    pub payload: String,
    pub style: StyleSpec,
}

/// Equality ignores `seq`: two requests for the same payload and style are
/// the same work.
impl PartialEq for RenderRequest {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.style == other.style
    }
}

impl Eq for RenderRequest {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No ready payload.
    Idle,
    /// A ready payload is waiting for the debounce window to pass.
    Pending { deadline: Instant },
    /// The current payload has been emitted.
    Settled,
}

pub struct RenderScheduler {
    window: Duration,
    state: SchedulerState,
    payload: Option<String>,
    style: StyleSpec,
    last_emitted: Option<RenderRequest>,
    latest_seq: RequestSeq,
}

impl RenderScheduler {
    pub fn new(window: Duration, style: StyleSpec) -> Self {
        Self {
            window,
            state: SchedulerState::Idle,
            payload: None,
            style,
            last_emitted: None,
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The ready payload the scheduler is tracking, if any.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Record a payload edit at `now`. Returns whether the payload is ready.
    ///
    /// A payload that is not ready drops the timer and invalidates any
    /// render still in flight.
    pub fn payload_changed(
        &mut self,
        content_type: ContentType,
        payload: &str,
        now: Instant,
    ) -> bool {
        if !is_ready(content_type, payload) {
            debug!(%content_type, len = payload.len(), "payload not ready; idle");
            self.go_idle();
            return false;
        }

        let deadline = now + self.window;
        debug!(%content_type, window_ms = self.window.as_millis() as u64, "debounce (re)started");
        self.payload = Some(payload.to_string());
        self.state = SchedulerState::Pending { deadline };
        true
    }

    /// Record a style edit. Emits immediately when a ready payload exists,
    /// cancelling any pending debounce since the request carries the
    /// current payload anyway.
    pub fn style_changed(&mut self, style: StyleSpec) -> Option<RenderRequest> {
        self.style = style;
        if self.payload.is_none() {
            return None;
        }
        self.state = SchedulerState::Settled;
        self.emit()
    }

    /// Advance the clock. Emits once the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<RenderRequest> {
        match self.state {
            SchedulerState::Pending { deadline } if now >= deadline => {
                self.state = SchedulerState::Settled;
                self.emit()
            }
            _ => None,
        }
    }

    /// Drop the payload, the timer and any in-flight render.
    pub fn reset(&mut self) {
        debug!("scheduler reset");
        self.go_idle();
    }

    /// Whether a completion for `seq` may still be applied.
    pub fn is_latest(&self, seq: RequestSeq) -> bool {
        seq == self.latest_seq
    }

    fn go_idle(&mut self) {
        self.state = SchedulerState::Idle;
        self.payload = None;
        self.last_emitted = None;
        // Burn a sequence number so outstanding work becomes stale.
        self.latest_seq += 1;
    }

    fn emit(&mut self) -> Option<RenderRequest> {
        let payload = self.payload.clone()?;
        let candidate = RenderRequest {
            seq: self.latest_seq + 1,
            payload,
            style: self.style.clone(),
        };

        if self.last_emitted.as_ref() == Some(&candidate) {
            debug!("request identical to last emitted; skipped");
            return None;
        }

        self.latest_seq = candidate.seq;
        self.last_emitted = Some(candidate.clone());
        info!(seq = candidate.seq, payload_len = candidate.payload.len(), "render requested");
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scheduler() -> RenderScheduler {
        RenderScheduler::new(ms(500), presets::classic().spec)
    }

    #[test]
    fn test_rapid_edits_emit_once_with_last_payload() {
        let t0 = Instant::now();
        let mut s = scheduler();
        let mut emitted = Vec::new();

        for (i, text) in ["h", "he", "hel", "hell"].iter().enumerate() {
            let now = t0 + ms(100 * i as u64);
            assert!(s.payload_changed(ContentType::Text, text, now));
            emitted.extend(s.poll(now));
        }
        // Poll every 50ms up to t=1500.
        for step in 7..=30 {
            emitted.extend(s.poll(t0 + ms(step * 50)));
        }

        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].payload, "hell");
        assert_eq!(s.state(), SchedulerState::Settled);
    }

    #[test]
    fn test_deadline_counts_from_last_edit() {
        let t0 = Instant::now();
        let mut s = scheduler();
        s.payload_changed(ContentType::Text, "a", t0);
        s.payload_changed(ContentType::Text, "ab", t0 + ms(300));
        assert_eq!(s.next_deadline(), Some(t0 + ms(800)));
        assert!(s.poll(t0 + ms(799)).is_none());
        assert!(s.poll(t0 + ms(800)).is_some());
        assert!(s.poll(t0 + ms(900)).is_none());
    }

    #[test]
    fn test_not_ready_payload_goes_idle() {
        let t0 = Instant::now();
        let mut s = scheduler();
        s.payload_changed(ContentType::Email, "mailto:a@b.com", t0);
        assert!(!s.payload_changed(ContentType::Email, "mailto:", t0 + ms(10)));
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(s.payload().is_none());
        assert!(s.poll(t0 + ms(2000)).is_none());
    }

    #[test]
    fn test_style_change_bypasses_debounce() {
        let t0 = Instant::now();
        let mut s = scheduler();
        s.payload_changed(ContentType::Url, "https://a.io", t0);

        let mut style = presets::classic().spec;
        style.module.color = crate::style::Rgb(10, 20, 30);
        let req = s.style_changed(style.clone()).unwrap();
        assert_eq!(req.payload, "https://a.io");
        assert_eq!(req.style, style);
        // The pending timer was satisfied by the immediate render.
        assert!(s.poll(t0 + ms(600)).is_none());
    }

    #[test]
    fn test_style_change_without_payload_is_stored_only() {
        let t0 = Instant::now();
        let mut s = scheduler();
        let style = presets::ocean().spec;
        assert!(s.style_changed(style.clone()).is_none());
        s.payload_changed(ContentType::Text, "x", t0);
        assert_eq!(s.poll(t0 + ms(500)).unwrap().style, style);
    }

    #[test]
    fn test_identical_request_is_deduplicated() {
        let t0 = Instant::now();
        let mut s = scheduler();
        s.payload_changed(ContentType::Text, "same", t0);
        assert!(s.poll(t0 + ms(500)).is_some());
        s.payload_changed(ContentType::Text, "same", t0 + ms(600));
        assert!(s.poll(t0 + ms(1100)).is_none());
        assert!(s.style_changed(presets::classic().spec).is_none());
    }

    #[test]
    fn test_sequence_guard_rejects_superseded_completions() {
        let t0 = Instant::now();
        let mut s = scheduler();
        s.payload_changed(ContentType::Text, "first", t0);
        let first = s.poll(t0 + ms(500)).unwrap();
        let second = s.style_changed(presets::sunset().spec).unwrap();
        assert!(second.seq > first.seq);
        assert!(!s.is_latest(first.seq));
        assert!(s.is_latest(second.seq));

        s.reset();
        assert!(!s.is_latest(second.seq));
        assert_eq!(s.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_request_equality_ignores_seq() {
        let style = presets::classic().spec;
        let a = RenderRequest { seq: 1, payload: "p".into(), style: style.clone() };
        let b = RenderRequest { seq: 9, payload: "p".into(), style };
        assert_eq!(a, b);
    }
}
