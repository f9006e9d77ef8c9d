/// Scroll-Triggered Fetch Controller
///
/// Turns viewport positions into page requests when the user gets close
/// to the end of the loaded content.
use super::cursor::{PageRequest, PaginationCursor};

/// Distance from the content bottom, in layout units, that counts as "near"
pub const DEFAULT_THRESHOLD: f32 = 100.0;

/// One viewport position report from the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSignal {
    pub offset_y: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollSignal {
    pub fn distance_to_bottom(&self) -> f32 {
        (self.content_height - (self.offset_y + self.viewport_height)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollTrigger {
    threshold: f32,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ScrollTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
        }
    }

    pub fn is_near_bottom(&self, signal: &ScrollSignal) -> bool {
        signal.distance_to_bottom() <= self.threshold
    }

    /// Ask the cursor for the next page if the signal is near the bottom.
    ///
    /// The cursor's fetching flag is checked before issuing, so a burst of
    /// signals yields at most one outstanding request.
    pub fn on_signal(&self, signal: &ScrollSignal, cursor: &mut PaginationCursor) -> Option<PageRequest> {
        if !self.is_near_bottom(signal) || !cursor.can_request() {
            return None;
        }
        cursor.request_next_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(offset_y: f32) -> ScrollSignal {
        ScrollSignal {
            offset_y,
            viewport_height: 800.0,
            content_height: 2000.0,
        }
    }

    #[test]
    fn test_distance_to_bottom() {
        assert_eq!(signal(0.0).distance_to_bottom(), 1200.0);
        assert_eq!(signal(1200.0).distance_to_bottom(), 0.0);
        assert_eq!(signal(1500.0).distance_to_bottom(), 0.0);
    }

    #[test]
    fn test_far_from_bottom_does_nothing() {
        let trigger = ScrollTrigger::default();
        let mut cursor = PaginationCursor::default();
        assert!(trigger.on_signal(&signal(500.0), &mut cursor).is_none());
        assert!(!cursor.is_fetching());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let trigger = ScrollTrigger::default();
        let mut cursor = PaginationCursor::default();
        assert!(trigger.on_signal(&signal(1100.0), &mut cursor).is_some());
    }

    #[test]
    fn test_signal_burst_issues_one_request() {
        let trigger = ScrollTrigger::default();
        let mut cursor = PaginationCursor::default();

        let issued = (0..50)
            .filter_map(|i| trigger.on_signal(&signal(1150.0 + i as f32), &mut cursor))
            .count();
        assert_eq!(issued, 1);
    }
}
