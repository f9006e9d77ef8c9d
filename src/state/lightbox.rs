/// Lightbox Navigator
///
/// State machine for the full-size overlay over the gallery store:
/// `Closed` or `Open(index)`, with circular previous/next navigation.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open(usize),
}

/// Normalized keyboard input the navigator reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Previous,
    Next,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("index {index} is out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    state: LightboxState,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open(_))
    }

    pub fn open_index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open(index) => Some(index),
            LightboxState::Closed => None,
        }
    }

    /// Open at `index` of a store holding `len` items.
    ///
    /// An out-of-range index leaves the state untouched.
    pub fn open(&mut self, index: usize, len: usize) -> Result<(), NavigationError> {
        if index >= len {
            return Err(NavigationError::OutOfRange { index, len });
        }
        self.state = LightboxState::Open(index);
        Ok(())
    }

    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
    }

    /// Step back one item, wrapping from the first to the last
    pub fn prev(&mut self, len: usize) {
        if let LightboxState::Open(index) = self.state {
            if len > 0 {
                self.state = LightboxState::Open((index.min(len - 1) + len - 1) % len);
            }
        }
    }

    /// Step forward one item, wrapping from the last to the first
    pub fn next(&mut self, len: usize) {
        if let LightboxState::Open(index) = self.state {
            if len > 0 {
                self.state = LightboxState::Open((index.min(len - 1) + 1) % len);
            }
        }
    }

    /// Apply a key press; ignored while closed
    pub fn handle_key(&mut self, key: LightboxKey, len: usize) {
        if !self.is_open() {
            return;
        }
        match key {
            LightboxKey::Previous => self.prev(len),
            LightboxKey::Next => self.next(len),
            LightboxKey::Dismiss => self.close(),
        }
    }

    /// Re-validate the open index after the store changed size.
    ///
    /// Clamps to the last item when the index fell off the end, and closes
    /// when the store is empty.
    pub fn reconcile(&mut self, len: usize) {
        if let LightboxState::Open(index) = self.state {
            if len == 0 {
                self.state = LightboxState::Closed;
            } else if index >= len {
                self.state = LightboxState::Open(len - 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_out_of_range() {
        let mut lightbox = Lightbox::new();
        assert_eq!(
            lightbox.open(3, 3),
            Err(NavigationError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(lightbox.state(), LightboxState::Closed);

        lightbox.open(1, 3).unwrap();
        assert!(lightbox.open(5, 3).is_err());
        assert_eq!(lightbox.open_index(), Some(1));
    }

    #[test]
    fn test_wraparound_both_directions() {
        let mut lightbox = Lightbox::new();
        lightbox.open(0, 4).unwrap();

        lightbox.handle_key(LightboxKey::Previous, 4);
        assert_eq!(lightbox.open_index(), Some(3));

        lightbox.handle_key(LightboxKey::Next, 4);
        assert_eq!(lightbox.open_index(), Some(0));
    }

    #[test]
    fn test_next_n_times_returns_to_start() {
        for len in 1..8 {
            for start in 0..len {
                let mut lightbox = Lightbox::new();
                lightbox.open(start, len).unwrap();
                for _ in 0..len {
                    lightbox.next(len);
                    assert!(lightbox.open_index().unwrap() < len);
                }
                assert_eq!(lightbox.open_index(), Some(start));

                lightbox.prev(len);
                assert!(lightbox.open_index().unwrap() < len);
            }
        }
    }

    #[test]
    fn test_navigation_is_noop_when_closed_or_empty() {
        let mut lightbox = Lightbox::new();
        lightbox.next(5);
        lightbox.handle_key(LightboxKey::Previous, 5);
        assert_eq!(lightbox.state(), LightboxState::Closed);

        lightbox.open(2, 5).unwrap();
        lightbox.next(0);
        assert_eq!(lightbox.open_index(), Some(2));
    }

    #[test]
    fn test_dismiss_closes() {
        let mut lightbox = Lightbox::new();
        lightbox.open(0, 1).unwrap();
        lightbox.handle_key(LightboxKey::Dismiss, 1);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_reconcile_clamps_or_closes() {
        let mut lightbox = Lightbox::new();
        lightbox.open(9, 10).unwrap();

        lightbox.reconcile(4);
        assert_eq!(lightbox.open_index(), Some(3));

        lightbox.reconcile(0);
        assert_eq!(lightbox.state(), LightboxState::Closed);
    }
}
