//! Recording event annotations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A labelled moment in a recording.
///
/// Events come from the wearer or operator marking instants during
/// capture (`recording.begin`, task markers, and so on). They take no
/// part in stream alignment; the fusion layer answers "where was the
/// wearer, and where were they looking, when this happened".
///
/// # Example
///
/// ```
/// use gaze_types::EventMarker;
///
/// let event = EventMarker::new("waypoint reached");
/// assert_eq!(event.label, "waypoint reached");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventMarker {
    /// Free-form event label.
    pub label: String,
}

impl EventMarker {
    /// Creates an event marker from its label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_label() {
        let event = EventMarker::new("recording.begin");
        assert_eq!(event.label, "recording.begin");
    }
}
