//! Edge detection over the caller's per-frame props
//!
//! The caller hands the canvas a full set of props every frame. Instead of
//! diffing ad hoc, the previous values are stored once here and each update
//! yields the transitions that need handling.

/// Reports a value's changes between observations
#[derive(Clone, Debug, Default)]
pub struct Changed<T> {
    previous: T,
}

impl<T: PartialEq + Clone> Changed<T> {
    pub fn new(initial: T) -> Self {
        Self { previous: initial }
    }

    /// Record `value`, returning true if it differs from the last one
    pub fn observe(&mut self, value: &T) -> bool {
        if self.previous == *value {
            return false;
        }
        self.previous = value.clone();
        true
    }
}

/// Detects false-to-true transitions of a boolean signal
#[derive(Clone, Copy, Debug, Default)]
pub struct RisingEdge {
    previous: bool,
}

impl RisingEdge {
    pub fn observe(&mut self, value: bool) -> bool {
        let rising = value && !self.previous;
        self.previous = value;
        rising
    }
}

/// Transitions found in one props update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropsEdges {
    pub document_changed: bool,
    pub highlighting_changed: bool,
    pub color_changed: bool,
    pub trigger_rising: bool,
}

/// Remembers the last props seen and computes [`PropsEdges`]
#[derive(Clone, Debug, Default)]
pub struct EdgeDetector {
    document: Changed<Option<String>>,
    highlighting: Changed<bool>,
    color: Changed<String>,
    trigger: RisingEdge,
}

impl EdgeDetector {
    pub fn observe(
        &mut self,
        document_source: &Option<String>,
        highlighting: bool,
        highlight_color: &str,
        trigger: bool,
    ) -> PropsEdges {
        PropsEdges {
            document_changed: self.document.observe(document_source),
            highlighting_changed: self.highlighting.observe(&highlighting),
            color_changed: self.color.observe(&highlight_color.to_string()),
            trigger_rising: self.trigger.observe(trigger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge_fires_once_per_transition() {
        let mut edge = RisingEdge::default();
        let fired: Vec<bool> = [false, true, true, false, true, false, false]
            .into_iter()
            .map(|v| edge.observe(v))
            .collect();
        assert_eq!(fired, [false, true, false, false, true, false, false]);
    }

    #[test]
    fn test_changed_tracks_value() {
        let mut changed = Changed::new(None::<String>);
        assert!(!changed.observe(&None));
        assert!(changed.observe(&Some("a".into())));
        assert!(!changed.observe(&Some("a".into())));
        assert!(changed.observe(&None));
    }

    #[test]
    fn test_detector_first_update_reports_initial_document() {
        let mut detector = EdgeDetector::default();
        let edges = detector.observe(&Some("doc.png".into()), false, "#FFFF00", false);
        assert!(edges.document_changed);
        assert!(edges.color_changed);
        assert!(!edges.trigger_rising);
        assert!(!edges.highlighting_changed);

        let edges = detector.observe(&Some("doc.png".into()), true, "#FFFF00", true);
        assert_eq!(
            edges,
            PropsEdges {
                document_changed: false,
                highlighting_changed: true,
                color_changed: false,
                trigger_rising: true,
            }
        );
    }
}
