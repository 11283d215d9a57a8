// Segment tracking against the playback position

use crate::segment::{sort_by_mark_in, Segment};

/// Result of feeding a playback position to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentTransition {
    /// Still in the same segment (or still outside of any)
    None,
    /// Entered a segment from outside
    Start(Segment),
    /// Left a segment into an uncovered range
    End(Segment),
    /// Moved directly from one segment into another
    Switch { from: Segment, to: Segment },
    /// Position lies in a blocked segment; playback must resume at `skip_to`
    Blocked { segment: Segment, skip_to: i64 },
}

/// Sorted segment list plus the segment currently being played.
#[derive(Debug, Clone, Default)]
pub struct SegmentTracker {
    segments: Vec<Segment>,
    current: Option<usize>,
    selected: Option<usize>,
}

impl SegmentTracker {
    pub fn new(mut segments: Vec<Segment>) -> Self {
        sort_by_mark_in(&mut segments);
        Self {
            segments,
            current: None,
            selected: None,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn find(&self, identifier: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.identifier() == identifier)
    }

    pub fn current(&self) -> Option<&Segment> {
        self.current.map(|i| &self.segments[i])
    }

    pub fn selected(&self) -> Option<&Segment> {
        self.selected.map(|i| &self.segments[i])
    }

    /// Mark a segment as user-selected
    pub fn select(&mut self, identifier: &str) -> Option<&Segment> {
        let index = self
            .segments
            .iter()
            .position(|s| s.identifier() == identifier)?;
        self.selected = Some(index);
        Some(&self.segments[index])
    }

    /// Segment containing `position`; the latest-starting one wins on overlap.
    pub fn segment_at(&self, position: i64) -> Option<&Segment> {
        self.index_at(position).map(|i| &self.segments[i])
    }

    pub fn blocked_segment_at(&self, position: i64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.is_blocked() && s.contains(position))
    }

    /// First position after the blocked range containing `position`.
    ///
    /// Blocked segments that overlap or touch the range are skipped with it.
    pub fn skip_target(&self, position: i64) -> Option<i64> {
        let blocked = self.blocked_segment_at(position)?;
        Some(self.chain_end(blocked.mark_out()))
    }

    /// Advance the tracker to `position` and report what changed.
    ///
    /// A blocked hit clears the current segment without reporting its end.
    pub fn update(&mut self, position: i64) -> SegmentTransition {
        if let Some(segment) = self.blocked_segment_at(position).cloned() {
            let skip_to = self.chain_end(segment.mark_out());
            self.current = None;
            return SegmentTransition::Blocked { segment, skip_to };
        }

        let next = self.index_at(position);
        let transition = match (self.current, next) {
            (None, None) => SegmentTransition::None,
            (None, Some(to)) => SegmentTransition::Start(self.segments[to].clone()),
            (Some(from), None) => SegmentTransition::End(self.segments[from].clone()),
            (Some(from), Some(to)) if from != to => SegmentTransition::Switch {
                from: self.segments[from].clone(),
                to: self.segments[to].clone(),
            },
            _ => SegmentTransition::None,
        };
        self.current = next;
        transition
    }

    /// Forget the current segment, e.g. after a seek
    pub fn reset(&mut self) {
        self.current = None;
    }

    fn chain_end(&self, mut target: i64) -> i64 {
        while let Some(next) = self.blocked_segment_at(target) {
            if next.mark_out() <= target {
                break;
            }
            target = next.mark_out();
        }
        target
    }

    fn index_at(&self, position: i64) -> Option<usize> {
        self.segments.iter().rposition(|s| s.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, mark_in: i64, mark_out: i64, blocked: Option<&str>) -> Segment {
        Segment::simple(
            id,
            id.to_uppercase(),
            mark_in,
            mark_out,
            mark_out - mark_in,
            true,
            blocked.map(str::to_string),
        )
    }

    #[test]
    fn test_segments_sorted_on_creation() {
        let tracker = SegmentTracker::new(vec![
            segment("b", 12000, 15000, None),
            segment("a", 3000, 10000, None),
        ]);
        assert_eq!(tracker.segments()[0].identifier(), "a");
        assert_eq!(tracker.segments()[1].identifier(), "b");
    }

    #[test]
    fn test_segment_at() {
        let tracker = SegmentTracker::new(vec![
            segment("a", 3000, 10000, None),
            segment("b", 12000, 15000, None),
        ]);
        assert!(tracker.segment_at(0).is_none());
        assert_eq!(tracker.segment_at(3000).unwrap().identifier(), "a");
        assert!(tracker.segment_at(10000).is_none());
        assert_eq!(tracker.segment_at(14999).unwrap().identifier(), "b");
    }

    #[test]
    fn test_overlap_prefers_latest_start() {
        let tracker = SegmentTracker::new(vec![
            segment("full", 0, 60000, None),
            segment("inner", 10000, 20000, None),
        ]);
        assert_eq!(tracker.segment_at(15000).unwrap().identifier(), "inner");
        assert_eq!(tracker.segment_at(30000).unwrap().identifier(), "full");
    }

    #[test]
    fn test_skip_target_chains_contiguous_blocks() {
        let tracker = SegmentTracker::new(vec![
            segment("ad1", 1000, 5000, Some("COMMERCIAL")),
            segment("ad2", 5000, 8000, Some("COMMERCIAL")),
            segment("show", 8000, 20000, None),
        ]);
        assert_eq!(tracker.skip_target(1500), Some(8000));
        assert_eq!(tracker.skip_target(6000), Some(8000));
        assert_eq!(tracker.skip_target(9000), None);
    }

    #[test]
    fn test_empty_reason_is_not_skipped() {
        let tracker = SegmentTracker::new(vec![segment("a", 0, 1000, Some(""))]);
        assert_eq!(tracker.skip_target(500), None);
    }

    #[test]
    fn test_update_transitions() {
        let mut tracker = SegmentTracker::new(vec![
            segment("a", 1000, 2000, None),
            segment("b", 2000, 3000, None),
        ]);

        assert_eq!(tracker.update(500), SegmentTransition::None);
        assert!(matches!(tracker.update(1000), SegmentTransition::Start(s) if s.identifier() == "a"));
        assert_eq!(tracker.update(1500), SegmentTransition::None);
        match tracker.update(2000) {
            SegmentTransition::Switch { from, to } => {
                assert_eq!(from.identifier(), "a");
                assert_eq!(to.identifier(), "b");
            }
            other => panic!("unexpected transition: {:?}", other),
        }
        assert!(matches!(tracker.update(3500), SegmentTransition::End(s) if s.identifier() == "b"));
        assert!(tracker.current().is_none());
    }

    #[test]
    fn test_update_blocked() {
        let mut tracker = SegmentTracker::new(vec![segment("ad", 1000, 10000, Some("COMMERCIAL"))]);
        match tracker.update(1200) {
            SegmentTransition::Blocked { segment, skip_to } => {
                assert_eq!(segment.identifier(), "ad");
                assert_eq!(skip_to, 10000);
            }
            other => panic!("unexpected transition: {:?}", other),
        }
        assert_eq!(tracker.update(10000), SegmentTransition::None);
    }

    #[test]
    fn test_select() {
        let mut tracker = SegmentTracker::new(vec![segment("a", 0, 10, None)]);
        assert!(tracker.select("missing").is_none());
        assert_eq!(tracker.select("a").unwrap().identifier(), "a");
        assert_eq!(tracker.selected().unwrap().identifier(), "a");
    }
}
