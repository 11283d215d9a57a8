// Segment: a bounded range of the media timeline

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A sub-range of a media timeline (chapter, commercial break, ...).
///
/// Marks are absolute positions in milliseconds. `duration` is stored as
/// supplied and is not derived from the marks. No field changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    identifier: String,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    blocking_reason: Option<String>,
    mark_in: i64,
    mark_out: i64,
    duration: i64,
    displayable: bool,
    #[serde(default)]
    is_live: bool,
    #[serde(default)]
    is_360: bool,
}

impl Segment {
    /// Create a segment whose marks are relative to `reference_date`.
    ///
    /// Both marks are shifted by `reference_date`. Mark ordering is not
    /// checked.
    #[allow(clippy::too_many_arguments)]
    pub fn with_reference_date(
        identifier: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        image_url: Option<String>,
        blocking_reason: Option<String>,
        mark_in: i64,
        mark_out: i64,
        duration: i64,
        displayable: bool,
        is_live: bool,
        is_360: bool,
        reference_date: i64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description,
            image_url,
            blocking_reason,
            mark_in: reference_date.saturating_add(mark_in),
            mark_out: reference_date.saturating_add(mark_out),
            duration,
            displayable,
            is_live,
            is_360,
        }
    }

    /// Create a segment with absolute marks.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        image_url: Option<String>,
        blocking_reason: Option<String>,
        mark_in: i64,
        mark_out: i64,
        duration: i64,
        displayable: bool,
        is_live: bool,
        is_360: bool,
    ) -> Self {
        Self::with_reference_date(
            identifier,
            title,
            description,
            image_url,
            blocking_reason,
            mark_in,
            mark_out,
            duration,
            displayable,
            is_live,
            is_360,
            0,
        )
    }

    /// Short form without description, image or live/360 flags.
    pub fn simple(
        identifier: impl Into<String>,
        title: impl Into<String>,
        mark_in: i64,
        mark_out: i64,
        duration: i64,
        displayable: bool,
        blocking_reason: Option<String>,
    ) -> Self {
        Self::new(
            identifier,
            title,
            None,
            None,
            blocking_reason,
            mark_in,
            mark_out,
            duration,
            displayable,
            false,
            false,
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn blocking_reason(&self) -> Option<&str> {
        self.blocking_reason.as_deref()
    }

    pub fn mark_in(&self) -> i64 {
        self.mark_in
    }

    pub fn mark_out(&self) -> i64 {
        self.mark_out
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn is_displayable(&self) -> bool {
        self.displayable
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    pub fn is_360(&self) -> bool {
        self.is_360
    }

    /// True when a non-empty blocking reason is set.
    pub fn is_blocked(&self) -> bool {
        self.blocking_reason.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// True when `position` lies in `[mark_in, mark_out)`.
    pub fn contains(&self, position: i64) -> bool {
        self.mark_in <= position && position < self.mark_out
    }

    /// Copy of this segment with both marks moved by `offset`.
    pub fn shifted(&self, offset: i64) -> Self {
        Self {
            mark_in: self.mark_in.saturating_add(offset),
            mark_out: self.mark_out.saturating_add(offset),
            ..self.clone()
        }
    }

    /// Timeline order: by `mark_in` only.
    ///
    /// Not exposed as `Ord` since equal mark-ins do not imply equal segments.
    pub fn compare(&self, other: &Segment) -> Ordering {
        self.mark_in.cmp(&other.mark_in)
    }
}

/// Stable sort by `mark_in`; segments sharing a mark-in keep their order.
pub fn sort_by_mark_in(segments: &mut [Segment]) {
    segments.sort_by(Segment::compare);
}
