//! Segment timelines
//!
//! A [`Timeline`] splits one global frame axis into a concatenation of named,
//! fixed-duration segments. Exactly one segment is active for every frame in
//! `0..total_duration()`; frames at or past the end are terminal. A segment
//! may hold a nested timeline, which is resolved recursively against the
//! segment-local frame.
//!
//! ```rust
//! use cadence_animation::Timeline;
//!
//! let timeline = Timeline::builder()
//!     .segment("reveal", 300, ())
//!     .segment("select", 600, ())
//!     .build()
//!     .unwrap();
//!
//! let active = timeline.active_segment(300).unwrap();
//! assert_eq!(active.segment.name(), "select");
//! assert_eq!(active.local_frame, 0);
//! assert!(timeline.active_segment(900).is_none());
//! ```

use cadence_core::{ConfigError, Result};
use smallvec::SmallVec;
use tracing::debug;

/// What a segment governs
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentContent<T> {
    Leaf(T),
    Nested(Timeline<T>),
}

/// A named, fixed-duration slice of a timeline
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<T> {
    name: String,
    duration: u32,
    content: SegmentContent<T>,
}

impl<T> Segment<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in frames (always > 0)
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn content(&self) -> &SegmentContent<T> {
        &self.content
    }

    /// The leaf payload, if this segment is not nested
    pub fn payload(&self) -> Option<&T> {
        match &self.content {
            SegmentContent::Leaf(payload) => Some(payload),
            SegmentContent::Nested(_) => None,
        }
    }

    pub fn nested(&self) -> Option<&Timeline<T>> {
        match &self.content {
            SegmentContent::Leaf(_) => None,
            SegmentContent::Nested(timeline) => Some(timeline),
        }
    }
}

/// The segment active at a given frame
#[derive(Debug)]
pub struct ActiveSegment<'a, T> {
    pub index: usize,
    pub segment: &'a Segment<T>,
    /// Frame at which the segment starts on the parent axis
    pub offset: u32,
    /// Frames since the segment started; 0 on its first frame
    pub local_frame: u32,
}

/// One level of a resolved path through nested timelines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub local_frame: u32,
}

/// Result of resolving a frame through every nesting level
#[derive(Debug)]
pub struct SegmentPath<'a, T> {
    /// Outermost level first
    pub entries: SmallVec<[PathEntry<'a>; 4]>,
    /// Active leaf payload. `None` when a nested timeline is shorter than its
    /// segment and has already finished.
    pub leaf: Option<&'a T>,
}

impl<'a, T> SegmentPath<'a, T> {
    /// Local frame at the deepest level reached
    pub fn local_frame(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.local_frame)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Segment names joined with `/`, outermost first
    pub fn qualified_name(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// An immutable, validated sequence of contiguous segments
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline<T> {
    segments: Vec<Segment<T>>,
    /// Start frame of each segment; `offsets[0] == 0`
    offsets: SmallVec<[u32; 8]>,
    total: u32,
}

impl<T> Timeline<T> {
    pub fn builder() -> TimelineBuilder<T> {
        TimelineBuilder::new()
    }

    /// Sum of all segment durations
    pub fn total_duration(&self) -> u32 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a built timeline
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment<T>] {
        &self.segments
    }

    /// Start frame of the segment at `index`
    pub fn offset_of(&self, index: usize) -> Option<u32> {
        self.offsets.get(index).copied()
    }

    pub fn segment_named(&self, name: &str) -> Option<(usize, &Segment<T>)> {
        self.segments
            .iter()
            .enumerate()
            .find(|(_, segment)| segment.name == name)
    }

    /// The segment containing `frame`, or `None` once the timeline has ended
    pub fn active_segment(&self, frame: u32) -> Option<ActiveSegment<'_, T>> {
        if frame >= self.total {
            return None;
        }

        // offsets[0] == 0, so at least one offset is <= frame
        let index = self.offsets.partition_point(|&offset| offset <= frame) - 1;
        let offset = self.offsets[index];
        Some(ActiveSegment {
            index,
            segment: &self.segments[index],
            offset,
            local_frame: frame - offset,
        })
    }

    /// Resolve `frame` through every level of nesting
    pub fn resolve(&self, frame: u32) -> Option<SegmentPath<'_, T>> {
        let mut entries = SmallVec::new();
        let mut timeline = self;
        let mut frame = frame;

        loop {
            let Some(active) = timeline.active_segment(frame) else {
                // Only the outermost level can be terminal for the caller
                if entries.is_empty() {
                    return None;
                }
                return Some(SegmentPath {
                    entries,
                    leaf: None,
                });
            };

            entries.push(PathEntry {
                index: active.index,
                name: active.segment.name(),
                local_frame: active.local_frame,
            });

            match active.segment.content() {
                SegmentContent::Leaf(payload) => {
                    return Some(SegmentPath {
                        entries,
                        leaf: Some(payload),
                    });
                }
                SegmentContent::Nested(inner) => {
                    timeline = inner;
                    frame = active.local_frame;
                }
            }
        }
    }

    /// Iterate over `(offset, segment)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Segment<T>)> {
        self.offsets.iter().copied().zip(self.segments.iter())
    }
}

/// Builder for [`Timeline`]
pub struct TimelineBuilder<T> {
    segments: Vec<Segment<T>>,
}

impl<T> Default for TimelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimelineBuilder<T> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append a leaf segment
    pub fn segment(mut self, name: impl Into<String>, duration: u32, payload: T) -> Self {
        self.segments.push(Segment {
            name: name.into(),
            duration,
            content: SegmentContent::Leaf(payload),
        });
        self
    }

    /// Append a nested timeline lasting exactly as long as its contents
    pub fn nested(self, name: impl Into<String>, timeline: Timeline<T>) -> Self {
        let duration = timeline.total_duration();
        self.nested_for(name, duration, timeline)
    }

    /// Append a nested timeline with an explicit duration. A shorter inner
    /// timeline ends early; a longer one is cut off.
    pub fn nested_for(mut self, name: impl Into<String>, duration: u32, timeline: Timeline<T>) -> Self {
        self.segments.push(Segment {
            name: name.into(),
            duration,
            content: SegmentContent::Nested(timeline),
        });
        self
    }

    pub fn build(self) -> Result<Timeline<T>> {
        if self.segments.is_empty() {
            return Err(ConfigError::EmptyTimeline);
        }

        let mut offsets = SmallVec::with_capacity(self.segments.len());
        let mut total: u32 = 0;
        for (index, segment) in self.segments.iter().enumerate() {
            if segment.duration == 0 {
                return Err(ConfigError::ZeroDuration(segment.name.clone()));
            }
            if self.segments[..index].iter().any(|s| s.name == segment.name) {
                return Err(ConfigError::DuplicateName {
                    kind: "segment",
                    name: segment.name.clone(),
                });
            }
            offsets.push(total);
            total = total
                .checked_add(segment.duration)
                .ok_or_else(|| ConfigError::InvalidParameter {
                    name: "timeline",
                    reason: "total duration overflows u32 frames".to_string(),
                })?;
        }

        debug!(segments = self.segments.len(), total, "timeline built");
        Ok(Timeline {
            segments: self.segments,
            offsets,
            total,
        })
    }
}
