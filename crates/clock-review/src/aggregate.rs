//! Think-time accumulation per time-control class and move quality.

use chess_analysis::MoveQuality;

use crate::clock::PlayerTimeline;
use crate::error::ReviewError;
use crate::time_control::TimeControlClass;

/// Think times of one time-control class, grouped by move quality.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateBucket {
    class: TimeControlClass,
    categories: [Vec<f64>; MoveQuality::COUNT],
    was_analyzed: bool,
}

impl AggregateBucket {
    pub fn new(class: TimeControlClass) -> Self {
        Self {
            class,
            categories: Default::default(),
            was_analyzed: false,
        }
    }

    /// Creates a bucket from a class label such as `"Blitz"`.
    pub fn for_label(label: &str) -> Result<Self, ReviewError> {
        Ok(Self::new(label.parse()?))
    }

    pub fn class(&self) -> TimeControlClass {
        self.class
    }

    /// Whether at least one non-empty timeline has been accumulated.
    pub fn was_analyzed(&self) -> bool {
        self.was_analyzed
    }

    /// Recorded think times for one quality, in insertion order.
    pub fn times(&self, quality: MoveQuality) -> &[f64] {
        &self.categories[quality.index()]
    }

    /// Total number of recorded think times.
    pub fn observation_count(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Length of the longest category.
    pub fn longest_category(&self) -> usize {
        self.categories.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Adds one game's timeline. Zero think times are not recorded.
    pub fn accumulate(&mut self, timeline: &PlayerTimeline) {
        for mv in timeline.moves() {
            if mv.think_time != 0.0 {
                self.categories[mv.quality.index()].push(mv.think_time);
            }
        }
        if !timeline.is_empty() {
            self.was_analyzed = true;
        }
    }

    /// Folds another bucket of the same class into this one.
    pub fn merge(&mut self, other: AggregateBucket) {
        debug_assert_eq!(self.class, other.class);
        for (mine, theirs) in self.categories.iter_mut().zip(other.categories) {
            mine.extend(theirs);
        }
        self.was_analyzed |= other.was_analyzed;
    }
}

/// One [`AggregateBucket`] per time-control class.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeControlBuckets {
    buckets: [AggregateBucket; TimeControlClass::COUNT],
}

impl Default for TimeControlBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeControlBuckets {
    pub fn new() -> Self {
        Self {
            buckets: TimeControlClass::ALL.map(AggregateBucket::new),
        }
    }

    pub fn get(&self, class: TimeControlClass) -> &AggregateBucket {
        &self.buckets[class.index()]
    }

    pub fn accumulate(&mut self, class: TimeControlClass, timeline: &PlayerTimeline) {
        self.buckets[class.index()].accumulate(timeline);
    }

    pub fn merge(&mut self, other: TimeControlBuckets) {
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets) {
            mine.merge(theirs);
        }
    }

    /// All buckets, fastest class first.
    pub fn iter(&self) -> impl Iterator<Item = &AggregateBucket> {
        self.buckets.iter()
    }

    /// Buckets that received at least one non-empty timeline.
    pub fn analyzed(&self) -> impl Iterator<Item = &AggregateBucket> {
        self.buckets.iter().filter(|b| b.was_analyzed())
    }
}
