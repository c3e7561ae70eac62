//! Activity markers for debugging tools
//!
//! The dispatcher brackets the router call, the controller lifecycle and
//! response printing with [`Activity`] values and hands them to a [`Timeline`].
//! Recording is best-effort: a failure is logged and the response is unaffected.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Group used for the activities recorded by the framework itself
pub const FRAMEWORK_GROUP: &str = "Cadenza";

/// Capacity of [`MemoryTimeline::new`]
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10_000;

/// A timed span of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
	pub name: String,
	pub group: Option<String>,
	pub started_at: Instant,
	pub ended_at: Option<Instant>,
}

impl Activity {
	/// Start timing an activity
	pub fn start(name: impl Into<String>, group: Option<&str>) -> Self {
		Self {
			name: name.into(),
			group: group.map(str::to_string),
			started_at: Instant::now(),
			ended_at: None,
		}
	}

	/// Stop timing; calling it again keeps the first end time
	pub fn end(mut self) -> Self {
		self.ended_at.get_or_insert_with(Instant::now);
		self
	}

	/// Elapsed time, `None` while the activity is still running
	pub fn duration(&self) -> Option<Duration> {
		self.ended_at
			.map(|ended_at| ended_at.duration_since(self.started_at))
	}
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
	#[error("Timeline is full ({0} activities)")]
	Full(usize),
}

/// Sink for activities
pub trait Timeline: Send + Sync {
	fn record(&self, activity: Activity) -> Result<(), TimelineError>;
}

/// Timeline discarding everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTimeline;

impl Timeline for NoopTimeline {
	fn record(&self, _activity: Activity) -> Result<(), TimelineError> {
		Ok(())
	}
}

/// Timeline keeping activities in memory
///
/// Meant for inspection and tests. Nothing is evicted: once the limit is
/// reached every further activity is refused until [`MemoryTimeline::clear`].
///
/// # Examples
///
/// ```
/// use cadenza_dispatch::timeline::{Activity, MemoryTimeline, Timeline};
///
/// let timeline = MemoryTimeline::with_limit(1);
/// timeline.record(Activity::start("Router (handle)", Some("Cadenza")).end()).unwrap();
///
/// assert!(timeline.record(Activity::start("Controller", None).end()).is_err());
/// assert_eq!(timeline.names(), vec!["Router (handle)"]);
/// ```
#[derive(Debug)]
pub struct MemoryTimeline {
	activities: Mutex<Vec<Activity>>,
	limit: usize,
}

impl MemoryTimeline {
	/// Timeline holding up to [`DEFAULT_ACTIVITY_LIMIT`] activities
	pub fn new() -> Self {
		Self::with_limit(DEFAULT_ACTIVITY_LIMIT)
	}

	/// Refuse activities past `limit`
	pub fn with_limit(limit: usize) -> Self {
		Self {
			activities: Mutex::new(Vec::new()),
			limit,
		}
	}

	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Snapshot of recorded activities
	pub fn activities(&self) -> Vec<Activity> {
		self.activities.lock().clone()
	}

	/// Names of recorded activities, in recording order
	pub fn names(&self) -> Vec<String> {
		self.activities
			.lock()
			.iter()
			.map(|activity| activity.name.clone())
			.collect()
	}

	pub fn clear(&self) {
		self.activities.lock().clear();
	}
}

impl Default for MemoryTimeline {
	fn default() -> Self {
		Self::new()
	}
}

impl Timeline for MemoryTimeline {
	fn record(&self, activity: Activity) -> Result<(), TimelineError> {
		let mut activities = self.activities.lock();
		if activities.len() >= self.limit {
			return Err(TimelineError::Full(self.limit));
		}
		activities.push(activity);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_end_is_idempotent() {
		let activity = Activity::start("Controller", Some(FRAMEWORK_GROUP)).end();
		let first_end = activity.ended_at;

		let activity = activity.end();
		assert_eq!(activity.ended_at, first_end);
		assert!(activity.duration().is_some());
	}

	#[rstest]
	fn test_running_activity_has_no_duration() {
		assert!(Activity::start("Print response", None).duration().is_none());
	}

	#[rstest]
	fn test_memory_timeline_keeps_order() {
		let timeline = MemoryTimeline::new();
		for name in ["a", "b", "c"] {
			timeline.record(Activity::start(name, None).end()).unwrap();
		}

		assert_eq!(timeline.names(), vec!["a", "b", "c"]);
		timeline.clear();
		assert!(timeline.activities().is_empty());
	}

	#[rstest]
	fn test_memory_timeline_is_bounded_by_default() {
		let timeline = MemoryTimeline::default();
		assert_eq!(timeline.limit(), DEFAULT_ACTIVITY_LIMIT);

		for _ in 0..DEFAULT_ACTIVITY_LIMIT {
			timeline.record(Activity::start("Controller", None).end()).unwrap();
		}

		let refused = timeline.record(Activity::start("Controller", None).end());
		assert!(matches!(refused, Err(TimelineError::Full(DEFAULT_ACTIVITY_LIMIT))));
		assert_eq!(timeline.activities().len(), DEFAULT_ACTIVITY_LIMIT);

		timeline.clear();
		assert!(timeline.record(Activity::start("Controller", None).end()).is_ok());
	}
}
