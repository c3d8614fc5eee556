use std::{iter::FusedIterator, time::Duration, vec};

use crate::{Result, model::UsageRecord, platform::UsageEventSource};

/// Half-open `[start, end)` range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start_millis: i64,
    pub end_millis: i64,
}

impl QueryWindow {
    /// The `span` preceding `now_millis`.
    pub fn preceding(now_millis: i64, span: Duration) -> Self {
        let span = i64::try_from(span.as_millis()).unwrap_or(i64::MAX);
        Self {
            start_millis: now_millis.saturating_sub(span),
            end_millis: now_millis,
        }
    }

    #[inline]
    pub fn contains(&self, timestamp_millis: i64) -> bool {
        (self.start_millis..self.end_millis).contains(&timestamp_millis)
    }
}

/// Forward-only cursor over one query's events. Reading again needs a new
/// query.
#[derive(Debug)]
pub struct UsageEvents {
    inner: vec::IntoIter<UsageRecord>,
}

impl Iterator for UsageEvents {
    type Item = UsageRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for UsageEvents {}

impl FusedIterator for UsageEvents {}

pub fn query_usage_events(
    source: &dyn UsageEventSource,
    window: QueryWindow,
) -> Result<UsageEvents> {
    let mut records = source.query_events(window.start_millis, window.end_millis)?;
    records.retain(|r| window.contains(r.timestamp_millis));

    tracing::debug!(?window, events = records.len(), "queried usage events");

    Ok(UsageEvents {
        inner: records.into_iter(),
    })
}

pub fn usage_rows(events: UsageEvents) -> Vec<String> {
    events.map(|r| r.to_string()).collect()
}
