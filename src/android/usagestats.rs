use std::rc::Rc;

use crate::{Result, dumpsys::ServiceDump, model::UsageRecord, platform::UsageEventSource};

/// Usage events from `dumpsys usagestats`.
///
/// The compact form (`-c`) prints event times as epoch milliseconds; events
/// are only listed under the daily interval, so each appears once per user.
pub struct UsageStatsService {
    dumpsys: Rc<dyn ServiceDump>,
    user_id: u32,
}

impl UsageStatsService {
    pub fn new(dumpsys: Rc<dyn ServiceDump>, user_id: u32) -> Self {
        Self { dumpsys, user_id }
    }
}

impl UsageEventSource for UsageStatsService {
    fn query_events(&self, start_millis: i64, end_millis: i64) -> Result<Vec<UsageRecord>> {
        let dump = self.dumpsys.dump("usagestats", &["-c"])?;
        super::ensure_dumpable("usagestats", &dump)?;

        let mut records: Vec<_> = parse_events(&dump, self.user_id)
            .filter(|r| (start_millis..end_millis).contains(&r.timestamp_millis))
            .collect();
        // stable: events sharing a timestamp keep their dump order
        records.sort_by_key(|r| r.timestamp_millis);

        Ok(records)
    }
}

/// `time=<ms> type=<TYPE> package=<pkg> ...` lines of one user's section.
fn parse_events(dump: &str, user_id: u32) -> impl Iterator<Item = UsageRecord> + '_ {
    let mut current_user = None;

    dump.lines().map(str::trim).filter_map(move |line| {
        if let Some(user) = line.strip_prefix("user=") {
            current_user = user.split_whitespace().next().and_then(|u| u.parse::<u32>().ok());
            return None;
        }

        if !line.starts_with("time=") || current_user.is_some_and(|u| u != user_id) {
            return None;
        }

        let mut time = None;
        let mut package = None;
        for (key, value) in line.split_whitespace().filter_map(|pair| pair.split_once('=')) {
            match key {
                "time" => time = value.parse::<i64>().ok(),
                "package" => package = Some(value),
                _ => {}
            }
        }

        match (time, package) {
            (Some(time), Some(package)) => Some(UsageRecord::new(package, time)),
            _ => {
                tracing::trace!(line, "skipping unparsable usage event");
                None
            }
        }
    })
}
