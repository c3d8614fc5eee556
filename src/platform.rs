//! Boundaries to the host platform.
//!
//! The gates and fetchers only see these traits; [`crate::android`] backs
//! them with binder dumps, tests back them with in-memory fakes.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    Result,
    model::{ApplicationInfo, OpMode, UsageRecord},
};

pub const OPSTR_GET_USAGE_STATS: &str = "android:get_usage_stats";

pub const ACTION_USAGE_ACCESS_SETTINGS: &str = "android.settings.USAGE_ACCESS_SETTINGS";

/// `PackageManager.GET_META_DATA`
pub const GET_META_DATA: u32 = 0x0000_0080;

/// How the op mode is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStrategy {
    /// `unsafeCheckOpNoThrow`, scoped to one package and op.
    Unsafe,
    /// `checkOpNoThrow`, on platforms predating the scoped query.
    Legacy,
}

pub trait AppOps {
    fn check_op(
        &self,
        strategy: CheckStrategy,
        op: &str,
        uid: u32,
        package: &str,
    ) -> Result<OpMode>;
}

pub trait UserState {
    fn is_user_unlocked(&self, user_id: u32) -> Result<bool>;
}

pub trait UsageEventSource {
    /// Events in `[start_millis, end_millis)`, in chronological order.
    fn query_events(&self, start_millis: i64, end_millis: i64) -> Result<Vec<UsageRecord>>;
}

pub trait AppRegistry {
    fn installed_applications(&self, flags: u32) -> Result<Vec<ApplicationInfo>>;

    fn application_label(&self, info: &ApplicationInfo) -> Result<String>;
}

pub trait SettingsNavigator {
    /// Launches the settings surface. The host reports when the user is
    /// back, see [`crate::UsageHistory::on_grant_flow_completed`].
    fn open(&self, action: &str) -> Result<()>;
}

pub trait Clock {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Everything a fetch cycle talks to.
pub struct Platform {
    pub app_ops: Box<dyn AppOps>,
    pub users: Box<dyn UserState>,
    pub events: Box<dyn UsageEventSource>,
    pub registry: Box<dyn AppRegistry>,
    pub settings: Box<dyn SettingsNavigator>,
    pub clock: Box<dyn Clock>,
}
