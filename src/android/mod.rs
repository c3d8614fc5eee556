//! [`Platform`] backed by the system services of the running device.

mod appops;
mod package;
mod settings;
mod usagestats;
mod user;

use std::rc::Rc;

pub use appops::AppOpsService;
pub use package::PackageRegistry;
pub use settings::ActivityManagerSettings;
pub use usagestats::UsageStatsService;
pub use user::UserService;

use crate::{
    Result,
    config::Config,
    dumpsys::{BinderDumpsys, ServiceDump},
    error::Error,
    platform::{Platform, SystemClock},
};

/// Wires every boundary to one shared [`BinderDumpsys`].
pub fn platform(config: &Config) -> Result<Platform> {
    let dumpsys: Rc<dyn ServiceDump> = Rc::new(BinderDumpsys::new()?);
    Ok(with_dumpsys(config, dumpsys))
}

pub fn with_dumpsys(config: &Config, dumpsys: Rc<dyn ServiceDump>) -> Platform {
    Platform {
        app_ops: Box::new(AppOpsService::new(dumpsys.clone())),
        users: Box::new(UserService::new(dumpsys.clone())),
        events: Box::new(UsageStatsService::new(dumpsys.clone(), config.user_id)),
        registry: Box::new(PackageRegistry::new(dumpsys, config.user_id)),
        settings: Box::new(ActivityManagerSettings),
        clock: Box::new(SystemClock),
    }
}

/// Services answer a caller without `android.permission.DUMP` with a
/// single denial line instead of their state.
fn ensure_dumpable(service: &'static str, dump: &str) -> Result<()> {
    match dump.lines().find(|l| l.starts_with("Permission Denial")) {
        Some(line) => Err(Error::Malformed {
            service,
            reason: line.to_owned(),
        }),
        None => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{testing::CannedDumpsys, *};
    use crate::{
        model::{FetchMode, PermissionState},
        pipeline::{FetchOutcome, UsageHistory},
        surface::ListSurface,
    };

    const APPOPS: &str = "\
Current AppOps Service state:
  Uid 10234:
    state=top
    Package com.example:
      GET_USAGE_STATS (allow):
";

    const USER: &str = "\
Users:
  UserInfo{0:Owner:c13} running
    State: RUNNING_UNLOCKED
";

    const PACKAGES: &str = "\
Packages:
  Package [com.android.settings] (a1b2c3):
    userId=1000
    flags=[ SYSTEM HAS_CODE PERSISTENT ALLOW_CLEAR_USER_DATA ]
  Package [org.mozilla.firefox] (d4e5f6):
    userId=10120
    flags=[ HAS_CODE ALLOW_CLEAR_USER_DATA ALLOW_BACKUP ]
    User 0: ceDataInode=1 installed=true hidden=false suspended=false
  Package [com.Example] (0a0b0c):
    userId=10234
    flags=[ HAS_CODE ]
";

    #[test]
    fn denial_line_is_an_error() {
        let dump = "Permission Denial: can't dump AppOps from pid=1, uid=10234\n";
        assert!(ensure_dumpable("appops", dump).is_err());
        assert!(ensure_dumpable("appops", APPOPS).is_ok());
    }

    #[test]
    fn dump_backed_pipeline_lists_apps() {
        let dumpsys = CannedDumpsys {
            outputs: vec![
                ("appops", APPOPS.to_owned()),
                ("user", USER.to_owned()),
                ("package", PACKAGES.to_owned()),
            ],
            ..Default::default()
        };
        let config = Config::new("com.example", 10234, 33).with_mode(FetchMode::NonSystemApps);
        let platform = with_dumpsys(&config, Rc::new(dumpsys));

        let gate = crate::permission::PermissionGate::new(config.capabilities(), 10234, "com.example");
        assert_eq!(gate.check(platform.app_ops.as_ref()), PermissionState::Granted);

        let mut history = UsageHistory::new(config, platform, ListSurface::default());
        assert_eq!(history.fetch(), FetchOutcome::Rendered(2));
        assert_eq!(history.surface().rows(), ["com.Example", "org.mozilla.firefox"]);
    }
}
