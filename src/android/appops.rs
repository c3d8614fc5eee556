use std::rc::Rc;

use crate::{
    Result,
    config::PER_USER_RANGE,
    dumpsys::ServiceDump,
    error::Error,
    model::OpMode,
    platform::{AppOps, CheckStrategy},
};

const FIRST_APPLICATION_UID: u32 = 10_000;

/// App-op modes read from `dumpsys appops`.
pub struct AppOpsService {
    dumpsys: Rc<dyn ServiceDump>,
}

impl AppOpsService {
    pub fn new(dumpsys: Rc<dyn ServiceDump>) -> Self {
        Self { dumpsys }
    }
}

impl AppOps for AppOpsService {
    fn check_op(
        &self,
        strategy: CheckStrategy,
        op: &str,
        uid: u32,
        package: &str,
    ) -> Result<OpMode> {
        let op_name = op_dump_name(op)?;

        let dump = match strategy {
            CheckStrategy::Unsafe => self
                .dumpsys
                .dump("appops", &["--package", package, "--op", op_name.as_str()])?,
            CheckStrategy::Legacy => self.dumpsys.dump("appops", &[])?,
        };
        super::ensure_dumpable("appops", &dump)?;

        parse_op_mode(&dump, &op_name, uid, package)
    }
}

/// `android:get_usage_stats` is dumped as `GET_USAGE_STATS`.
fn op_dump_name(op: &str) -> Result<String> {
    op.strip_prefix("android:")
        .filter(|name| !name.is_empty())
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| Error::Malformed {
            service: "appops",
            reason: format!("`{op}` is not a public op name"),
        })
}

/// `Uid 10234:` or `Uid u0a234:`
fn parse_uid_header(line: &str) -> Option<u32> {
    let uid = line.strip_prefix("Uid ")?.strip_suffix(':')?;
    if let Ok(uid) = uid.parse() {
        return Some(uid);
    }

    let (user, app) = uid.strip_prefix('u')?.split_once('a')?;
    let user: u32 = user.parse().ok()?;
    let app: u32 = app.parse().ok()?;
    Some(user * PER_USER_RANGE + FIRST_APPLICATION_UID + app)
}

fn parse_mode(op_name: &str, token: &str) -> Result<OpMode> {
    OpMode::from_name(token).ok_or_else(|| Error::Malformed {
        service: "appops",
        reason: format!("unknown mode `{token}` for {op_name}"),
    })
}

/// A uid-wide mode wins over the package mode; no entry means the op was
/// never touched.
fn parse_op_mode(dump: &str, op_name: &str, uid: u32, package: &str) -> Result<OpMode> {
    let mut in_uid = false;
    let mut in_package_block = false;
    let mut in_package = false;
    let mut uid_mode = None;
    let mut package_mode = None;

    for line in dump.lines().map(str::trim) {
        if let Some(section_uid) = parse_uid_header(line) {
            in_uid = section_uid == uid;
            in_package_block = false;
            in_package = false;
            continue;
        }

        if !in_uid {
            continue;
        }

        if let Some(name) = line.strip_prefix("Package ").and_then(|l| l.strip_suffix(':')) {
            in_package_block = true;
            in_package = name == package;
            continue;
        }

        let Some(rest) = line.strip_prefix(op_name) else {
            continue;
        };

        if let Some(mode) = rest.strip_prefix(": mode=") {
            if !in_package_block {
                uid_mode = Some(parse_mode(op_name, mode.trim())?);
            }
        } else if let Some(mode) = rest.strip_prefix(" (") {
            if in_package {
                let token = mode
                    .split(|c: char| c == ')' || c == ' ' || c == '/')
                    .next()
                    .unwrap_or_default();
                package_mode = Some(parse_mode(op_name, token)?);
            }
        }
    }

    tracing::trace!(?uid_mode, ?package_mode, op_name, "parsed app-op modes");

    Ok(uid_mode.or(package_mode).unwrap_or(OpMode::Default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::testing::CannedDumpsys;

    const DUMP: &str = "\
Current AppOps Service state:
  Settings:
    top_state_settle_time=+5s0ms
  Uid 10100:
    state=cch
    GET_USAGE_STATS: mode=allow
  Uid 10234:
    state=top
    COARSE_LOCATION: mode=ignore
    Package com.example:
      GET_USAGE_STATS (ignore):
      READ_CLIPBOARD (allow):
    Package com.example.other:
      GET_USAGE_STATS (allow):
";

    #[test]
    fn op_names_are_uppercased() {
        assert_eq!(op_dump_name("android:get_usage_stats").unwrap(), "GET_USAGE_STATS");
        assert!(op_dump_name("get_usage_stats").is_err());
    }

    #[test]
    fn uid_headers_in_both_forms() {
        assert_eq!(parse_uid_header("Uid 10234:"), Some(10234));
        assert_eq!(parse_uid_header("Uid u10a234:"), Some(1_010_234));
        assert_eq!(parse_uid_header("Uid mode watchers:"), None);
    }

    #[test]
    fn package_mode_of_matching_uid() {
        let mode = parse_op_mode(DUMP, "GET_USAGE_STATS", 10234, "com.example").unwrap();
        assert_eq!(mode, OpMode::Ignored);

        let mode = parse_op_mode(DUMP, "GET_USAGE_STATS", 10234, "com.example.other").unwrap();
        assert_eq!(mode, OpMode::Allowed);
    }

    #[test]
    fn uid_mode_takes_precedence() {
        let dump = "\
  Uid u0a234:
    GET_USAGE_STATS: mode=allow
    Package com.example:
      GET_USAGE_STATS (ignore):
";
        let mode = parse_op_mode(dump, "GET_USAGE_STATS", 10234, "com.example").unwrap();
        assert_eq!(mode, OpMode::Allowed);
    }

    #[test]
    fn untouched_op_is_default() {
        let mode = parse_op_mode(DUMP, "GET_USAGE_STATS", 10999, "com.missing").unwrap();
        assert_eq!(mode, OpMode::Default);
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let dump = "  Uid 10234:\n    Package com.example:\n      GET_USAGE_STATS (sometimes):\n";
        assert!(parse_op_mode(dump, "GET_USAGE_STATS", 10234, "com.example").is_err());
    }

    #[test]
    fn strategy_selects_dump_arguments() {
        let dumpsys = Rc::new(CannedDumpsys::with("appops", DUMP));
        let ops = AppOpsService::new(dumpsys.clone());

        ops.check_op(CheckStrategy::Unsafe, "android:get_usage_stats", 10234, "com.example")
            .unwrap();
        ops.check_op(CheckStrategy::Legacy, "android:get_usage_stats", 10234, "com.example")
            .unwrap();

        let calls = dumpsys.calls.borrow();
        assert_eq!(
            calls[0].1,
            ["--package", "com.example", "--op", "GET_USAGE_STATS"]
        );
        assert!(calls[1].1.is_empty());
    }
}
