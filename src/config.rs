use std::{env, fs, process::Command, time::Duration};

use crate::{Result, error::Error, model::FetchMode};

pub const PER_USER_RANGE: u32 = 100_000;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

const SDK_N: u32 = 24;
const SDK_Q: u32 = 29;

/// Platform features the gates pick their strategy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// `unsafeCheckOpNoThrow` exists, and `dumpsys appops` takes filters.
    pub unsafe_check_op: bool,
    /// Credential-encrypted storage can be locked for a running user.
    pub user_unlock_state: bool,
}

impl PlatformCapabilities {
    pub const fn from_sdk(sdk_int: u32) -> Self {
        Self {
            unsafe_check_op: sdk_int >= SDK_Q,
            user_unlock_state: sdk_int >= SDK_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub package_name: String,
    pub uid: u32,
    pub user_id: u32,
    pub sdk_int: u32,
    pub mode: FetchMode,
    pub window: Duration,
}

impl Config {
    pub fn new<S: Into<String>>(package_name: S, uid: u32, sdk_int: u32) -> Self {
        Self {
            package_name: package_name.into(),
            uid,
            user_id: uid / PER_USER_RANGE,
            sdk_int,
            mode: FetchMode::default(),
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities::from_sdk(self.sdk_int)
    }

    /// Identity of the running process, from procfs and system properties.
    ///
    /// `USAGE_HISTORY_PACKAGE`, `USAGE_HISTORY_SDK` and `USAGE_HISTORY_MODE`
    /// override the detected values.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn foo() -> Result<(), usage_history::error::Error> {
    /// let config = usage_history::Config::detect()?;
    /// println!("{} ({})", config.package_name, config.uid);
    /// # Ok(())
    /// # }
    /// ```
    pub fn detect() -> Result<Self> {
        let uid = parse_status_uid(&fs::read_to_string("/proc/self/status")?)?;

        let package_name = match env::var("USAGE_HISTORY_PACKAGE") {
            Ok(name) => name,
            Err(_) => parse_cmdline(&fs::read("/proc/self/cmdline")?)?,
        };

        let sdk_int = match env::var("USAGE_HISTORY_SDK") {
            Ok(sdk) => parse_sdk(&sdk)?,
            Err(_) => {
                let output = Command::new("getprop")
                    .arg("ro.build.version.sdk")
                    .output()?;
                parse_sdk(&String::from_utf8_lossy(&output.stdout))?
            }
        };

        let mut config = Self::new(package_name, uid, sdk_int);
        if let Ok(mode) = env::var("USAGE_HISTORY_MODE") {
            config.mode = mode.parse()?;
        }

        tracing::debug!(?config, "detected configuration");

        Ok(config)
    }
}

fn parse_status_uid(status: &str) -> Result<u32> {
    status
        .lines()
        .find_map(|l| l.strip_prefix("Uid:"))
        .and_then(|l| l.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
        .ok_or_else(|| Error::Config("no real uid in /proc/self/status".into()))
}

fn parse_cmdline(cmdline: &[u8]) -> Result<String> {
    let argv0 = cmdline.split(|b| *b == 0).next().unwrap_or_default();
    let argv0 = String::from_utf8_lossy(argv0);
    // app processes are named `<package>` or `<package>:<process>`
    let package = argv0.split(':').next().unwrap_or_default().trim();
    if package.is_empty() || package.contains('/') {
        return Err(Error::Config(format!(
            "process name `{argv0}` is not a package name, set USAGE_HISTORY_PACKAGE"
        )));
    }
    Ok(package.to_owned())
}

fn parse_sdk(sdk: &str) -> Result<u32> {
    sdk.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid sdk level `{}`", sdk.trim())))
}
