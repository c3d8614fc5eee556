use std::{fmt, str::FromStr};

use crate::error::Error;

/// A single usage event, as produced by the event cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub package: String,
    pub timestamp_millis: i64,
}

impl UsageRecord {
    pub fn new<S: Into<String>>(package: S, timestamp_millis: i64) -> Self {
        Self {
            package: package.into(),
            timestamp_millis,
        }
    }
}

impl fmt::Display for UsageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " Package - {} Time -  {}",
            self.package, self.timestamp_millis
        )
    }
}

/// `ApplicationInfo.flags` bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ApplicationFlags(pub u32);

impl ApplicationFlags {
    pub const SYSTEM: Self = Self(1 << 0);
    pub const DEBUGGABLE: Self = Self(1 << 1);
    pub const HAS_CODE: Self = Self(1 << 2);
    pub const PERSISTENT: Self = Self(1 << 3);
    pub const FACTORY_TEST: Self = Self(1 << 4);
    pub const ALLOW_TASK_REPARENTING: Self = Self(1 << 5);
    pub const ALLOW_CLEAR_USER_DATA: Self = Self(1 << 6);
    pub const UPDATED_SYSTEM_APP: Self = Self(1 << 7);
    pub const TEST_ONLY: Self = Self(1 << 8);
    pub const SUPPORTS_SMALL_SCREENS: Self = Self(1 << 9);
    pub const SUPPORTS_NORMAL_SCREENS: Self = Self(1 << 10);
    pub const SUPPORTS_LARGE_SCREENS: Self = Self(1 << 11);
    pub const RESIZEABLE_FOR_SCREENS: Self = Self(1 << 12);
    pub const SUPPORTS_SCREEN_DENSITIES: Self = Self(1 << 13);
    pub const VM_SAFE_MODE: Self = Self(1 << 14);
    pub const ALLOW_BACKUP: Self = Self(1 << 15);
    pub const KILL_AFTER_RESTORE: Self = Self(1 << 16);
    pub const RESTORE_ANY_VERSION: Self = Self(1 << 17);
    pub const EXTERNAL_STORAGE: Self = Self(1 << 18);
    pub const SUPPORTS_XLARGE_SCREENS: Self = Self(1 << 19);
    pub const LARGE_HEAP: Self = Self(1 << 20);
    pub const STOPPED: Self = Self(1 << 21);
    pub const SUPPORTS_RTL: Self = Self(1 << 22);
    pub const INSTALLED: Self = Self(1 << 23);
    pub const IS_DATA_ONLY: Self = Self(1 << 24);
    pub const IS_GAME: Self = Self(1 << 25);
    pub const FULL_BACKUP_ONLY: Self = Self(1 << 26);
    pub const USES_CLEARTEXT_TRAFFIC: Self = Self(1 << 27);
    pub const EXTRACT_NATIVE_LIBS: Self = Self(1 << 28);
    pub const HARDWARE_ACCELERATED: Self = Self(1 << 29);
    pub const SUSPENDED: Self = Self(1 << 30);
    pub const MULTIARCH: Self = Self(1 << 31);

    /// Flag names as printed by `dumpsys package`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "SYSTEM" => Self::SYSTEM,
            "DEBUGGABLE" => Self::DEBUGGABLE,
            "HAS_CODE" => Self::HAS_CODE,
            "PERSISTENT" => Self::PERSISTENT,
            "FACTORY_TEST" => Self::FACTORY_TEST,
            "ALLOW_TASK_REPARENTING" => Self::ALLOW_TASK_REPARENTING,
            "ALLOW_CLEAR_USER_DATA" => Self::ALLOW_CLEAR_USER_DATA,
            "UPDATED_SYSTEM_APP" => Self::UPDATED_SYSTEM_APP,
            "TEST_ONLY" => Self::TEST_ONLY,
            "SUPPORTS_SMALL_SCREENS" => Self::SUPPORTS_SMALL_SCREENS,
            "SUPPORTS_NORMAL_SCREENS" => Self::SUPPORTS_NORMAL_SCREENS,
            "SUPPORTS_LARGE_SCREENS" => Self::SUPPORTS_LARGE_SCREENS,
            "RESIZEABLE_FOR_SCREENS" => Self::RESIZEABLE_FOR_SCREENS,
            "SUPPORTS_SCREEN_DENSITIES" => Self::SUPPORTS_SCREEN_DENSITIES,
            "VM_SAFE_MODE" => Self::VM_SAFE_MODE,
            "ALLOW_BACKUP" => Self::ALLOW_BACKUP,
            "KILL_AFTER_RESTORE" => Self::KILL_AFTER_RESTORE,
            "RESTORE_ANY_VERSION" => Self::RESTORE_ANY_VERSION,
            "EXTERNAL_STORAGE" => Self::EXTERNAL_STORAGE,
            "SUPPORTS_XLARGE_SCREENS" => Self::SUPPORTS_XLARGE_SCREENS,
            "LARGE_HEAP" => Self::LARGE_HEAP,
            "STOPPED" => Self::STOPPED,
            "SUPPORTS_RTL" => Self::SUPPORTS_RTL,
            "INSTALLED" => Self::INSTALLED,
            "IS_DATA_ONLY" => Self::IS_DATA_ONLY,
            "IS_GAME" => Self::IS_GAME,
            "FULL_BACKUP_ONLY" => Self::FULL_BACKUP_ONLY,
            "USES_CLEARTEXT_TRAFFIC" => Self::USES_CLEARTEXT_TRAFFIC,
            "EXTRACT_NATIVE_LIBS" => Self::EXTRACT_NATIVE_LIBS,
            "HARDWARE_ACCELERATED" => Self::HARDWARE_ACCELERATED,
            "SUSPENDED" => Self::SUSPENDED,
            "MULTIARCH" => Self::MULTIARCH,
            _ => return None,
        })
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 & Self::SYSTEM.0 != 0
    }
}

impl std::ops::BitOr for ApplicationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ApplicationFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Raw record handed out by an application registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub package: String,
    pub flags: ApplicationFlags,
}

/// Registry record with its label resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEntry {
    pub package: String,
    pub label: String,
    pub is_system: bool,
}

/// `AppOpsManager` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Allowed,
    Ignored,
    Denied,
    Default,
    Foreground,
}

impl OpMode {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "allow" => Self::Allowed,
            "ignore" => Self::Ignored,
            "deny" => Self::Denied,
            "default" => Self::Default,
            "foreground" => Self::Foreground,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

impl From<OpMode> for PermissionState {
    fn from(mode: OpMode) -> Self {
        match mode {
            OpMode::Allowed => Self::Granted,
            _ => Self::Denied,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    Unlocked,
    Locked,
}

/// Which data a fetch cycle renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    UsageEvents,
    #[default]
    NonSystemApps,
}

impl FromStr for FetchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" | "usage" | "usage-events" => Ok(Self::UsageEvents),
            "apps" | "non-system-apps" => Ok(Self::NonSystemApps),
            other => Err(Error::Config(format!("unknown fetch mode `{other}`"))),
        }
    }
}
