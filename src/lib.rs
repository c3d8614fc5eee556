//! Recent app usage on an Android device, behind the usage-access app-op.
//!
//! A fetch cycle checks `android:get_usage_stats` for the configured process
//! identity, then whether the user's credential-encrypted storage is
//! unlocked, and only then queries either the last ten minutes of usage
//! events or the installed non-system applications. The rows end up on a
//! [`Surface`].
//!
//! # Example
//!
//! ```no_run
//! use usage_history::{Config, FetchMode, FetchOutcome, TextSurface, UsageHistory, android};
//!
//! # fn foo() -> Result<(), usage_history::error::Error> {
//! let config = Config::detect()?.with_mode(FetchMode::UsageEvents);
//! let platform = android::platform(&config)?;
//! let mut history = UsageHistory::new(config, platform, TextSurface::default());
//!
//! if let FetchOutcome::Rendered(_) = history.fetch() {
//!     println!("{}", history.surface().text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod android;
pub mod apps;
pub mod config;
pub mod device;
pub mod dumpsys;
pub mod error;
pub mod model;
pub mod permission;
pub mod pipeline;
pub mod platform;
pub mod surface;
mod task_thread;
pub mod usage;

pub use config::Config;
pub use model::{
    ApplicationEntry, ApplicationFlags, FetchMode, PermissionState, UnlockState, UsageRecord,
};
pub use permission::RequestToken;
pub use pipeline::{FetchOutcome, UsageHistory};
pub use platform::Platform;
pub use surface::{ListSurface, Surface, TextSurface};

pub type Result<T, E = crate::error::Error> = core::result::Result<T, E>;
