use crate::{
    Result,
    apps::{app_rows, list_non_system_apps},
    config::Config,
    device::UnlockGate,
    model::{FetchMode, PermissionState, UnlockState},
    permission::{GrantRequests, PermissionGate, RequestToken},
    platform::Platform,
    surface::Surface,
    usage::{QueryWindow, query_usage_events, usage_rows},
};

pub const PERMISSION_NOT_GRANTED: &str = "Permission Not Granted";
pub const USER_NOT_UNLOCKED: &str = "User device is not unlocked";

/// How one fetch cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows handed to the surface.
    Rendered(usize),
    PermissionDenied,
    DeviceLocked,
    /// The query itself failed; nothing was rendered.
    Failed(String),
}

/// Permission gate, unlock gate, then one query, rendered onto a [`Surface`].
///
/// # Example
///
/// ```no_run
/// use usage_history::{Config, ListSurface, UsageHistory, android};
///
/// # fn foo() -> Result<(), usage_history::error::Error> {
/// let config = Config::detect()?;
/// let platform = android::platform(&config)?;
/// let mut history = UsageHistory::new(config, platform, ListSurface::default());
///
/// if history.fetch() == usage_history::FetchOutcome::PermissionDenied {
///     let token = history.initiate_grant_request()?;
///     history.on_grant_flow_completed(token)?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct UsageHistory<S: Surface> {
    config: Config,
    platform: Platform,
    surface: S,
    permission: PermissionGate,
    unlock: UnlockGate,
    requests: GrantRequests,
}

impl<S: Surface> UsageHistory<S> {
    pub fn new(config: Config, platform: Platform, surface: S) -> Self {
        let capabilities = config.capabilities();

        Self {
            permission: PermissionGate::new(capabilities, config.uid, config.package_name.clone()),
            unlock: UnlockGate::new(capabilities, config.user_id),
            requests: GrantRequests::default(),
            config,
            platform,
            surface,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_mode(&mut self, mode: FetchMode) {
        self.config.mode = mode;
    }

    /// Runs one cycle from the top, re-checking both gates.
    pub fn fetch(&mut self) -> FetchOutcome {
        if self.permission.check(self.platform.app_ops.as_ref()) == PermissionState::Denied {
            self.surface.notify(PERMISSION_NOT_GRANTED);
            self.surface.set_request_visible(true);
            return FetchOutcome::PermissionDenied;
        }
        self.surface.set_request_visible(false);

        if self.unlock.check(self.platform.users.as_ref()) == UnlockState::Locked {
            self.surface.set_request_visible(true);
            self.surface.notify(USER_NOT_UNLOCKED);
            return FetchOutcome::DeviceLocked;
        }
        self.surface.set_request_visible(false);

        match self.query() {
            Ok(rows) => {
                let count = rows.len();
                self.surface.render(rows);
                FetchOutcome::Rendered(count)
            }
            Err(e) => {
                tracing::warn!(mode = ?self.config.mode, "fetch failed: {e}");
                let message = e.to_string();
                self.surface.notify(&message);
                FetchOutcome::Failed(message)
            }
        }
    }

    fn query(&self) -> Result<Vec<String>> {
        match self.config.mode {
            FetchMode::UsageEvents => {
                let window =
                    QueryWindow::preceding(self.platform.clock.now_millis(), self.config.window);
                let events = query_usage_events(self.platform.events.as_ref(), window)?;
                Ok(usage_rows(events))
            }
            FetchMode::NonSystemApps => {
                let entries = list_non_system_apps(self.platform.registry.as_ref())?;
                Ok(app_rows(entries))
            }
        }
    }

    /// Sends the user to the usage access settings. Redeem the token with
    /// [`UsageHistory::on_grant_flow_completed`] when control returns.
    pub fn initiate_grant_request(&mut self) -> Result<RequestToken> {
        self.requests.initiate(self.platform.settings.as_ref())
    }

    /// Re-runs the whole pipeline; the grant may or may not have happened.
    pub fn on_grant_flow_completed(&mut self, token: RequestToken) -> Result<FetchOutcome> {
        self.requests.complete(token)?;
        Ok(self.fetch())
    }
}
