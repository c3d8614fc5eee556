use crate::{
    Result,
    config::PlatformCapabilities,
    error::Error,
    model::PermissionState,
    platform::{
        ACTION_USAGE_ACCESS_SETTINGS, AppOps, CheckStrategy, OPSTR_GET_USAGE_STATS,
        SettingsNavigator,
    },
};

/// Checks the usage-access app-op for one process identity.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    strategy: CheckStrategy,
    uid: u32,
    package: String,
}

impl PermissionGate {
    pub fn new<S: Into<String>>(capabilities: PlatformCapabilities, uid: u32, package: S) -> Self {
        let strategy = if capabilities.unsafe_check_op {
            CheckStrategy::Unsafe
        } else {
            CheckStrategy::Legacy
        };

        Self {
            strategy,
            uid,
            package: package.into(),
        }
    }

    pub fn strategy(&self) -> CheckStrategy {
        self.strategy
    }

    /// Never cached: the grant changes out of process.
    pub fn check(&self, app_ops: &dyn AppOps) -> PermissionState {
        match app_ops.check_op(self.strategy, OPSTR_GET_USAGE_STATS, self.uid, &self.package) {
            Ok(mode) => {
                tracing::debug!(?mode, package = %self.package, "usage access mode");
                mode.into()
            }
            Err(e) => {
                tracing::warn!("usage access check failed, treating as denied: {e}");
                PermissionState::Denied
            }
        }
    }
}

/// Handle for one trip through the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct GrantRequests {
    issued: u64,
    pending: Option<RequestToken>,
}

impl GrantRequests {
    /// Opens the usage access settings; the returned token is redeemed with
    /// [`GrantRequests::complete`] once control comes back.
    pub fn initiate(&mut self, settings: &dyn SettingsNavigator) -> Result<RequestToken> {
        settings.open(ACTION_USAGE_ACCESS_SETTINGS)?;

        self.issued += 1;
        let token = RequestToken(self.issued);
        self.pending = Some(token);

        tracing::debug!(?token, "grant request initiated");

        Ok(token)
    }

    pub fn complete(&mut self, token: RequestToken) -> Result<()> {
        match self.pending {
            Some(pending) if pending == token => {
                self.pending = None;
                Ok(())
            }
            _ => Err(Error::UnknownRequest),
        }
    }

    pub fn pending(&self) -> Option<RequestToken> {
        self.pending
    }
}
