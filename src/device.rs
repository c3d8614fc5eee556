use crate::{config::PlatformCapabilities, model::UnlockState, platform::UserState};

/// Credential-encrypted storage gate for one user.
#[derive(Debug, Clone, Copy)]
pub struct UnlockGate {
    distinguishable: bool,
    user_id: u32,
}

impl UnlockGate {
    pub fn new(capabilities: PlatformCapabilities, user_id: u32) -> Self {
        Self {
            distinguishable: capabilities.user_unlock_state,
            user_id,
        }
    }

    /// A failed query reads as locked, the caller retries later.
    pub fn check(&self, users: &dyn UserState) -> UnlockState {
        if !self.distinguishable {
            return UnlockState::Unlocked;
        }

        match users.is_user_unlocked(self.user_id) {
            Ok(true) => UnlockState::Unlocked,
            Ok(false) => UnlockState::Locked,
            Err(e) => {
                tracing::warn!(user_id = self.user_id, "unlock state query failed: {e}");
                UnlockState::Locked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{Result, error::Error};

    struct Users(Option<bool>, Cell<u32>);

    impl UserState for Users {
        fn is_user_unlocked(&self, _user_id: u32) -> Result<bool> {
            self.1.set(self.1.get() + 1);
            self.0.ok_or(Error::ServiceNotExist("user".into()))
        }
    }

    #[test]
    fn old_platforms_are_always_unlocked() {
        let users = Users(Some(false), Cell::new(0));
        let gate = UnlockGate::new(PlatformCapabilities::from_sdk(23), 0);
        assert_eq!(gate.check(&users), UnlockState::Unlocked);
        assert_eq!(users.1.get(), 0);
    }

    #[test]
    fn reports_queried_state() {
        let gate = UnlockGate::new(PlatformCapabilities::from_sdk(30), 0);
        assert_eq!(gate.check(&Users(Some(true), Cell::new(0))), UnlockState::Unlocked);
        assert_eq!(gate.check(&Users(Some(false), Cell::new(0))), UnlockState::Locked);
        assert_eq!(gate.check(&Users(None, Cell::new(0))), UnlockState::Locked);
    }
}
