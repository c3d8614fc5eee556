use std::rc::Rc;

use crate::{Result, dumpsys::ServiceDump, platform::UserState};

/// Running-user states from `dumpsys user`.
pub struct UserService {
    dumpsys: Rc<dyn ServiceDump>,
}

impl UserService {
    pub fn new(dumpsys: Rc<dyn ServiceDump>) -> Self {
        Self { dumpsys }
    }
}

impl UserState for UserService {
    fn is_user_unlocked(&self, user_id: u32) -> Result<bool> {
        let dump = self.dumpsys.dump("user", &[])?;
        super::ensure_dumpable("user", &dump)?;

        let state = parse_user_state(&dump, user_id);
        tracing::debug!(user_id, ?state, "user state");

        Ok(state == Some("RUNNING_UNLOCKED"))
    }
}

/// `State:` line of the `UserInfo{<id>:..}` block; `None` when the user is
/// missing or not running.
fn parse_user_state(dump: &str, user_id: u32) -> Option<&str> {
    let mut in_user = false;

    for line in dump.lines().map(str::trim) {
        if let Some(info) = line.strip_prefix("UserInfo{") {
            in_user = info
                .split(':')
                .next()
                .and_then(|id| id.parse::<u32>().ok())
                == Some(user_id);
            continue;
        }

        if in_user && let Some(state) = line.strip_prefix("State:") {
            return Some(state.trim());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::testing::CannedDumpsys;

    const DUMP: &str = "\
Users:
  UserInfo{0:Owner:c13} running
    State: RUNNING_LOCKED
    Created: <unknown>
  UserInfo{10:Work profile:1030} running
    State: RUNNING_UNLOCKED
  UserInfo{11:Guest:404}
    Created: +2d1h
";

    #[test]
    fn state_belongs_to_requested_user() {
        assert_eq!(parse_user_state(DUMP, 0), Some("RUNNING_LOCKED"));
        assert_eq!(parse_user_state(DUMP, 10), Some("RUNNING_UNLOCKED"));
        assert_eq!(parse_user_state(DUMP, 11), None);
        assert_eq!(parse_user_state(DUMP, 12), None);
    }

    #[test]
    fn only_running_unlocked_counts() {
        let users = UserService::new(Rc::new(CannedDumpsys::with("user", DUMP)));
        assert!(!users.is_user_unlocked(0).unwrap());
        assert!(users.is_user_unlocked(10).unwrap());
        assert!(!users.is_user_unlocked(11).unwrap());
    }
}
