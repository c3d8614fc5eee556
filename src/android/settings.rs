use std::process::Command;

use crate::{Result, error::Error, platform::SettingsNavigator};

/// Starts settings activities through `am start`.
pub struct ActivityManagerSettings;

impl SettingsNavigator for ActivityManagerSettings {
    fn open(&self, action: &str) -> Result<()> {
        let output = Command::new("am").args(start_args(action)).output()?;

        // `am` reports resolution failures on stdout with a zero exit status
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || stdout.contains("Error:") {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Navigation(
                format!("{} {}", stdout.trim(), stderr.trim()).trim().to_owned(),
            ));
        }

        tracing::debug!(action, "settings activity started");

        Ok(())
    }
}

fn start_args(action: &str) -> [&str; 4] {
    ["start", "-W", "-a", action]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ACTION_USAGE_ACCESS_SETTINGS;

    #[test]
    fn waits_for_the_launch() {
        assert_eq!(
            start_args(ACTION_USAGE_ACCESS_SETTINGS),
            ["start", "-W", "-a", "android.settings.USAGE_ACCESS_SETTINGS"]
        );
    }
}
