use std::rc::Rc;

use crate::{
    Result,
    dumpsys::ServiceDump,
    error::Error,
    model::{ApplicationFlags, ApplicationInfo},
    platform::AppRegistry,
};

/// Installed packages from `dumpsys package packages`.
pub struct PackageRegistry {
    dumpsys: Rc<dyn ServiceDump>,
    user_id: u32,
}

impl PackageRegistry {
    pub fn new(dumpsys: Rc<dyn ServiceDump>, user_id: u32) -> Self {
        Self { dumpsys, user_id }
    }
}

impl AppRegistry for PackageRegistry {
    /// The dump always carries the full package state, so `flags` selects
    /// nothing here.
    fn installed_applications(&self, flags: u32) -> Result<Vec<ApplicationInfo>> {
        let dump = self.dumpsys.dump("package", &["packages"])?;
        super::ensure_dumpable("package", &dump)?;

        let apps = parse_packages(&dump, self.user_id);
        tracing::debug!(flags, apps = apps.len(), "enumerated packages");

        Ok(apps)
    }

    /// Resource labels are not part of the dump; the package name stands in.
    fn application_label(&self, info: &ApplicationInfo) -> Result<String> {
        if info.package.is_empty() {
            return Err(Error::LabelUnavailable(info.package.clone()));
        }
        Ok(info.package.clone())
    }
}

struct Block {
    package: String,
    flags: ApplicationFlags,
    installed: bool,
}

impl Block {
    fn finish(self, apps: &mut Vec<ApplicationInfo>) {
        if self.installed {
            apps.push(ApplicationInfo {
                package: self.package,
                flags: self.flags,
            });
        }
    }
}

fn parse_flags(names: &str) -> ApplicationFlags {
    let mut flags = ApplicationFlags::default();
    for name in names.split_whitespace() {
        match ApplicationFlags::from_name(name) {
            Some(flag) => flags |= flag,
            None => tracing::trace!(name, "unknown application flag"),
        }
    }
    flags
}

/// `User <id>: ... installed=<bool> ...`
fn parse_installed(line: &str, user_id: u32) -> Option<bool> {
    let (user, rest) = line.strip_prefix("User ")?.split_once(':')?;
    if user.parse::<u32>().ok()? != user_id {
        return None;
    }
    rest.split_whitespace()
        .find_map(|pair| pair.strip_prefix("installed="))
        .map(|v| v == "true")
}

fn parse_packages(dump: &str, user_id: u32) -> Vec<ApplicationInfo> {
    let mut apps = Vec::new();
    let mut block: Option<Block> = None;

    for line in dump.lines().map(str::trim) {
        if line.starts_with("Hidden system packages:") {
            break;
        }

        if let Some(rest) = line.strip_prefix("Package [") {
            if let Some(done) = block.take() {
                done.finish(&mut apps);
            }
            block = rest.split_once(']').map(|(package, _)| Block {
                package: package.to_owned(),
                flags: ApplicationFlags::default(),
                installed: true,
            });
            continue;
        }

        let Some(current) = block.as_mut() else {
            continue;
        };

        if let Some(names) = line.strip_prefix("flags=[") {
            current.flags = parse_flags(names.trim_end_matches(']'));
        } else if let Some(installed) = parse_installed(line, user_id) {
            current.installed = installed;
        }
    }

    if let Some(done) = block {
        done.finish(&mut apps);
    }

    apps
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
Packages:
  Package [com.android.phone] (1f2e3d):
    userId=1001
    flags=[ SYSTEM HAS_CODE PERSISTENT ]
    privateFlags=[ PRIVATE_FLAG_PRIVILEGED ]
    User 0: ceDataInode=2 installed=true hidden=false
  Package [com.example] (4c5b6a):
    userId=10234
    flags=[ HAS_CODE ALLOW_CLEAR_USER_DATA ALLOW_BACKUP UPDATED_SYSTEM_APP ]
    User 0: ceDataInode=3 installed=true hidden=false
    User 10: ceDataInode=0 installed=false hidden=false
  Package [com.work.only] (7d8e9f):
    flags=[ HAS_CODE SOMETHING_NEW ]
    User 0: ceDataInode=0 installed=false hidden=false

Hidden system packages:
  Package [com.android.phone] (0a0b0c):
    flags=[ SYSTEM ]
";

    #[test]
    fn flags_become_a_bitmask() {
        let apps = parse_packages(DUMP, 0);
        assert_eq!(apps.len(), 2);

        let phone = &apps[0];
        assert_eq!(phone.package, "com.android.phone");
        assert!(phone.flags.is_system());
        assert!(phone.flags.contains(ApplicationFlags::PERSISTENT));

        let example = &apps[1];
        assert!(!example.flags.is_system());
        assert!(example.flags.contains(
            ApplicationFlags::HAS_CODE | ApplicationFlags::ALLOW_BACKUP | ApplicationFlags::UPDATED_SYSTEM_APP
        ));
    }

    #[test]
    fn installation_is_per_user() {
        let for_work: Vec<_> = parse_packages(DUMP, 10).into_iter().map(|a| a.package).collect();
        assert_eq!(for_work, ["com.android.phone", "com.work.only"]);
    }

    #[test]
    fn hidden_system_packages_are_not_listed_twice() {
        let apps = parse_packages(DUMP, 0);
        assert_eq!(
            apps.iter().filter(|a| a.package == "com.android.phone").count(),
            1
        );
    }
}
