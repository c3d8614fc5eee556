use std::cmp::Ordering;

use crate::{
    Result,
    model::ApplicationEntry,
    platform::{AppRegistry, GET_META_DATA},
};

/// Installed applications without the system bit, sorted by label ignoring
/// case. Entries whose label cannot be resolved are skipped.
pub fn list_non_system_apps(registry: &dyn AppRegistry) -> Result<Vec<ApplicationEntry>> {
    let installed = registry.installed_applications(GET_META_DATA)?;
    let total = installed.len();

    let mut entries: Vec<ApplicationEntry> = installed
        .into_iter()
        .filter(|info| !info.flags.is_system())
        .filter_map(|info| match registry.application_label(&info) {
            Ok(label) => Some(ApplicationEntry {
                package: info.package,
                label,
                is_system: false,
            }),
            Err(e) => {
                tracing::warn!(package = %info.package, "skipping application: {e}");
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| compare_case_insensitive(&a.label, &b.label));

    tracing::debug!(total, listed = entries.len(), "listed non-system applications");

    Ok(entries)
}

pub fn app_rows(entries: Vec<ApplicationEntry>) -> Vec<String> {
    entries.into_iter().map(|e| e.label).collect()
}

/// Ordinal comparison of lowercased chars, ties broken ordinally so the
/// order is total.
pub fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        error::Error,
        model::{ApplicationFlags, ApplicationInfo},
    };

    struct Registry {
        apps: Vec<(ApplicationInfo, Option<&'static str>)>,
        enumerations: Cell<u32>,
    }

    impl Registry {
        fn new(apps: Vec<(&str, ApplicationFlags, Option<&'static str>)>) -> Self {
            Self {
                apps: apps
                    .into_iter()
                    .map(|(package, flags, label)| {
                        (
                            ApplicationInfo {
                                package: package.to_owned(),
                                flags,
                            },
                            label,
                        )
                    })
                    .collect(),
                enumerations: Cell::new(0),
            }
        }
    }

    impl AppRegistry for Registry {
        fn installed_applications(&self, flags: u32) -> Result<Vec<ApplicationInfo>> {
            assert_eq!(flags, GET_META_DATA);
            self.enumerations.set(self.enumerations.get() + 1);
            Ok(self.apps.iter().map(|(info, _)| info.clone()).collect())
        }

        fn application_label(&self, info: &ApplicationInfo) -> Result<String> {
            self.apps
                .iter()
                .find(|(i, _)| i.package == info.package)
                .and_then(|(_, label)| label.map(str::to_owned))
                .ok_or_else(|| Error::LabelUnavailable(info.package.clone()))
        }
    }

    fn sample() -> Registry {
        let user = ApplicationFlags::HAS_CODE | ApplicationFlags::ALLOW_BACKUP;
        Registry::new(vec![
            ("com.zed", user, Some("zed")),
            (
                "com.android.settings",
                ApplicationFlags::SYSTEM | ApplicationFlags::HAS_CODE | ApplicationFlags::PERSISTENT,
                Some("Settings"),
            ),
            ("com.alpha", user, Some("Alpha")),
            ("com.broken", user, None),
            ("com.beta", ApplicationFlags::HAS_CODE, Some("beta")),
            (
                "com.updated",
                ApplicationFlags::SYSTEM | ApplicationFlags::UPDATED_SYSTEM_APP,
                Some("Updated"),
            ),
        ])
    }

    #[test]
    fn system_apps_are_filtered_by_bit() {
        let entries = list_non_system_apps(&sample()).unwrap();
        let packages: Vec<_> = entries.iter().map(|e| e.package.as_str()).collect();
        assert!(!packages.contains(&"com.android.settings"));
        assert!(!packages.contains(&"com.updated"));
        assert!(entries.iter().all(|e| !e.is_system));
    }

    #[test]
    fn labels_sort_ignoring_case() {
        let rows = app_rows(list_non_system_apps(&sample()).unwrap());
        assert_eq!(rows, ["Alpha", "beta", "zed"]);
        for pair in rows.windows(2) {
            assert!(pair[0].to_lowercase() <= pair[1].to_lowercase());
        }
    }

    #[test]
    fn unresolvable_label_is_skipped() {
        let entries = list_non_system_apps(&sample()).unwrap();
        assert!(entries.iter().all(|e| e.package != "com.broken"));
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn repeated_listing_is_identical() {
        let registry = sample();
        let first = list_non_system_apps(&registry).unwrap();
        let second = list_non_system_apps(&registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.enumerations.get(), 2);
    }

    #[test]
    fn case_insensitive_ties_are_stable() {
        assert_eq!(compare_case_insensitive("Maps", "maps"), Ordering::Less);
        assert_eq!(compare_case_insensitive("maps", "MAPS2"), Ordering::Less);
        assert_eq!(compare_case_insensitive("b", "A"), Ordering::Greater);
    }
}
