// Export file naming: `<folder>/export_<unixTimestamp>.xml`

const PREFIX: &str = "export_";
const SUFFIX: &str = ".xml";

/// Storage path for a snapshot taken at `timestamp`.
pub fn export_path(folder: &str, timestamp: i64) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        format!("{PREFIX}{timestamp}{SUFFIX}")
    } else {
        format!("{folder}/{PREFIX}{timestamp}{SUFFIX}")
    }
}

/// The `<unixTimestamp>` part of an export path, if the path follows the naming scheme.
pub fn timestamp_from_path(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let timestamp = file_name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    (!timestamp.is_empty()).then_some(timestamp)
}

pub fn is_export_path(path: &str) -> bool {
    timestamp_from_path(path).is_some()
}

/// The lexicographically last export file, i.e. the newest snapshot.
pub fn latest(paths: &[String]) -> Option<&String> {
    paths.iter().filter(|p| is_export_path(p)).max()
}

/// Two snapshots to compare, `older` sorting before `newer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPair {
    pub older: String,
    pub newer: String,
}

/// Picks the two lexicographically last export files.
pub fn latest_two(paths: &[String]) -> Option<SnapshotPair> {
    let mut exports: Vec<&String> = paths.iter().filter(|p| is_export_path(p)).collect();
    exports.sort();
    match exports.as_slice() {
        [.., older, newer] => Some(SnapshotPair {
            older: (*older).clone(),
            newer: (*newer).clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_export_paths() {
        assert_eq!(export_path("exports", 1700000000), "exports/export_1700000000.xml");
        assert_eq!(export_path("exports/", 5), "exports/export_5.xml");
        assert_eq!(export_path("", 5), "export_5.xml");
    }

    #[test]
    fn extracts_timestamp() {
        assert_eq!(timestamp_from_path("exports/export_1700000000.xml"), Some("1700000000"));
        assert_eq!(timestamp_from_path("export_42.xml"), Some("42"));
        assert_eq!(timestamp_from_path("exports/.gitignore"), None);
        assert_eq!(timestamp_from_path("exports/export_.xml"), None);
        assert_eq!(timestamp_from_path("exports/export_1.json"), None);
    }

    #[test]
    fn latest_two_takes_last_pair_in_order() {
        let all = paths(&[
            "exports/export_1700000300.xml",
            "exports/.gitignore",
            "exports/export_1700000100.xml",
            "exports/export_1700000200.xml",
        ]);
        assert_eq!(
            latest_two(&all),
            Some(SnapshotPair {
                older: "exports/export_1700000200.xml".into(),
                newer: "exports/export_1700000300.xml".into(),
            })
        );
        assert_eq!(latest(&all).map(String::as_str), Some("exports/export_1700000300.xml"));
    }

    #[test]
    fn latest_two_needs_two_exports() {
        assert_eq!(latest_two(&paths(&[])), None);
        assert_eq!(latest_two(&paths(&["exports/export_1.xml", "exports/notes.txt"])), None);
        assert_eq!(latest(&paths(&["exports/notes.txt"])), None);
    }
}
