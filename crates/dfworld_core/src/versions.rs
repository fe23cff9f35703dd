/// Save-format version numbers and the game release that writes them.
/// Sorted by version.
pub static VERSION_LABELS: &[(u32, &str)] = &[
    (1287, "0.31.01"),
    (1288, "0.31.02"),
    (1289, "0.31.03"),
    (1292, "0.31.04"),
    (1295, "0.31.05"),
    (1297, "0.31.06"),
    (1300, "0.31.08"),
    (1304, "0.31.09"),
    (1305, "0.31.10"),
    (1310, "0.31.11"),
    (1311, "0.31.12"),
    (1323, "0.31.13"),
    (1325, "0.31.14"),
    (1326, "0.31.15"),
    (1327, "0.31.16"),
    (1340, "0.31.17"),
    (1341, "0.31.18"),
    (1351, "0.31.19"),
    (1353, "0.31.20"),
    (1354, "0.31.21"),
    (1359, "0.31.22"),
    (1360, "0.31.23"),
    (1361, "0.31.24"),
    (1362, "0.31.25"),
    (1372, "0.34.01"),
    (1374, "0.34.02"),
    (1376, "0.34.03"),
    (1377, "0.34.04"),
    (1378, "0.34.05"),
    (1382, "0.34.06"),
    (1383, "0.34.07"),
    (1400, "0.34.08"),
    (1402, "0.34.09"),
    (1403, "0.34.10"),
    (1404, "0.34.11"),
    (1441, "0.40.01"),
    (1442, "0.40.02"),
    (1443, "0.40.03"),
    (1444, "0.40.04"),
    (1445, "0.40.05"),
    (1446, "0.40.06"),
    (1448, "0.40.07"),
    (1449, "0.40.08"),
];

pub fn known_version_label(version: u32) -> Option<&'static str> {
    VERSION_LABELS
        .binary_search_by_key(&version, |&(v, _)| v)
        .ok()
        .map(|idx| VERSION_LABELS[idx].1)
}

/// Human-readable release for `version`. Unknown versions are expected
/// (newer releases) and get a synthesized label instead of an error.
pub fn version_label(version: u32) -> String {
    match known_version_label(version) {
        Some(label) => label.to_string(),
        None => format!("unidentified version {version}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(VERSION_LABELS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_versions_resolve() {
        assert_eq!(version_label(1446), "0.40.06");
        assert_eq!(version_label(1287), "0.31.01");
        assert_eq!(version_label(1449), "0.40.08");
    }

    #[test]
    fn unknown_versions_get_synthesized_label() {
        assert_eq!(version_label(1447), "unidentified version 1447");
        assert_eq!(known_version_label(0), None);
    }
}
