//! Length of the world header that sits between the save header and the
//! first name field. It grew over several format revisions.

use crate::core_api::SaveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionOffsetEntry {
    pub min_version: u32,
    pub header_length: u32,
}

const fn entry(min_version: u32, header_length: u32) -> VersionOffsetEntry {
    VersionOffsetEntry {
        min_version,
        header_length,
    }
}

/// A step function from save version to world header length.
///
/// Tables are only built through [`VersionOffsetTable::new`], which rejects
/// tables that are empty, unsorted, or do not start at version 0. In a
/// `static` that rejection happens at compile time, so every lookup resolves.
#[derive(Debug, Clone, Copy)]
pub struct VersionOffsetTable {
    entries: &'static [VersionOffsetEntry],
}

impl VersionOffsetTable {
    pub const fn new(entries: &'static [VersionOffsetEntry]) -> Self {
        assert!(!entries.is_empty(), "offset table must not be empty");
        assert!(
            entries[0].min_version == 0,
            "offset table must start at version 0"
        );
        let mut i = 1;
        while i < entries.len() {
            assert!(
                entries[i - 1].min_version < entries[i].min_version,
                "offset table versions must be strictly ascending"
            );
            i += 1;
        }
        Self { entries }
    }

    pub fn for_kind(kind: SaveKind) -> &'static Self {
        match kind {
            SaveKind::FortressActive => &FORTRESS_ACTIVE_OFFSETS,
            SaveKind::WorldOnly => &WORLD_ONLY_OFFSETS,
        }
    }

    /// Header length of the last entry whose `min_version` is at most
    /// `version`. Versions newer than the table use its last entry.
    pub fn offset_for(&self, version: u32) -> u32 {
        let idx = self
            .entries
            .partition_point(|e| e.min_version <= version)
            .saturating_sub(1);
        self.entries[idx].header_length
    }
}

const FORTRESS_ACTIVE_ENTRIES: &[VersionOffsetEntry] = &[
    entry(0, 86),
    entry(1372, 106),
    entry(1400, 110),
    entry(1441, 130),
];

const WORLD_ONLY_ENTRIES: &[VersionOffsetEntry] = &[
    entry(0, 70),
    entry(1372, 90),
    entry(1400, 94),
    entry(1441, 114),
];

/// `world.sav`
pub static FORTRESS_ACTIVE_OFFSETS: VersionOffsetTable =
    VersionOffsetTable::new(FORTRESS_ACTIVE_ENTRIES);

/// `world.dat`
pub static WORLD_ONLY_OFFSETS: VersionOffsetTable = VersionOffsetTable::new(WORLD_ONLY_ENTRIES);

pub fn offset_for(kind: SaveKind, version: u32) -> u32 {
    VersionOffsetTable::for_kind(kind).offset_for(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_match_table_entries() {
        let kind = SaveKind::FortressActive;
        assert_eq!(offset_for(kind, 0), 86);
        assert_eq!(offset_for(kind, 1371), 86);
        assert_eq!(offset_for(kind, 1372), 106);
        assert_eq!(offset_for(kind, 1399), 106);
        assert_eq!(offset_for(kind, 1400), 110);
        assert_eq!(offset_for(kind, 1440), 110);
        assert_eq!(offset_for(kind, 1441), 130);
        assert_eq!(offset_for(kind, 1446), 130);
    }

    #[test]
    fn world_only_table_is_independent() {
        assert_eq!(offset_for(SaveKind::WorldOnly, 1287), 70);
        assert_eq!(offset_for(SaveKind::WorldOnly, 1441), 114);
        assert_eq!(offset_for(SaveKind::WorldOnly, 1446), 114);
    }

    #[test]
    fn future_versions_use_last_entry() {
        assert_eq!(offset_for(SaveKind::FortressActive, u32::MAX), 130);
        assert_eq!(offset_for(SaveKind::WorldOnly, 99_999), 114);
    }

    #[test]
    fn offsets_never_decrease_with_version() {
        for kind in [SaveKind::FortressActive, SaveKind::WorldOnly] {
            let mut last = 0;
            for version in 0..2000 {
                let offset = offset_for(kind, version);
                assert!(offset >= last, "{kind} offset dropped at version {version}");
                last = offset;
            }
        }
    }

    #[test]
    #[should_panic(expected = "start at version 0")]
    fn table_not_starting_at_zero_is_rejected() {
        static BAD: [VersionOffsetEntry; 1] = [entry(1372, 106)];
        VersionOffsetTable::new(&BAD);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn unsorted_table_is_rejected() {
        static BAD: [VersionOffsetEntry; 3] = [entry(0, 86), entry(1400, 110), entry(1372, 106)];
        VersionOffsetTable::new(&BAD);
    }
}
