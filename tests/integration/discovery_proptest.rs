// Property-based tests for discovery partitioning and template encoding

use hbqueue::engine::{decode, discover, encode, partition};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::helpers::touch;

const EXTENSIONS: &[&str] = &["mp4", "MP4", "mov", "Mov", "ts", "txt", "jpg", "mkv", ""];
const WANTED: &[&str] = &["mp4", "mov", "ts", "mkv"];

fn file_name() -> impl Strategy<Value = String> {
    ("[a-z]{1,6}", prop::sample::select(EXTENSIONS), prop::bool::ANY).prop_map(
        |(stem, ext, nested)| {
            let name = if ext.is_empty() {
                stem
            } else {
                format!("{}.{}", stem, ext)
            };
            if nested { format!("nested_dir/{}", name) } else { name }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Selected and excluded files are disjoint and together cover every file
    #[test]
    fn proptest_partition_covers_all_files(
        names in prop::collection::btree_set(file_name(), 0..12),
        wanted in prop::collection::vec(prop::sample::select(WANTED), 1..3),
    ) {
        let temp_dir = TempDir::new().unwrap();
        for name in &names {
            touch(temp_dir.path(), name, b"");
        }

        let all: BTreeSet<PathBuf> = discover::<&str>(temp_dir.path(), &[])
            .unwrap()
            .into_iter()
            .collect();
        let split = partition(temp_dir.path(), &wanted, None).unwrap();
        let selected: BTreeSet<PathBuf> = split.selected.iter().cloned().collect();
        let excluded: BTreeSet<PathBuf> = split.excluded.iter().cloned().collect();

        // Case-insensitive filesystems may fold some names together
        prop_assert!(all.len() <= names.len());
        prop_assert!(selected.is_disjoint(&excluded));
        prop_assert_eq!(selected.union(&excluded).cloned().collect::<BTreeSet<_>>(), all);
        prop_assert_eq!(split.selected, discover(temp_dir.path(), &wanted).unwrap());

        for path in &selected {
            let ext = path.extension().unwrap().to_string_lossy().to_lowercase();
            prop_assert!(wanted.iter().any(|w| *w == ext));
        }
    }

    /// Encoding is lossless for arbitrary text
    #[test]
    fn proptest_encode_decode_roundtrip(text in any::<String>()) {
        prop_assert_eq!(decode(&encode(&text)).unwrap(), text);
    }
}
