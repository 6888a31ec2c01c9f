use remote::protocol::{DirectoryMetadata, FileMetadata};

/// Every file reachable from `directory`, paired with its path relative to `directory`.
///
/// Depth-first: the subdirectories of a directory are walked (prefixing their name and `/`)
/// before its own files are emitted. Backend order is kept, nothing is sorted.
pub fn flatten(directory: &DirectoryMetadata) -> Vec<(FileMetadata, String)> {
    let mut files = Vec::new();
    flatten_into(directory, "", &mut files);
    files
}

fn flatten_into(directory: &DirectoryMetadata, prefix: &str, out: &mut Vec<(FileMetadata, String)>) {
    for child in &directory.directories {
        let child_prefix = format!("{prefix}{}/", child.friendly_name);
        flatten_into(child, &child_prefix, out);
    }
    for file in &directory.files {
        out.push((file.clone(), format!("{prefix}{}", file.friendly_name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn file(name: &str, size: u64) -> FileMetadata {
        FileMetadata {
            friendly_name: name.to_string(),
            resource_path: name.to_string(),
            resource_size: size,
        }
    }

    fn dir(name: &str, files: Vec<FileMetadata>, directories: Vec<DirectoryMetadata>) -> DirectoryMetadata {
        DirectoryMetadata {
            friendly_name: name.to_string(),
            resource_path: format!("{name}/"),
            files,
            directories,
        }
    }

    #[test]
    fn subdirectories_come_first() {
        let root = dir(
            "dir1",
            vec![file("a.txt", 10)],
            vec![dir("sub", vec![file("b.txt", 20)], vec![])],
        );
        let flat: Vec<_> = flatten(&root)
            .into_iter()
            .map(|(file, path)| (file.friendly_name, path))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("b.txt".to_string(), "sub/b.txt".to_string()),
                ("a.txt".to_string(), "a.txt".to_string()),
            ]
        );
    }

    #[test]
    fn nested_prefixes_accumulate() {
        let root = dir(
            "top",
            vec![],
            vec![
                dir("x", vec![], vec![dir("y", vec![file("deep", 1)], vec![])]),
                dir("z", vec![file("last", 2)], vec![]),
            ],
        );
        let paths: Vec<_> = flatten(&root).into_iter().map(|(_, path)| path).collect();
        assert_eq!(paths, vec!["x/y/deep".to_string(), "z/last".to_string()]);
    }

    #[test]
    fn empty_directory_has_no_files() {
        assert!(flatten(&dir("empty", vec![], vec![dir("also-empty", vec![], vec![])])).is_empty());
    }

    fn arb_directory() -> impl Strategy<Value = DirectoryMetadata> {
        let leaf = proptest::collection::vec(("[a-z]{1,8}", 0u64..1000), 0..4).prop_map(|files| {
            dir(
                "leaf",
                files.into_iter().map(|(name, size)| file(&name, size)).collect(),
                vec![],
            )
        });
        leaf.prop_recursive(4, 64, 4, |inner| {
            (
                "[a-z]{1,8}",
                proptest::collection::vec(("[a-z]{1,8}", 0u64..1000), 0..4),
                proptest::collection::vec(inner, 0..4),
            )
                .prop_map(|(name, files, mut directories)| {
                    for child in &mut directories {
                        let prefix = format!("{}/", child.friendly_name);
                        prefix_resource_paths(child, &prefix);
                    }
                    dir(
                        &name,
                        files.into_iter().map(|(name, size)| file(&name, size)).collect(),
                        directories,
                    )
                })
        })
    }

    // generated files carry their expected flattened path in `resource_path`
    fn prefix_resource_paths(directory: &mut DirectoryMetadata, prefix: &str) {
        for file in &mut directory.files {
            file.resource_path = format!("{prefix}{}", file.resource_path);
        }
        for child in &mut directory.directories {
            prefix_resource_paths(child, prefix);
        }
    }

    fn count_files(directory: &DirectoryMetadata) -> usize {
        directory.files.len() + directory.directories.iter().map(count_files).sum::<usize>()
    }

    proptest! {
        #[test]
        fn every_file_is_emitted_once(root in arb_directory()) {
            let flat = flatten(&root);
            prop_assert_eq!(flat.len(), count_files(&root));
            for (file, path) in &flat {
                prop_assert_eq!(path, &file.resource_path);
                prop_assert!(!path.starts_with('/'));
            }
        }

        #[test]
        fn flattening_is_deterministic(root in arb_directory()) {
            prop_assert_eq!(flatten(&root), flatten(&root));
        }

        #[test]
        fn sizes_are_preserved(root in arb_directory()) {
            fn total(directory: &DirectoryMetadata) -> u64 {
                directory.files.iter().map(|file| file.resource_size).sum::<u64>()
                    + directory.directories.iter().map(total).sum::<u64>()
            }
            let flat_total: u64 = flatten(&root).iter().map(|(file, _)| file.resource_size).sum();
            prop_assert_eq!(flat_total, total(&root));
        }
    }
}
