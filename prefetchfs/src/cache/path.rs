//! Virtual path normalization.
//!
//! Every cache key is a normalized path: backslash-free and without a
//! leading slash. Normalization is deterministic and idempotent, so the
//! same virtual path always maps to the same cache entry regardless of
//! how the adapter spelled it.

/// Normalize a virtual path into canonical cache-key form.
///
/// Replaces `\` with `/`, then strips leading slashes.
///
/// # Examples
///
/// ```
/// use prefetchfs::cache::normalize;
///
/// assert_eq!(normalize("/a\\b"), "a/b");
/// assert_eq!(normalize("scenery/tile_01.dat"), "scenery/tile_01.dat");
/// ```
pub fn normalize(path: &str) -> String {
    let forward = path.replace('\\', "/");
    forward.trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_leading_slashes() {
        assert_eq!(normalize("/data/file.bin"), "data/file.bin");
        assert_eq!(normalize("//data/file.bin"), "data/file.bin");
    }

    #[test]
    fn replaces_backslashes() {
        assert_eq!(normalize("data\\sub\\file.bin"), "data/sub/file.bin");
        assert_eq!(normalize("/a\\b"), "a/b");
    }

    #[test]
    fn leaves_normalized_paths_untouched() {
        assert_eq!(normalize("data/file.bin"), "data/file.bin");
        assert_eq!(normalize(""), "");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(path in ".{0,40}") {
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalized_has_no_backslash_and_no_leading_slash(path in ".{0,40}") {
            let normalized = normalize(&path);
            prop_assert!(!normalized.contains('\\'));
            prop_assert!(!normalized.starts_with('/'));
        }
    }
}
