/// Path segments that disqualify a file from review, regardless of size
/// or extension. Build output, VCS metadata and dependency caches.
const EXCLUDED_SEGMENTS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "target",
    ".idea",
    ".vscode",
    "build",
];

/// Extensions eligible for review: the Java/Spring and Vue/TS stacks plus
/// the markup and config formats that travel with them.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "java", "kt", "vue", "ts", "tsx", "js", "jsx", "css", "scss", "html", "json", "xml", "yml",
    "yaml", "properties", "sql", "md",
];

/// Per-file size ceiling in bytes.
pub const MAX_FILE_BYTES: u64 = 500_000;

/// Global cap on files per review batch. Enforced by the walkers, not by
/// `accept`, so the predicate stays stateless.
pub const MAX_REVIEW_FILES: usize = 30;

/// Decide whether a candidate path/size is eligible for review.
///
/// Rules are applied in order, rejecting on the first match: excluded
/// path segment, size over the ceiling, extension not on the allow-list.
pub fn accept(path: &str, size_bytes: u64) -> bool {
    if path
        .split('/')
        .any(|segment| EXCLUDED_SEGMENTS.contains(&segment))
    {
        return false;
    }

    if size_bytes > MAX_FILE_BYTES {
        return false;
    }

    match path.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_excluded_segments_regardless_of_rest() {
        for segment in EXCLUDED_SEGMENTS {
            let path = format!("src/{}/Main.java", segment);
            assert!(!accept(&path, 10), "should reject {}", path);
            // even at zero size and with an allowed extension
            assert!(!accept(&path, 0));
        }
        assert!(!accept("node_modules/lodash/index.js", 100));
        assert!(!accept(".git/config", 100));
    }

    #[test]
    fn test_segment_match_is_not_substring_match() {
        // "distribution" contains "dist" but is not the excluded segment
        assert!(accept("distribution/Main.java", 10));
        assert!(accept("rebuild/Main.java", 10));
    }

    #[test]
    fn test_rejects_oversized_files_regardless_of_path() {
        assert!(!accept("src/Main.java", MAX_FILE_BYTES + 1));
        assert!(!accept("App.vue", 1_000_000));
        // at the ceiling is still fine
        assert!(accept("src/Main.java", MAX_FILE_BYTES));
    }

    #[test]
    fn test_rejects_unknown_extensions() {
        assert!(!accept("binary.exe", 10));
        assert!(!accept("archive.tar.gz", 10));
        assert!(!accept("Makefile", 10));
        assert!(!accept("noextension", 10));
    }

    #[test]
    fn test_accepts_supported_stack() {
        assert!(accept("src/main/java/com/acme/OrderService.java", 4_096));
        assert!(accept("frontend/src/App.vue", 2_048));
        assert!(accept("frontend/src/store/index.ts", 1_024));
        assert!(accept("pom.xml", 512));
        assert!(accept("application.yml", 128));
        assert!(accept("README.md", 256));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(accept("legacy/Main.JAVA", 10));
        assert!(accept("notes.MD", 10));
    }
}
