//! Test helpers shared across `stackwatch-*` crates.
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

/// Returns the full path to the specified fixture.
///
/// Fixtures are stored in the `stackwatch-testutils/fixtures` directory and paths should be
/// given relative to that location.
///
/// # Example
///
/// ```
/// use stackwatch_testutils::fixture;
///
/// let path = fixture("dep-x86_64/objdump.txt");
/// assert!(path.ends_with("dep-x86_64/objdump.txt"));
/// ```
pub fn fixture<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut full_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    full_path.push("fixtures");

    let path = path.as_ref();
    full_path.push(path);

    assert!(
        full_path.exists(),
        "Fixture does not exist: {}",
        full_path.display()
    );

    full_path
}

/// Reads the given fixture's contents as a UTF-8 string.
pub fn read_fixture<P: AsRef<Path>>(path: P) -> String {
    let full_path = fixture(path);
    std::fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}
