//! `/`-separated path helpers for tree and virtual filesystem paths.

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

pub fn is_root(path: &str) -> bool {
    path.is_empty() || path.chars().all(|c| c == SEPARATOR)
}

/// Joins a child name onto a parent path.
///
/// The root marker is special: `join("/", "a")` is `/a`, never `//a`.
pub fn join(parent: &str, name: &str) -> String {
    if is_root(parent) {
        format!("{SEPARATOR}{name}")
    } else {
        format!("{}{SEPARATOR}{name}", parent.trim_end_matches(SEPARATOR))
    }
}

/// Non-empty segments of `path`, in order.
pub fn segments(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

pub fn last_segment(path: &str) -> Option<&str> {
    segments(path).next_back()
}

/// Path of the containing directory; the root is its own parent.
pub fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) | None => ROOT.to_string(),
        Some(index) => trimmed[..index].to_string(),
    }
}

/// Replaces only the last segment of `path` with `name`.
pub fn replace_last_segment(path: &str, name: &str) -> String {
    join(&parent(path), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", "a", "/a")]
    #[case("", "a", "/a")]
    #[case("/a", "b", "/a/b")]
    #[case("/a/", "b", "/a/b")]
    #[case("/a/b", "c.txt", "/a/b/c.txt")]
    fn join_inserts_exactly_one_separator(
        #[case] parent: &str,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(join(parent, name), expected);
    }

    #[rstest]
    #[case("/", None)]
    #[case("", None)]
    #[case("/proj", Some("proj"))]
    #[case("/a/b/c.txt", Some("c.txt"))]
    #[case("/a/b/", Some("b"))]
    fn last_segment_ignores_empty_segments(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(last_segment(path), expected);
    }

    #[rstest]
    #[case("/a/b/c.txt", "/a/b")]
    #[case("/a", "/")]
    #[case("/", "/")]
    #[case("a", "/")]
    fn parent_strips_the_last_segment(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(parent(path), expected);
    }

    #[test]
    fn replace_last_segment_keeps_the_directory() {
        assert_eq!(replace_last_segment("/a/b/c.txt", "d.txt"), "/a/b/d.txt");
        assert_eq!(replace_last_segment("/c.txt", "d.txt"), "/d.txt");
    }
}
