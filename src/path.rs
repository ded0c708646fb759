//! Path cleaning and joining helpers shared by the dispatcher and groups.

/// Normalize a path: collapse duplicate slashes, resolve `.` and `..`
/// segments and guarantee a single leading `/`. A trailing slash is dropped
/// (except for the root path itself).
pub(crate) fn clean(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len().max(1));
    for segment in &stack {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// Join an absolute base path with a relative suffix, preserving the
/// suffix's trailing slash.
pub(crate) fn join_paths(absolute: &str, relative: &str) -> String {
    if relative.is_empty() {
        return absolute.to_string();
    }

    let mut combined = clean(&format!("{absolute}/{relative}"));
    if relative.ends_with('/') && !combined.ends_with('/') {
        combined.push('/');
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_duplicate_slashes() {
        assert_eq!(clean("//a///b"), "/a/b");
        assert_eq!(clean("/a/b/"), "/a/b");
    }

    #[test]
    fn clean_resolves_dot_segments() {
        assert_eq!(clean("/a/./b"), "/a/b");
        assert_eq!(clean("/a/b/../c"), "/a/c");
        assert_eq!(clean("/.."), "/");
    }

    #[test]
    fn clean_of_empty_and_root() {
        assert_eq!(clean(""), "/");
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("a/b"), "/a/b");
    }

    #[test]
    fn join_guarantees_leading_slash() {
        assert_eq!(join_paths("/", "api"), "/api");
        assert_eq!(join_paths("/", "/api"), "/api");
        assert_eq!(join_paths("/api", "v1"), "/api/v1");
    }

    #[test]
    fn join_preserves_relative_trailing_slash() {
        assert_eq!(join_paths("/api", "posts/"), "/api/posts/");
        assert_eq!(join_paths("/api/", "posts"), "/api/posts");
    }

    #[test]
    fn join_with_empty_relative_is_identity() {
        assert_eq!(join_paths("/api/", ""), "/api/");
    }
}
