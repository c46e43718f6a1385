//! Request path normalization for static files.

/// Normalize a decoded request path into a name relative to the served root.
///
/// Leading separators are dropped, `\` counts as a separator and `.`/`..`
/// segments are resolved lexically. `..` never climbs above the root, so the
/// result always stays inside it. The root itself is returned as `"."`.
pub fn clean_name(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths() {
        assert_eq!(clean_name("index.html"), "index.html");
        assert_eq!(clean_name("/assets/app.js"), "assets/app.js");
        assert_eq!(clean_name("assets//img/./logo.svg"), "assets/img/logo.svg");
        assert_eq!(clean_name("docs/guide/"), "docs/guide");
    }

    #[test]
    fn test_root() {
        assert_eq!(clean_name(""), ".");
        assert_eq!(clean_name("/"), ".");
        assert_eq!(clean_name("./"), ".");
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        assert_eq!(clean_name("../../etc/passwd"), "etc/passwd");
        assert_eq!(clean_name("/assets/../../../etc/passwd"), "etc/passwd");
        assert_eq!(clean_name("..\\..\\windows\\win.ini"), "windows/win.ini");
        assert_eq!(clean_name("a/b/../../.."), ".");
    }
}
