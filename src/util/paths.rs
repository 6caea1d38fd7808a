//! MSBuild path helpers.
//!
//! Logs recorded on Windows carry `C:\...` paths with backslashes while the
//! model may be built on any host, so these helpers work on plain strings
//! instead of `std::path`, treating both `/` and `\` as separators.

/// Extension MSBuild uses for generated temporary projects.
pub const TEMPORARY_PROJECT_EXTENSION: &str = ".tmp_proj";

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Check whether a path is rooted (`\x`, `/x`, or a drive letter like `C:`).
pub fn is_rooted(path: &str) -> bool {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(c), _) if is_separator(c) => true,
        (Some(drive), Some(':')) => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Directory portion of a path, without the trailing separator.
pub fn directory_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Check whether `path` ends with `extension` (ASCII case-insensitive).
pub fn has_extension(path: &str, extension: &str) -> bool {
    path.len() >= extension.len()
        && path.is_char_boundary(path.len() - extension.len())
        && path[path.len() - extension.len()..].eq_ignore_ascii_case(extension)
}

/// Resolve `path` against `base_dir` unless it is already rooted.
pub fn resolve(base_dir: &str, path: &str) -> String {
    if is_rooted(path) || base_dir.is_empty() {
        path.to_string()
    } else {
        format!("{}\\{}", base_dir.trim_end_matches(is_separator), path)
    }
}

/// Normalize a path for comparison: unify separators to `\`, drop empty and
/// `.` segments, apply `..`, and lowercase ASCII letters.
pub fn normalize(path: &str) -> String {
    let rooted_at_separator = path.starts_with(is_separator);
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                // Never pop a drive root
                match segments.last().copied() {
                    Some(last) if last.ends_with(':') => {}
                    Some(last) if last != ".." => {
                        segments.pop();
                    }
                    _ => segments.push(".."),
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    if rooted_at_separator {
        out.push('\\');
    }
    out.push_str(&segments.join("\\"));
    out.to_ascii_lowercase()
}

/// Compare two paths after normalization.
pub fn paths_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
