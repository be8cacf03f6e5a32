use std::path::{Component, Path};

/// Segment-wise glob pattern over `/`-normalized relative paths.
///
/// `**` spans any number of path segments; `*` and `?` match within a
/// single segment. Patterns are matched against path components, never
/// against raw strings, so separators cannot leak into wildcards.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
enum Part {
    AnyDepth,
    Segment(String),
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let parts = pattern
            .replace('\\', "/")
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment == "**" {
                    Part::AnyDepth
                } else {
                    Part::Segment(segment.to_string())
                }
            })
            .collect();
        Self { parts }
    }

    pub fn matches_segments(&self, input: &[String]) -> bool {
        matches_parts(&self.parts, input)
    }

    pub fn matches_path(&self, relative: &Path) -> bool {
        self.matches_segments(&path_segments(relative))
    }

    /// Match a single file name, e.g. for filtering a flat directory.
    pub fn matches_name(&self, name: &str) -> bool {
        self.matches_segments(&[name.to_string()])
    }
}

/// Normal components of a relative path, as owned strings.
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn matches_parts(parts: &[Part], input: &[String]) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return input.is_empty();
    };

    match first {
        Part::AnyDepth => {
            if matches_parts(rest, input) {
                return true;
            }
            match input.split_first() {
                Some((_, tail)) => matches_parts(parts, tail),
                None => false,
            }
        }
        Part::Segment(pattern) => match input.split_first() {
            Some((head, tail)) if matches_segment(pattern, head) => matches_parts(rest, tail),
            _ => false,
        },
    }
}

// Iterative wildcard match with single-star backtracking.
fn matches_segment(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut p = 0;
    let mut t = 0;
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            backtrack = Some((star, matched + 1));
            p = star + 1;
            t = matched + 1;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
