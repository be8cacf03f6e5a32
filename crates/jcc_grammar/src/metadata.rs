use once_cell::sync::Lazy;
use regex::Regex;

// Raw-text scans over the grammar source. Deliberately tolerant: a match
// inside a comment or string literal counts, first occurrence wins. The
// generator applies the same reading of the file, so "fixing" this here
// would desynchronize placement from generation.
static PACKAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bpackage\s+([\w$]+(?:\.[\w$]+)*)\s*;").expect("package pattern")
});

static PARSER_BEGIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bPARSER_BEGIN\s*\(\s*([A-Za-z_$][\w$]*)\s*\)").expect("parser begin pattern")
});

/// First declared package in the grammar text, if any.
pub fn extract_package(text: &str) -> Option<String> {
    PACKAGE_RE
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Parser type name from the first `PARSER_BEGIN(<name>)` marker, if any.
pub fn extract_parser_name(text: &str) -> Option<String> {
    PARSER_BEGIN_RE
        .captures(text)
        .map(|captures| captures[1].to_string())
}
