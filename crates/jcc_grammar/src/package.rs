use std::path::PathBuf;

/// Resolve a configured package name against a grammar's declared package.
///
/// A leading `*` in `configured` stands for the declared package: declared
/// `org.app` with configured `*.node` resolves to `org.app.node`. When the
/// declared package is empty the leading `*.` is stripped instead, so the
/// result never starts with a dot.
pub fn resolve_package(configured: &str, declared: &str) -> String {
    match configured.strip_prefix('*') {
        Some(rest) => {
            if declared.is_empty() {
                rest.strip_prefix('.').unwrap_or(rest).to_string()
            } else {
                format!("{}{}", declared, rest)
            }
        }
        None => configured.to_string(),
    }
}

/// Translate a dot-separated package into a relative directory path.
/// The default (empty) package maps to an empty path.
pub fn package_to_directory(package: &str) -> PathBuf {
    if package.is_empty() {
        return PathBuf::new();
    }
    package.split('.').collect()
}
