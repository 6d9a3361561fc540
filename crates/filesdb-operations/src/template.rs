/// Suffix of the per-repository file list archive.
pub const FILES_SUFFIX: &str = ".files";

/// Expands a mirror URL template for one repository.
///
/// Every `$arch` is replaced with `arch`, then every `$repo` with `repo`, and
/// `/<repo><suffix>` is appended. No URL normalisation happens; a template ending in
/// `/` yields a doubled slash.
///
/// ```
/// use filesdb_operations::template::expand_url;
///
/// let url = expand_url("https://example.org/$repo/os/$arch", "core", "x86_64", ".files");
/// assert_eq!(url, "https://example.org/core/os/x86_64/core.files");
/// ```
pub fn expand_url(template: &str, repo: &str, arch: &str, suffix: &str) -> String {
    let base = template.replace("$arch", arch).replace("$repo", repo);
    format!("{base}/{repo}{suffix}")
}
