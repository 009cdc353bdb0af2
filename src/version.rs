//! Build identity reported by `plenariod` and the health endpoint.
//!
//! Release builds from a git checkout read `0.1.0+main.abc1234`; a checkout
//! with uncommitted changes adds `.dirty`. Source tarballs carry no git
//! metadata and report the bare package version.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const SHORT_SHA_LEN: usize = 7;

/// Version string with git build metadata when it was available.
pub fn version_string() -> String {
    render(
        option_env!("VERGEN_GIT_BRANCH"),
        option_env!("VERGEN_GIT_SHA"),
        option_env!("VERGEN_GIT_DIRTY") == Some("true"),
    )
}

fn render(branch: Option<&str>, sha: Option<&str>, dirty: bool) -> String {
    let Some(sha) = sha.filter(|s| !s.is_empty()) else {
        return PKG_VERSION.to_string();
    };
    let short = sha.get(..SHORT_SHA_LEN).unwrap_or(sha);
    let branch = branch.filter(|b| !b.is_empty()).unwrap_or("detached");
    let dirty = if dirty { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{branch}.{short}{dirty}")
}
