//! Release classification.
//!
//! Official builds report with the production API key, everything else
//! (source checkouts, untagged or locally modified builds) with the dev key.

/// Version prefix stamped on builds that were not cut from a tag.
pub const UNTAGGED_PREFIX: &str = "0+untagged";

/// Build provenance signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Built as an installable release artifact (not a source checkout)
    pub installed: bool,

    /// Version string
    pub version: String,

    /// Working tree had uncommitted changes at build time
    pub dirty: bool,
}

impl BuildInfo {
    /// Signals captured when this crate was compiled.
    ///
    /// Release pipelines set `BENTO_RELEASE_BUILD`, and may set
    /// `BENTO_BUILD_VERSION` and `BENTO_BUILD_DIRTY`, in the build environment.
    pub fn current() -> Self {
        Self {
            installed: option_env!("BENTO_RELEASE_BUILD").is_some(),
            version: option_env!("BENTO_BUILD_VERSION")
                .unwrap_or(env!("CARGO_PKG_VERSION"))
                .to_string(),
            dirty: option_env!("BENTO_BUILD_DIRTY").is_some_and(is_truthy),
        }
    }

    /// True only for an installed, tagged, clean build.
    pub fn is_official_release(&self) -> bool {
        let is_tagged = !self.version.starts_with(UNTAGGED_PREFIX);
        self.installed && is_tagged && !self.dirty
    }

    /// Channel name for display and logs.
    pub fn channel(&self) -> &'static str {
        if self.is_official_release() {
            "prod"
        } else {
            "dev"
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
