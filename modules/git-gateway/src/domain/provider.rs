//! Provider identities, admission rules and API roots.

use std::fmt;

use gateway_security::TenantConfig;
use regex::Regex;

use super::target::single_joining_slash;

/// Git hosting provider fronted by a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GitHub,
    GitLab,
    BitBucket,
}

impl Provider {
    pub const ALL: [Self; 3] = [Self::GitHub, Self::GitLab, Self::BitBucket];

    /// Display name used in client-facing messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::GitLab => "GitLab",
            Self::BitBucket => "BitBucket",
        }
    }

    /// First path segment under which the gateway is mounted.
    #[must_use]
    pub fn mount(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::BitBucket => "bitbucket",
        }
    }

    fn allow_pattern(self) -> &'static str {
        match self {
            Self::GitHub => {
                r"^/github/(git|contents|pulls|branches|merges|statuses|compare|commits)(/|$)"
            }
            Self::GitLab => {
                r"^/gitlab/(merge_requests|repository/(files|commits|tree|compare|branches))(/|$)"
            }
            Self::BitBucket => r"^/bitbucket/(src|refs/branches|pullrequests|commits?|diff)(/|$)",
        }
    }

    /// Whether the tenant carries credential material for this provider.
    #[must_use]
    pub fn is_configured(self, config: &TenantConfig) -> bool {
        match self {
            Self::GitHub => config.github.is_enabled(),
            Self::GitLab => config.gitlab.is_enabled(),
            Self::BitBucket => config.bitbucket.is_enabled(),
        }
    }

    /// Upstream URL every admitted path is joined onto.
    ///
    /// GitLab addresses projects by their path-escaped full name, so
    /// `owner/name` becomes `owner%2Fname`.
    #[must_use]
    pub fn api_root(self, config: &TenantConfig) -> String {
        match self {
            Self::GitHub => single_joining_slash(
                config.github.endpoint(),
                &format!("/repos/{}", config.github.repo),
            ),
            Self::GitLab => single_joining_slash(
                config.gitlab.endpoint(),
                &format!("/projects/{}", urlencoding::encode(&config.gitlab.repo)),
            ),
            Self::BitBucket => single_joining_slash(
                config.bitbucket.endpoint(),
                &format!("/repositories/{}", config.bitbucket.repo),
            ),
        }
    }

    /// Pagination travels in the `Link` response header.
    #[must_use]
    pub fn paginates_with_link_header(self) -> bool {
        matches!(self, Self::GitHub | Self::GitLab)
    }

    /// Pagination travels in `next`/`previous` fields of JSON bodies.
    #[must_use]
    pub fn paginates_with_json_body(self) -> bool {
        matches!(self, Self::BitBucket)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled path rules for one provider.
#[derive(Debug, Clone)]
pub struct ProviderRoutes {
    mount: Regex,
    allowed: Regex,
}

impl ProviderRoutes {
    /// # Errors
    /// Returns the regex error if a built-in pattern fails to compile.
    pub fn new(provider: Provider) -> Result<Self, regex::Error> {
        Ok(Self {
            mount: Regex::new(&format!("^/{}/?", provider.mount()))?,
            allowed: Regex::new(provider.allow_pattern())?,
        })
    }

    /// Matches the raw (still escaped) request path against the allow-list.
    #[must_use]
    pub fn is_allowed(&self, path: &str) -> bool {
        self.allowed.is_match(path)
    }

    /// Replaces the mount prefix with `/`.
    #[must_use]
    pub fn strip_mount(&self, path: &str) -> String {
        self.mount.replace(path, "/").into_owned()
    }
}
