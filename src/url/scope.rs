use url::Url;

/// Returns the network authority (lowercase host and explicit port) of a URL
///
/// Default ports are already dropped by the parser, so
/// `https://example.com:443/` and `https://example.com/` compare equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use doc_harvest::url::authority;
///
/// let url = Url::parse("https://EXAMPLE.com:8443/path").unwrap();
/// assert_eq!(authority(&url), Some(("example.com".to_string(), Some(8443))));
/// ```
pub fn authority(url: &Url) -> Option<(String, Option<u16>)> {
    url.host_str().map(|h| (h.to_lowercase(), url.port()))
}

/// Checks whether `url` is served by the same authority as `base`
///
/// Malformed input on either side yields `false`.
pub fn same_host(url: &str, base: &str) -> bool {
    match (Url::parse(url), Url::parse(base)) {
        (Ok(url), Ok(base)) => same_authority(&url, &base),
        _ => false,
    }
}

/// Checks whether `url` lives on the same authority as `base` and under its path
///
/// The path comparison works on whole segments: `/a/b` is under `/a`,
/// `/ab` is not. Malformed input on either side yields `false`.
pub fn under_base_path(url: &str, base: &str) -> bool {
    match (Url::parse(url), Url::parse(base)) {
        (Ok(url), Ok(base)) => {
            same_authority(&url, &base) && path_has_prefix(url.path(), base.path())
        }
        _ => false,
    }
}

fn same_authority(url: &Url, base: &Url) -> bool {
    match (authority(url), authority(base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Segment-aware path prefix test
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() || prefix == "/" {
        return true;
    }
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The host/path boundary of one crawl
#[derive(Debug, Clone)]
pub struct Scope {
    base: Url,
    same_path_only: bool,
}

impl Scope {
    /// Creates a scope rooted at `base`
    ///
    /// With `same_path_only` the scope covers URLs under the base path;
    /// without it, the whole site.
    pub fn new(base: Url, same_path_only: bool) -> Self {
        Self {
            base,
            same_path_only,
        }
    }

    /// The URL the scope is rooted at
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Whether only the base path (rather than the whole site) is in scope
    pub fn same_path_only(&self) -> bool {
        self.same_path_only
    }

    /// Checks whether a candidate URL belongs to this crawl
    pub fn contains(&self, url: &Url) -> bool {
        if !same_authority(url, &self.base) {
            return false;
        }
        !self.same_path_only || path_has_prefix(url.path(), self.base.path())
    }
}
