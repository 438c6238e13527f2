use std::fmt;
use url::Url;

/// The same-site boundary for link-following
///
/// An origin is the scheme, host and port of a URL. Comparison is exact:
/// `http` and `https` differ, subdomains differ, and an explicit default port
/// equals the implicit one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(url::Origin);

impl Origin {
    /// Extracts the origin of a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use site2pdf::url::Origin;
    ///
    /// let seed = Url::parse("https://example.com/start").unwrap();
    /// let origin = Origin::of(&seed);
    /// assert_eq!(origin.to_string(), "https://example.com");
    /// ```
    pub fn of(url: &Url) -> Self {
        Self(url.origin())
    }

    /// Returns true if `url` belongs to this origin
    pub fn contains(&self, url: &Url) -> bool {
        self.0.is_tuple() && url.origin() == self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.ascii_serialization())
    }
}
