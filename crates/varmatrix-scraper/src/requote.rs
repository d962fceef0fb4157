//! Product URL parsing and requoting.
//!
//! A product page's configuration lives in its query string. Requoting
//! writes a selection's option identifiers over the matching parameters
//! and leaves every other parameter where it was.

use url::{form_urlencoded, Url};
use varmatrix_core::Selection;

use crate::error::ScraperError;

/// One `&`-separated query segment, kept exactly as it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    raw: String,
    name: String,
    value: String,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let (name, value) = form_urlencoded::parse(raw.as_bytes())
            .next()
            .map(|(n, v)| (n.into_owned(), v.into_owned()))
            .unwrap_or_default();
        Self {
            raw: raw.to_string(),
            name,
            value,
        }
    }

    fn encoded(name: &str, value: &str) -> Self {
        let raw = form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .finish();
        Self {
            raw,
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Ordered query parameters.
///
/// Segments keep their original encoding, repeats and valueless flags, so
/// writing them back reproduces the query byte for byte. Lookups read the
/// first occurrence of a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    segments: Vec<Segment>,
}

impl QueryParams {
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    #[must_use]
    pub fn from_query(query: &str) -> Self {
        if query.is_empty() {
            return Self::default();
        }
        Self {
            segments: query.split('&').map(Segment::parse).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| !s.raw.is_empty() && s.name == name)
            .map(|s| s.value.as_str())
    }

    /// Overwrites the first `name` segment in place and drops its repeats,
    /// or appends `name` when absent. Other segments are untouched.
    pub fn set(&mut self, name: &str, value: &str) {
        let replacement = Segment::encoded(name, value);
        match self.segments.iter().position(|s| !s.raw.is_empty() && s.name == name) {
            Some(first) => {
                self.segments[first] = replacement;
                let mut index = 0;
                self.segments.retain(|s| {
                    let keep = index <= first || s.raw.is_empty() || s.name != name;
                    index += 1;
                    keep
                });
            }
            None => self.segments.push(replacement),
        }
    }

    /// Decoded `(name, value)` pairs in order, repeats included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments
            .iter()
            .filter(|s| !s.raw.is_empty())
            .map(|s| (s.name.as_str(), s.value.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The query string with every untouched segment in its original form.
    #[must_use]
    pub fn to_query(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.raw.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A product page URL split into its base and its query parameters.
#[derive(Debug, Clone)]
pub struct ProductUrl {
    source: String,
    base: Url,
    params: QueryParams,
}

impl ProductUrl {
    /// Parses an absolute `http`/`https` product URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidProductUrl`] when `raw` does not parse
    /// or uses another scheme.
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        let invalid = |reason: String| ScraperError::InvalidProductUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let params = QueryParams::from_url(&url);
        let mut base = url;
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            source: raw.trim().to_string(),
            base,
            params,
        })
    }

    /// The URL exactly as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Scheme, host and path without query or fragment.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// The URL for `selection`: each chosen value's id is written to its
    /// axis parameter; unrelated parameters keep their value and position.
    #[must_use]
    pub fn requote(&self, selection: &Selection) -> String {
        let mut params = self.params.clone();
        for entry in selection {
            if !entry.value.param.is_empty() {
                params.set(&entry.value.param, &entry.value.id);
            }
        }

        let mut url = self.base.clone();
        if !params.is_empty() {
            url.set_query(Some(&params.to_query()));
        }
        url.to_string()
    }
}
