use std::fmt;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;

use crate::model::Year;

/// A backend route: path segments plus query parameters.
///
/// List parameters are sent by repeating the key, e.g. `years=2019&years=2014`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// A route from `/`-separated `path`. Empty segments are ignored.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            query: Vec::new(),
        }
    }

    /// Appends one path segment verbatim; it is percent-encoded when the URL is built.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds `key` once per value, keeping the order given.
    pub fn params<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Joins this route onto `base_url`, keeping any path the base already has.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL '{base_url}'"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL '{base_url}' cannot take a path"))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub fn years() -> Self {
        Self::new("years")
    }

    pub fn election(year: Year) -> Self {
        Self::new("election").segment(year.to_string())
    }

    pub fn party_trends() -> Self {
        Self::new("party-trends")
    }

    pub fn turnout() -> Self {
        Self::new("turnout")
    }

    pub fn compare_years(years: &[Year]) -> Self {
        Self::new("compare/years").params("years", years)
    }

    pub fn compare_parties<S: AsRef<str>>(parties: &[S]) -> Self {
        Self::new("compare/parties").params("parties", parties.iter().map(|p| p.as_ref()))
    }

    pub fn party(name: &str) -> Self {
        Self::new("party").segment(name)
    }

    pub fn parties() -> Self {
        Self::new("parties")
    }

    pub fn states() -> Self {
        Self::new("states")
    }

    pub fn constituency_types() -> Self {
        Self::new("constituency-types")
    }

    pub fn constituency(name: &str) -> Self {
        Self::new("constituency").segment(name)
    }

    /// `party` narrows the trends to one party; all parties otherwise.
    pub fn state_party_trends(state: &str, party: Option<&str>) -> Self {
        Self::new("state-party-trends")
            .param("state", state)
            .params("party", party)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            write!(f, "{}{key}={value}", if i == 0 { '?' } else { '&' })?;
        }
        Ok(())
    }
}
