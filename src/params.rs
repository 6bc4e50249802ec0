//! Ordered request parameters.

use url::form_urlencoded;

/// Anything that knows how to describe itself as request parameters.
pub trait ToParams {
    fn write_params(&self, params: &mut Params);
}

/// An ordered list of `name=value` pairs.
///
/// Repeated names are allowed (polygon vertices and multi-valued attributes
/// are sent that way). [`Params::set`] and [`Params::merge`] give
/// last-write-wins semantics per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every existing value for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        let name = name.into();
        self.entries.retain(|(k, _)| *k != name);
        self.entries.push((name, value.to_string()));
        self
    }

    /// Adds another value for `name`, keeping the old ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.entries.push((name.into(), value.to_string()));
        self
    }

    /// Folds `other` in; names present in `other` drop their current values first.
    pub fn merge(&mut self, other: Params) -> &mut Self {
        for (name, _) in &other.entries {
            self.entries.retain(|(k, _)| k != name);
        }
        self.entries.extend(other.entries);
        self
    }

    pub fn extend_from<T: ToParams + ?Sized>(&mut self, value: &T) -> &mut Self {
        let mut nested = Params::new();
        value.write_params(&mut nested);
        self.merge(nested)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering, used for both query
    /// strings and request bodies.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.append(k, v);
        }
        params
    }
}
