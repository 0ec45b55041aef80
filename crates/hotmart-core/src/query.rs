//! Convenience builder for HTTP query parameters.
//!
//! Parameters are kept as ordered `(key, value)` pairs. A multi-value parameter
//! is stored as repeated pairs under the same key, which is how `reqwest`
//! serializes it (`status=ACTIVE&status=DELAYED`).

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append using a fallible mapping function when the value is present.
    ///
    /// Nothing is appended when the mapper returns `None`.
    pub fn push_opt_with<T, U, F>(&mut self, key: &'static str, value: Option<T>, map: F)
    where
        U: Display,
        F: FnOnce(T) -> Option<U>,
    {
        if let Some(mapped) = value.and_then(map) {
            self.pairs.push((key, mapped.to_string()));
        }
    }

    /// Append every value under the same key, preserving order.
    pub fn push_many<I, T>(&mut self, key: &'static str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.pairs
            .extend(values.into_iter().map(|value| (key, value.to_string())));
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Replace every existing value for `key` with a single value.
    pub fn set<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.remove(key);
        self.push(key, value);
    }

    /// Remove every pair for `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(existing, _)| *existing != key);
    }

    /// First value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// All values stored for `key`, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Returns true if at least one pair exists for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(existing, _)| *existing == key)
    }

    /// Borrow the collected pairs.
    #[must_use]
    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }

    /// Number of pairs (repeated keys count once per value).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("name", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn push_opt_keeps_false() {
        let mut params = QueryParams::new();
        params.push_opt("trial", Some(false));
        assert_eq!(params.get("trial"), Some("false"));
    }

    #[test]
    fn push_opt_with_applies_mapper() {
        let mut params = QueryParams::new();
        params.push_opt_with("limit", Some(5u32), |v| Some(format!("{v:02}")));
        params.push_opt_with("skipped", Some(1u32), |_| Option::<u32>::None);
        assert_eq!(params.into_pairs(), vec![("limit", "05".to_string())]);
    }

    #[test]
    fn push_many_repeats_key_in_order() {
        let mut params = QueryParams::new();
        params.push_many("status", ["ACTIVE", "DELAYED"]);
        assert_eq!(params.get_all("status"), vec!["ACTIVE", "DELAYED"]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn set_replaces_existing_values() {
        let mut params = QueryParams::new();
        params.push("max_results", 100);
        params.push("page_token", "a");
        params.set("max_results", 500);

        assert_eq!(params.get_all("max_results"), vec!["500"]);
        assert!(params.contains_key("page_token"));

        params.remove("page_token");
        assert!(!params.contains_key("page_token"));
    }
}
