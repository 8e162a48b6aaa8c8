use indexmap::IndexMap;
use serde_json::Value as Json;

/// Open, string-keyed field metadata.
///
/// Applications attach arbitrary keys (widget hints, sort weights, …). Only a
/// few are read here: `title`, `placeholder`, `help`, `format`, `currency`
/// and `hidden`. Everything else is carried untouched.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, Json>);

impl Metadata {
    pub fn new() -> Metadata {
        Metadata::default()
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Json>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Json::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.get_str("placeholder")
    }

    pub fn help(&self) -> Option<&str> {
        self.get_str("help")
    }

    pub fn format(&self) -> Option<&str> {
        self.get_str("format")
    }

    pub fn currency(&self) -> Option<&str> {
        self.get_str("currency")
    }

    pub fn is_hidden(&self) -> bool {
        match self.0.get("hidden") {
            Some(Json::Bool(hidden)) => *hidden,
            Some(Json::String(hidden)) => hidden == "true",
            _ => false,
        }
    }
}

impl<K: Into<String>, V: Into<Json>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Metadata(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
