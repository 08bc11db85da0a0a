// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Petition input and classification output types

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A submitted petition. Lives for one request only.
///
/// `priority` and `status` default to "medium" and "new" when absent. An
/// explicit `null` is kept as `None` and echoed back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Petition {
    pub title: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: Option<String>,
    #[serde(default = "default_status")]
    pub status: Option<String>,
}

fn default_priority() -> Option<String> {
    Some("medium".to_string())
}

fn default_status() -> Option<String> {
    Some("new".to_string())
}

impl Petition {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: default_priority(),
            status: default_status(),
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The text handed to the classifier: `"{title}. {description}"`.
    pub fn text_to_classify(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }
}

/// Category → score, kept in the classifier's ranked order.
///
/// Serializes as a JSON object whose keys appear highest score first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap(Vec<(String, f64)>);

impl ScoreMap {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, score)| *score)
    }

    pub fn contains_key(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, score)| (key.as_str(), *score))
    }

    /// Label with the highest score; the first one on ties.
    pub fn arg_max(&self) -> Option<(&str, f64)> {
        let mut best = None;
        for (key, score) in self.iter() {
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((key, score)),
            }
        }
        best
    }
}

impl FromIterator<(String, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut entries: Vec<(String, f64)> = Vec::new();
        for (key, score) in iter {
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = score,
                None => entries.push((key, score)),
            }
        }
        ScoreMap(entries)
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, score) in &self.0 {
            map.serialize_entry(key, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = ScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreMap, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, score)) = access.next_entry::<String, f64>()? {
                    entries.push((key, score));
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}

/// Response body of `POST /classify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub petition: Petition,
    pub predicted_category: String,
    pub confidence: f64,
    pub all_scores: ScoreMap,
}
