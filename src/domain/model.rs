use crate::utils::sanitize::filename_part;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// One scraped table row: column name to cell text, in column order.
///
/// Inserting an existing column overwrites its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column name to cell text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    record.insert(k, v);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Union of all column names across `records`, in first-seen order.
pub fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// Rebuild every record over `columns`, filling missing cells with `""`.
pub fn normalize(records: &[Record], columns: &[String]) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| (c.clone(), record.get(c).unwrap_or("").to_string()))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub state: String,
    pub district: String,
    pub court_complex: String,
    pub date: String,
}

impl QueryParams {
    pub fn new(
        state: impl Into<String>,
        district: impl Into<String>,
        court_complex: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            district: district.into(),
            court_complex: court_complex.into(),
            date: date.into(),
        }
    }

    /// `{state}_{district}_{complex}_{date}` with non-word runs replaced.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            filename_part(&self.state, "state"),
            filename_part(&self.district, "dist"),
            filename_part(&self.court_complex, "complex"),
            self.date
        )
    }

    pub fn title(&self) -> String {
        format!(
            "Cause List - {} / {} / {}",
            self.state, self.district, self.court_complex
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Exported,
    EmptyResult,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBundle {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub records: Vec<Record>,
    pub outcome: RunOutcome,
}

impl ResultBundle {
    pub fn empty() -> Self {
        Self {
            csv: None,
            json: None,
            pdf: None,
            records: Vec::new(),
            outcome: RunOutcome::EmptyResult,
        }
    }
}

/// A way of locating an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Selector {
    Id(String),
    Css(String),
    XPath(String),
    Tag(String),
}

impl Selector {
    pub fn id(value: impl Into<String>) -> Self {
        Selector::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Selector::Css(value.into())
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Selector::Tag(value.into())
    }

    /// The DOM query this selector runs as.
    pub fn query(&self) -> DomQuery {
        match self {
            Selector::Id(id) => {
                DomQuery::Css(format!("[id=\"{}\"]", id.replace('"', "\\\"")))
            }
            Selector::Css(css) => DomQuery::Css(css.clone()),
            Selector::Tag(tag) => DomQuery::Css(tag.clone()),
            Selector::XPath(xpath) => DomQuery::XPath(xpath.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomQuery {
    Css(String),
    XPath(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(v) => write!(f, "id={}", v),
            Selector::Css(v) => write!(f, "css={}", v),
            Selector::XPath(v) => write!(f, "xpath={}", v),
            Selector::Tag(v) => write!(f, "tag={}", v),
        }
    }
}
