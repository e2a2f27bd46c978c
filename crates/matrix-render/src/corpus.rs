//! Static text corpus
//!
//! Source JSON maps an arcana number to its title and a set of free-form
//! section headings:
//!
//! ```json
//! {"1": {"title": "1 аркан: Маг", "spheres": {"ЛИЧНЫЕ КАЧЕСТВА": "..."}}}
//! ```
//!
//! Headings are resolved to sphere ids once, at load time. Personal headings
//! are matched by keyword; compatibility headings must equal the canonical
//! sphere title. Headings that place nowhere become `LoadWarning`s.

use crate::error::{CorpusError, LoadWarning};
use crate::sphere::layout;
use indexmap::IndexMap;
use matrix_gate::ServiceType;
use matrix_points::{Arcana, MAX_ARCANA};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Keywords identifying each personal sphere, checked in this order
pub const PERSONAL_KEYWORDS: [(&str, &[&str]); 14] = [
    (
        "qualities",
        &["ЛИЧНЫЕ КАЧЕСТВА", "ХАРАКТЕР", "ПСИХОЛОГИЧЕСКИЙ ПОРТРЕТ", "ЭНЕРГЕТИКА"],
    ),
    ("pastlife", &["ПРОШЛАЯ ЖИЗНЬ", "КАРМИЧЕСКАЯ ПАМЯТЬ"]),
    ("talents", &["ТАЛАНТЫ", "ЗОЛОТОЙ ЗАПАС", "СУПЕРСИЛЫ"]),
    ("purpose", &["ПРЕДНАЗНАЧЕНИЕ", "МИССИЯ ДУШИ"]),
    ("money", &["ДЕНЬГИ", "БИЗНЕС", "КАРЬЕРА", "ФИНАНСЫ"]),
    ("programs", &["ПРОГРАММЫ", "КАРМИЧЕСКИЕ СЦЕНАРИИ", "ЛОВУШКИ"]),
    ("sexuality", &["СЕКСУАЛЬНОСТЬ", "ТЕМПЕРАМЕНТ", "ЛЮБОВЬ"]),
    ("parents", &["РОДИТЕЛИ", "ДЕТСКО-РОДИТЕЛЬСКАЯ", "СЕПАРАЦИЯ"]),
    ("children", &["ДЕТИ", "РОДИТЕЛЬ"]),
    ("relationships", &["ОТНОШЕНИЯ", "ЛЮБОВЬ", "ПАРТНЕР"]),
    ("leadership", &["РУКОВОДСТВО", "УПРАВЛЕНИЕ", "ЛИДЕРСТВО"]),
    ("year", &["ГОД", "ПРОГНОЗ", "ЭНЕРГИЯ ПЕРИОДА"]),
    ("brand", &["БРЕНД", "ПОЗИЦИОНИРОВАНИЕ", "ЛИЧНЫЙ БРЕНД"]),
    ("health", &["ЗДОРОВЬЕ", "ПСИХОСОМАТИКА"]),
];

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    spheres: IndexMap<String, String>,
}

/// Texts for one arcana, keyed by sphere id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusEntry {
    title: Option<String>,
    texts: HashMap<&'static str, String>,
}

/// Corpus plus the problems found while loading it
#[derive(Debug, Clone)]
pub struct CorpusLoad {
    /// Loaded corpus
    pub corpus: TextCorpus,
    /// Headings that matched no sphere
    pub warnings: Vec<LoadWarning>,
}

/// Read-only text corpus for one service
#[derive(Debug, Clone, Default)]
pub struct TextCorpus {
    entries: BTreeMap<u32, CorpusEntry>,
}

impl TextCorpus {
    /// Corpus with no texts; every lookup misses
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a JSON file
    ///
    /// # Errors
    /// `CorpusError` when the file cannot be read or parsed.
    pub fn load(service: ServiceType, path: &Path) -> Result<CorpusLoad, CorpusError> {
        let json = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let load = Self::from_json(service, &json)?;
        tracing::info!(
            path = %path.display(),
            %service,
            arcana = load.corpus.len(),
            warnings = load.warnings.len(),
            "loaded text corpus"
        );
        Ok(load)
    }

    /// Parse JSON text
    ///
    /// # Errors
    /// `CorpusError` for malformed JSON or keys outside `1..=22`.
    pub fn from_json(service: ServiceType, json: &str) -> Result<CorpusLoad, CorpusError> {
        let raw: IndexMap<String, RawEntry> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        let mut warnings = Vec::new();

        for (number, entry) in raw {
            let arcana = number
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_ARCANA).contains(n))
                .ok_or_else(|| CorpusError::InvalidArcana(number.clone()))?;

            let texts = match service {
                ServiceType::Personal => map_by_keywords(&entry.spheres),
                ServiceType::Compatibility => map_by_title(&entry.spheres),
            };

            let used: HashSet<&str> = texts.values().map(|(heading, _)| *heading).collect();
            for heading in entry.spheres.keys() {
                if !used.contains(heading.as_str()) {
                    tracing::warn!(arcana, heading = %heading, "corpus heading matches no sphere");
                    warnings.push(LoadWarning {
                        arcana,
                        heading: heading.clone(),
                    });
                }
            }

            let texts = texts
                .into_iter()
                .filter(|(_, (_, text))| !text.trim().is_empty())
                .map(|(id, (_, text))| (id, text.to_string()))
                .collect();
            entries.insert(
                arcana,
                CorpusEntry {
                    title: entry.title.filter(|t| !t.trim().is_empty()),
                    texts,
                },
            );
        }

        Ok(CorpusLoad {
            corpus: Self { entries },
            warnings,
        })
    }

    /// Number of arcana with an entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the corpus has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arcana title, if the corpus has one
    #[must_use]
    pub fn title(&self, arcana: Arcana) -> Option<&str> {
        self.entries.get(&arcana.value())?.title.as_deref()
    }

    /// Text for an arcana in a sphere
    #[must_use]
    pub fn text(&self, arcana: Arcana, sphere_id: &str) -> Option<&str> {
        self.entries
            .get(&arcana.value())?
            .texts
            .get(sphere_id)
            .map(String::as_str)
    }
}

/// For each sphere, the first heading containing one of its keywords
fn map_by_keywords(spheres: &IndexMap<String, String>) -> HashMap<&'static str, (&str, &str)> {
    let upper: Vec<(String, &str, &str)> = spheres
        .iter()
        .map(|(h, t)| (h.to_uppercase(), h.as_str(), t.as_str()))
        .collect();

    PERSONAL_KEYWORDS
        .iter()
        .filter_map(|(id, keywords)| {
            upper
                .iter()
                .find(|(heading, _, _)| keywords.iter().any(|k| heading.contains(k)))
                .map(|(_, heading, text)| (*id, (*heading, *text)))
        })
        .collect()
}

/// Headings equal to a canonical compatibility title
fn map_by_title(spheres: &IndexMap<String, String>) -> HashMap<&'static str, (&str, &str)> {
    layout(ServiceType::Compatibility)
        .iter()
        .filter_map(|spec| {
            spheres
                .iter()
                .find(|(heading, _)| heading.trim() == spec.title)
                .map(|(heading, text)| (spec.id, (heading.as_str(), text.as_str())))
        })
        .collect()
}
