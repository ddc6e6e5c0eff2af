use crate::constants::filters::{ALL, ALL_ALIASES, REGION_SEPARATOR};
use crate::errors::QuizError;
use crate::quiz::normalize::group_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateItem {
    canonical_name: String,
    group_key: String,
    display_group: String,
    filter_tags: Vec<String>,
    alternate_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    population: Option<u64>,
}

impl CandidateItem {
    /// Builds a candidate filed under the first letter of its own name.
    pub fn new(name: &str, filter_tag: &str) -> Result<Self, QuizError> {
        Self::build(name, None, &[filter_tag.to_string()], Vec::new(), None, None)
    }

    pub fn with_alternates<I, S>(mut self, alternates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternate_names = alternates
            .into_iter()
            .map(Into::into)
            .filter(|alt: &String| !alt.trim().is_empty())
            .collect();
        self
    }

    fn build(
        name: &str,
        grouping_source: Option<&str>,
        filter_tags: &[String],
        alternate_names: Vec<String>,
        country: Option<String>,
        population: Option<u64>,
    ) -> Result<Self, QuizError> {
        let canonical_name = name.trim();
        if canonical_name.is_empty() {
            return Err(QuizError::invalid_catalog("Candidate name must not be empty"));
        }
        let source = grouping_source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(canonical_name);
        let group_key = group_key(source).ok_or_else(|| {
            QuizError::invalid_catalog(format!("Cannot derive a group for {}", canonical_name))
        })?;
        let display_group = source
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| group_key.clone());

        let mut tags: Vec<String> = Vec::new();
        for tag in filter_tags
            .iter()
            .flat_map(|raw| raw.split(REGION_SEPARATOR))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
        {
            if !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        if tags.is_empty() {
            return Err(QuizError::invalid_catalog(format!(
                "Candidate {} has no filter tag",
                canonical_name
            )));
        }

        Ok(Self {
            canonical_name: canonical_name.to_string(),
            group_key,
            display_group,
            filter_tags: tags,
            alternate_names: alternate_names
                .into_iter()
                .map(|alt| alt.trim().to_string())
                .filter(|alt| !alt.is_empty())
                .collect(),
            country: country
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            population,
        })
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn display_group(&self) -> &str {
        &self.display_group
    }

    /// Primary region; multi-region candidates list the others in `filter_tags`.
    pub fn filter_tag(&self) -> &str {
        &self.filter_tags[0]
    }

    pub fn filter_tags(&self) -> &[String] {
        &self.filter_tags
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    /// Country of a city candidate; `None` for countries.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn population(&self) -> Option<u64> {
        self.population
    }

    /// Canonical name followed by the alternates, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str())
            .chain(self.alternate_names.iter().map(String::as_str))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.filter_tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Filter {
    All,
    Tag(String),
}

impl Filter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();
        if trimmed.is_empty() || ALL_ALIASES.contains(&lowered.as_str()) {
            Filter::All
        } else {
            Filter::Tag(trimmed.to_string())
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Filter::parse(&tag.into())
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Filter::All => ALL,
            Filter::Tag(tag) => tag,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::All
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One catalog entry. Country lists use `name`/`continent`/`letter`; city
/// lists use `Stadt`/`Land`/`Kontinent`/`Einwohner`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    #[serde(alias = "canonicalName", alias = "canonical_name", alias = "Stadt")]
    pub name: String,
    #[serde(default, alias = "letter", alias = "groupingSourceChar")]
    pub grouping_source_char: Option<String>,
    #[serde(alias = "continent", alias = "filterTag", alias = "Kontinent")]
    pub filter_tag: String,
    #[serde(default, alias = "Land")]
    pub country: Option<String>,
    #[serde(default, alias = "Einwohner")]
    pub population: Option<u64>,
    #[serde(default, alias = "alternatives", alias = "alternateNames")]
    pub alternate_names: Option<Vec<String>>,
}

impl SourceRecord {
    pub fn into_candidate(self) -> Result<CandidateItem, QuizError> {
        CandidateItem::build(
            &self.name,
            self.grouping_source_char.as_deref(),
            &[self.filter_tag],
            self.alternate_names.unwrap_or_default(),
            self.country,
            self.population,
        )
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    items: Vec<SourceRecord>,
    #[serde(default)]
    composite_filters: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Items(Vec<SourceRecord>),
    Document(CatalogDocument),
}

/// Immutable candidate set with lookup by canonical name and filter resolution.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CandidateItem>,
    index: HashMap<String, usize>,
    composites: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub fn new(items: Vec<CandidateItem>) -> Result<Self, QuizError> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.canonical_name.clone(), pos).is_some() {
                return Err(QuizError::invalid_catalog(format!(
                    "Duplicate candidate name: {}",
                    item.canonical_name
                ))
                .with_hint("Canonical names must be unique; list extra regions as \"A/B\""));
            }
        }
        Ok(Self {
            items,
            index,
            composites: BTreeMap::new(),
        })
    }

    /// Declares a filter tag that stands for the union of other tags.
    pub fn with_composite<I, S>(mut self, name: &str, members: I) -> Result<Self, QuizError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.trim();
        if matches!(Filter::parse(name), Filter::All) {
            return Err(QuizError::invalid_catalog(format!(
                "Composite filter name is reserved: {}",
                name
            )));
        }
        let members: Vec<String> = members
            .into_iter()
            .map(Into::into)
            .map(|m: String| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if members.is_empty() {
            return Err(QuizError::invalid_catalog(format!(
                "Composite filter {} has no members",
                name
            )));
        }
        self.composites.insert(name.to_string(), members);
        Ok(self)
    }

    pub fn from_records(records: Vec<SourceRecord>) -> Result<Self, QuizError> {
        let items = records
            .into_iter()
            .map(SourceRecord::into_candidate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(items)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, QuizError> {
        let parsed: CatalogFile = serde_json::from_str(raw).map_err(|err| {
            QuizError::invalid_catalog(format!("Failed to parse catalog: {}", err))
        })?;
        match parsed {
            CatalogFile::Items(records) => Self::from_records(records),
            CatalogFile::Document(doc) => {
                let mut catalog = Self::from_records(doc.items)?;
                for (name, members) in doc.composite_filters {
                    catalog = catalog.with_composite(&name, members)?;
                }
                Ok(catalog)
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, QuizError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                QuizError::not_found(format!("Catalog file not found: {}", path.display()))
                    .with_hint("Pass --catalog or set GEOQUIZ_CATALOG_PATH")
            } else {
                QuizError::io(format!("Failed to read catalog {}: {}", path.display(), err))
            }
        })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, canonical_name: &str) -> Option<&CandidateItem> {
        self.index.get(canonical_name).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.index.contains_key(canonical_name)
    }

    pub fn in_filter(&self, item: &CandidateItem, filter: &Filter) -> bool {
        match filter {
            Filter::All => true,
            Filter::Tag(tag) => match self.composites.get(tag) {
                Some(members) => members.iter().any(|m| item.has_tag(m)),
                None => item.has_tag(tag),
            },
        }
    }

    pub fn filter_items<'a>(
        &'a self,
        filter: &'a Filter,
    ) -> impl Iterator<Item = &'a CandidateItem> + 'a {
        self.items
            .iter()
            .filter(move |item| self.in_filter(item, filter))
    }

    /// Candidates of `group` under `filter`, in catalog order.
    pub fn group_items<'a>(
        &'a self,
        group: &'a str,
        filter: &'a Filter,
    ) -> impl Iterator<Item = &'a CandidateItem> + 'a {
        self.filter_items(filter)
            .filter(move |item| item.group_key == group)
    }

    /// Sorted group keys that hold at least one candidate under `filter`.
    pub fn groups(&self, filter: &Filter) -> Vec<String> {
        self.filter_items(filter)
            .map(|item| item.group_key.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `All`, then composites, then plain tags in first-seen order.
    pub fn filters(&self) -> Vec<Filter> {
        let mut out = vec![Filter::All];
        out.extend(self.composites.keys().map(|name| Filter::Tag(name.clone())));
        for tag in self.items.iter().flat_map(|item| item.filter_tags.iter()) {
            let filter = Filter::Tag(tag.clone());
            if !out.contains(&filter) {
                out.push(filter);
            }
        }
        out
    }

    pub fn knows_filter(&self, filter: &Filter) -> bool {
        match filter {
            Filter::All => true,
            Filter::Tag(tag) => {
                self.composites.contains_key(tag) || self.items.iter().any(|i| i.has_tag(tag))
            }
        }
    }

    /// Next non-empty group after `current` under `filter`, wrapping around.
    pub fn next_group(&self, current: &str, filter: &Filter) -> Option<String> {
        let groups = self.groups(filter);
        groups
            .iter()
            .find(|group| group.as_str() > current)
            .or_else(|| groups.first())
            .cloned()
    }
}
