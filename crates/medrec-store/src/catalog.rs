//! The test catalog and its text format.
//!
//! One definition per line:
//!
//! ```text
//! Name: Glucose (GLU); Range: > 70.0, < 100.0; Unit: mg/dL, 00-02-00
//! Name: Troponin (TROP); Range: , < 0.04; Unit: ng/mL, 00-01-00
//! ```
//!
//! An omitted bound renders as an empty segment. Lines that do not split
//! into at least three `"; "` segments are skipped with a diagnostic; any
//! other defect fails the whole load.

use std::collections::BTreeMap;
use std::path::PathBuf;

use medrec_model::{
    Diagnostic, Parsed, TestDefinition, TestLookup, TestPatch, Turnaround, format_value,
};
use medrec_validate::validate_definition;
use tracing::{info, warn};

use crate::backing::BackingFile;
use crate::error::{NotFound, Result, StoreError};

const SEGMENT_SEPARATOR: &str = "; ";

/// Catalog entries keyed by abbreviation.
pub type CatalogMap = BTreeMap<String, TestDefinition>;

/// Parse catalog text into definitions keyed by abbreviation.
pub fn parse_catalog(text: &str) -> Result<Parsed<CatalogMap>> {
    let mut tests = CatalogMap::new();
    let mut diagnostics = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let segments: Vec<&str> = line.split(SEGMENT_SEPARATOR).collect();
        if segments.len() < 3 {
            warn!(line = line_number, "skipping catalog line with invalid format");
            diagnostics.push(Diagnostic::error(
                line_number,
                format!("invalid format in catalog line: {line}"),
            ));
            continue;
        }
        let definition = parse_segments(&segments).map_err(|message| StoreError::Parse {
            line: line_number,
            message,
        })?;
        if tests.contains_key(&definition.abbr) {
            diagnostics.push(Diagnostic::warning(
                line_number,
                format!(
                    "test '{}' is defined more than once; the last definition wins",
                    definition.abbr
                ),
            ));
        }
        tests.insert(definition.abbr.clone(), definition);
    }
    Ok(Parsed::new(tests, diagnostics))
}

fn parse_segments(segments: &[&str]) -> std::result::Result<TestDefinition, String> {
    let name_abbr = segment_value(segments[0], "Name")?;
    let (name, rest) = name_abbr
        .split_once(" (")
        .ok_or_else(|| format!("expected `<name> (<abbr>)`, found '{name_abbr}'"))?;
    let (abbr, _) = rest
        .split_once(')')
        .ok_or_else(|| format!("missing ')' after abbreviation in '{name_abbr}'"))?;

    let range = segment_value(segments[1], "Range")?;
    let (lower_bound, upper_bound) = parse_range(range)?;

    let unit_turnaround = segment_value(segments[2], "Unit")?;
    let (unit, turnaround) = unit_turnaround
        .split_once(',')
        .ok_or_else(|| format!("expected `<unit>, DD-hh-mm`, found '{unit_turnaround}'"))?;
    let turnaround: Turnaround = turnaround.trim().parse().map_err(|e| format!("{e}"))?;

    Ok(TestDefinition {
        name: name.trim().to_string(),
        abbr: abbr.trim().to_string(),
        lower_bound,
        upper_bound,
        unit: unit.trim().to_string(),
        turnaround,
    })
}

/// Text after the `<label>:` prefix of a segment.
fn segment_value<'a>(segment: &'a str, label: &str) -> std::result::Result<&'a str, String> {
    segment
        .split_once(':')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| format!("expected `{label}: ...`, found '{segment}'"))
}

fn parse_range(range: &str) -> std::result::Result<(Option<f64>, Option<f64>), String> {
    let mut lower = None;
    let mut upper = None;
    for token in range.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(value) = token.strip_prefix('>') {
            lower = Some(parse_bound_value(value, "lower")?);
        } else if let Some(value) = token.strip_prefix('<') {
            upper = Some(parse_bound_value(value, "upper")?);
        } else {
            return Err(format!("unexpected range token '{token}'"));
        }
    }
    Ok((lower, upper))
}

fn parse_bound_value(text: &str, which: &str) -> std::result::Result<f64, String> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid {which} range '{trimmed}'"))
}

/// Render one definition as a catalog line (no trailing newline).
pub fn serialize_definition(definition: &TestDefinition) -> String {
    let lower = definition
        .lower_bound
        .map(|value| format!("> {}", format_value(value)))
        .unwrap_or_default();
    let upper = definition
        .upper_bound
        .map(|value| format!("< {}", format_value(value)))
        .unwrap_or_default();
    format!(
        "Name: {} ({}); Range: {}, {}; Unit: {}, {}",
        definition.name, definition.abbr, lower, upper, definition.unit, definition.turnaround
    )
}

/// Render every definition, one line each, in abbreviation order.
pub fn serialize_catalog(tests: &CatalogMap) -> String {
    let mut out = String::new();
    for definition in tests.values() {
        out.push_str(&serialize_definition(definition));
        out.push('\n');
    }
    out
}

/// The set of known tests, optionally persisted to a catalog file.
#[derive(Debug, Clone, Default)]
pub struct TestCatalog {
    tests: CatalogMap,
    backing: Option<BackingFile>,
}

impl TestCatalog {
    /// A catalog that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TestDefinition>) -> Self {
        Self {
            tests: definitions
                .into_iter()
                .map(|definition| (definition.abbr.clone(), definition))
                .collect(),
            backing: None,
        }
    }

    /// Load the catalog file at `path`. A missing file is an empty catalog;
    /// it is created by the first `add_test`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Parsed<Self>> {
        let backing = BackingFile::new(path);
        let parsed = match backing.read()? {
            Some(text) => parse_catalog(&text)?,
            None => {
                info!(path = %backing.path().display(), "catalog file not found, starting empty");
                Parsed::default()
            }
        };
        info!(
            path = %backing.path().display(),
            tests = parsed.value.len(),
            skipped = parsed.diagnostics.len(),
            "loaded test catalog"
        );
        Ok(parsed.map(|tests| Self {
            tests,
            backing: Some(backing),
        }))
    }

    pub fn get(&self, abbr: &str) -> Option<&TestDefinition> {
        self.tests.get(abbr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestDefinition> {
        self.tests.values()
    }

    pub fn abbreviations(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn definitions(&self) -> &CatalogMap {
        &self.tests
    }

    /// Add a new test and append it to the catalog file.
    pub fn add_test(&mut self, definition: TestDefinition) -> Result<()> {
        if self.tests.contains_key(&definition.abbr) {
            return Err(StoreError::DuplicateKey(definition.abbr));
        }
        validate_definition(&definition)?;
        if let Some(backing) = &self.backing {
            backing.append_line(&serialize_definition(&definition))?;
        }
        info!(abbr = %definition.abbr, "added test");
        self.tests.insert(definition.abbr.clone(), definition);
        Ok(())
    }

    /// Apply `patch` to the test `abbr` and rewrite the catalog file.
    ///
    /// The in-memory catalog only changes once the rewrite succeeded.
    pub fn update_test(&mut self, abbr: &str, patch: &TestPatch) -> Result<&TestDefinition> {
        let current = self
            .tests
            .get(abbr)
            .ok_or_else(|| NotFound::Test(abbr.to_string()))?;
        let updated = current.patched(patch);
        validate_definition(&updated)?;

        let mut next = self.tests.clone();
        next.insert(abbr.to_string(), updated);
        if let Some(backing) = &self.backing {
            backing.rewrite(next.values().map(serialize_definition))?;
        }
        self.tests = next;
        info!(abbr = %abbr, "updated test");
        self.tests
            .get(abbr)
            .ok_or_else(|| NotFound::Test(abbr.to_string()).into())
    }

    pub fn serialize(&self) -> String {
        serialize_catalog(&self.tests)
    }
}

impl TestLookup for TestCatalog {
    fn test(&self, abbr: &str) -> Option<&TestDefinition> {
        self.tests.get(abbr)
    }
}
