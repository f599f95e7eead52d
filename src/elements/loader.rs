use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::ElementSetError;
use super::tle;
use super::types::OrbitalElementSet;

impl OrbitalElementSet {
    /// Parse a single element set given as 2 lines, or 3 lines with a
    /// leading name line.
    pub fn from_tle_text(text: &str) -> Result<Self, ElementSetError> {
        let (name, line1, line2) = parse_tle_lines(text)?;
        tle::parse(name.as_deref(), &line1, &line2)
    }
}

pub fn parse_tle_lines(text: &str) -> Result<(Option<String>, String, String), ElementSetError> {
    let lines: Vec<String> = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        n => Err(ElementSetError::LineCount(n)),
    }
}

/// Element sets read from a multi-satellite file, keyed by catalog number.
pub struct ElementCatalog {
    sets: BTreeMap<u32, OrbitalElementSet>,
}

impl ElementCatalog {
    /// Load every element set in `path`. Entries that fail validation are
    /// logged and skipped; a file with no valid entry is an error.
    pub fn load(path: &Path) -> Result<Self, ElementSetError> {
        let content = fs::read_to_string(path)?;
        let sets = parse_element_sets(&content)
            .into_iter()
            .filter_map(|result| match result {
                Ok(set) => Some((set.norad_id, set)),
                Err(e) => {
                    log::warn!("Skipping element set in {}: {}", path.display(), e);
                    None
                }
            })
            .collect::<BTreeMap<_, _>>();

        if sets.is_empty() {
            return Err(ElementSetError::Empty);
        }
        log::debug!("Loaded {} element sets from {}", sets.len(), path.display());

        Ok(Self { sets })
    }

    pub fn get(&self, norad_id: u32) -> Result<&OrbitalElementSet, ElementSetError> {
        self.sets
            .get(&norad_id)
            .ok_or(ElementSetError::NotFound(norad_id))
    }

    /// The only element set in the file, or the lowest catalog number when
    /// there are several.
    pub fn first(&self) -> Result<&OrbitalElementSet, ElementSetError> {
        self.sets.values().next().ok_or(ElementSetError::Empty)
    }
}

/// Split multi-satellite text into element sets. Accepts bare 2-line sets
/// and named 3-line sets in any mix; lines that fit neither shape are
/// skipped.
pub fn parse_element_sets(content: &str) -> Vec<Result<OrbitalElementSet, ElementSetError>> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(tle::parse(None, lines[i], lines[i + 1]));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]);
            result.push(tle::parse(Some(name), lines[i + 1], lines[i + 2]));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
