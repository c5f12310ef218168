//! Publication records: the raw shapes returned by the Pure API and the
//! fixed-schema record serialised into the website's `_data/publist.yml`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Display text used when a publication has no DOI and the link comes
/// from the Harvard citation text instead.
const NO_DOI_LINK_DISPLAY: &str = "Read more";

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(https?:.*?)""#).expect("static pattern"))
}

fn doi_display_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://doi\.org/(.*)").expect("static pattern"))
}

/// Response of `GET {base}/project/{id}`: the outputs registered for a
/// project, reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub struct ProjectOutputs {
    pub outputs: Vec<OutputRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRef {
    pub pure_id: String,
}

/// One page of `GET {base}/outputs?...`. A details lookup queries a single
/// Pure ID, so a well-formed response has `count == 1`.
#[derive(Debug, Deserialize)]
pub struct OutputsPage {
    pub count: u64,
    #[serde(default)]
    pub publications: Vec<OutputDetails>,
}

/// Raw publication details as returned by the Pure outputs endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputDetails {
    pub title: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub harvard: Option<String>,
    #[serde(default)]
    pub persons: Vec<Person>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub firstname: String,
    pub lastname: String,
    pub role: String,
}

/// One entry of the website's publication list.
///
/// This is the schema the website templates consume: a YAML sequence of
/// mappings with `title`, `description`, `authors` and a nested `link`.
#[derive(Debug, Clone, Serialize)]
pub struct Publication {
    pub title: String,
    pub description: String,
    pub authors: String,
    pub link: Link,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Link {
    pub url: String,
    pub display: String,
}

impl Publication {
    /// Build a website record from raw Pure details.
    ///
    /// Incomplete records are kept (the website tolerates an empty link or
    /// author list) but logged with their Pure ID so they can be fixed
    /// upstream.
    pub fn from_details(pure_id: &str, details: OutputDetails) -> Self {
        let authors = format_authors(&details.persons);
        let link = match details.doi.as_deref().filter(|d| !d.is_empty()) {
            Some(doi) => link_from_doi(pure_id, doi),
            None => link_from_harvard(pure_id, details.harvard.as_deref().unwrap_or("")),
        };
        if details.title.is_empty() || authors.is_empty() || link.url.is_empty() {
            warn!(pure_id = pure_id, "Unknown details for Pure ID");
        }
        Self {
            title: details.title,
            description: String::new(),
            authors,
            link,
        }
    }
}

/// Comma-joined "Firstname Lastname" for every person in the Author role.
fn format_authors(persons: &[Person]) -> String {
    persons
        .iter()
        .filter(|p| p.role == "Author")
        .map(|p| format!("{} {}", p.firstname, p.lastname))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Link and display text derived from a DOI link such as
/// `https://doi.org/10.1000/182`; the display text is the DOI number.
fn link_from_doi(pure_id: &str, doi: &str) -> Link {
    let displays: Vec<&str> = doi_display_regex()
        .captures_iter(doi)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if displays.is_empty() {
        warn!(pure_id = pure_id, doi = doi, "Bad DOI");
        return Link::default();
    }
    if displays.len() > 1 {
        warn!(
            pure_id = pure_id,
            doi = doi,
            options = ?displays,
            "Too many display options for DOI"
        );
    }
    Link {
        url: doi.to_string(),
        display: displays[0].to_string(),
    }
}

/// Fallback for publications without a DOI: the first quoted URL in the
/// Harvard citation text, which for our outputs points at the
/// institutional repository.
fn link_from_harvard(pure_id: &str, harvard: &str) -> Link {
    let urls: Vec<&str> = url_regex()
        .captures_iter(harvard)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let Some(first) = urls.first() else {
        warn!(pure_id = pure_id, "No URLs found in Harvard text");
        return Link::default();
    };
    if !first.contains("eprints.soton.ac.uk") {
        warn!(
            pure_id = pure_id,
            url = first,
            "Found non eprints.soton.ac.uk link in Harvard text"
        );
    }
    Link {
        url: (*first).to_string(),
        display: NO_DOI_LINK_DISPLAY.to_string(),
    }
}
