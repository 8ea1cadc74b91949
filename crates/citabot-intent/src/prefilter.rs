// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyword pre-filter.
//!
//! Runs before the language-understanding call and costs nothing: it
//! detects candidate service names from the configured catalog, temporal
//! references, and presence-of-personal-data flags. Its service hits are
//! later used to down-adjust the confidence of unsupported model claims.

use std::sync::LazyLock;

use citabot_config::ServiceConfig;
use regex::Regex;

/// Catalog of bookable services with their alias spellings, lowercased
/// for matching.
pub struct ServiceCatalog {
    entries: Vec<CatalogEntry>,
}

struct CatalogEntry {
    name: String,
    aliases: Vec<String>,
    /// Whole-word matcher over the name and aliases, so "corte" does not
    /// fire inside "recortes".
    mention: Option<Regex>,
}

impl ServiceCatalog {
    pub fn new(services: &[ServiceConfig]) -> Self {
        let entries = services
            .iter()
            .map(|s| {
                let name = s.name.to_lowercase();
                let aliases: Vec<String> =
                    s.aliases.iter().map(|a| a.to_lowercase()).collect();
                let mention = mention_pattern(&name, &aliases);
                CatalogEntry {
                    name,
                    aliases,
                    mention,
                }
            })
            .collect();
        Self { entries }
    }

    /// Canonical service names, in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Resolves a raw service mention to its canonical catalog name.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.name == needle || e.aliases.iter().any(|a| *a == needle))
            .map(|e| e.name.as_str())
    }

    /// Canonical names of every catalog service mentioned in the text,
    /// matched on word boundaries.
    pub fn find_in_text(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.mention.as_ref().is_some_and(|re| re.is_match(text)))
            .map(|e| e.name.clone())
            .collect()
    }
}

/// Compiles the whole-word mention pattern for one catalog entry. The
/// terms are escaped, so compilation cannot fail in practice.
fn mention_pattern(name: &str, aliases: &[String]) -> Option<Regex> {
    let terms: Vec<String> = std::iter::once(name)
        .chain(aliases.iter().map(String::as_str))
        .map(regex::escape)
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", terms.join("|"))).ok()
}

/// What the pre-filter saw in one message.
#[derive(Debug, Clone, Default)]
pub struct PrefilterHits {
    /// Canonical names of catalog services mentioned in the text.
    pub services: Vec<String>,
    pub has_temporal_ref: bool,
    /// Name, email, or phone-number shaped content is present.
    pub has_personal_data: bool,
}

static TEMPORAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(hoy|mañana|manana|pasado\s+mañana|today|tomorrow)\b
        | \b(lunes|martes|miércoles|miercoles|jueves|viernes|sábado|sabado|domingo)\b
        | \b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b
        | \b\d{1,2}:\d{2}\b
        | \b(a\s+las?\s+\d{1,2})\b
        | \b\d{1,2}/\d{1,2}(/\d{2,4})?\b
        | \b\d{4}-\d{2}-\d{2}\b",
    )
    .unwrap()
});

static PERSONAL_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b[\w.+-]+@[\w-]+\.[\w.]+\b
        | \b(me\s+llamo|mi\s+nombre\s+es|soy)\b
        | \bmy\s+name\s+is\b
        | \+?\d[\d\s-]{7,}\d",
    )
    .unwrap()
});

pub struct Prefilter {
    catalog: ServiceCatalog,
}

impl Prefilter {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn scan(&self, text: &str) -> PrefilterHits {
        PrefilterHits {
            services: self.catalog.find_in_text(text),
            has_temporal_ref: TEMPORAL_RE.is_match(text),
            has_personal_data: PERSONAL_DATA_RE.is_match(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(&[
            ServiceConfig {
                name: "corte".into(),
                duration_minutes: 30,
                aliases: vec!["corte de pelo".into(), "haircut".into()],
            },
            ServiceConfig {
                name: "tinte".into(),
                duration_minutes: 90,
                aliases: vec![],
            },
        ])
    }

    fn prefilter() -> Prefilter {
        Prefilter::new(catalog())
    }

    #[test]
    fn resolves_aliases_to_canonical_names() {
        let c = catalog();
        assert_eq!(c.resolve("Corte de Pelo"), Some("corte"));
        assert_eq!(c.resolve("haircut"), Some("corte"));
        assert_eq!(c.resolve("tinte"), Some("tinte"));
        assert_eq!(c.resolve("masaje"), None);
        assert_eq!(c.resolve("  "), None);
    }

    #[test]
    fn finds_services_mentioned_in_text() {
        let hits = prefilter().scan("quiero un corte de pelo mañana");
        assert_eq!(hits.services, vec!["corte".to_string()]);
        assert!(hits.has_temporal_ref);
    }

    #[test]
    fn detects_temporal_references() {
        let p = prefilter();
        assert!(p.scan("el viernes a las 10").has_temporal_ref);
        assert!(p.scan("el 12/09 por favor").has_temporal_ref);
        assert!(p.scan("2026-09-12 10:30").has_temporal_ref);
        assert!(!p.scan("gracias").has_temporal_ref);
    }

    #[test]
    fn detects_personal_data() {
        let p = prefilter();
        assert!(p.scan("me llamo Ana García").has_personal_data);
        assert!(p.scan("escríbeme a ana@example.com").has_personal_data);
        assert!(!p.scan("quiero un tinte").has_personal_data);
    }

    #[test]
    fn no_catalog_match_yields_empty_services() {
        let hits = prefilter().scan("quiero un masaje relajante");
        assert!(hits.services.is_empty());
    }

    #[test]
    fn substring_inside_longer_word_is_not_a_mention() {
        let hits = prefilter().scan("me interesan los recortes de prensa");
        assert!(hits.services.is_empty());
    }

    #[test]
    fn mentions_match_case_insensitively_at_word_boundaries() {
        let hits = prefilter().scan("¿Tenéis hueco para un Corte?");
        assert_eq!(hits.services, vec!["corte".to_string()]);
    }
}
