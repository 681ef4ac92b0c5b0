//! Skill and specialty categorization
//!
//! Maps free-text labels to a fixed category set by keyword substring
//! matching. Categories are tested in declaration order; the first category
//! with a matching keyword wins, and labels matching nothing fall back to
//! `Autre`.

use serde::{Deserialize, Serialize};

/// Closed category set for skills and specialties
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Software, data, infrastructure
    Technique,
    /// Leadership, project and people management
    Management,
    /// Manufacturing, logistics, quality
    Industrie,
    /// R&D, academia, innovation
    Recherche,
    /// Ecology, climate, sustainability
    Environnement,
    /// Power generation and distribution
    Energie,
    /// Anything else
    #[default]
    Autre,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technique => "technique",
            Category::Management => "management",
            Category::Industrie => "industrie",
            Category::Recherche => "recherche",
            Category::Environnement => "environnement",
            Category::Energie => "energie",
            Category::Autre => "autre",
        }
    }
}

/// Keyword table, tested in order. Keywords are matched as substrings of the
/// normalized label, so stems cover their derived forms ("manag" matches
/// both "management" and "manager").
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Technique,
        &[
            "tech", "dev", "logiciel", "software", "data", "donnees", "données", "inform",
            "numeri", "numéri", "cyber", "cloud", "web", "api", "python", "java", "react",
            "rust", "reseau", "réseau", "intelligence artificielle",
        ],
    ),
    (
        Category::Management,
        &[
            "manag", "gestion", "projet", "lead", "direction", "strat", "agile", "scrum",
            "coach",
        ],
    ),
    (
        Category::Industrie,
        &[
            "indus", "usine", "product", "fabri", "mainten", "qualit", "lean", "mecan",
            "mécan", "logist", "supply",
        ],
    ),
    (
        Category::Recherche,
        &[
            "recherche", "r&d", "innov", "scien", "labo", "doctor", "these", "thèse",
            "publi", "academ", "académ",
        ],
    ),
    (
        Category::Environnement,
        &[
            "environ", "ecolo", "écolo", "climat", "durab", "rse", "recycl", "biodiv",
            "carbone", "dechet", "déchet",
        ],
    ),
    (
        Category::Energie,
        &[
            "energ", "énerg", "solaire", "eolien", "éolien", "nucle", "nuclé", "hydrog",
            "renouvel", "electri", "électri", "photovolta",
        ],
    ),
];

/// Normalize a label for counting and lookup: trimmed, lowercased.
pub fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Classify a free-text label into a category.
///
/// Pure and total: the same label always yields the same category, and a
/// category is always returned.
pub fn classify(label: &str) -> Category {
    let normalized = normalize(label);

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| normalized.contains(kw)) {
            return *category;
        }
    }

    Category::Autre
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_labels() {
        assert_eq!(classify("Développement logiciel"), Category::Technique);
        assert_eq!(classify("Python"), Category::Technique);
        assert_eq!(classify("REACT"), Category::Technique);
        assert_eq!(classify("Gestion de projet"), Category::Management);
        assert_eq!(classify("Maintenance industrielle"), Category::Industrie);
        assert_eq!(classify("Recherche appliquée"), Category::Recherche);
        assert_eq!(classify("Économie circulaire et recyclage"), Category::Environnement);
        assert_eq!(classify("Énergie solaire"), Category::Energie);
    }

    #[test]
    fn test_classify_falls_back_to_autre() {
        assert_eq!(classify("Poterie"), Category::Autre);
        assert_eq!(classify(""), Category::Autre);
        assert_eq!(classify("   "), Category::Autre);
    }

    #[test]
    fn test_classify_is_case_and_whitespace_insensitive() {
        assert_eq!(classify("  CLOUD architecture  "), classify("cloud architecture"));
        assert_eq!(classify("ScRuM master"), Category::Management);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for label in ["Python", "Gestion", "Poterie", "Énergie éolienne"] {
            assert_eq!(classify(label), classify(label));
        }
    }

    #[test]
    fn test_first_matching_category_wins() {
        // Contains both a management keyword ("manag") and an energy keyword
        // ("energ"); management is declared after technique but before energie.
        assert_eq!(classify("Management de l'énergie"), Category::Management);
    }

    #[test]
    fn test_normalize_folds_case_and_whitespace() {
        assert_eq!(normalize(" Python "), "python");
        assert_eq!(normalize("REACT"), "react");
        assert_eq!(normalize("python"), normalize("PYTHON  "));
    }
}
