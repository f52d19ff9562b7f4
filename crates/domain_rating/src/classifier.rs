//! Occupation and body-part classification
//!
//! Classification is driven by [`ClassificationRules`], an ordered list of
//! rules held as data. Rule order is part of the contract: the first
//! matching rule wins, so "lower back" resolves to the spine rule before any
//! lower-extremity rule is consulted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RatingError;
use crate::finding::BodyRegion;
use crate::ports::LookupProvider;
use crate::tables::OccupationRecord;

/// Occupation group of the packer family used by the stocker/sorter override
const PACKER_GROUP: u16 = 360;

/// An override applied when no occupation title matches exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccupationRule {
    /// Titles containing any keyword map to `group_number`
    Keyword {
        label: String,
        keywords: Vec<String>,
        group_number: u16,
    },
    /// Titles written as a group code with a variant suffix, e.g. "380H"
    GroupCode,
}

impl OccupationRule {
    pub fn keyword(label: impl Into<String>, keywords: &[&str], group_number: u16) -> Self {
        OccupationRule::Keyword {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            group_number,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            OccupationRule::Keyword { label, .. } => label,
            OccupationRule::GroupCode => "group_code",
        }
    }

    fn apply(&self, title: &str) -> Option<u16> {
        match self {
            OccupationRule::Keyword {
                keywords,
                group_number,
                ..
            } => {
                let lower = title.to_lowercase();
                keywords
                    .iter()
                    .any(|k| lower.contains(k.as_str()))
                    .then_some(*group_number)
            }
            OccupationRule::GroupCode => parse_group_code(title),
        }
    }
}

/// Parses "380H" style codes: at least two digits followed by one letter
fn parse_group_code(title: &str) -> Option<u16> {
    let suffix = title.chars().last()?;
    if !suffix.is_ascii_alphabetic() {
        return None;
    }
    let digits = &title[..title.len() - 1];
    if digits.len() < 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// How an occupation title was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OccupationMatch {
    Exact { title: String },
    Override { rule: String },
    Fuzzy { title: String },
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationClassification {
    pub group_number: u16,
    pub matched: OccupationMatch,
}

/// Maps body-part descriptions to an impairment code
///
/// A rule matches when any keyword matches and, if `qualifiers` is not empty,
/// at least one qualifier matches as well. Single-word terms match the start
/// of a word in the description; multi-word terms match as a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPartRule {
    pub label: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub qualifiers: Vec<String>,
    pub impairment_code: String,
    /// Row key in the variant tables
    pub variant_body_part: String,
    pub region: BodyRegion,
}

impl BodyPartRule {
    pub fn new(
        label: impl Into<String>,
        keywords: &[&str],
        impairment_code: impl Into<String>,
        variant_body_part: impl Into<String>,
        region: BodyRegion,
    ) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            qualifiers: Vec::new(),
            impairment_code: impairment_code.into(),
            variant_body_part: variant_body_part.into(),
            region,
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: &[&str]) -> Self {
        self.qualifiers = qualifiers.iter().map(|q| q.to_lowercase()).collect();
        self
    }

    fn matches(&self, description: &Description) -> bool {
        let any = |terms: &[String]| terms.iter().any(|t| description.contains_term(t));
        any(&self.keywords) && (self.qualifiers.is_empty() || any(&self.qualifiers))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPartClassification {
    pub impairment_code: String,
    pub variant_body_part: String,
    pub region: BodyRegion,
    /// Label of the rule that matched
    pub rule: String,
}

/// Result of classifying one occupation and body part pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub group_number: u16,
    pub impairment_code: String,
    pub body_region: BodyRegion,
    pub variant_body_part: String,
}

/// Lower-cased words of a description
struct Description {
    words: Vec<String>,
    phrase: String,
}

impl Description {
    fn parse(text: &str) -> Self {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        let phrase = words.join(" ");
        Self { words, phrase }
    }

    fn contains_term(&self, term: &str) -> bool {
        if term.contains(' ') {
            self.phrase.contains(term)
        } else {
            self.words.iter().any(|w| w.starts_with(term))
        }
    }
}

/// Ordered classification rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRules {
    pub occupation_rules: Vec<OccupationRule>,
    /// Fall back to substring matching against occupation titles
    pub fuzzy_occupation_matching: bool,
    /// Group used when nothing else matches; `None` makes that an error
    pub default_group: Option<u16>,
    pub body_part_rules: Vec<BodyPartRule>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::reference()
    }
}

impl ClassificationRules {
    /// Rules of the reference schedule
    pub fn reference() -> Self {
        use BodyRegion::*;

        let body_part_rules = vec![
            BodyPartRule::new("cervical_spine", &["cervical", "neck"], "15.01.02.05", "SPINE", Spine),
            BodyPartRule::new(
                "lumbar_spine",
                &["spine", "spinal", "back", "lumbar", "thoracic"],
                "15.03.02.05",
                "SPINE",
                Spine,
            ),
            BodyPartRule::new("shoulder", &["shoulder"], "16.02.01.00", "SHOULDER", UpperExtremity),
            BodyPartRule::new("elbow", &["elbow"], "16.03.01.00", "ELBOW", UpperExtremity),
            BodyPartRule::new("wrist", &["wrist"], "16.04.01.00", "WRIST", UpperExtremity),
            BodyPartRule::new("hand", &["hand", "finger", "thumb"], "16.05.00.00", "HAND", UpperExtremity),
            BodyPartRule::new("grip_pinch", &["grip", "pinch"], "16.01.04.00", "ARM", UpperExtremity),
            BodyPartRule::new("knee_muscle", &["knee"], "17.05.05.00", "KNEE", LowerExtremity)
                .with_qualifiers(&["muscle", "strength"]),
            BodyPartRule::new("knee", &["knee"], "17.05.00.00", "KNEE", LowerExtremity),
            BodyPartRule::new("ankle", &["ankle"], "17.07.00.00", "ANKLE", LowerExtremity),
            BodyPartRule::new("hip", &["hip"], "17.03.00.00", "HIP", LowerExtremity),
            BodyPartRule::new("leg_amputation", &["leg"], "17.01.02.00", "LEG", LowerExtremity)
                .with_qualifiers(&["amput"]),
            BodyPartRule::new("trigeminal", &["trigeminal"], "13.07.04.00", "CRANIAL NERVE", Other),
            BodyPartRule::new(
                "mastication",
                &["mastication", "jaw", "tmj", "teeth", "dental"],
                "11.03.02.00",
                "MASTICATION",
                Other,
            ),
            BodyPartRule::new(
                "upper_extremity",
                &["arm", "forearm", "upper extremity", "bicep", "tricep"],
                "16.00.00.00",
                "ARM",
                UpperExtremity,
            ),
            BodyPartRule::new(
                "lower_extremity",
                &["leg", "lower extremity", "shin", "calf", "foot", "feet"],
                "17.00.00.00",
                "LEG",
                LowerExtremity,
            ),
            BodyPartRule::new(
                "psychiatric",
                &["psychiatric", "psych", "depression", "anxiety", "ptsd"],
                "14.01.00.00",
                "PSYCHE",
                Other,
            ),
            BodyPartRule::new("vision", &["vision", "visual", "eye"], "12.01.00.00", "VISION", Other),
            BodyPartRule::new("skin", &["skin", "scar", "dermat"], "08.01.00.00", "SKIN", Other),
            BodyPartRule::new("heart", &["heart", "cardiac"], "03.01.00.00", "HEART", Other),
            BodyPartRule::new(
                "respiratory",
                &["respiratory", "lung", "pulmonary"],
                "05.01.00.00",
                "RESPIRATORY",
                Other,
            ),
        ];

        Self {
            occupation_rules: vec![
                OccupationRule::keyword("stock_sort_to_packer", &["stock", "sort"], PACKER_GROUP),
                OccupationRule::GroupCode,
            ],
            fuzzy_occupation_matching: true,
            default_group: None,
            body_part_rules,
        }
    }

    pub fn with_default_group(mut self, group_number: Option<u16>) -> Self {
        self.default_group = group_number;
        self
    }

    /// Classifies both descriptions in one call
    pub fn classify<P: LookupProvider + ?Sized>(
        &self,
        tables: &P,
        occupation_title: &str,
        body_part_description: &str,
    ) -> Result<Classification, RatingError> {
        let occupation = self.classify_occupation(tables, occupation_title)?;
        let body_part = self.classify_body_part(body_part_description)?;

        Ok(Classification {
            group_number: occupation.group_number,
            impairment_code: body_part.impairment_code,
            body_region: body_part.region,
            variant_body_part: body_part.variant_body_part,
        })
    }

    /// Resolves an occupation title to a group number
    ///
    /// Order: exact title, override rules, fuzzy title match, default group.
    pub fn classify_occupation<P: LookupProvider + ?Sized>(
        &self,
        tables: &P,
        occupation_title: &str,
    ) -> Result<OccupationClassification, RatingError> {
        let title = occupation_title.trim();
        let query = title.to_lowercase();

        let exact = tables
            .occupations()
            .iter()
            .find(|o| !query.is_empty() && o.title.trim().to_lowercase() == query);

        let classification = if let Some(record) = exact {
            OccupationClassification {
                group_number: record.group_number,
                matched: OccupationMatch::Exact {
                    title: record.title.clone(),
                },
            }
        } else if let Some((rule, group_number)) = self
            .occupation_rules
            .iter()
            .find_map(|rule| rule.apply(title).map(|g| (rule, g)))
        {
            OccupationClassification {
                group_number,
                matched: OccupationMatch::Override {
                    rule: rule.label().to_string(),
                },
            }
        } else if let Some(record) = self.fuzzy_match(tables.occupations(), &query) {
            OccupationClassification {
                group_number: record.group_number,
                matched: OccupationMatch::Fuzzy {
                    title: record.title.clone(),
                },
            }
        } else if let Some(group_number) = self.default_group {
            OccupationClassification {
                group_number,
                matched: OccupationMatch::Default,
            }
        } else {
            return Err(RatingError::UnclassifiedOccupation {
                title: occupation_title.to_string(),
            });
        };

        debug!(
            title = %occupation_title,
            group_number = classification.group_number,
            matched = ?classification.matched,
            "Occupation classified"
        );
        Ok(classification)
    }

    /// First title containing the whole query, else the first title
    /// containing any query word longer than two characters
    fn fuzzy_match<'a>(
        &self,
        occupations: &'a [OccupationRecord],
        query: &str,
    ) -> Option<&'a OccupationRecord> {
        if !self.fuzzy_occupation_matching || query.is_empty() {
            return None;
        }
        let containing = |needle: &str| {
            occupations
                .iter()
                .find(|o| o.title.to_lowercase().contains(needle))
        };

        containing(query).or_else(|| {
            query
                .split_whitespace()
                .filter(|word| word.chars().count() > 2)
                .find_map(containing)
        })
    }

    /// Resolves a body-part description to an impairment code and region
    pub fn classify_body_part(
        &self,
        body_part_description: &str,
    ) -> Result<BodyPartClassification, RatingError> {
        let description = Description::parse(body_part_description);

        let rule = self
            .body_part_rules
            .iter()
            .find(|rule| rule.matches(&description))
            .ok_or_else(|| RatingError::UnclassifiedBodyPart {
                description: body_part_description.to_string(),
            })?;

        debug!(
            description = %body_part_description,
            rule = %rule.label,
            impairment_code = %rule.impairment_code,
            region = %rule.region,
            "Body part classified"
        );

        Ok(BodyPartClassification {
            impairment_code: rule.impairment_code.clone(),
            variant_body_part: rule.variant_body_part.clone(),
            region: rule.region,
            rule: rule.label.clone(),
        })
    }
}
