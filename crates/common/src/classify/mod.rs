//! Filename classifiers
//!
//! Infers equipment and jurisdiction tags from an uploaded file's name, and the
//! document kind from its mime type or extension. Matching runs against a
//! normalised form of the name (lower-case, extension stripped, punctuation and
//! underscores turned into spaces) so that `AHU-3_Manual.pdf` and
//! `ahu 3 manual` classify the same way.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::DocumentKind;

/// Building system a document is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Hvac,
    Electrical,
    Plumbing,
    FireProtection,
    Elevator,
    Controls,
    Roofing,
}

impl EquipmentKind {
    /// All kinds in classification order
    pub const ALL: [EquipmentKind; 7] = [
        EquipmentKind::Hvac,
        EquipmentKind::Electrical,
        EquipmentKind::Plumbing,
        EquipmentKind::FireProtection,
        EquipmentKind::Elevator,
        EquipmentKind::Controls,
        EquipmentKind::Roofing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Hvac => "hvac",
            EquipmentKind::Electrical => "electrical",
            EquipmentKind::Plumbing => "plumbing",
            EquipmentKind::FireProtection => "fire_protection",
            EquipmentKind::Elevator => "elevator",
            EquipmentKind::Controls => "controls",
            EquipmentKind::Roofing => "roofing",
        }
    }
}

/// Code jurisdiction a document refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    NewYorkCity,
    California,
    Florida,
    Texas,
    Chicago,
    International,
}

impl Jurisdiction {
    /// Human readable label used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Jurisdiction::NewYorkCity => "New York City (NYC Construction Codes)",
            Jurisdiction::California => "California (Title 24)",
            Jurisdiction::Florida => "Florida (Florida Building Code)",
            Jurisdiction::Texas => "Texas",
            Jurisdiction::Chicago => "Chicago (Chicago Building Code)",
            Jurisdiction::International => "International Code Council (I-Codes)",
        }
    }
}

/// Tags inferred from a filename
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileTags {
    #[serde(default)]
    pub equipment: Vec<EquipmentKind>,
    #[serde(default)]
    pub jurisdiction: Option<Jurisdiction>,
}

impl FileTags {
    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.jurisdiction.is_none()
    }
}

const EQUIPMENT_PATTERNS: &[(EquipmentKind, &str)] = &[
    (
        EquipmentKind::Hvac,
        r"\b(hvac|ahu|rtu|vav|fcu|mau|chiller|chillers|boiler|boilers|cooling tower|heat pump|air handl(er|ing)|ductwork|mechanical)\b",
    ),
    (
        EquipmentKind::Electrical,
        r"\b(electrical|switchgear|switchboard|panelboard|transformer|ups|generator|genset|ats|mcc|lighting)\b",
    ),
    (
        EquipmentKind::Plumbing,
        r"\b(plumbing|domestic water|water heater|backflow|sanitary|sump|booster pump|storm drain)\b",
    ),
    (
        EquipmentKind::FireProtection,
        r"\b(fire alarm|fire pump|sprinkler|sprinklers|facp|standpipe|nfpa|fire protection|smoke control)\b",
    ),
    (
        EquipmentKind::Elevator,
        r"\b(elevator|elevators|escalator|escalators|lift|dumbwaiter)\b",
    ),
    (
        EquipmentKind::Controls,
        r"\b(bms|bas|ddc|bacnet|controls|building automation|sequence of operations?)\b",
    ),
    (
        EquipmentKind::Roofing,
        r"\b(roof|roofing|membrane|flashing)\b",
    ),
];

const JURISDICTION_PATTERNS: &[(Jurisdiction, &str)] = &[
    (
        Jurisdiction::NewYorkCity,
        r"\b(nyc|new york city|fdny|ll97|local law \d+)\b",
    ),
    // Checked before California so "Chicago CBC" is not read as the California code
    (Jurisdiction::Chicago, r"\b(chicago|cbc chicago)\b"),
    (
        Jurisdiction::California,
        r"\b(california|title 24|t24|cbc|calgreen)\b",
    ),
    (Jurisdiction::Florida, r"\b(florida|fbc)\b"),
    (Jurisdiction::Texas, r"\b(texas|tdlr)\b"),
    (
        Jurisdiction::International,
        r"\b(ibc|imc|ipc|ifc|iecc|icc)\b",
    ),
];

struct Classifier {
    equipment: Vec<(EquipmentKind, Regex)>,
    jurisdiction: Vec<(Jurisdiction, Regex)>,
}

fn classifier() -> &'static Classifier {
    static CLASSIFIER: OnceLock<Classifier> = OnceLock::new();
    CLASSIFIER.get_or_init(|| Classifier {
        equipment: EQUIPMENT_PATTERNS
            .iter()
            .filter_map(|(kind, pattern)| compile(pattern).map(|re| (*kind, re)))
            .collect(),
        jurisdiction: JURISDICTION_PATTERNS
            .iter()
            .filter_map(|(kind, pattern)| compile(pattern).map(|re| (*kind, re)))
            .collect(),
    })
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern, error = %e, "Invalid classifier pattern, skipping");
            None
        }
    }
}

/// Lower-case the stem of a filename and replace separators with spaces
pub fn normalize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(pos) if pos > 0 => &base[..pos],
        _ => base,
    };

    let spaced: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Infer equipment and jurisdiction tags from a filename
pub fn classify_filename(name: &str) -> FileTags {
    let normalized = normalize_filename(name);
    let classifier = classifier();

    let mut equipment = Vec::new();
    for (kind, re) in &classifier.equipment {
        if re.is_match(&normalized) && !equipment.contains(kind) {
            equipment.push(*kind);
        }
    }

    let jurisdiction = classifier
        .jurisdiction
        .iter()
        .find(|(_, re)| re.is_match(&normalized))
        .map(|(kind, _)| *kind);

    tracing::debug!(
        file = name,
        normalized = %normalized,
        equipment = ?equipment,
        jurisdiction = ?jurisdiction,
        "Filename classified"
    );

    FileTags {
        equipment,
        jurisdiction,
    }
}

/// Work out the document kind from the mime type, falling back to the extension
pub fn document_kind(name: &str, mime_type: &str) -> Option<DocumentKind> {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/pdf" => return Some(DocumentKind::Pdf),
        "text/plain" => return Some(DocumentKind::Text),
        _ => {}
    }

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "txt" | "text" => Some(DocumentKind::Text),
        _ => None,
    }
}

/// Mime type to record when the client did not send a usable one
pub fn mime_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "application/pdf",
        DocumentKind::Text => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("AHU-3_Manual.pdf"), "ahu 3 manual");
        assert_eq!(normalize_filename("docs/NYC Fire  Alarm.TXT"), "nyc fire alarm");
        assert_eq!(normalize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_equipment_tags() {
        let tags = classify_filename("Chiller_Plant_Sequence_of_Operation.pdf");
        assert_eq!(tags.equipment, vec![EquipmentKind::Hvac, EquipmentKind::Controls]);
        assert!(tags.jurisdiction.is_none());

        let tags = classify_filename("fire-alarm-FACP-submittal.pdf");
        assert_eq!(tags.equipment, vec![EquipmentKind::FireProtection]);
    }

    #[test]
    fn test_word_boundaries() {
        // "upstairs" must not match "ups", "broof" must not match "roof"
        let tags = classify_filename("upstairs_broof_notes.txt");
        assert!(tags.equipment.is_empty());
    }

    #[test]
    fn test_jurisdiction_first_match_wins() {
        let tags = classify_filename("NYC_LL97_boiler_report_IBC.pdf");
        assert_eq!(tags.jurisdiction, Some(Jurisdiction::NewYorkCity));
        assert_eq!(tags.equipment, vec![EquipmentKind::Hvac]);

        let tags = classify_filename("title-24-lighting.pdf");
        assert_eq!(tags.jurisdiction, Some(Jurisdiction::California));
        assert_eq!(tags.equipment, vec![EquipmentKind::Electrical]);
    }

    #[test]
    fn test_chicago_building_code() {
        let tags = classify_filename("Chicago_CBC_sprinkler_riser.pdf");
        assert_eq!(tags.jurisdiction, Some(Jurisdiction::Chicago));
        assert_eq!(tags.equipment, vec![EquipmentKind::FireProtection]);

        let tags = classify_filename("CBC_2022_elevator_hoistway.pdf");
        assert_eq!(tags.jurisdiction, Some(Jurisdiction::California));
    }

    #[test]
    fn test_untagged_file() {
        let tags = classify_filename("meeting-notes.txt");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(document_kind("a.bin", "application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(document_kind("a.txt", "text/plain; charset=utf-8"), Some(DocumentKind::Text));
        assert_eq!(document_kind("a.PDF", "application/octet-stream"), Some(DocumentKind::Pdf));
        assert_eq!(document_kind("a.docx", "application/octet-stream"), None);
        assert_eq!(document_kind("README", ""), None);
    }
}
