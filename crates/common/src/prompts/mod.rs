//! Building and equipment prompt templates
//!
//! A registry of system prompts keyed by name. Built-in templates cover the
//! general facilities assistant and one template per [`EquipmentKind`];
//! configuration can add templates or replace built-ins by key.
//!
//! [`build_messages`] assembles the final chat request: system prompt with an
//! optional jurisdiction hint, a numbered context block from retrieval hits,
//! recent history and the user's question.

use crate::classify::{EquipmentKind, FileTags, Jurisdiction};
use crate::errors::{AppError, Result};
use crate::models::{ChatMessage, RetrievalHit, Role};
use serde::{Deserialize, Serialize};

/// Key of the fallback template
pub const GENERAL_TEMPLATE: &str = "general";

/// A named system prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    pub key: String,
    pub title: String,
    pub system_prompt: String,
    /// Equipment this template is picked for when files carry that tag
    #[serde(default)]
    pub equipment: Option<EquipmentKind>,
}

impl PromptTemplate {
    fn builtin(key: &str, title: &str, focus: &str, equipment: Option<EquipmentKind>) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            system_prompt: format!(
                "You are an experienced building engineer helping facility staff. {} \
                 Answer precisely, cite document excerpts by their [n] number when you use them, \
                 and say so plainly when the documents do not cover the question. \
                 Flag any step that needs a licensed professional or a permit.",
                focus
            ),
            equipment,
        }
    }
}

/// Lookup table of prompt templates, in display order
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    templates: Vec<PromptTemplate>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptRegistry {
    /// The built-in templates
    pub fn builtin() -> Self {
        let templates = vec![
            PromptTemplate::builtin(
                GENERAL_TEMPLATE,
                "General facilities",
                "You cover building operations, maintenance and code questions across all trades.",
                None,
            ),
            PromptTemplate::builtin(
                "hvac",
                "HVAC",
                "Focus on heating, ventilation and air conditioning: air handlers, chillers, boilers, \
                 rooftop units, VAV boxes, refrigerant handling and ventilation rates.",
                Some(EquipmentKind::Hvac),
            ),
            PromptTemplate::builtin(
                "electrical",
                "Electrical",
                "Focus on electrical distribution: switchgear, panelboards, transformers, generators, \
                 transfer switches, lighting and lockout/tagout practice.",
                Some(EquipmentKind::Electrical),
            ),
            PromptTemplate::builtin(
                "plumbing",
                "Plumbing",
                "Focus on domestic water, sanitary and storm drainage, water heaters, pumps, \
                 backflow prevention and fixtures.",
                Some(EquipmentKind::Plumbing),
            ),
            PromptTemplate::builtin(
                "fire_protection",
                "Fire protection",
                "Focus on sprinkler and standpipe systems, fire pumps, fire alarm panels and \
                 inspection, testing and maintenance intervals.",
                Some(EquipmentKind::FireProtection),
            ),
            PromptTemplate::builtin(
                "elevator",
                "Elevators",
                "Focus on elevators and escalators: traction and hydraulic machines, controllers, \
                 door equipment and periodic inspections.",
                Some(EquipmentKind::Elevator),
            ),
            PromptTemplate::builtin(
                "controls",
                "Building controls",
                "Focus on building automation: BMS/BAS front ends, controllers, sequences of \
                 operation, sensors, setpoints and trending.",
                Some(EquipmentKind::Controls),
            ),
            PromptTemplate::builtin(
                "roofing",
                "Roofing",
                "Focus on roof assemblies: membranes, flashing, drains, insulation and leak \
                 investigation.",
                Some(EquipmentKind::Roofing),
            ),
        ];

        Self { templates }
    }

    /// Built-ins with configured templates applied; a configured key replaces the built-in in place
    pub fn with_overrides(overrides: Vec<PromptTemplate>) -> Self {
        let mut registry = Self::builtin();
        for template in overrides {
            match registry.templates.iter_mut().find(|t| t.key == template.key) {
                Some(existing) => {
                    tracing::debug!(key = %template.key, "Prompt template overridden");
                    *existing = template;
                }
                None => {
                    tracing::debug!(key = %template.key, "Prompt template added");
                    registry.templates.push(template);
                }
            }
        }
        registry
    }

    pub fn templates(&self) -> &[PromptTemplate] {
        &self.templates
    }

    pub fn get(&self, key: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    /// Pick the template for a request.
    ///
    /// An explicit key must exist. Otherwise the equipment tag seen most often
    /// across the session's files decides, falling back to the general template.
    pub fn select(&self, explicit: Option<&str>, tags: &[FileTags]) -> Result<&PromptTemplate> {
        if let Some(key) = explicit {
            return self.get(key).ok_or_else(|| AppError::TemplateNotFound {
                key: key.to_string(),
            });
        }

        if let Some(kind) = dominant_equipment(tags) {
            if let Some(template) = self.templates.iter().find(|t| t.equipment == Some(kind)) {
                return Ok(template);
            }
        }

        self.get(GENERAL_TEMPLATE)
            .ok_or_else(|| AppError::TemplateNotFound {
                key: GENERAL_TEMPLATE.to_string(),
            })
    }
}

/// Most frequent equipment tag; ties go to the earlier kind in classification order
pub fn dominant_equipment(tags: &[FileTags]) -> Option<EquipmentKind> {
    let mut best: Option<(EquipmentKind, usize)> = None;
    for kind in EquipmentKind::ALL {
        let count = tags.iter().filter(|t| t.equipment.contains(&kind)).count();
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

/// Jurisdiction of the most recently uploaded file that carries one
pub fn session_jurisdiction(tags: &[FileTags]) -> Option<Jurisdiction> {
    tags.iter().rev().find_map(|t| t.jurisdiction)
}

/// Limits applied while assembling a prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptLimits {
    /// Maximum characters of retrieved context
    pub max_context_chars: usize,
    /// Number of previous question/answer pairs to include
    pub history_turns: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_context_chars: 12_000,
            history_turns: 4,
        }
    }
}

/// Assemble the chat request for a question
pub fn build_messages(
    template: &PromptTemplate,
    jurisdiction: Option<Jurisdiction>,
    hits: &[RetrievalHit],
    history: &[ChatMessage],
    question: &str,
    limits: PromptLimits,
) -> Vec<ChatMessage> {
    let mut system = template.system_prompt.clone();

    if let Some(jurisdiction) = jurisdiction {
        system.push_str(&format!(
            "\n\nWhere codes apply, prefer requirements for {}.",
            jurisdiction.label()
        ));
    }

    let context = context_block(hits, limits.max_context_chars);
    if context.is_empty() {
        system.push_str(
            "\n\nNo document context was found for this question. \
             Answer from general knowledge and say that no uploaded document supports the answer.",
        );
    } else {
        system.push_str("\n\nDocument excerpts:\n\n");
        system.push_str(&context);
    }

    let recent: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.role != Role::System)
        .collect();
    let keep = limits.history_turns * 2;
    let skip = recent.len().saturating_sub(keep);

    let mut messages = Vec::with_capacity(keep + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(recent.into_iter().skip(skip).cloned());
    messages.push(ChatMessage::user(question));
    messages
}

/// Numbered excerpts, cut off at `max_chars` characters
fn context_block(hits: &[RetrievalHit], max_chars: usize) -> String {
    let mut block = String::new();
    let mut remaining = max_chars;

    for (i, hit) in hits.iter().enumerate() {
        let entry = format!(
            "[{}] {} (chunk {})\n{}\n\n",
            i + 1,
            hit.source.file_name,
            hit.source.chunk_index,
            hit.text
        );
        let len = entry.chars().count();
        if len <= remaining {
            block.push_str(&entry);
            remaining -= len;
        } else {
            block.extend(entry.chars().take(remaining));
            break;
        }
    }

    block.trim_end().to_string()
}
