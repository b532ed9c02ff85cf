use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::ids::ItemId;

//
// ─── ITEM KIND ─────────────────────────────────────────────────────────────────
//

/// The two kinds of study material a week carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Vocab,
    Phrase,
}

impl ItemKind {
    /// All kinds, in display order.
    pub const ALL: [ItemKind; 2] = [ItemKind::Vocab, ItemKind::Phrase];

    /// Stable lowercase name, used in storage keys and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Vocab => "vocab",
            ItemKind::Phrase => "phrase",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── WORD CLASS ────────────────────────────────────────────────────────────────
//

/// Grammatical class of a vocabulary item.
///
/// Drives the inflected-form expansion used by phrase highlighting; items
/// without a class (and all phrases) only match their literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
    #[serde(other)]
    #[default]
    Other,
}

//
// ─── CONJUGATIONS ──────────────────────────────────────────────────────────────
//

/// Conjugation table keyed by tense group, then by person.
///
/// The nesting mirrors the catalog documents (`present.yo`, `preterite.tu`,
/// ...); consumers usually only need the flattened forms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conjugations(BTreeMap<String, BTreeMap<String, String>>);

impl Conjugations {
    #[must_use]
    pub fn new(table: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self(table)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over every conjugated form, across all tense groups.
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        self.0
            .values()
            .flat_map(|group| group.values())
            .map(String::as_str)
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// A single piece of immutable study content: one vocabulary word or one
/// phrase, with its translation and optional conjugation/audio extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    source_text: String,
    target_text: String,
    kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    word_class: Option<WordClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conjugations: Option<Conjugations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
}

impl Item {
    #[must_use]
    pub fn new(
        id: ItemId,
        source_text: impl Into<String>,
        target_text: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            target_text: target_text.into(),
            kind,
            word_class: None,
            conjugations: None,
            audio: None,
        }
    }

    #[must_use]
    pub fn with_word_class(mut self, word_class: WordClass) -> Self {
        self.word_class = Some(word_class);
        self
    }

    #[must_use]
    pub fn with_conjugations(mut self, conjugations: Conjugations) -> Self {
        self.conjugations = Some(conjugations);
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Text in the language being learned.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Translation in the learner's language.
    #[must_use]
    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[must_use]
    pub fn word_class(&self) -> Option<WordClass> {
        self.word_class
    }

    #[must_use]
    pub fn conjugations(&self) -> Option<&Conjugations> {
        self.conjugations.as_ref()
    }

    #[must_use]
    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
