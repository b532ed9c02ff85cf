//! Marks occurrences of the selected weeks' vocabulary inside phrase text.
//!
//! A vocabulary word matches not just its dictionary form but its
//! conjugations and simple Spanish inflections (noun plurals, adjective
//! gender/number). All forms go into one case-insensitive word-boundary
//! alternation, longest first, so a longer inflection always wins over a
//! shorter form embedded in it.

use std::collections::HashMap;

use regex::RegexBuilder;
use tracing::debug;

use study_core::model::{Item, ItemId, WordClass};

/// One run of phrase text, either plain or matching a vocabulary item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Vocab { text: String, item_id: ItemId },
}

/// Every form of a vocabulary word that should light up in a phrase.
///
/// Lowercased, deduplicated, empty forms dropped. Inflection expansion is
/// heuristic by word class; items without a class only match literally.
#[must_use]
pub fn vocab_forms(item: &Item) -> Vec<String> {
    let base = item.source_text().trim().to_lowercase();
    let mut forms = vec![base.clone()];

    if let Some(conjugations) = item.conjugations() {
        forms.extend(conjugations.forms().map(str::to_lowercase));
    }

    match item.word_class() {
        Some(WordClass::Noun) => forms.extend(noun_plurals(&base)),
        Some(WordClass::Adjective) => forms.extend(adjective_variants(&base)),
        _ => {}
    }

    let mut seen = Vec::with_capacity(forms.len());
    for form in forms {
        if !form.trim().is_empty() && !seen.contains(&form) {
            seen.push(form);
        }
    }
    seen
}

fn noun_plurals(word: &str) -> Vec<String> {
    match word.chars().last() {
        Some('a' | 'o' | 'e') => vec![format!("{word}s")],
        Some('l' | 'r' | 'n') => vec![format!("{word}es")],
        Some(_) => vec![format!("{word}s")],
        None => Vec::new(),
    }
}

fn adjective_variants(word: &str) -> Vec<String> {
    match word.chars().last() {
        Some('o') => {
            let stem: String = word.chars().take(word.chars().count() - 1).collect();
            vec![
                format!("{stem}a"),
                format!("{stem}os"),
                format!("{stem}as"),
            ]
        }
        Some('a') => {
            let stem: String = word.chars().take(word.chars().count() - 1).collect();
            vec![
                format!("{stem}o"),
                format!("{stem}as"),
                format!("{stem}os"),
            ]
        }
        Some('s') | None => Vec::new(),
        Some(last) => {
            let mut variants = vec![format!("{word}s")];
            if matches!(last, 'l' | 'r' | 'n') {
                variants.push(format!("{word}es"));
            }
            variants
        }
    }
}

/// Splits phrase text into plain and vocabulary-matching segments.
///
/// Matching is case-insensitive on word boundaries. When two items share a
/// form, the item with the longer base word owns it.
#[must_use]
pub fn highlight_phrase(text: &str, vocab: &[Item]) -> Vec<Segment> {
    let mut form_owner: HashMap<String, &Item> = HashMap::new();
    for item in vocab {
        for form in vocab_forms(item) {
            match form_owner.get(&form) {
                Some(existing)
                    if existing.source_text().chars().count()
                        >= item.source_text().chars().count() => {}
                _ => {
                    form_owner.insert(form, item);
                }
            }
        }
    }
    if form_owner.is_empty() {
        return plain(text);
    }

    // Longest alternative first so the regex prefers full inflections.
    let mut forms: Vec<&String> = form_owner.keys().collect();
    forms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let pattern = format!(
        r"\b(?:{})\b",
        forms
            .iter()
            .map(|form| regex::escape(form))
            .collect::<Vec<_>>()
            .join("|")
    );

    let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(err) => {
            debug!(error = %err, "vocabulary pattern failed to compile");
            return plain(text);
        }
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in regex.find_iter(text) {
        let Some(item) = form_owner.get(&found.as_str().to_lowercase()) else {
            continue;
        };
        if found.start() > cursor {
            segments.push(Segment::Plain(text[cursor..found.start()].to_owned()));
        }
        segments.push(Segment::Vocab {
            text: found.as_str().to_owned(),
            item_id: item.id().clone(),
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment::Plain(text[cursor..].to_owned()));
    }
    if segments.is_empty() {
        return plain(text);
    }
    segments
}

fn plain(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment::Plain(text.to_owned())]
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
