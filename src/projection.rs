//! Display-ready data derived from a [`ResearchResult`].
//!
//! Everything here is a pure function of the result. Optional parts of the
//! payload degrade to explicit empty states instead of empty lists.

use crate::models::{FullState, Reference, ResearchResult, ValidationEntry};

pub const NO_REFERENCES: &str = "No references available";
pub const NO_LOGS: &str = "No logs available";
pub const NO_DETAILS: &str = "No details available";
pub const UNTITLED: &str = "Untitled";

/// `round(x * 100)`, kept inside 0..=100.
pub fn percent(x: f64) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
}

/// `High` strictly above 0.75.
pub fn confidence_tier(confidence: f64) -> ConfidenceTier {
    if confidence > 0.75 {
        ConfidenceTier::High
    } else {
        ConfidenceTier::Medium
    }
}

pub fn resolve_reference_url(reference: &Reference) -> Option<&str> {
    reference.source.as_deref().or(reference.url.as_deref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Messages,
    Validations,
    SearchQueries,
}

/// A section is present only when its sequence exists and is non-empty.
pub fn has_section(full_state: Option<&FullState>, section: Section) -> bool {
    let Some(state) = full_state else {
        return false;
    };
    match section {
        Section::Messages => state.messages.as_ref().is_some_and(|m| !m.is_empty()),
        Section::Validations => state.validations.as_ref().is_some_and(|v| !v.is_empty()),
        Section::SearchQueries => state.search_queries.as_ref().is_some_and(|q| !q.is_empty()),
    }
}

pub fn conflicts_label(conflicts_detected: bool) -> &'static str {
    if conflicts_detected {
        "Conflicts detected"
    } else {
        "No conflicts"
    }
}

/// Sidebar status card.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub confidence_percent: u8,
    pub tier: ConfidenceTier,
    pub sources: u32,
    pub validations: u32,
    pub iterations: u32,
    pub conflicts_detected: bool,
    pub conflicts_label: &'static str,
}

impl StatusSummary {
    pub fn from_result(result: &ResearchResult) -> Self {
        StatusSummary {
            confidence_percent: percent(result.confidence),
            tier: confidence_tier(result.confidence),
            sources: result.search_results_count,
            validations: result.validations_count,
            iterations: result.iterations,
            conflicts_detected: result.conflicts_detected,
            conflicts_label: conflicts_label(result.conflicts_detected),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceItem {
    /// 1-based, as shown to the user.
    pub index: usize,
    pub title: String,
    pub url: Option<String>,
    pub relevance_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReferencesView {
    Empty(&'static str),
    Items(Vec<ReferenceItem>),
}

impl ReferencesView {
    pub fn from_result(result: &ResearchResult) -> Self {
        if result.references.is_empty() {
            return ReferencesView::Empty(NO_REFERENCES);
        }

        let items = result
            .references
            .iter()
            .enumerate()
            .map(|(i, reference)| ReferenceItem {
                index: i + 1,
                title: reference
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string()),
                url: resolve_reference_url(reference).map(str::to_string),
                relevance_percent: reference.relevance_score.map(percent),
            })
            .collect();
        ReferencesView::Items(items)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogsView {
    Empty(&'static str),
    Messages(Vec<String>),
}

impl LogsView {
    pub fn from_result(result: &ResearchResult) -> Self {
        let full_state = result.full_state.as_ref();
        match full_state.and_then(|s| s.messages.as_ref()) {
            Some(messages) if has_section(full_state, Section::Messages) => {
                LogsView::Messages(messages.clone())
            }
            _ => LogsView::Empty(NO_LOGS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationItem {
    pub claim: String,
    pub is_validated: bool,
    pub confidence_percent: u8,
    pub reasoning: String,
}

impl From<&ValidationEntry> for ValidationItem {
    fn from(entry: &ValidationEntry) -> Self {
        ValidationItem {
            claim: entry.claim.clone(),
            is_validated: entry.is_validated,
            confidence_percent: percent(entry.confidence),
            reasoning: entry.reasoning.clone(),
        }
    }
}

/// Details tab. A card is `None` when its section is absent or empty, and
/// the whole tab falls back to a placeholder when both are.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsView {
    pub validations: Option<Vec<ValidationItem>>,
    pub search_queries: Option<Vec<String>>,
}

impl DetailsView {
    pub fn from_result(result: &ResearchResult) -> Self {
        let full_state = result.full_state.as_ref();

        let validations = full_state
            .filter(|s| has_section(Some(*s), Section::Validations))
            .and_then(|s| s.validations.as_ref())
            .map(|entries| entries.iter().map(ValidationItem::from).collect());

        let search_queries = full_state
            .filter(|s| has_section(Some(*s), Section::SearchQueries))
            .and_then(|s| s.search_queries.clone());

        DetailsView {
            validations,
            search_queries,
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        if self.validations.is_none() && self.search_queries.is_none() {
            Some(NO_DETAILS)
        } else {
            None
        }
    }
}

/// Fill ratio of the onboarding progress bar for a 0-based step.
pub fn progress_fraction(step: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((step + 1).min(total)) as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(references: Vec<Reference>, full_state: Option<FullState>) -> ResearchResult {
        ResearchResult {
            query: "test".into(),
            timestamp: "2025-01-01T00:00:00".into(),
            report: "# Report".into(),
            confidence: 0.9,
            search_results_count: 5,
            validations_count: 3,
            iterations: 2,
            conflicts_detected: false,
            references,
            full_state,
        }
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0.753), 75);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(-0.2), 0);
        assert_eq!(percent(f64::NAN), 0);
    }

    #[test]
    fn tier_boundary_is_exclusive() {
        assert_eq!(confidence_tier(0.76), ConfidenceTier::High);
        assert_eq!(confidence_tier(0.75), ConfidenceTier::Medium);
        assert_eq!(confidence_tier(0.0), ConfidenceTier::Medium);
    }

    #[test]
    fn reference_url_prefers_source() {
        let both = Reference {
            source: Some("https://a".into()),
            url: Some("https://b".into()),
            ..Reference::default()
        };
        let url_only = Reference {
            url: Some("https://b".into()),
            ..Reference::default()
        };
        assert_eq!(resolve_reference_url(&both), Some("https://a"));
        assert_eq!(resolve_reference_url(&url_only), Some("https://b"));
        assert_eq!(resolve_reference_url(&Reference::default()), None);
    }

    #[test]
    fn sections_need_non_empty_sequences() {
        let state = FullState {
            messages: Some(vec![]),
            validations: None,
            search_queries: Some(vec!["rust async".into()]),
        };
        assert!(!has_section(Some(&state), Section::Messages));
        assert!(!has_section(Some(&state), Section::Validations));
        assert!(has_section(Some(&state), Section::SearchQueries));
        assert!(!has_section(None, Section::SearchQueries));
    }

    #[test]
    fn empty_references_show_placeholder() {
        let view = ReferencesView::from_result(&result_with(vec![], None));
        assert_eq!(view, ReferencesView::Empty(NO_REFERENCES));
    }

    #[test]
    fn references_are_numbered_and_defaulted() {
        let view = ReferencesView::from_result(&result_with(
            vec![
                Reference {
                    title: Some("Rust book".into()),
                    url: Some("https://doc.rust-lang.org/book".into()),
                    relevance_score: Some(0.873),
                    ..Reference::default()
                },
                Reference::default(),
            ],
            None,
        ));
        let ReferencesView::Items(items) = view else {
            panic!("expected items");
        };
        assert_eq!(items[0].index, 1);
        assert_eq!(items[0].relevance_percent, Some(87));
        assert_eq!(items[1].index, 2);
        assert_eq!(items[1].title, UNTITLED);
        assert_eq!(items[1].url, None);
        assert_eq!(items[1].relevance_percent, None);
    }

    #[test]
    fn details_omit_missing_validations_card() {
        let result = result_with(
            vec![],
            Some(FullState {
                messages: None,
                validations: None,
                search_queries: Some(vec!["q1".into(), "q2".into()]),
            }),
        );
        let details = DetailsView::from_result(&result);
        assert!(details.validations.is_none());
        assert_eq!(details.search_queries.as_ref().map(Vec::len), Some(2));
        assert_eq!(details.placeholder(), None);
    }

    #[test]
    fn details_without_full_state_use_placeholder() {
        let details = DetailsView::from_result(&result_with(vec![], None));
        assert_eq!(details.placeholder(), Some(NO_DETAILS));
    }

    #[test]
    fn validation_items_carry_percent() {
        let result = result_with(
            vec![],
            Some(FullState {
                validations: Some(vec![ValidationEntry {
                    claim: "Rust has no GC".into(),
                    is_validated: true,
                    confidence: 0.92,
                    reasoning: "Ownership model".into(),
                }]),
                ..FullState::default()
            }),
        );
        let details = DetailsView::from_result(&result);
        let items = details.validations.unwrap();
        assert_eq!(items[0].confidence_percent, 92);
        assert!(items[0].is_validated);
    }

    #[test]
    fn logs_fall_back_when_absent_or_empty() {
        let absent = result_with(vec![], Some(FullState::default()));
        assert_eq!(LogsView::from_result(&absent), LogsView::Empty(NO_LOGS));

        let present = result_with(
            vec![],
            Some(FullState {
                messages: Some(vec!["planning".into()]),
                ..FullState::default()
            }),
        );
        assert_eq!(
            LogsView::from_result(&present),
            LogsView::Messages(vec!["planning".into()])
        );
    }

    #[test]
    fn status_summary_for_successful_scenario() {
        let summary = StatusSummary::from_result(&result_with(vec![], None));
        assert_eq!(summary.confidence_percent, 90);
        assert_eq!(summary.tier, ConfidenceTier::High);
        assert_eq!(summary.sources, 5);
        assert_eq!(summary.validations, 3);
        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.conflicts_label, "No conflicts");
    }

    #[test]
    fn progress_fraction_counts_current_step() {
        assert_eq!(progress_fraction(0, 6), 1.0 / 6.0);
        assert_eq!(progress_fraction(5, 6), 1.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
    }
}
