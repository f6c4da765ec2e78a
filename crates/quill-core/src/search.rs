//! Search ledger consumed by the presentation layer.
//!
//! The transcript UI shows one entry per distinct query: `Searching` while
//! the query is pending, `Done` with the fetched summary once a result
//! arrives. Like everything else in this crate the ledger is an ephemeral
//! snapshot, rebuilt from the segment sequence on every reparse; the CLI can
//! also feed it directly from transport events.

use serde::Serialize;

use crate::segment::AgentSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Searching,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchItem {
    /// Trimmed query text; acts as the identity key.
    pub query: String,
    pub status: SearchStatus,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchLedger {
    items: Vec<SearchItem>,
}

impl SearchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from a parsed segment sequence. A result segment
    /// completes the most recent query still waiting for one; a result that
    /// is itself still streaming leaves its query in `Searching`.
    pub fn from_segments(segments: &[AgentSegment]) -> Self {
        let mut ledger = Self::new();
        for seg in segments {
            match seg {
                AgentSegment::Search { text, .. } => {
                    ledger.upsert(text, SearchStatus::Searching, None);
                }
                AgentSegment::SearchResult { text, in_progress } => {
                    if !in_progress {
                        ledger.attach_result(text);
                    }
                }
                _ => {}
            }
        }
        ledger
    }

    /// Upsert by trimmed query; the most recent match wins. Empty queries
    /// are ignored.
    pub fn upsert(&mut self, query: &str, status: SearchStatus, result: Option<String>) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        if let Some(item) = self.items.iter_mut().rev().find(|item| item.query == query) {
            item.status = status;
            if result.is_some() {
                item.result = result;
            }
        } else {
            self.items.push(SearchItem {
                query: query.to_string(),
                status,
                result,
            });
        }
    }

    /// Attach a result to the most recent item still waiting for one.
    pub fn attach_result(&mut self, result: &str) {
        if let Some(item) = self.items.iter_mut().rev().find(|item| item.result.is_none()) {
            item.status = SearchStatus::Done;
            item.result = Some(result.to_string());
        }
    }

    pub fn items(&self) -> &[SearchItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    #[test]
    fn test_query_trimmed_and_used_as_key() {
        let mut ledger = SearchLedger::new();
        ledger.upsert("  weather today \n", SearchStatus::Searching, None);
        ledger.upsert("weather today", SearchStatus::Done, Some("sunny".to_string()));
        assert_eq!(ledger.items().len(), 1);
        assert_eq!(ledger.items()[0].query, "weather today");
        assert_eq!(ledger.items()[0].status, SearchStatus::Done);
        assert_eq!(ledger.items()[0].result.as_deref(), Some("sunny"));
    }

    #[test]
    fn test_empty_query_ignored() {
        let mut ledger = SearchLedger::new();
        ledger.upsert("   ", SearchStatus::Searching, None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_result_pairs_with_most_recent_unanswered_query() {
        let segments =
            segment("<search>q1</search><search_result>r1</search_result><search>q2</search>");
        let ledger = SearchLedger::from_segments(&segments);
        assert_eq!(ledger.items().len(), 2);
        assert_eq!(ledger.items()[0].result.as_deref(), Some("r1"));
        assert_eq!(ledger.items()[0].status, SearchStatus::Done);
        assert_eq!(ledger.items()[1].status, SearchStatus::Searching);
    }

    #[test]
    fn test_streaming_result_leaves_query_searching() {
        let segments = segment("<search>q</search><search_result>partial summar");
        let ledger = SearchLedger::from_segments(&segments);
        assert_eq!(ledger.items().len(), 1);
        assert_eq!(ledger.items()[0].status, SearchStatus::Searching);
        assert_eq!(ledger.items()[0].result, None);
    }

    #[test]
    fn test_upsert_matches_most_recent_duplicate() {
        let mut ledger = SearchLedger::new();
        ledger.upsert("q", SearchStatus::Searching, None);
        ledger.items.push(SearchItem {
            query: "q".to_string(),
            status: SearchStatus::Searching,
            result: None,
        });
        ledger.upsert("q", SearchStatus::Done, Some("r".to_string()));
        assert_eq!(ledger.items()[0].status, SearchStatus::Searching);
        assert_eq!(ledger.items()[1].status, SearchStatus::Done);
    }
}
