//! Viewer session state.
//!
//! The load decision used to be the kind of thing that ends up as a global
//! "first load" flag. Here it is an explicit, pure state machine: given the
//! raw text the operator supplied (or `None` when they supplied nothing),
//! [`Session::load`] decides which batch is active, whether the viewer is
//! still waiting for real data, and what notice (if any) to surface. The
//! caller owns the value; re-loading is just calling `load` again.

use exprov_ingest::{parse_provenance, ParsedInput};
use exprov_model::{example_records, ProvenanceRecord};

/// Whether the active batch is operator data or the built-in example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable operator data yet; the example dataset is active and the
    /// viewer should keep inviting input.
    AwaitingInput,
    /// An operator-supplied batch is active.
    Loaded,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub records: Vec<ProvenanceRecord>,
    pub state: SessionState,
    /// Non-fatal warning to surface when bad input forced the fallback.
    pub notice: Option<String>,
}

impl Session {
    /// Resolve raw operator input into an active record batch.
    ///
    /// Never fails: absent or empty input selects the example dataset
    /// silently, unparseable input selects it with a notice, and a parsed
    /// batch (even an empty one, when every line was dropped) is loaded
    /// as-is.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(text) = raw else {
            return Self::awaiting(None);
        };
        match parse_provenance(text) {
            Ok(ParsedInput::Records(records)) => Self {
                records,
                state: SessionState::Loaded,
                notice: None,
            },
            Ok(ParsedInput::Empty) => Self::awaiting(None),
            Err(err) => Self::awaiting(Some(format!("{err}; using the example dataset"))),
        }
    }

    fn awaiting(notice: Option<String>) -> Self {
        Self {
            records: example_records(),
            state: SessionState::AwaitingInput,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_input_uses_the_example_silently() {
        let session = Session::load(None);
        assert_eq!(session.state, SessionState::AwaitingInput);
        assert_eq!(session.records, example_records());
        assert!(session.notice.is_none());
    }

    #[test]
    fn empty_text_behaves_like_no_input() {
        let session = Session::load(Some("   \n"));
        assert_eq!(session.state, SessionState::AwaitingInput);
        assert!(session.notice.is_none());
    }

    #[test]
    fn valid_array_input_is_loaded() {
        let text = serde_json::to_string(&example_records()).expect("serialize");
        let session = Session::load(Some(&text));
        assert_eq!(session.state, SessionState::Loaded);
        assert_eq!(session.records.len(), 3);
        assert!(session.notice.is_none());
    }

    #[test]
    fn format_error_falls_back_with_a_notice() {
        let session = Session::load(Some(r#"{"method": "add"}"#));
        assert_eq!(session.state, SessionState::AwaitingInput);
        assert_eq!(session.records, example_records());
        assert!(session.notice.as_deref().is_some_and(|n| n.contains("example")));
    }

    #[test]
    fn parse_error_falls_back_with_a_notice() {
        let session = Session::load(Some("not json at all"));
        assert_eq!(session.state, SessionState::AwaitingInput);
        assert!(session.notice.is_some());
    }

    #[test]
    fn reload_is_just_another_call() {
        let loaded = Session::load(Some(r#"[{"method": "add", "result": "x"}]"#));
        assert_eq!(loaded.state, SessionState::Loaded);
        let reset = Session::load(None);
        assert_eq!(reset.state, SessionState::AwaitingInput);
    }
}
