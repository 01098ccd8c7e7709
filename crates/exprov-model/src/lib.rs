//! Provenance record model
//!
//! A provenance log is a flat sequence of records, one per traced operation.
//! Each record names the operation (`method`), the expression keys it consumed
//! (`arguments`, in call order), and the expression key it produced (`result`).
//! The `result` key doubles as the record's identity: other records reference
//! it by using the same string in their own `arguments`.
//!
//! The three stack/context fields are opaque pass-through text. The core never
//! interprets them; they exist so a viewer can show where in user and
//! framework code the operation happened.

use serde::{Deserialize, Serialize};

/// One logged operation.
///
/// All fields are defaulted so partially filled records deserialize cleanly:
/// missing fields surface as empty display text downstream, never as parse
/// errors. Unknown extra fields in the JSON are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    #[serde(default)]
    pub method: String,
    /// Expression keys consumed by the operation. Order matches the call
    /// signature and is preserved for display and child expansion.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Expression key produced by the operation; identity key of the record.
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub user_bottom_stack: String,
    #[serde(default)]
    pub user_top_stack: String,
    #[serde(default)]
    pub floc: String,
}

const EXAMPLE_USER_BOTTOM: &str = "latent = self.proj(latent)  # pytorch-env/lib/python3.10/site-packages/diffusers/models/embeddings.py:545 in forward";
const EXAMPLE_USER_TOP: &str = "hidden_states = self.pos_embed(hidden_states)  # takes care of adding positional embeddings too.  # pytorch-env/lib/python3.10/site-packages/diffusers/models/transformers/transformer_sd3.py:391 in forward";
const EXAMPLE_FLOC: &str = "<FrameSummary file /home/bobren/local/a/pytorch/torch/_meta_registrations.py, line 2183 in _formula>";

/// Built-in example batch: three chained symbolic-shape records
/// (`floordiv` → `mul` → `gt`).
///
/// Used as the fallback dataset whenever no input is supplied or the supplied
/// input is invalid, and as the canonical end-to-end fixture: `(s1//2)` feeds
/// `1536*((s1//2))` which feeds `1536*((s1//2)) > 1536`, while `s1`, `2` and
/// `1536` stay unresolved leaves.
pub fn example_records() -> Vec<ProvenanceRecord> {
    vec![
        ProvenanceRecord {
            method: "floordiv".to_string(),
            arguments: vec!["s1".to_string(), "2".to_string()],
            result: "(s1//2)".to_string(),
            user_bottom_stack: EXAMPLE_USER_BOTTOM.to_string(),
            user_top_stack: EXAMPLE_USER_TOP.to_string(),
            floc: EXAMPLE_FLOC.to_string(),
        },
        ProvenanceRecord {
            method: "mul".to_string(),
            arguments: vec!["1536".to_string(), "(s1//2)".to_string()],
            result: "1536*((s1//2))".to_string(),
            user_bottom_stack: EXAMPLE_USER_BOTTOM.to_string(),
            user_top_stack: EXAMPLE_USER_TOP.to_string(),
            floc: EXAMPLE_FLOC.to_string(),
        },
        ProvenanceRecord {
            method: "gt".to_string(),
            arguments: vec!["1536*((s1//2))".to_string(), "1536".to_string()],
            result: "1536*((s1//2)) > 1536".to_string(),
            user_bottom_stack: EXAMPLE_USER_BOTTOM.to_string(),
            user_top_stack: EXAMPLE_USER_TOP.to_string(),
            floc: EXAMPLE_FLOC.to_string(),
        },
    ]
}
