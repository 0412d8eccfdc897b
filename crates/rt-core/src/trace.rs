//! Hash-chained reasoning trace.
//!
//! Each pipeline stage appends one [`ReasoningStep`] carrying a label, a
//! structured evidence map, and a SHA-256 digest chained over the previous
//! step's digest. The chain makes the reasoning trace tamper-evident:
//! editing any step's evidence after the fact breaks verification.
//!
//! Determinism: evidence maps are `serde_json::Map` (BTreeMap-backed, so
//! key-ordered) and digests are computed over the canonical JSON of
//! `(step, evidence, prev_digest)`, so identical pipeline inputs always
//! produce identical digests.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Digest seed for the first step of a trace.
pub const GENESIS_DIGEST: &str = "genesis";

/// One step of an investigation's reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReasoningStep {
    /// Stage label (`detect`, `investigate`, `correlate`, ...).
    pub step: String,
    /// Structured evidence produced by the stage.
    pub evidence: Map<String, Value>,
    /// Digest of the previous step (`"genesis"` for the first).
    pub prev_digest: String,
    /// SHA-256 over `{step, evidence, prev_digest}` as canonical JSON.
    pub digest: String,
}

/// Accumulates reasoning steps, maintaining the digest chain.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    steps: Vec<ReasoningStep>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. `evidence` must be a JSON object; any other value is
    /// wrapped under an `"evidence"` key so the trace shape stays total.
    pub fn push(&mut self, step: &str, evidence: Value) {
        let evidence = match evidence {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("evidence".to_string(), other);
                map
            }
        };
        let prev_digest = self
            .steps
            .last()
            .map(|s| s.digest.clone())
            .unwrap_or_else(|| GENESIS_DIGEST.to_string());
        let digest = step_digest(step, &evidence, &prev_digest);
        self.steps.push(ReasoningStep {
            step: step.to_string(),
            evidence,
            prev_digest,
            digest,
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Digest of the latest step, or the genesis seed for an empty trace.
    pub fn head_digest(&self) -> &str {
        self.steps.last().map(|s| s.digest.as_str()).unwrap_or(GENESIS_DIGEST)
    }

    pub fn finish(self) -> Vec<ReasoningStep> {
        self.steps
    }
}

/// Verify a trace's digest chain end to end.
///
/// Returns false if any step's digest does not match its content, if the
/// chain links are broken, or if the first step is not anchored at the
/// genesis seed.
pub fn verify_trace(steps: &[ReasoningStep]) -> bool {
    let mut prev = GENESIS_DIGEST;
    for step in steps {
        if step.prev_digest != prev {
            return false;
        }
        if step_digest(&step.step, &step.evidence, &step.prev_digest) != step.digest {
            return false;
        }
        prev = &step.digest;
    }
    true
}

fn step_digest(step: &str, evidence: &Map<String, Value>, prev_digest: &str) -> String {
    // serde_json::Map iterates in key order, so this serialization is
    // canonical for our purposes.
    let payload = serde_json::json!({
        "step": step,
        "evidence": evidence,
        "prev_digest": prev_digest,
    });
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
