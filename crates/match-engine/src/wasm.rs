//! WASM bindings for frontend match replay

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::catalog::{RuleInfo, RuleSpec};
use crate::game::{run_match, MatchConfig, MatchLength};

fn parse_rule(json: &str, seat: &str) -> Result<RuleSpec, JsError> {
    RuleSpec::from_json(json).map_err(|e| JsError::new(&format!("Invalid rule {}: {}", seat, e)))
}

/// Replay a match with full round-by-round details
///
/// # Arguments
/// * `rule_a_json` - JSON serialized RuleSpec for player A
/// * `rule_b_json` - JSON serialized RuleSpec for player B
/// * `seed` - 32-byte randomness seed
/// * `stream` - Stream index within the seed
/// * `rounds` - Match length, disclosed to rules that declare it
///
/// # Returns
/// JSON serialized MatchResult
#[wasm_bindgen]
pub fn replay_match(
    rule_a_json: &str,
    rule_b_json: &str,
    seed: &[u8],
    stream: u32,
    rounds: u32,
) -> Result<JsValue, JsError> {
    let rule_a = parse_rule(rule_a_json, "A")?;
    let rule_b = parse_rule(rule_b_json, "B")?;

    let seed_arr: [u8; 32] = seed
        .try_into()
        .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))?;

    let config = MatchConfig::new(MatchLength::Finite(rounds)).with_seed(seed_arr, stream);
    let build = |spec: &RuleSpec| spec.build().map_err(|e| JsError::new(&e.to_string()));
    let result = run_match(build(&rule_a)?, build(&rule_b)?, config)
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Name and descriptor of a configured rule
#[wasm_bindgen]
pub fn describe_rule(rule_json: &str) -> Result<JsValue, JsError> {
    let info = parse_rule(rule_json, "")?
        .describe()
        .map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Every catalogue rule at its default parameters
#[wasm_bindgen]
pub fn list_rules() -> Result<js_sys::Array, JsError> {
    let rules = js_sys::Array::new();
    for spec in RuleSpec::defaults() {
        let info: RuleInfo = spec.describe().map_err(|e| JsError::new(&e.to_string()))?;
        let value = serde_wasm_bindgen::to_value(&info)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))?;
        rules.push(&value);
    }
    Ok(rules)
}
