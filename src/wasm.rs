//! WebAssembly bindings.
//!
//! Enabled with the `wasm` feature. Values cross the boundary as plain
//! JavaScript objects shaped like the JSON problem and result.

use crate::problem::Problem;
use crate::relax::SolveResult;
use crate::ValidationError;
use wasm_bindgen::prelude::*;

/// Solves a problem object and returns the result object.
///
/// Malformed or invalid problems produce a `VALIDATION_ERROR` result rather
/// than a thrown exception; only result encoding failures throw.
#[wasm_bindgen]
pub fn solve(problem: JsValue) -> Result<JsValue, JsValue> {
    let result = match serde_wasm_bindgen::from_value::<Problem>(problem) {
        Ok(problem) => crate::solve(&problem),
        Err(err) => SolveResult::from_error(&ValidationError::Malformed(err.to_string()).into()),
    };
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solves a problem given as JSON text and returns the result as JSON text.
#[wasm_bindgen(js_name = solveJson)]
pub fn solve_json(input: &str) -> Result<String, JsValue> {
    crate::solve_json(input)
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
