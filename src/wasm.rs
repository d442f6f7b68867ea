use std::str::FromStr;

use itertools::Itertools;
use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::arrangement::Arrangement;
use crate::domain::Direction;
use crate::graph::MarkGraph;
use crate::mark::Mark;
use crate::optimizer::plan;
use crate::pattern::TargetSpec;

fn to_js_error(err: impl ToString) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Plan the fewest swaps from `start` (card per position) to a layout showing `target_marks` (mark name per position).
///
/// Resolves to `[assignment, distance, swaps]` where `assignment` lists the card per position and `swaps` is a list of `[a, b]` pairs.
#[wasm_bindgen(js_name = planSwaps)]
pub fn plan_swaps(start: Vec<u8>, target_marks: Array) -> Result<Array, JsValue> {
    let start = Arrangement::from_cards(&start.iter().map(|card| usize::from(*card)).collect_vec())
        .map_err(to_js_error)?;

    let marks = target_marks.iter()
        .map(|value| value.as_string()
            .ok_or_else(|| to_js_error("target marks must be strings"))
            .and_then(|name| Mark::from_str(&name).map_err(to_js_error)))
        .collect::<Result<Vec<_>, _>>()?;
    let target = TargetSpec::from_marks(&marks).map_err(to_js_error)?;

    let chosen = plan(&MarkGraph::standard(), &start, &target, Direction::default()).map_err(to_js_error)?;

    let assignment = chosen.assignment.cards().iter()
        .map(|card| JsValue::from(*card as u32))
        .collect::<Array>();
    let swaps = chosen.swaps.swaps().iter()
        .map(|(a, b)| JsValue::from(Array::of2(&JsValue::from(*a as u32), &JsValue::from(*b as u32))))
        .collect::<Array>();

    Ok(Array::of3(&assignment.into(), &JsValue::from(chosen.distance as u32), &swaps.into()))
}
