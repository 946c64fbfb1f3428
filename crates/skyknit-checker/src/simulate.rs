//! Whole-component simulation and edge-count extraction.

use crate::error::{CheckerError, TransitionError};
use crate::vm::{VmState, execute_op};
use serde::{Deserialize, Serialize};
use skyknit_kernel::ShapingAction;
use skyknit_schemas::{ComponentIR, ComponentSpec, OpType, Operation};
use skyknit_topology::{EdgeType, Join, JoinType};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub component_name: String,
    pub passed: bool,
    pub final_state: VmState,
    pub errors: Vec<CheckerError>,
}

/// Run every operation of `ir` in order, collecting every failure.
///
/// When the first operation establishes the component (`CAST_ON` or
/// `PICKUP_STITCHES`) simulation starts from empty needles and the declared
/// starting count is compared after the operation that first puts stitches
/// on the needle. A `CAST_ON` anywhere but index 0 is refused. Otherwise the declared
/// starting count is loaded as the live count. The declared ending count is
/// always compared with the final live count.
pub fn simulate_component(ir: &ComponentIR) -> SimulationResult {
    let name = ir.component_name.as_str();
    let establishes = ir
        .operations
        .first()
        .is_some_and(|op| op.op_type.starts_component());
    let mut state = if establishes {
        VmState::new()
    } else {
        VmState::resumed(ir.starting_stitch_count)
    };
    let mut errors = Vec::new();

    for (index, op) in ir.operations.iter().enumerate() {
        // Position, not the count of successful transitions, decides this:
        // a failed first CAST_ON must not let a later one through.
        if index > 0 && op.op_type == OpType::CastOn {
            errors.push(CheckerError::filler(
                name,
                Some(index),
                TransitionError::CastOnNotFirst.to_string(),
            ));
            continue;
        }
        let was_started = state.started;
        match execute_op(&state, op) {
            Ok(next) => {
                for message in interval_mismatches(op, state.live_stitch_count, next.live_stitch_count)
                {
                    errors.push(CheckerError::filler(name, Some(index), message));
                }
                state = next;
                if let Some(expected) = op.stitch_count_after {
                    if expected != state.live_stitch_count {
                        errors.push(CheckerError::filler(
                            name,
                            Some(index),
                            format!(
                                "{} declares {expected} stitches after, simulation has {}",
                                op.op_type, state.live_stitch_count
                            ),
                        ));
                    }
                }
            }
            Err(err) => errors.push(CheckerError::filler(name, Some(index), err.to_string())),
        }
        if establishes
            && !was_started
            && state.started
            && state.live_stitch_count != ir.starting_stitch_count
        {
            errors.push(CheckerError::filler(
                name,
                Some(index),
                format!(
                    "starting stitch count is declared as {}, but {} leaves {}",
                    ir.starting_stitch_count, op.op_type, state.live_stitch_count
                ),
            ));
        }
    }

    if state.live_stitch_count != ir.ending_stitch_count {
        errors.push(CheckerError::filler(
            name,
            None,
            format!(
                "ending stitch count is declared as {}, but simulation ends with {}",
                ir.ending_stitch_count, state.live_stitch_count
            ),
        ));
    }

    for error in &errors {
        warn!(component = name, error = %error.message, "simulation error");
    }
    debug!(
        component = name,
        operations = ir.operations.len(),
        live = state.live_stitch_count,
        held = state.total_held(),
        rows = state.row_counter,
        errors = errors.len(),
        "simulated component"
    );

    SimulationResult {
        component_name: ir.component_name.clone(),
        passed: errors.is_empty(),
        final_state: state,
        errors,
    }
}

/// Check a shaping operation's `intervals` parameter, when present, against
/// the rows it declares and the delta it applied.
fn interval_mismatches(op: &Operation, before: u32, after: u32) -> Vec<String> {
    let expected_action = match op.op_type {
        OpType::IncreaseSection => Some(ShapingAction::Increase),
        OpType::DecreaseSection => Some(ShapingAction::Decrease),
        OpType::Taper => None,
        _ => return Vec::new(),
    };
    let intervals = match op.intervals_param() {
        Ok(Some(intervals)) => intervals,
        Ok(None) => return Vec::new(),
        Err(message) => return vec![message],
    };

    let mut mismatches = Vec::new();
    if let Some(expected) = expected_action {
        if let Some(wrong) = intervals.iter().find(|interval| interval.action != expected) {
            mismatches.push(format!("{} carries {} intervals", op.op_type, wrong.action));
        }
    }
    let rows: u64 = intervals.iter().map(|interval| interval.rows()).sum();
    let declared_rows = u64::from(op.row_count.unwrap_or(0));
    if rows != declared_rows {
        mismatches.push(format!(
            "shaping intervals cover {rows} rows, but the operation spans {declared_rows}"
        ));
    }
    let stitches: u64 = intervals.iter().map(|interval| interval.stitches()).sum();
    let delta = u64::from(before.abs_diff(after));
    if stitches != delta {
        mismatches.push(format!(
            "shaping intervals change {stitches} stitches, but the operation changes {delta}"
        ));
    }
    mismatches
}

/// Simulate `ir` and map each edge of `spec` to its stitch count.
pub fn extract_edge_counts(
    ir: &ComponentIR,
    spec: &ComponentSpec,
    joins: &[Join],
) -> BTreeMap<String, u32> {
    edge_counts_from(&simulate_component(ir), ir, spec, joins)
}

/// Edge counts from an existing simulation, keyed by edge name.
///
/// In order of precedence:
/// - an edge named like a HOLD/SEPARATE label gets the count captured there;
/// - `BOUND_OFF` and `OPEN` edges get the ending count;
/// - `CAST_ON` edges get the starting count;
/// - `SELVEDGE` edges get the component's total row count, not a stitch
///   count, so a `RATIO` pickup along a row edge means stitches per row;
/// - a `LIVE_STITCH` edge downstream of a `PICKUP` join gets the starting
///   count, the stitches just picked up; other `LIVE_STITCH` edges get the
///   ending count when the component casts on and the starting count
///   otherwise.
pub fn edge_counts_from(
    simulation: &SimulationResult,
    ir: &ComponentIR,
    spec: &ComponentSpec,
    joins: &[Join],
) -> BTreeMap<String, u32> {
    let casts_on = ir
        .operations
        .first()
        .is_some_and(|op| op.op_type == OpType::CastOn);
    let total_rows = u32::try_from(ir.total_rows()).unwrap_or(u32::MAX);

    spec.edges
        .iter()
        .map(|edge| {
            let count = if let Some(captured) = simulation.final_state.captured.get(&edge.name) {
                *captured
            } else {
                match edge.edge_type {
                    EdgeType::BoundOff | EdgeType::Open => ir.ending_stitch_count,
                    EdgeType::CastOn => ir.starting_stitch_count,
                    EdgeType::Selvedge => total_rows,
                    EdgeType::LiveStitch => {
                        let qualified = format!("{}.{}", spec.name, edge.name);
                        let picked_up = edge.join_ref.as_deref().is_some_and(|join_ref| {
                            joins.iter().any(|join| {
                                join.id() == join_ref
                                    && join.join_type() == JoinType::Pickup
                                    && join.edge_b_ref() == qualified
                            })
                        });
                        if picked_up || !casts_on {
                            ir.starting_stitch_count
                        } else {
                            ir.ending_stitch_count
                        }
                    }
                }
            };
            (edge.name.clone(), count)
        })
        .collect()
}
