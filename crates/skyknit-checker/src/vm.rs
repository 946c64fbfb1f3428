//! Per-component stitch-count state machine.
//!
//! `execute_op` is the transition function. It never mutates its input: a
//! refused transition leaves the caller's state exactly as it was, so
//! simulation can record the failure and keep going.

use crate::error::TransitionError;
use serde::{Deserialize, Serialize};
use skyknit_schemas::{OpType, Operation};
use std::collections::BTreeMap;
use tracing::trace;

pub const MAIN_NEEDLE: &str = "main";
pub const DEFAULT_HOLD_LABEL: &str = "held";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmState {
    pub live_stitch_count: u32,
    pub held_stitches: BTreeMap<String, u32>,
    pub row_counter: u64,
    pub current_needle: String,
    pub operations_applied: usize,
    /// Stitches moved onto each holder label over the whole run. Picking a
    /// group back up empties `held_stitches` but not this.
    pub captured: BTreeMap<String, u32>,
    /// Whether a live count has been established.
    pub started: bool,
}

impl Default for VmState {
    fn default() -> Self {
        Self::new()
    }
}

impl VmState {
    /// Empty needles, waiting for a `CAST_ON` or `PICKUP_STITCHES`.
    pub fn new() -> Self {
        Self {
            live_stitch_count: 0,
            held_stitches: BTreeMap::new(),
            row_counter: 0,
            current_needle: MAIN_NEEDLE.to_string(),
            operations_applied: 0,
            captured: BTreeMap::new(),
            started: false,
        }
    }

    /// A component that continues from stitches already on the needle.
    pub fn resumed(live_stitch_count: u32) -> Self {
        Self {
            live_stitch_count,
            started: true,
            ..Self::new()
        }
    }

    pub fn total_held(&self) -> u64 {
        self.held_stitches.values().copied().map(u64::from).sum()
    }
}

/// Apply one operation, returning the successor state.
pub fn execute_op(state: &VmState, op: &Operation) -> Result<VmState, TransitionError> {
    let mut next = state.clone();
    match op.op_type {
        OpType::CastOn => cast_on(&mut next, op)?,
        OpType::WorkEven => work_even(&mut next, op)?,
        OpType::IncreaseSection | OpType::DecreaseSection | OpType::Taper => {
            shape(&mut next, op)?
        }
        OpType::BindOff => bind_off(&mut next, op)?,
        OpType::Hold => hold(&mut next, op)?,
        OpType::Separate => separate(&mut next, op)?,
        OpType::PickupStitches => pickup(&mut next, op)?,
    }
    next.operations_applied += 1;
    trace!(
        op = %op.op_type,
        live = next.live_stitch_count,
        held = next.total_held(),
        rows = next.row_counter,
        "vm transition"
    );
    Ok(next)
}

fn require_started(state: &VmState, op_type: OpType) -> Result<(), TransitionError> {
    if state.started {
        Ok(())
    } else {
        Err(TransitionError::NotStarted { op_type })
    }
}

fn required_rows(op: &Operation) -> Result<u32, TransitionError> {
    match op.row_count {
        Some(rows) if rows > 0 => Ok(rows),
        _ => Err(TransitionError::MissingRows {
            op_type: op.op_type,
        }),
    }
}

fn count_param(op: &Operation, name: &str) -> Result<Option<u32>, TransitionError> {
    op.count_param(name)
        .map_err(|message| TransitionError::InvalidParameter {
            op_type: op.op_type,
            message,
        })
}

fn positive_count(op: &Operation, count: u32) -> Result<u32, TransitionError> {
    if count == 0 {
        return Err(TransitionError::ZeroCount {
            op_type: op.op_type,
        });
    }
    Ok(count)
}

fn str_param<'a>(op: &'a Operation, name: &str) -> Result<Option<&'a str>, TransitionError> {
    op.str_param(name)
        .map_err(|message| TransitionError::InvalidParameter {
            op_type: op.op_type,
            message,
        })
}

fn add_held(
    state: &mut VmState,
    op_type: OpType,
    label: &str,
    count: u32,
) -> Result<(), TransitionError> {
    for slot in [
        state.held_stitches.entry(label.to_string()).or_insert(0),
        state.captured.entry(label.to_string()).or_insert(0),
    ] {
        *slot = slot
            .checked_add(count)
            .ok_or(TransitionError::Overflow { op_type })?;
    }
    Ok(())
}

fn cast_on(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    if state.started || state.operations_applied > 0 {
        return Err(TransitionError::CastOnNotFirst);
    }
    let count = count_param(op, "count")?
        .or(op.stitch_count_after)
        .ok_or(TransitionError::MissingParameter {
            op_type: op.op_type,
            parameter: "count",
        })?;
    state.live_stitch_count = positive_count(op, count)?;
    state.started = true;
    Ok(())
}

fn work_even(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    require_started(state, op.op_type)?;
    state.row_counter += u64::from(required_rows(op)?);
    Ok(())
}

/// INCREASE_SECTION, DECREASE_SECTION and TAPER. The target is either
/// `live + stitch_delta` or the declared `stitch_count_after`.
fn shape(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    require_started(state, op.op_type)?;
    let rows = required_rows(op)?;
    let live = state.live_stitch_count;
    let delta = op
        .signed_param("stitch_delta")
        .map_err(|message| TransitionError::InvalidParameter {
            op_type: op.op_type,
            message,
        })?;
    let target = match (delta, op.stitch_count_after) {
        (Some(delta), _) => i64::from(live) + delta,
        (None, Some(after)) => i64::from(after),
        (None, None) => {
            return Err(TransitionError::MissingParameter {
                op_type: op.op_type,
                parameter: "stitch_count_after",
            });
        }
    };
    if target < 0 {
        return Err(TransitionError::NegativeCount {
            op_type: op.op_type,
            live,
            delta: target - i64::from(live),
        });
    }
    let after = u32::try_from(target).map_err(|_| TransitionError::Overflow {
        op_type: op.op_type,
    })?;
    let direction = match op.op_type {
        OpType::IncreaseSection if after <= live => Some("increase"),
        OpType::DecreaseSection if after >= live => Some("decrease"),
        _ => None,
    };
    if let Some(direction) = direction {
        return Err(TransitionError::WrongDirection {
            op_type: op.op_type,
            direction,
            before: live,
            after,
        });
    }
    state.live_stitch_count = after;
    state.row_counter += u64::from(rows);
    Ok(())
}

fn bind_off(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    require_started(state, op.op_type)?;
    let live = state.live_stitch_count;
    if live == 0 {
        return Err(TransitionError::NothingToBindOff);
    }
    let count = positive_count(op, count_param(op, "count")?.unwrap_or(live))?;
    if count > live {
        return Err(TransitionError::Exceeds {
            op_type: op.op_type,
            what: "live",
            requested: count,
            available: live,
        });
    }
    state.live_stitch_count = live - count;
    Ok(())
}

fn hold(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    require_started(state, op.op_type)?;
    let label = str_param(op, "label")?.unwrap_or(DEFAULT_HOLD_LABEL);
    let count = count_param(op, "count")?.ok_or(TransitionError::MissingParameter {
        op_type: op.op_type,
        parameter: "count",
    })?;
    let count = positive_count(op, count)?;
    if count > state.live_stitch_count {
        return Err(TransitionError::Exceeds {
            op_type: op.op_type,
            what: "live",
            requested: count,
            available: state.live_stitch_count,
        });
    }
    add_held(state, op.op_type, label, count)?;
    state.live_stitch_count -= count;
    Ok(())
}

/// Split the live stitches into named groups. The active group stays live
/// and becomes the current needle; the rest go on hold under their labels.
fn separate(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    require_started(state, op.op_type)?;
    let groups = op
        .groups_param()
        .map_err(|message| TransitionError::InvalidParameter {
            op_type: op.op_type,
            message,
        })?
        .ok_or(TransitionError::MissingParameter {
            op_type: op.op_type,
            parameter: "groups",
        })?;
    if groups.is_empty() {
        return Err(TransitionError::InvalidParameter {
            op_type: op.op_type,
            message: "parameter `groups` must not be empty".to_string(),
        });
    }
    let active = str_param(op, "active_group")?.ok_or(TransitionError::MissingParameter {
        op_type: op.op_type,
        parameter: "active_group",
    })?;
    let total: u64 = groups.values().copied().map(u64::from).sum();
    if total != u64::from(state.live_stitch_count) {
        return Err(TransitionError::GroupMismatch {
            total,
            live: state.live_stitch_count,
        });
    }
    let Some(active_count) = groups.get(active).copied() else {
        return Err(TransitionError::UnknownActiveGroup {
            active: active.to_string(),
        });
    };
    for (label, count) in groups.iter().filter(|(label, _)| label.as_str() != active) {
        add_held(state, op.op_type, label, *count)?;
    }
    state.live_stitch_count = active_count;
    state.current_needle = active.to_string();
    Ok(())
}

/// Add stitches to the needle. A `source` naming a held group draws from
/// it; any other source is an edge reference and draws from nothing.
fn pickup(state: &mut VmState, op: &Operation) -> Result<(), TransitionError> {
    let count = count_param(op, "count")?.ok_or(TransitionError::MissingParameter {
        op_type: op.op_type,
        parameter: "count",
    })?;
    let count = positive_count(op, count)?;
    if let Some(source) = str_param(op, "source")? {
        if let Some(available) = state.held_stitches.get(source).copied() {
            if count > available {
                return Err(TransitionError::Exceeds {
                    op_type: op.op_type,
                    what: "held",
                    requested: count,
                    available,
                });
            }
            if count == available {
                state.held_stitches.remove(source);
            } else {
                state.held_stitches.insert(source.to_string(), available - count);
            }
        }
    }
    state.live_stitch_count = state
        .live_stitch_count
        .checked_add(count)
        .ok_or(TransitionError::Overflow {
            op_type: op.op_type,
        })?;
    state.started = true;
    Ok(())
}
