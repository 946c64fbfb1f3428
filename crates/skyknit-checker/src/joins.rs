//! Cross-component join arithmetic.
//!
//! The registry decides which rule applies to a join type; this module only
//! evaluates the rule. Band checks compare millimetres, never raw stitch
//! differences, so one tolerance serves every gauge.

use crate::error::CheckerError;
use serde_json::Value;
use skyknit_kernel::{Gauge, gauge_base_mm};
use skyknit_topology::{ArithmeticImplication, EdgeRef, Join, TopologyRegistry, read_join_parameters};
use std::collections::BTreeMap;
use tracing::debug;

/// Slack for floating-point comparisons against a tolerance band.
const BAND_EPSILON: f64 = 1e-9;

fn component_of(edge_ref: &str) -> &str {
    EdgeRef::parse(edge_ref).map_or(edge_ref, |parsed| parsed.component)
}

/// Validate one join against the extracted edge counts.
///
/// `edge_counts` is keyed by `component.edge`. Parameters are read from the
/// join itself; callers that want registry defaults pass a join whose
/// parameters were resolved with `resolve_join_parameters`.
pub fn validate_join(
    registry: &TopologyRegistry,
    join: &Join,
    edge_counts: &BTreeMap<String, u32>,
    tolerance_mm: f64,
    gauge: &Gauge,
) -> Option<CheckerError> {
    let upstream = component_of(join.edge_a_ref());
    let downstream = component_of(join.edge_b_ref());
    let Some(count_a) = edge_counts.get(join.edge_a_ref()).copied() else {
        return Some(missing_count(join, join.edge_a_ref()));
    };
    let Some(count_b) = edge_counts.get(join.edge_b_ref()).copied() else {
        return Some(missing_count(join, join.edge_b_ref()));
    };

    let implication = registry.get_arithmetic(join.join_type());
    debug!(
        join = join.id(),
        implication = %implication,
        count_a,
        count_b,
        "validating join"
    );
    let parameters = read_join_parameters(join);
    let stitch_mm = gauge_base_mm(gauge);

    match implication {
        ArithmeticImplication::OneToOne | ArithmeticImplication::Structural => {
            // Each edge may sit anywhere inside its own ±tolerance band, so
            // two edges may differ by up to twice the tolerance.
            let diff_mm = f64::from(count_a.abs_diff(count_b)) * stitch_mm;
            let allowed_mm = 2.0 * tolerance_mm;
            (diff_mm > allowed_mm + BAND_EPSILON).then(|| {
                CheckerError::geometric(
                    upstream,
                    None,
                    format!(
                        "join {} ({}): {} has {count_a} stitches and {} has {count_b}, \
                         {diff_mm:.2} mm apart, beyond the {allowed_mm:.2} mm band",
                        join.id(),
                        implication,
                        join.edge_a_ref(),
                        join.edge_b_ref()
                    ),
                )
            })
        }
        ArithmeticImplication::Ratio => {
            let ratio = match positive_number(&parameters, "pickup_ratio") {
                Ok(ratio) => ratio,
                Err(message) => {
                    return Some(CheckerError::filler(
                        downstream,
                        None,
                        format!("join {}: {message}", join.id()),
                    ));
                }
            };
            let expected = f64::from(count_a) * ratio;
            let diff_mm = (f64::from(count_b) - expected).abs() * stitch_mm;
            (diff_mm > tolerance_mm + BAND_EPSILON).then(|| {
                CheckerError::geometric(
                    downstream,
                    None,
                    format!(
                        "join {} (RATIO): {} has {count_b} stitches, expected about \
                         {expected:.1} from {count_a} × {ratio}, {diff_mm:.2} mm off, \
                         beyond the {tolerance_mm:.2} mm band",
                        join.id(),
                        join.edge_b_ref()
                    ),
                )
            })
        }
        ArithmeticImplication::Additive => {
            let added = match whole_number(&parameters, "cast_on_count") {
                Ok(added) => added,
                Err(message) => {
                    return Some(CheckerError::filler(
                        downstream,
                        None,
                        format!("join {}: {message}", join.id()),
                    ));
                }
            };
            let expected = u64::from(count_a) + added;
            (u64::from(count_b) != expected).then(|| {
                CheckerError::filler(
                    downstream,
                    None,
                    format!(
                        "join {} (ADDITIVE): {} has {count_b} stitches, expected \
                         {count_a} + {added} = {expected}",
                        join.id(),
                        join.edge_b_ref()
                    ),
                )
            })
        }
    }
}

fn missing_count(join: &Join, edge_ref: &str) -> CheckerError {
    CheckerError::geometric(
        component_of(edge_ref),
        None,
        format!("join {}: no stitch count for edge {edge_ref}", join.id()),
    )
}

fn present<'a>(parameters: &'a BTreeMap<String, Value>, name: &str) -> Result<&'a Value, String> {
    match parameters.get(name) {
        None | Some(Value::Null) => Err(format!("parameter `{name}` is not set")),
        Some(value) => Ok(value),
    }
}

fn positive_number(parameters: &BTreeMap<String, Value>, name: &str) -> Result<f64, String> {
    let value = present(parameters, name)?;
    value
        .as_f64()
        .filter(|number| number.is_finite() && *number > 0.0)
        .ok_or_else(|| format!("parameter `{name}` must be a positive number, got {value}"))
}

fn whole_number(parameters: &BTreeMap<String, Value>, name: &str) -> Result<u64, String> {
    let value = present(parameters, name)?;
    value
        .as_u64()
        .ok_or_else(|| format!("parameter `{name}` must be a non-negative integer, got {value}"))
}
