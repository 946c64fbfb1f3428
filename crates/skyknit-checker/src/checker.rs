//! Whole-garment check: simulate every component, then validate every join.
//!
//! Components are simulated in parallel; nothing is shared between them.
//! Join validation waits for all of them, then runs in manifest order, so
//! the error list is deterministic.

use crate::error::CheckerError;
use crate::joins::validate_join;
use crate::simulate::{SimulationResult, edge_counts_from, simulate_component};
use serde::{Deserialize, Serialize};
use skyknit_schemas::{ComponentIR, ConstraintObject, ShapeManifest};
use skyknit_topology::{
    CompatibilityResult, EdgeRef, Join, TopologyRegistry, resolve_join_parameters,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerResult {
    pub passed: bool,
    pub errors: Vec<CheckerError>,
}

impl CheckerResult {
    fn from_errors(errors: Vec<CheckerError>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
        }
    }
}

/// Everything one check consumes, in the JSON shape exchanged with the
/// instruction generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBundle {
    pub manifest: ShapeManifest,
    /// Keyed by component name.
    pub irs: BTreeMap<String, ComponentIR>,
    /// Keyed by component name.
    pub constraints: BTreeMap<String, ConstraintObject>,
}

impl CheckBundle {
    pub fn check(&self, registry: &TopologyRegistry) -> CheckerResult {
        check_all(registry, &self.manifest, &self.irs, &self.constraints)
    }
}

fn component_of(edge_ref: &str) -> &str {
    EdgeRef::parse(edge_ref).map_or(edge_ref, |parsed| parsed.component)
}

pub fn check_all(
    registry: &TopologyRegistry,
    manifest: &ShapeManifest,
    irs: &BTreeMap<String, ComponentIR>,
    constraints: &BTreeMap<String, ConstraintObject>,
) -> CheckerResult {
    let mut errors = Vec::new();

    for name in irs.keys() {
        if manifest.component(name).is_none() {
            warn!(component = %name, "IR has no component in the manifest; ignored");
        }
    }

    let simulations: Vec<Option<SimulationResult>> = std::thread::scope(|scope| {
        let handles: Vec<_> = manifest
            .components
            .iter()
            .map(|spec| {
                irs.get(&spec.name)
                    .map(|ir| scope.spawn(move || simulate_component(ir)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
            })
            .collect()
    });

    let mut edge_counts = BTreeMap::new();
    for (spec, simulation) in manifest.components.iter().zip(simulations) {
        let (Some(ir), Some(simulation)) = (irs.get(&spec.name), simulation) else {
            errors.push(CheckerError::filler(
                &spec.name,
                None,
                "no instruction sequence for component",
            ));
            continue;
        };
        for (edge, count) in edge_counts_from(&simulation, ir, spec, &manifest.joins) {
            edge_counts.insert(format!("{}.{edge}", spec.name), count);
        }
        errors.extend(simulation.errors);
    }

    for join in &manifest.joins {
        for error in check_join(registry, manifest, constraints, &edge_counts, join) {
            warn!(join = join.id(), error = %error.message, "join error");
            errors.push(error);
        }
    }
    debug!(
        components = manifest.components.len(),
        joins = manifest.joins.len(),
        errors = errors.len(),
        "checked garment"
    );
    CheckerResult::from_errors(errors)
}

fn check_join(
    registry: &TopologyRegistry,
    manifest: &ShapeManifest,
    constraints: &BTreeMap<String, ConstraintObject>,
    edge_counts: &BTreeMap<String, u32>,
    join: &Join,
) -> Vec<CheckerError> {
    let upstream = component_of(join.edge_a_ref());
    let downstream = component_of(join.edge_b_ref());

    let (Some((_, edge_a)), Some((_, edge_b))) = (
        manifest.resolve_edge(join.edge_a_ref()),
        manifest.resolve_edge(join.edge_b_ref()),
    ) else {
        return vec![CheckerError::geometric(
            upstream,
            None,
            format!(
                "join {}: edge references {} and {} do not both resolve",
                join.id(),
                join.edge_a_ref(),
                join.edge_b_ref()
            ),
        )];
    };
    let (edge_type_a, edge_type_b, join_type) = (edge_a.edge_type, edge_b.edge_type, join.join_type());

    match registry.get_compatibility(edge_type_a, edge_type_b, join_type) {
        CompatibilityResult::Invalid => {
            return vec![CheckerError::geometric(
                upstream,
                None,
                format!(
                    "join {}: ({edge_type_a}, {edge_type_b}, {join_type}) is not a valid combination",
                    join.id()
                ),
            )];
        }
        CompatibilityResult::Valid | CompatibilityResult::Conditional => {}
    }

    // Tolerance and gauge come from the upstream component, or the
    // downstream one when the upstream has no constraints.
    let Some(constraint) = constraints
        .get(upstream)
        .or_else(|| constraints.get(downstream))
    else {
        return vec![CheckerError::geometric(
            upstream,
            None,
            format!(
                "join {}: neither {upstream} nor {downstream} has constraints",
                join.id()
            ),
        )];
    };

    // PICKUP from a SELVEDGE edge is not exempt: its measured pickup count is
    // held to rows × pickup_ratio like every other RATIO join, and a miss is
    // reported as geometric.
    let resolved = Join::new(
        join.id(),
        join_type,
        join.edge_a_ref(),
        join.edge_b_ref(),
        resolve_join_parameters(registry, edge_type_a, edge_type_b, join),
    );
    let mut errors: Vec<CheckerError> = validate_join(
        registry,
        &resolved,
        edge_counts,
        constraint.physical_tolerance_mm,
        &constraint.gauge,
    )
    .into_iter()
    .collect();

    if let Some(condition) = registry.get_condition(edge_type_a, edge_type_b, join_type) {
        let counts = (
            edge_counts.get(join.edge_a_ref()),
            edge_counts.get(join.edge_b_ref()),
        );
        if let (Some(&count_a), Some(&count_b)) = counts {
            if !condition.holds(count_a, count_b) {
                errors.push(CheckerError::geometric(
                    upstream,
                    None,
                    format!(
                        "join {}: condition `{condition}` fails with {count_a} and {count_b}: {}",
                        join.id(),
                        condition.describe()
                    ),
                ));
            }
        }
    }
    errors
}
