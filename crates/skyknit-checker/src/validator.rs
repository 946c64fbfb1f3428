//! Phase-1 manifest validation: topology only, before any IR exists.
//!
//! Only errors fail the result. `CONDITIONAL` compatibilities and missing
//! required join parameters are warnings; the checker decides them later
//! with real counts.

use serde::{Deserialize, Serialize};
use skyknit_schemas::ShapeManifest;
use skyknit_topology::{CompatibilityResult, EdgeRef, TopologyRegistry};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by(|a, b| {
            (&a.path, a.severity, &a.message).cmp(&(&b.path, b.severity, &b.message))
        });
        Self {
            passed: !issues
                .iter()
                .any(|issue| issue.severity == Severity::Error),
            issues,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }
}

fn push_issue(issues: &mut Vec<ValidationIssue>, severity: Severity, path: String, message: String) {
    issues.push(ValidationIssue {
        severity,
        path,
        message,
    });
}

pub fn validate_manifest(manifest: &ShapeManifest, registry: &TopologyRegistry) -> ValidationResult {
    let mut issues = Vec::new();

    let mut component_names = BTreeSet::new();
    for spec in &manifest.components {
        let path = format!("components[{}]", spec.name);
        if !component_names.insert(spec.name.as_str()) {
            push_issue(
                &mut issues,
                Severity::Error,
                path.clone(),
                format!("duplicate component name `{}`", spec.name),
            );
        }
        if let Err(err) = spec.validate() {
            push_issue(&mut issues, Severity::Error, path.clone(), err.to_string());
        }
        for edge in &spec.edges {
            let Some(join_ref) = edge.join_ref.as_deref() else {
                continue;
            };
            let edge_path = format!("{path}.edges[{}]", edge.name);
            let qualified = format!("{}.{}", spec.name, edge.name);
            match manifest.join(join_ref) {
                None => push_issue(
                    &mut issues,
                    Severity::Error,
                    edge_path,
                    format!("join_ref `{join_ref}` names no join"),
                ),
                Some(join) if join.edge_a_ref() != qualified && join.edge_b_ref() != qualified => {
                    push_issue(
                        &mut issues,
                        Severity::Error,
                        edge_path,
                        format!("join `{join_ref}` does not connect this edge"),
                    )
                }
                Some(_) => {}
            }
        }
    }

    let mut join_ids = BTreeSet::new();
    for join in &manifest.joins {
        let path = format!("joins[{}]", join.id());
        if !join_ids.insert(join.id()) {
            push_issue(
                &mut issues,
                Severity::Error,
                path.clone(),
                format!("duplicate join id `{}`", join.id()),
            );
        }

        let mut resolved = Vec::with_capacity(2);
        for raw in [join.edge_a_ref(), join.edge_b_ref()] {
            if EdgeRef::parse(raw).is_none() {
                push_issue(
                    &mut issues,
                    Severity::Error,
                    path.clone(),
                    format!("edge reference `{raw}` is not of the form component.edge"),
                );
                continue;
            }
            match manifest.resolve_edge(raw) {
                Some((_, edge)) => {
                    if edge.join_ref.as_deref() != Some(join.id()) {
                        push_issue(
                            &mut issues,
                            Severity::Warning,
                            path.clone(),
                            format!("edge `{raw}` does not name this join in its join_ref"),
                        );
                    }
                    resolved.push(edge.edge_type);
                }
                None => push_issue(
                    &mut issues,
                    Severity::Error,
                    path.clone(),
                    format!("edge reference `{raw}` does not resolve"),
                ),
            }
        }

        if join.edge_a_ref() == join.edge_b_ref() {
            push_issue(
                &mut issues,
                Severity::Error,
                path.clone(),
                format!("join connects `{}` to itself", join.edge_a_ref()),
            );
        }

        let &[edge_type_a, edge_type_b] = resolved.as_slice() else {
            continue;
        };
        if registry.edge_type(edge_type_a).is_terminal {
            push_issue(
                &mut issues,
                Severity::Error,
                path.clone(),
                format!("terminal edge type {edge_type_a} cannot be a join source"),
            );
        }
        let join_type = join.join_type();
        match registry.get_compatibility(edge_type_a, edge_type_b, join_type) {
            CompatibilityResult::Valid => {}
            CompatibilityResult::Invalid => push_issue(
                &mut issues,
                Severity::Error,
                path.clone(),
                format!("({edge_type_a}, {edge_type_b}, {join_type}) is not a valid combination"),
            ),
            CompatibilityResult::Conditional => {
                let condition = registry
                    .get_condition(edge_type_a, edge_type_b, join_type)
                    .map_or("unspecified", |condition| condition.as_str());
                push_issue(
                    &mut issues,
                    Severity::Warning,
                    path.clone(),
                    format!(
                        "({edge_type_a}, {edge_type_b}, {join_type}) is conditional on \
                         `{condition}`; checked once edge counts are known"
                    ),
                );
            }
        }
        for required in registry.required_parameters(edge_type_a, edge_type_b, join_type) {
            if join.parameter(required).is_none_or(serde_json::Value::is_null) {
                push_issue(
                    &mut issues,
                    Severity::Warning,
                    path.clone(),
                    format!("required parameter `{required}` is not set yet"),
                );
            }
        }
    }

    let result = ValidationResult::from_issues(issues);
    debug!(
        components = manifest.components.len(),
        joins = manifest.joins.len(),
        errors = result.errors().count(),
        warnings = result.warnings().count(),
        "validated manifest"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyknit_schemas::{ComponentSpec, ShapeType};
    use skyknit_topology::{Edge, EdgeType, Join, JoinType};
    use std::collections::BTreeMap;

    fn component(name: &str, edges: Vec<Edge>) -> ComponentSpec {
        ComponentSpec::new(name, ShapeType::Cylinder, BTreeMap::new(), edges).unwrap()
    }

    fn sweater() -> ShapeManifest {
        ShapeManifest {
            components: vec![
                component(
                    "yoke",
                    vec![
                        Edge::new("neck", EdgeType::CastOn),
                        Edge::new("body", EdgeType::LiveStitch).with_join("j_body"),
                    ],
                ),
                component(
                    "body",
                    vec![
                        Edge::new("top", EdgeType::LiveStitch).with_join("j_body"),
                        Edge::new("hem", EdgeType::BoundOff),
                    ],
                ),
            ],
            joins: vec![Join::new(
                "j_body",
                JoinType::Continuation,
                "yoke.body",
                "body.top",
                BTreeMap::new(),
            )],
        }
    }

    fn registry() -> TopologyRegistry {
        TopologyRegistry::builtin().unwrap()
    }

    #[test]
    fn consistent_manifest_passes_cleanly() {
        let result = validate_manifest(&sweater(), &registry());
        assert!(result.passed, "{:?}", result.issues);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn dangling_join_ref_and_unresolved_edge() {
        let mut manifest = sweater();
        manifest.components[1].edges[1].join_ref = Some("j_missing".to_string());
        manifest.joins.push(Join::new(
            "j_ghost",
            JoinType::Seam,
            "body.hem",
            "sleeve.cuff",
            BTreeMap::new(),
        ));
        let result = validate_manifest(&manifest, &registry());
        assert!(!result.passed);
        let messages: Vec<_> = result.errors().map(|issue| issue.message.as_str()).collect();
        assert!(messages.contains(&"join_ref `j_missing` names no join"));
        assert!(messages.contains(&"edge reference `sleeve.cuff` does not resolve"));
    }

    #[test]
    fn invalid_triples_and_self_joins_are_errors() {
        let mut manifest = sweater();
        manifest.joins[0] = Join::new(
            "j_body",
            JoinType::CastOnJoin,
            "yoke.body",
            "body.top",
            BTreeMap::new(),
        );
        manifest.joins.push(Join::new(
            "j_self",
            JoinType::Seam,
            "body.hem",
            "body.hem",
            BTreeMap::new(),
        ));
        let result = validate_manifest(&manifest, &registry());
        let paths: Vec<_> = result
            .errors()
            .map(|issue| (issue.path.as_str(), issue.message.as_str()))
            .collect();
        assert!(paths.contains(&(
            "joins[j_body]",
            "(LIVE_STITCH, LIVE_STITCH, CAST_ON_JOIN) is not a valid combination"
        )));
        assert!(paths.contains(&("joins[j_self]", "join connects `body.hem` to itself")));
    }

    #[test]
    fn terminal_source_is_rejected() {
        let manifest = ShapeManifest {
            components: vec![
                component("a", vec![Edge::new("open", EdgeType::Open).with_join("j")]),
                component("b", vec![Edge::new("top", EdgeType::LiveStitch).with_join("j")]),
            ],
            joins: vec![Join::new("j", JoinType::Continuation, "a.open", "b.top", BTreeMap::new())],
        };
        let result = validate_manifest(&manifest, &registry());
        assert!(
            result
                .errors()
                .any(|issue| issue.message == "terminal edge type OPEN cannot be a join source")
        );
    }

    #[test]
    fn conditional_and_missing_required_are_warnings() {
        let manifest = ShapeManifest {
            components: vec![
                component("front", vec![Edge::new("shoulder", EdgeType::LiveStitch).with_join("j_sh")]),
                component(
                    "back",
                    vec![
                        Edge::new("shoulder", EdgeType::LiveStitch).with_join("j_sh"),
                        Edge::new("underarm", EdgeType::LiveStitch).with_join("j_gusset"),
                    ],
                ),
                component("sleeve", vec![Edge::new("cast_on", EdgeType::CastOn).with_join("j_gusset")]),
            ],
            joins: vec![
                Join::new("j_sh", JoinType::Seam, "front.shoulder", "back.shoulder", BTreeMap::new()),
                Join::new(
                    "j_gusset",
                    JoinType::CastOnJoin,
                    "back.underarm",
                    "sleeve.cast_on",
                    BTreeMap::new(),
                ),
            ],
        };
        let result = validate_manifest(&manifest, &registry());
        assert!(result.passed, "{:?}", result.issues);
        let warnings: Vec<_> = result.warnings().map(|issue| issue.path.as_str()).collect();
        assert_eq!(warnings, vec!["joins[j_gusset]", "joins[j_sh]"]);
        assert!(result.issues[1].message.contains("`equal_live_counts`"));
    }

    #[test]
    fn duplicate_components_are_reported() {
        let mut manifest = sweater();
        manifest.components.push(component("body", vec![]));
        let result = validate_manifest(&manifest, &registry());
        assert!(
            result
                .errors()
                .any(|issue| issue.message == "duplicate component name `body`")
        );
    }
}
