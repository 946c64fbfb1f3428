//! The validated, read-only topology registry.
//!
//! Construction parses all six tables, then runs one cross-reference pass
//! that collects every problem before failing. A registry value that exists
//! is complete: every edge type and join type has its entries, so the
//! per-type accessors are total.

use crate::condition::Condition;
use crate::error::TopologyError;
use crate::tables::{
    ARITHMETIC_FILE, COMPATIBILITY_FILE, DEFAULTS_FILE, EDGE_TYPES_FILE, JOIN_TYPES_FILE,
    RawArithmetic, RawCompatibility, RawDefaults, RawEdgeType, RawJoinType, RawWriterDispatch,
    TableSources, WRITER_DISPATCH_FILE, parse_table,
};
use crate::types::{
    ArithmeticEntry, ArithmeticImplication, CompatibilityEntry, CompatibilityKey,
    CompatibilityResult, DefaultsEntry, EdgeType, EdgeTypeEntry, JoinType, JoinTypeEntry,
    WriterDispatchEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const REGISTRY_DIGEST_PREFIX: &str = "topo1_";

/// One value per edge type; lookups are exhaustive matches.
#[derive(Debug, Clone, PartialEq)]
struct ByEdgeType<T> {
    cast_on: T,
    live_stitch: T,
    bound_off: T,
    selvedge: T,
    open: T,
}

impl<T> ByEdgeType<T> {
    fn from_map(mut map: BTreeMap<EdgeType, T>) -> Option<Self> {
        Some(Self {
            cast_on: map.remove(&EdgeType::CastOn)?,
            live_stitch: map.remove(&EdgeType::LiveStitch)?,
            bound_off: map.remove(&EdgeType::BoundOff)?,
            selvedge: map.remove(&EdgeType::Selvedge)?,
            open: map.remove(&EdgeType::Open)?,
        })
    }

    fn get(&self, edge_type: EdgeType) -> &T {
        match edge_type {
            EdgeType::CastOn => &self.cast_on,
            EdgeType::LiveStitch => &self.live_stitch,
            EdgeType::BoundOff => &self.bound_off,
            EdgeType::Selvedge => &self.selvedge,
            EdgeType::Open => &self.open,
        }
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        EdgeType::ALL.iter().map(|edge_type| self.get(*edge_type))
    }
}

/// One value per join type; lookups are exhaustive matches.
#[derive(Debug, Clone, PartialEq)]
struct ByJoinType<T> {
    continuation: T,
    held_stitch: T,
    cast_on_join: T,
    pickup: T,
    seam: T,
}

impl<T> ByJoinType<T> {
    fn from_map(mut map: BTreeMap<JoinType, T>) -> Option<Self> {
        Some(Self {
            continuation: map.remove(&JoinType::Continuation)?,
            held_stitch: map.remove(&JoinType::HeldStitch)?,
            cast_on_join: map.remove(&JoinType::CastOnJoin)?,
            pickup: map.remove(&JoinType::Pickup)?,
            seam: map.remove(&JoinType::Seam)?,
        })
    }

    fn get(&self, join_type: JoinType) -> &T {
        match join_type {
            JoinType::Continuation => &self.continuation,
            JoinType::HeldStitch => &self.held_stitch,
            JoinType::CastOnJoin => &self.cast_on_join,
            JoinType::Pickup => &self.pickup,
            JoinType::Seam => &self.seam,
        }
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        JoinType::ALL.iter().map(|join_type| self.get(*join_type))
    }
}

/// Counts and provenance of a loaded registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySummary {
    pub digest: String,
    pub versions: BTreeMap<String, u32>,
    pub edge_types: usize,
    pub join_types: usize,
    pub compatibility_entries: usize,
    pub conditional_entries: usize,
    pub default_entries: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyRegistry {
    versions: BTreeMap<String, u32>,
    edge_types: ByEdgeType<EdgeTypeEntry>,
    join_types: ByJoinType<JoinTypeEntry>,
    compatibility: BTreeMap<CompatibilityKey, CompatibilityEntry>,
    defaults: BTreeMap<CompatibilityKey, DefaultsEntry>,
    arithmetic: ByJoinType<ArithmeticEntry>,
    writer_dispatch: ByJoinType<WriterDispatchEntry>,
    digest: String,
}

impl TopologyRegistry {
    /// Load the tables compiled into the binary.
    pub fn builtin() -> Result<Self, TopologyError> {
        Self::from_sources(&TableSources::builtin())
    }

    /// Load every table from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, TopologyError> {
        Self::from_sources(&TableSources::from_dir(dir)?)
    }

    pub fn from_sources(sources: &TableSources) -> Result<Self, TopologyError> {
        let edge_rows = parse_table::<RawEdgeType>(&sources.edge_types)?;
        let join_rows = parse_table::<RawJoinType>(&sources.join_types)?;
        let compat_rows = parse_table::<RawCompatibility>(&sources.compatibility)?;
        let default_rows = parse_table::<RawDefaults>(&sources.defaults)?;
        let arith_rows = parse_table::<RawArithmetic>(&sources.arithmetic)?;
        let dispatch_rows = parse_table::<RawWriterDispatch>(&sources.writer_dispatch)?;

        let mut versions = BTreeMap::new();
        versions.insert(EDGE_TYPES_FILE.to_string(), edge_rows.version);
        versions.insert(JOIN_TYPES_FILE.to_string(), join_rows.version);
        versions.insert(COMPATIBILITY_FILE.to_string(), compat_rows.version);
        versions.insert(DEFAULTS_FILE.to_string(), default_rows.version);
        versions.insert(ARITHMETIC_FILE.to_string(), arith_rows.version);
        versions.insert(WRITER_DISPATCH_FILE.to_string(), dispatch_rows.version);

        let mut issues = Vec::new();
        let edge_types = build_edge_types(edge_rows.entries, &mut issues);
        let join_types = build_join_types(join_rows.entries, &mut issues);
        let compatibility = build_compatibility(compat_rows.entries, &edge_types, &mut issues);
        let defaults = build_defaults(default_rows.entries, &compatibility, &mut issues);
        let arithmetic = build_arithmetic(arith_rows.entries, &join_types, &mut issues);
        let writer_dispatch = build_writer_dispatch(dispatch_rows.entries, &join_types, &mut issues);

        if !issues.is_empty() {
            return Err(TopologyError::CrossReference { issues });
        }

        let (Some(edge_types), Some(join_types), Some(arithmetic), Some(writer_dispatch)) = (
            ByEdgeType::from_map(edge_types),
            ByJoinType::from_map(join_types),
            ByJoinType::from_map(arithmetic),
            ByJoinType::from_map(writer_dispatch),
        ) else {
            return Err(TopologyError::CrossReference {
                issues: vec!["per-type tables are incomplete".to_string()],
            });
        };

        let mut registry = Self {
            versions,
            edge_types,
            join_types,
            compatibility,
            defaults,
            arithmetic,
            writer_dispatch,
            digest: String::new(),
        };
        registry.digest = registry.compute_digest();
        tracing::debug!(
            digest = %registry.digest,
            compatibility_entries = registry.compatibility.len(),
            "topology registry loaded"
        );
        Ok(registry)
    }

    pub fn edge_type(&self, edge_type: EdgeType) -> &EdgeTypeEntry {
        self.edge_types.get(edge_type)
    }

    pub fn join_type(&self, join_type: JoinType) -> &JoinTypeEntry {
        self.join_types.get(join_type)
    }

    /// `VALID`, `CONDITIONAL` or `INVALID` for the ordered triple. Triples not
    /// in the table are `INVALID`.
    pub fn get_compatibility(
        &self,
        edge_type_a: EdgeType,
        edge_type_b: EdgeType,
        join_type: JoinType,
    ) -> CompatibilityResult {
        self.compatibility
            .get(&CompatibilityKey::new(edge_type_a, edge_type_b, join_type))
            .map_or(CompatibilityResult::Invalid, |entry| entry.result)
    }

    /// The condition of a `CONDITIONAL` entry; `None` for any other triple.
    pub fn get_condition(
        &self,
        edge_type_a: EdgeType,
        edge_type_b: EdgeType,
        join_type: JoinType,
    ) -> Option<Condition> {
        self.compatibility
            .get(&CompatibilityKey::new(edge_type_a, edge_type_b, join_type))
            .and_then(|entry| entry.condition)
    }

    /// A copy of the default join parameters for the triple. Required
    /// parameters without a default appear as `null`.
    pub fn get_defaults(
        &self,
        edge_type_a: EdgeType,
        edge_type_b: EdgeType,
        join_type: JoinType,
    ) -> BTreeMap<String, Value> {
        let Some(entry) = self
            .defaults
            .get(&CompatibilityKey::new(edge_type_a, edge_type_b, join_type))
        else {
            return BTreeMap::new();
        };
        let mut params = entry.defaults.clone();
        for name in &entry.required {
            params.entry(name.clone()).or_insert(Value::Null);
        }
        params
    }

    /// Parameters the join itself must supply for this triple.
    pub fn required_parameters(
        &self,
        edge_type_a: EdgeType,
        edge_type_b: EdgeType,
        join_type: JoinType,
    ) -> &[String] {
        self.defaults
            .get(&CompatibilityKey::new(edge_type_a, edge_type_b, join_type))
            .map_or(&[], |entry| entry.required.as_slice())
    }

    pub fn get_arithmetic(&self, join_type: JoinType) -> ArithmeticImplication {
        self.arithmetic.get(join_type).implication
    }

    pub fn get_writer_dispatch(&self, join_type: JoinType) -> WriterDispatchEntry {
        self.writer_dispatch.get(join_type).clone()
    }

    pub fn compatibility_entries(&self) -> impl Iterator<Item = &CompatibilityEntry> {
        self.compatibility.values()
    }

    pub fn versions(&self) -> &BTreeMap<String, u32> {
        &self.versions
    }

    /// `topo1_<sha256>` over the canonical table contents and versions.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            digest: self.digest.clone(),
            versions: self.versions.clone(),
            edge_types: EdgeType::ALL.len(),
            join_types: JoinType::ALL.len(),
            compatibility_entries: self.compatibility.len(),
            conditional_entries: self
                .compatibility
                .values()
                .filter(|entry| entry.result == CompatibilityResult::Conditional)
                .count(),
            default_entries: self.defaults.len(),
        }
    }

    fn compute_digest(&self) -> String {
        let canonical = serde_json::json!({
            "versions": self.versions,
            "edgeTypes": self.edge_types.values().collect::<Vec<_>>(),
            "joinTypes": self.join_types.values().collect::<Vec<_>>(),
            "compatibility": self.compatibility.values().collect::<Vec<_>>(),
            "defaults": self.defaults.values().collect::<Vec<_>>(),
            "arithmetic": self.arithmetic.values().collect::<Vec<_>>(),
            "writerDispatch": self.writer_dispatch.values().collect::<Vec<_>>(),
        });
        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string().as_bytes());
        format!("{REGISTRY_DIGEST_PREFIX}{:x}", hasher.finalize())
    }
}

fn parse_id<T>(raw: &str, location: &str, issues: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(message) => {
            issues.push(format!("{location}: {message}"));
            None
        }
    }
}

fn parse_key(
    edge_type_a: &str,
    edge_type_b: &str,
    join_type: &str,
    location: &str,
    issues: &mut Vec<String>,
) -> Option<CompatibilityKey> {
    let a = parse_id::<EdgeType>(edge_type_a, location, issues);
    let b = parse_id::<EdgeType>(edge_type_b, location, issues);
    let j = parse_id::<JoinType>(join_type, location, issues);
    Some(CompatibilityKey::new(a?, b?, j?))
}

fn build_edge_types(
    rows: Vec<RawEdgeType>,
    issues: &mut Vec<String>,
) -> BTreeMap<EdgeType, EdgeTypeEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("edge_types entries[{idx}]");
        let id = parse_id::<EdgeType>(&row.id, &location, issues);
        let phase = parse_id(&row.phase_constraint, &location, issues);
        let (Some(id), Some(phase_constraint)) = (id, phase) else {
            continue;
        };
        if out.contains_key(&id) {
            issues.push(format!("edge_types entry {id}: duplicate entry"));
            continue;
        }
        out.insert(
            id,
            EdgeTypeEntry {
                id,
                description: row.description.trim().to_string(),
                has_live_stitches: row.has_live_stitches,
                is_terminal: row.is_terminal,
                phase_constraint,
                notes: row.notes.trim().to_string(),
            },
        );
    }
    for edge_type in EdgeType::ALL {
        if !out.contains_key(edge_type) {
            issues.push(format!("edge type {edge_type}: no entry in edge_types"));
        }
    }
    out
}

fn build_join_types(
    rows: Vec<RawJoinType>,
    issues: &mut Vec<String>,
) -> BTreeMap<JoinType, JoinTypeEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("join_types entries[{idx}]");
        let Some(id) = parse_id::<JoinType>(&row.id, &location, issues) else {
            continue;
        };
        if out.contains_key(&id) {
            issues.push(format!("join_types entry {id}: duplicate entry"));
            continue;
        }
        let declared: BTreeSet<&str> = row.owns_parameters.iter().map(String::as_str).collect();
        let expected: BTreeSet<&str> = id.owned_parameters().iter().copied().collect();
        if declared != expected {
            issues.push(format!(
                "join_types entry {id}: owns_parameters {declared:?} do not match {expected:?}"
            ));
        }
        if row.symmetric != id.is_symmetric() {
            issues.push(format!(
                "join_types entry {id}: symmetric must be {}",
                id.is_symmetric()
            ));
        }
        out.insert(
            id,
            JoinTypeEntry {
                id,
                description: row.description.trim().to_string(),
                symmetric: row.symmetric,
                directional: row.directional,
                owns_parameters: row.owns_parameters,
                construction_methods: row.construction_methods,
                notes: row.notes.trim().to_string(),
            },
        );
    }
    for join_type in JoinType::ALL {
        if !out.contains_key(join_type) {
            issues.push(format!("join type {join_type}: no entry in join_types"));
        }
    }
    out
}

fn build_compatibility(
    rows: Vec<RawCompatibility>,
    edge_types: &BTreeMap<EdgeType, EdgeTypeEntry>,
    issues: &mut Vec<String>,
) -> BTreeMap<CompatibilityKey, CompatibilityEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("compatibility entries[{idx}]");
        let key = parse_key(
            &row.edge_type_a,
            &row.edge_type_b,
            &row.join_type,
            &location,
            issues,
        );
        let result = parse_id::<CompatibilityResult>(&row.result, &location, issues);
        let (Some(key), Some(result)) = (key, result) else {
            continue;
        };
        let prefix = format!("compatibility entry {key}");
        if out.contains_key(&key) {
            issues.push(format!("{prefix}: duplicate entry"));
            continue;
        }
        for (side, edge_type) in [("edge_type_a", key.edge_type_a), ("edge_type_b", key.edge_type_b)] {
            if edge_types.get(&edge_type).is_some_and(|entry| entry.is_terminal) {
                issues.push(format!(
                    "{prefix}: {side} {edge_type} is terminal and cannot appear in compatibility"
                ));
            }
        }
        let condition = match (&row.condition, result) {
            (Some(raw), CompatibilityResult::Conditional) => {
                parse_id::<Condition>(raw, &prefix, issues)
            }
            (None, CompatibilityResult::Conditional) => {
                issues.push(format!("{prefix}: result is CONDITIONAL but condition is not set"));
                None
            }
            (Some(_), _) => {
                issues.push(format!("{prefix}: condition is only allowed on CONDITIONAL entries"));
                None
            }
            (None, _) => None,
        };
        out.insert(
            key,
            CompatibilityEntry {
                key,
                result,
                condition,
            },
        );
    }
    out
}

fn build_defaults(
    rows: Vec<RawDefaults>,
    compatibility: &BTreeMap<CompatibilityKey, CompatibilityEntry>,
    issues: &mut Vec<String>,
) -> BTreeMap<CompatibilityKey, DefaultsEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("defaults entries[{idx}]");
        let Some(key) = parse_key(
            &row.edge_type_a,
            &row.edge_type_b,
            &row.join_type,
            &location,
            issues,
        ) else {
            continue;
        };
        let prefix = format!("defaults entry {key}");
        if out.contains_key(&key) {
            issues.push(format!("{prefix}: duplicate entry"));
            continue;
        }
        let usable = compatibility
            .get(&key)
            .is_some_and(|entry| entry.result != CompatibilityResult::Invalid);
        if !usable {
            issues.push(format!("{prefix}: key is not a VALID or CONDITIONAL compatibility entry"));
        }
        let owned = key.join_type.owned_parameters();
        for name in row.defaults.keys().chain(row.required.iter()) {
            if !owned.contains(&name.as_str()) {
                issues.push(format!(
                    "{prefix}: parameter `{name}` is not owned by {}",
                    key.join_type
                ));
            }
        }
        for name in &row.required {
            if row.defaults.contains_key(name) {
                issues.push(format!(
                    "{prefix}: parameter `{name}` is both required and defaulted"
                ));
            }
        }
        out.insert(
            key,
            DefaultsEntry {
                key,
                defaults: row.defaults,
                required: row.required,
            },
        );
    }
    out
}

fn build_arithmetic(
    rows: Vec<RawArithmetic>,
    join_types: &BTreeMap<JoinType, JoinTypeEntry>,
    issues: &mut Vec<String>,
) -> BTreeMap<JoinType, ArithmeticEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("arithmetic_implications entries[{idx}]");
        let join_type = parse_id::<JoinType>(&row.join_type, &location, issues);
        let implication = parse_id(&row.implication, &location, issues);
        let (Some(join_type), Some(implication)) = (join_type, implication) else {
            continue;
        };
        if out.contains_key(&join_type) {
            issues.push(format!(
                "arithmetic_implications entry {join_type}: duplicate entry"
            ));
            continue;
        }
        out.insert(
            join_type,
            ArithmeticEntry {
                join_type,
                implication,
                notes: row.notes.trim().to_string(),
            },
        );
    }
    for join_type in JoinType::ALL {
        if join_types.contains_key(join_type) && !out.contains_key(join_type) {
            issues.push(format!(
                "join type {join_type}: no entry in arithmetic_implications"
            ));
        }
    }
    out
}

fn build_writer_dispatch(
    rows: Vec<RawWriterDispatch>,
    join_types: &BTreeMap<JoinType, JoinTypeEntry>,
    issues: &mut Vec<String>,
) -> BTreeMap<JoinType, WriterDispatchEntry> {
    let mut out = BTreeMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let location = format!("writer_dispatch entries[{idx}]");
        let join_type = parse_id::<JoinType>(&row.join_type, &location, issues);
        let mode = parse_id(&row.rendering_mode, &location, issues);
        let (Some(join_type), Some(rendering_mode)) = (join_type, mode) else {
            continue;
        };
        if out.contains_key(&join_type) {
            issues.push(format!("writer_dispatch entry {join_type}: duplicate entry"));
            continue;
        }
        if row.template_key.trim().is_empty() {
            issues.push(format!(
                "writer_dispatch entry {join_type}: template_key must be non-empty"
            ));
        }
        out.insert(
            join_type,
            WriterDispatchEntry {
                join_type,
                rendering_mode,
                template_key: row.template_key,
                directionality_note: row.directionality_note,
                conditional_template_key: row.conditional_template_key,
                notes: row.notes.trim().to_string(),
            },
        );
    }
    for join_type in JoinType::ALL {
        if join_types.contains_key(join_type) && !out.contains_key(join_type) {
            issues.push(format!("join type {join_type}: no entry in writer_dispatch"));
        }
    }
    out
}
