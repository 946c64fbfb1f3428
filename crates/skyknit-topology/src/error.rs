//! Structural errors raised while loading the lookup tables.

/// The registry could not be built. Never recovered from silently: a
/// registry either loads completely valid or not at all.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("failed to read topology table: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml in topology table {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("topology table {path} has version {found}; supported version is {supported}")]
    UnsupportedVersion {
        path: String,
        found: u32,
        supported: u32,
    },

    /// Every cross-reference problem found in one pass, each naming its key.
    #[error("topology registry cross-reference validation failed:\n{}", render_issues(.issues))]
    CrossReference { issues: Vec<String> },
}

impl TopologyError {
    /// Problems listed by a cross-reference failure; empty for other kinds.
    pub fn issues(&self) -> &[String] {
        match self {
            Self::CrossReference { issues } => issues,
            _ => &[],
        }
    }
}

fn render_issues(issues: &[String]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
