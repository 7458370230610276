//! Source validation and merging.

use std::collections::HashMap;

use ps_core::{CoreError, NodeId, ensure_finite};
use ps_network::{Branch, InjectionMap, NetworkError, Partition};

use crate::schema::{BranchDef, PartitionSource};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No partition sources given")]
    NoSources,

    #[error("Invalid value in {context}: {source}")]
    InvalidValue {
        context: String,
        #[source]
        source: CoreError,
    },
}

/// Reject non-finite branch and injection values.
pub fn validate_source(label: &str, source: &PartitionSource) -> Result<(), ValidationError> {
    let groups = [("interior", &source.interior), ("boundary", &source.boundary)];
    for (group, branches) in groups {
        for (i, b) in branches.iter().enumerate() {
            ensure_finite(b.value, "branch value").map_err(|source| {
                ValidationError::InvalidValue {
                    context: format!("{label} {group}[{i}]"),
                    source,
                }
            })?;
        }
    }
    for (i, inj) in source.injections.iter().enumerate() {
        ensure_finite(inj.value, "injection value").map_err(|source| {
            ValidationError::InvalidValue {
                context: format!("{label} injections[{i}]"),
                source,
            }
        })?;
    }
    Ok(())
}

/// Combine labelled sources into one partition.
///
/// Interior branches of every source come first, then boundary branches,
/// each group in source order.
pub fn merge_sources(sources: &[(String, PartitionSource)]) -> crate::ProjectResult<Partition> {
    if sources.is_empty() {
        return Err(ValidationError::NoSources.into());
    }

    let reference = resolve_reference(sources)?;

    let to_branches = |defs: &[BranchDef]| -> Vec<Branch> {
        defs.iter()
            .map(|d| Branch::new(d.from.get(), d.to.get(), d.value))
            .collect()
    };
    let interior = sources
        .iter()
        .flat_map(|(_, s)| to_branches(&s.interior))
        .collect();
    let boundary = sources
        .iter()
        .flat_map(|(_, s)| to_branches(&s.boundary))
        .collect();

    let mut seen: HashMap<NodeId, (f64, &str)> = HashMap::new();
    let mut injections = InjectionMap::new();
    for (label, source) in sources {
        for inj in &source.injections {
            match seen.get(&inj.node) {
                Some(&(value, _)) if value == inj.value => {}
                Some(&(value, first)) => {
                    return Err(NetworkError::InputInconsistency {
                        what: format!(
                            "node {} injected with {value} in {first} and {} in {label}",
                            inj.node, inj.value
                        ),
                    }
                    .into());
                }
                None => {
                    seen.insert(inj.node, (inj.value, label.as_str()));
                    injections.insert(inj.node, inj.value);
                }
            }
        }
    }

    Ok(Partition::from_groups(reference, interior, boundary, injections))
}

fn resolve_reference(sources: &[(String, PartitionSource)]) -> Result<NodeId, NetworkError> {
    let mut resolved: Option<(NodeId, &str)> = None;
    for (label, source) in sources {
        let Some(r) = source.reference else {
            continue;
        };
        match resolved {
            None => resolved = Some((r, label.as_str())),
            Some((first, _)) if first == r => {}
            Some((first, first_label)) => {
                return Err(NetworkError::InputInconsistency {
                    what: format!(
                        "reference node {first} in {first_label} disagrees with {r} in {label}"
                    ),
                });
            }
        }
    }
    resolved
        .map(|(r, _)| r)
        .ok_or_else(|| NetworkError::InputInconsistency {
            what: "no source declares a reference node".into(),
        })
}
