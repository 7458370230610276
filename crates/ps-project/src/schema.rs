//! Partition source schema definitions.

use ps_core::NodeId;
use serde::{Deserialize, Serialize};

/// One source file of a partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartitionSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<NodeId>,
    #[serde(default)]
    pub interior: Vec<BranchDef>,
    #[serde(default)]
    pub boundary: Vec<BranchDef>,
    #[serde(default)]
    pub injections: Vec<InjectionDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BranchDef {
    pub from: NodeId,
    pub to: NodeId,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InjectionDef {
    pub node: NodeId,
    pub value: f64,
}
