use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use agentweave_core::types::{Edge, Node, START_LABEL};

/// Flatten a user-drawn graph into a single total execution order.
///
/// This is deliberately NOT a topological sort. The node labeled START is
/// moved to the front, then a single left-to-right scan relocates each
/// node's unvisited targets to sit immediately after it, in edge-insertion
/// order. Fan-out is serialized into a consecutive splice and cycles are
/// broken by the visited check; reordering ambiguous graphs any other way
/// would change which order users observe, so the scan must stay as-is.
///
/// Nodes unreachable from the head keep their original relative order after
/// the reachable prefix. The output is always a permutation of the input.
pub fn linearize(nodes: &[Node], edges: &[Edge]) -> Vec<Node> {
    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        "Linearizing workflow graph"
    );

    let mut sorted: Vec<Node> = nodes.to_vec();
    if sorted.is_empty() {
        warn!("No nodes to linearize");
        return sorted;
    }

    // Move START to the front. A missing START doesn't abort ordering;
    // the structure validator rejects the run later.
    match sorted.iter().position(|n| n.label == START_LABEL) {
        Some(idx) => {
            let start = sorted.remove(idx);
            sorted.insert(0, start);
        }
        None => warn!("No START node found, ordering may be unreliable"),
    }

    // source id -> target ids, first-seen order, duplicates allowed
    let mut edge_map: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        edge_map
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(sorted[0].id.clone());

    // Single left-to-right pass: relocate each unvisited target to sit
    // right behind the current node. A target spliced far ahead of the
    // cursor is revisited once the cursor reaches it.
    let mut i = 0;
    while i < sorted.len() {
        let current_id = sorted[i].id.clone();
        let targets: Vec<String> = edge_map
            .get(current_id.as_str())
            .map(|t| t.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        let mut insert_at = i + 1;
        for target_id in targets {
            if visited.contains(&target_id) {
                continue;
            }
            let Some(j) = sorted.iter().position(|n| n.id == target_id) else {
                continue;
            };

            let node = sorted.remove(j);
            if j < insert_at {
                insert_at -= 1;
            }
            let pos = insert_at.min(sorted.len());
            sorted.insert(pos, node);
            visited.insert(target_id);
            insert_at += 1;
        }

        i += 1;
    }

    let sequence = sorted
        .iter()
        .map(|n| n.label.as_str())
        .collect::<Vec<_>>()
        .join(" -> ");
    info!(%sequence, "Node ordering complete");

    sorted
}
