//! Ancestry queries over a built lineage graph.
//!
//! Breadth-first walks along parent edges answer "who does this character
//! descend from?" and "who descends from this character?". Walks keep a
//! visited set, so cyclic lineages terminate.

use crate::graph::{LineageGraph, NodeId};
use crate::node::NodeInfo;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Which way to walk from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageDirection {
    /// Parents, grandparents, ...
    Ancestors,
    /// Children, grandchildren, ...
    Descendants,
}

impl LineageDirection {
    fn edge_direction(self) -> Direction {
        match self {
            LineageDirection::Ancestors => Direction::Incoming,
            LineageDirection::Descendants => Direction::Outgoing,
        }
    }
}

impl std::fmt::Display for LineageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineageDirection::Ancestors => write!(f, "ancestors"),
            LineageDirection::Descendants => write!(f, "descendants"),
        }
    }
}

/// A character related to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relative {
    pub node: NodeInfo,
    /// Number of parent edges between target and this character.
    pub distance: usize,
}

/// Both directions of lineage around one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageReport {
    pub target: NodeInfo,
    pub ancestors: Vec<Relative>,
    pub descendants: Vec<Relative>,
    /// Maximum distance searched; 0 means unlimited.
    pub max_depth: usize,
}

impl LineageReport {
    /// Returns a summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let parents = self.ancestors.iter().filter(|r| r.distance == 1).count();
        let children = self.descendants.iter().filter(|r| r.distance == 1).count();
        format!(
            "{}: {} ancestors ({} parents), {} descendants ({} children)",
            self.target.name,
            self.ancestors.len(),
            parents,
            self.descendants.len(),
            children
        )
    }
}

impl LineageGraph {
    /// Ancestors of a character, nearest first.
    ///
    /// `max_depth` of 0 walks the whole lineage.
    pub fn ancestors(&self, id: &str, max_depth: usize) -> Vec<Relative> {
        self.relatives(id, LineageDirection::Ancestors, max_depth)
    }

    /// Descendants of a character, nearest first.
    pub fn descendants(&self, id: &str, max_depth: usize) -> Vec<Relative> {
        self.relatives(id, LineageDirection::Descendants, max_depth)
    }

    /// Ancestors and descendants of a character, or `None` if unknown.
    pub fn lineage(&self, id: &str, max_depth: usize) -> Option<LineageReport> {
        let index = self.get_index(id)?;
        let target = self.info(index)?;
        Some(LineageReport {
            target,
            ancestors: self.walk(index, LineageDirection::Ancestors, max_depth),
            descendants: self.walk(index, LineageDirection::Descendants, max_depth),
            max_depth,
        })
    }

    /// Relatives in one direction. Unknown ids yield an empty list.
    pub fn relatives(&self, id: &str, direction: LineageDirection, max_depth: usize) -> Vec<Relative> {
        match self.get_index(id) {
            Some(index) => self.walk(index, direction, max_depth),
            None => Vec::new(),
        }
    }

    fn walk(&self, start: NodeId, direction: LineageDirection, max_depth: usize) -> Vec<Relative> {
        let max_depth = if max_depth == 0 {
            usize::MAX
        } else {
            max_depth
        };

        let mut result = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for neighbor in self
                .graph
                .neighbors_directed(current, direction.edge_direction())
            {
                if !visited.insert(neighbor) {
                    continue;
                }
                if let Some(node) = self.info(neighbor) {
                    result.push(Relative {
                        node,
                        distance: depth + 1,
                    });
                }
                queue.push_back((neighbor, depth + 1));
            }
        }

        // Stable ordering: distance → id
        result.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| a.node.id.cmp(&b.node.id))
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::build_lineage;
    use village_core::{Character, ZERO_ADDRESS};

    fn character(id: &str, parents: [&str; 2]) -> Character {
        Character::new(id, id).with_parents(parents)
    }

    fn family() -> Vec<Character> {
        //  A   B
        //   \ /
        //    C   D
        //     \ /
        //      E
        //      |
        //      F
        vec![
            character("A", [ZERO_ADDRESS, ZERO_ADDRESS]),
            character("B", [ZERO_ADDRESS, ZERO_ADDRESS]),
            character("C", ["A", "B"]),
            character("D", [ZERO_ADDRESS, ZERO_ADDRESS]),
            character("E", ["C", "D"]),
            character("F", ["E", ZERO_ADDRESS]),
        ]
    }

    fn ids(relatives: &[super::Relative]) -> Vec<(&str, usize)> {
        relatives
            .iter()
            .map(|r| (r.node.id.as_str(), r.distance))
            .collect()
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let graph = build_lineage(&family());
        let ancestors = graph.ancestors("E", 0);
        assert_eq!(
            ids(&ancestors),
            vec![("C", 1), ("D", 1), ("A", 2), ("B", 2)]
        );
    }

    #[test]
    fn test_descendants_with_depth_limit() {
        let graph = build_lineage(&family());
        assert_eq!(ids(&graph.descendants("A", 2)), vec![("C", 1), ("E", 2)]);
        assert_eq!(
            ids(&graph.descendants("A", 0)),
            vec![("C", 1), ("E", 2), ("F", 3)]
        );
    }

    #[test]
    fn test_unknown_id() {
        let graph = build_lineage(&family());
        assert!(graph.ancestors("nobody", 0).is_empty());
        assert!(graph.lineage("nobody", 0).is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = build_lineage(&[
            character("P", ["Q", ZERO_ADDRESS]),
            character("Q", ["R", ZERO_ADDRESS]),
            character("R", ["P", ZERO_ADDRESS]),
        ]);

        assert_eq!(ids(&graph.ancestors("P", 0)), vec![("Q", 1), ("R", 2)]);
        assert_eq!(ids(&graph.descendants("P", 0)), vec![("R", 1), ("Q", 2)]);
    }

    #[test]
    fn test_report_summary() {
        let graph = build_lineage(&family());
        let report = graph.lineage("E", 0).unwrap();
        // D is a root, so E is reached in the first pass.
        assert_eq!(report.target.generation, 1);
        assert_eq!(
            report.summary(),
            "E: 4 ancestors (2 parents), 1 descendants (1 children)"
        );
    }
}
