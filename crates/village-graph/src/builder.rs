//! Graph builder for constructing the lineage graph from character records.
//!
//! Building runs in three passes over the character list:
//! 1. Assign generations breadth-first from the roots
//! 2. Position each node from its generation and its index within it
//! 3. Resolve parent references into edges
//!
//! The builder holds only settings. `build` borrows the input, never
//! mutates it, and returns a fresh graph, so one builder can be shared
//! freely between callers.

use crate::edge::Edge;
use crate::graph::LineageGraph;
use crate::layout::layout_levels;
use crate::node::GraphNode;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};
use village_core::{Character, LayoutSettings, ZERO_ADDRESS};

/// Builds a [`LineageGraph`] from a flat character list.
#[derive(Debug, Clone)]
pub struct LineageBuilder {
    /// Identifier marking an empty parent slot.
    sentinel: String,
    layout: LayoutSettings,
}

impl Default for LineageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineageBuilder {
    /// Creates a builder using the zero address and default spacing.
    pub fn new() -> Self {
        Self {
            sentinel: ZERO_ADDRESS.to_string(),
            layout: LayoutSettings::default(),
        }
    }

    /// Uses a different empty-slot identifier.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Uses different spacing.
    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Builds the graph. Never fails: dangling parents are dropped, and
    /// characters unreachable from a root land in generation 0.
    pub fn build(&self, characters: &[Character]) -> LineageGraph {
        let characters = dedup_by_id(characters);
        let generations = assign_generations_of(&characters, &self.sentinel);
        let positions = layout_levels(&generations, &self.layout);

        let mut graph = LineageGraph::new();
        let indexes: Vec<_> = characters
            .iter()
            .zip(generations.iter().zip(positions))
            .map(|(character, (&generation, position))| {
                graph.add_node(GraphNode::new(character, generation, position))
            })
            .collect();

        for (character, &child) in characters.iter().zip(&indexes) {
            for (slot, parent_id) in character.parents.iter().enumerate() {
                if *parent_id == self.sentinel {
                    continue;
                }
                match graph.get_index(parent_id) {
                    Some(parent) => graph.add_edge(parent, child, Edge::parent(slot)),
                    None => trace!(
                        "Dropping dangling parent {} of {}",
                        parent_id,
                        character.id
                    ),
                }
            }
        }

        debug!(
            "Built lineage graph: {} nodes, {} edges, {} generations",
            graph.node_count(),
            graph.edge_count(),
            graph.max_generation().map_or(0, |g| g + 1)
        );

        graph
    }
}

/// Builds a graph with the zero address and default spacing.
pub fn build_lineage(characters: &[Character]) -> LineageGraph {
    LineageBuilder::new().build(characters)
}

/// Computes the generation of every character, index-aligned with the input.
///
/// Roots (all slots hold `sentinel`) start at 0. Each pass takes the
/// characters assigned in the previous pass and gives their unassigned
/// children the next generation, so the first assignment is the shortest
/// distance from any root. Whatever is never reached gets 0.
pub fn assign_generations(characters: &[Character], sentinel: &str) -> Vec<u32> {
    let refs: Vec<&Character> = characters.iter().collect();
    assign_generations_of(&refs, sentinel)
}

fn assign_generations_of(characters: &[&Character], sentinel: &str) -> Vec<u32> {
    let mut generations: Vec<Option<u32>> = vec![None; characters.len()];

    // parent id -> indexes of characters naming it, in input order
    let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, character) in characters.iter().enumerate() {
        for parent in character.valid_parents(sentinel) {
            children_of.entry(parent).or_default().push(index);
        }
    }

    let mut frontier: Vec<usize> = characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_root(sentinel))
        .map(|(index, _)| index)
        .collect();
    for &index in &frontier {
        generations[index] = Some(0);
    }

    let mut assigned = frontier.len();
    let mut generation = 0u32;

    while !frontier.is_empty() && assigned < characters.len() {
        let mut next = Vec::new();

        for &parent in &frontier {
            let Some(children) = children_of.get(characters[parent].id.as_str()) else {
                continue;
            };
            for &child in children {
                if child == parent || generations[child].is_some() {
                    continue;
                }
                generations[child] = Some(generation + 1);
                next.push(child);
            }
        }

        next.sort_unstable();
        trace!(
            "Generation {}: {} characters assigned",
            generation + 1,
            next.len()
        );

        assigned += next.len();
        frontier = next;
        generation += 1;
    }

    generations
        .into_iter()
        .enumerate()
        .map(|(index, generation)| {
            generation.unwrap_or_else(|| {
                debug!(
                    "{} is unreachable from any root, placing at generation 0",
                    characters[index].id
                );
                0
            })
        })
        .collect()
}

/// Keeps the first record for each id.
fn dedup_by_id(characters: &[Character]) -> Vec<&Character> {
    let mut seen = HashSet::new();
    characters
        .iter()
        .filter(|&character| {
            let fresh = seen.insert(character.id.as_str());
            if !fresh {
                warn!("Duplicate character {} ignored", character.id);
            }
            fresh
        })
        .collect()
}
