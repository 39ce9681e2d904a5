//! Deterministic positioning of lineage nodes.
//!
//! Generations stack vertically; characters of the same generation line up
//! horizontally in input order. The resulting coordinates seed a
//! force-directed renderer, which is free to move nodes afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use village_core::LayoutSettings;

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Position of the `index_in_level`-th node of `generation`.
pub fn position_for(layout: &LayoutSettings, generation: u32, index_in_level: usize) -> Position {
    Position {
        x: index_in_level as f64 * layout.horizontal_spacing + layout.horizontal_offset,
        y: f64::from(generation) * layout.vertical_spacing + layout.vertical_offset,
    }
}

/// Positions every node given its generation.
///
/// `generations[i]` is the generation of the i-th node in input order. The
/// returned positions are index-aligned with it.
pub fn layout_levels(generations: &[u32], layout: &LayoutSettings) -> Vec<Position> {
    let mut next_slot: HashMap<u32, usize> = HashMap::new();

    generations
        .iter()
        .map(|&generation| {
            let slot = next_slot.entry(generation).or_insert(0);
            let position = position_for(layout, generation, *slot);
            *slot += 1;
            position
        })
        .collect()
}
