//! Request handlers for protocol methods.
//!
//! Each handler implements one method. Handlers that read the loaded
//! village take a read lock; `lineage.build` touches no shared state.

use crate::protocol::{BuildParams, NodeGetParams, RelativesParams, Response, SearchParams};
use crate::SharedGraph;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use village_graph::{LineageBuilder, LineageDirection, NodeInfo};

/// Handles the graph.info method.
pub async fn handle_info(graph: SharedGraph, id: Option<Value>) -> Response {
    let g = graph.read().await;
    let stats = g.stats();

    #[derive(Serialize)]
    struct InfoResult {
        #[serde(rename = "nodeCount")]
        node_count: usize,
        #[serde(rename = "edgeCount")]
        edge_count: usize,
        generations: usize,
        roots: usize,
        version: &'static str,
    }

    Response::success(
        id,
        InfoResult {
            node_count: stats.node_count,
            edge_count: stats.edge_count,
            generations: stats.generations,
            roots: stats.roots,
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the lineage.build method: lays out the given characters.
pub fn handle_build(builder: &LineageBuilder, id: Option<Value>, params: BuildParams) -> Response {
    let start = Instant::now();

    let builder = match params.layout {
        Some(layout) => builder.clone().with_layout(layout),
        None => builder.clone(),
    };
    let graph = builder.build(&params.characters);

    debug!(
        "Built lineage for {} characters in {}ms",
        params.characters.len(),
        start.elapsed().as_millis()
    );

    Response::success(id, graph.to_render_graph())
}

/// Handles the lineage.graph method: the loaded village's render graph.
pub async fn handle_graph(graph: SharedGraph, id: Option<Value>) -> Response {
    let g = graph.read().await;
    Response::success(id, g.to_render_graph())
}

/// Handles the node.get method.
pub async fn handle_node_get(graph: SharedGraph, id: Option<Value>, params: NodeGetParams) -> Response {
    let g = graph.read().await;

    let Some(index) = g.get_index(&params.id) else {
        return Response::node_not_found(id, &params.id);
    };
    let Some(node) = g.get(index) else {
        return Response::node_not_found(id, &params.id);
    };

    let parents: Vec<_> = g.parents_of(index).iter().map(|n| n.id.clone()).collect();
    let children: Vec<_> = g.children_of(index).iter().map(|n| n.id.clone()).collect();

    Response::success(
        id,
        serde_json::json!({
            "id": node.id,
            "name": node.name,
            "generation": node.generation,
            "position": node.position,
            "metadata": node.metadata,
            "edges": {
                "parents": parents,
                "children": children
            }
        }),
    )
}

/// Handles lineage.ancestors and lineage.descendants.
pub async fn handle_relatives(
    graph: SharedGraph,
    id: Option<Value>,
    direction: LineageDirection,
    params: RelativesParams,
) -> Response {
    let start = Instant::now();
    let g = graph.read().await;

    let Some(target) = g.get_index(&params.id).and_then(|idx| g.info(idx)) else {
        return Response::node_not_found(id, &params.id);
    };

    debug!("{} of {} (depth {})", direction, params.id, params.depth);
    let relatives = g.relatives(&params.id, direction, params.depth);

    Response::success(
        id,
        serde_json::json!({
            "target": target,
            "direction": direction,
            "relatives": relatives,
            "total": relatives.len(),
            "queryTime": start.elapsed().as_millis()
        }),
    )
}

/// Handles the search method.
pub async fn handle_search(graph: SharedGraph, id: Option<Value>, params: SearchParams) -> Response {
    let start = Instant::now();
    let g = graph.read().await;

    debug!("Search: {}", params.query);

    let mut matches: Vec<NodeInfo> = g.search(&params.query).into_iter().map(NodeInfo::from).collect();
    let total = matches.len();
    matches.truncate(params.limit);

    Response::success(
        id,
        serde_json::json!({
            "nodes": matches,
            "total": total,
            "queryTime": start.elapsed().as_millis()
        }),
    )
}
