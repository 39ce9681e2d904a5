//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers.

use crate::handlers::{
    handle_build, handle_graph, handle_info, handle_node_get, handle_relatives, handle_search,
};
use crate::protocol::{
    BuildParams, NodeGetParams, RelativesParams, Request, Response, SearchParams,
};
use crate::SharedGraph;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use village_graph::{LineageBuilder, LineageDirection, LineageGraph};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// Builder used by `lineage.build`.
    pub builder: LineageBuilder,
}

impl ServerConfig {
    /// Binds to localhost on the given port.
    pub fn local(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
            builder: LineageBuilder::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::local(7432)
    }
}

/// The village WebSocket server.
pub struct VillageServer {
    config: ServerConfig,
    graph: SharedGraph,
}

impl VillageServer {
    /// Creates a new server serving the given graph.
    pub fn new(graph: LineageGraph, config: ServerConfig) -> Self {
        Self::new_with_shared(Arc::new(RwLock::new(graph)), config)
    }

    /// Creates a server over a graph the caller keeps a handle to.
    pub fn new_with_shared(graph: SharedGraph, config: ServerConfig) -> Self {
        Self { config, graph }
    }

    /// Returns a handle to the shared graph for updates.
    pub fn graph(&self) -> SharedGraph {
        self.graph.clone()
    }

    /// Runs the server, accepting connections forever.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Village server listening on {}", self.config.addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let graph = self.graph.clone();
                    let builder = self.config.builder.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, graph, builder).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    graph: SharedGraph,
    builder: LineageBuilder,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket connection established with {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if msg.is_ping() {
            write.send(Message::Pong(msg.into_data())).await?;
            continue;
        }

        if msg.is_text() {
            let text = msg.to_text().unwrap_or("");
            let response = process_message(text, graph.clone(), &builder).await;
            let json = serde_json::to_string(&response)?;
            write.send(Message::Text(json)).await?;
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

fn parse_params<T: DeserializeOwned>(id: &Option<Value>, params: Value) -> Result<T, Response> {
    serde_json::from_value(params).map_err(|e| Response::invalid_params(id.clone(), e.to_string()))
}

/// Processes a JSON-RPC message and returns a response.
pub(crate) async fn process_message(
    text: &str,
    graph: SharedGraph,
    builder: &LineageBuilder,
) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Processing method: {}", method);

    match method {
        "graph.info" => handle_info(graph, id).await,

        "lineage.graph" => handle_graph(graph, id).await,

        "lineage.build" => match parse_params::<BuildParams>(&id, request.params) {
            Ok(params) => handle_build(builder, id, params),
            Err(response) => response,
        },

        "node.get" => match parse_params::<NodeGetParams>(&id, request.params) {
            Ok(params) => handle_node_get(graph, id, params).await,
            Err(response) => response,
        },

        "lineage.ancestors" | "lineage.descendants" => {
            let direction = if method == "lineage.ancestors" {
                LineageDirection::Ancestors
            } else {
                LineageDirection::Descendants
            };
            match parse_params::<RelativesParams>(&id, request.params) {
                Ok(params) => handle_relatives(graph, id, direction, params).await,
                Err(response) => response,
            }
        }

        "search" => match parse_params::<SearchParams>(&id, request.params) {
            Ok(params) => handle_search(graph, id, params).await,
            Err(response) => response,
        },

        _ => Response::method_not_found(id, method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND, NODE_NOT_FOUND, PARSE_ERROR};
    use serde_json::json;
    use village_core::{Character, ZERO_ADDRESS};

    fn village() -> Vec<Character> {
        vec![
            Character::new("A", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
            Character::new("B", "Bo").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
            Character::new("C", "Cy").with_parents(["A", "B"]),
            Character::new("D", "Dee").with_parents(["C", ZERO_ADDRESS]),
        ]
    }

    fn shared() -> SharedGraph {
        let graph = LineageBuilder::new().build(&village());
        Arc::new(RwLock::new(graph))
    }

    async fn call(text: &str) -> Response {
        process_message(text, shared(), &LineageBuilder::new()).await
    }

    fn code(response: &Response) -> Option<i32> {
        response.error.as_ref().map(|e| e.code)
    }

    #[test]
    fn test_default_config_binds_localhost() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1:7432".parse::<SocketAddr>().unwrap());
        assert_eq!(ServerConfig::local(9000).addr.port(), 9000);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = call("{not json").await;
        assert_eq!(code(&response), Some(PARSE_ERROR));
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(r#"{"jsonrpc":"2.0","id":7,"method":"graph.explode"}"#).await;
        assert_eq!(code(&response), Some(METHOD_NOT_FOUND));
        assert_eq!(response.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_graph_info() {
        let response = call(r#"{"jsonrpc":"2.0","id":1,"method":"graph.info"}"#).await;
        let result = response.result.unwrap();
        assert_eq!(result["nodeCount"], 4);
        assert_eq!(result["edgeCount"], 3);
        assert_eq!(result["generations"], 3);
        assert_eq!(result["roots"], 2);
    }

    #[tokio::test]
    async fn test_build_is_stateless() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "lineage.build",
            "params": {
                "characters": [
                    {"id": "X", "name": "Xi", "parents": [ZERO_ADDRESS, ZERO_ADDRESS], "charMetadata": ""},
                    {"id": "Y", "name": "Yu", "parents": ["X", ZERO_ADDRESS], "charMetadata": ""}
                ],
                "layout": {
                    "horizontal_spacing": 10,
                    "horizontal_offset": 0,
                    "vertical_spacing": 100,
                    "vertical_offset": 0
                }
            }
        });

        let graph = shared();
        let response =
            process_message(&request.to_string(), graph.clone(), &LineageBuilder::new()).await;
        let result = response.result.unwrap();

        assert_eq!(result["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(result["nodes"][1]["y"], 100.0);
        assert_eq!(result["links"][0]["source"], "X");
        assert_eq!(result["links"][0]["type"], "parent");

        // The loaded village is untouched.
        assert_eq!(graph.read().await.node_count(), 4);
    }

    #[tokio::test]
    async fn test_build_rejects_bad_params() {
        let response =
            call(r#"{"jsonrpc":"2.0","id":3,"method":"lineage.build","params":{"characters":5}}"#)
                .await;
        assert_eq!(code(&response), Some(INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_node_get() {
        let response =
            call(r#"{"jsonrpc":"2.0","id":4,"method":"node.get","params":{"id":"C"}}"#).await;
        let result = response.result.unwrap();
        assert_eq!(result["generation"], 1);
        assert_eq!(result["edges"]["parents"], json!(["A", "B"]));
        assert_eq!(result["edges"]["children"], json!(["D"]));

        let missing =
            call(r#"{"jsonrpc":"2.0","id":5,"method":"node.get","params":{"id":"Z"}}"#).await;
        assert_eq!(code(&missing), Some(NODE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_ancestors_and_descendants() {
        let response = call(
            r#"{"jsonrpc":"2.0","id":6,"method":"lineage.ancestors","params":{"id":"D"}}"#,
        )
        .await;
        let result = response.result.unwrap();
        assert_eq!(result["total"], 3);
        assert_eq!(result["relatives"][0]["node"]["id"], "C");

        let response = call(
            r#"{"jsonrpc":"2.0","id":7,"method":"lineage.descendants","params":{"id":"A","depth":1}}"#,
        )
        .await;
        assert_eq!(response.result.unwrap()["total"], 1);
    }

    #[tokio::test]
    async fn test_search_limit() {
        let response = call(
            r#"{"jsonrpc":"2.0","id":8,"method":"search","params":{"query":"d","limit":1}}"#,
        )
        .await;
        let result = response.result.unwrap();
        // "Ada" and "Dee" both match.
        assert_eq!(result["total"], 2);
        assert_eq!(result["nodes"].as_array().unwrap().len(), 1);
    }
}
