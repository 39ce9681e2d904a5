//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use village_core::{Config, Village, CONFIG_DIR};
use village_graph::{LineageBuilder, LineageGraph, Relative, RenderGraph, SnapshotStore};
use village_indexer::{load_characters, normalize_address, SubgraphClient};
use village_server::{ServerConfig, VillageServer};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config in a project directory.
pub fn init(root: &Path) -> Result<()> {
    let config_path = Config::path_in(root);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let path = Config::default().write(root)?;

    println!("{} Wrote {}", "✓".green(), path.display());
    println!(
        "  Run {} to download a village",
        "shapevillage fetch <address>".cyan()
    );

    Ok(())
}

/// Fetch a village and store a snapshot of it.
pub async fn fetch(root: &Path, address: &str) -> Result<()> {
    let config = Config::load(root)?;
    let village = load_village(root, &config, address, true).await?;
    let graph = builder_for(&config).build(village.characters());

    println!(
        "{} Stored {} ({} characters, {} generations)",
        "✓".green(),
        village.display_name().cyan(),
        graph.node_count().to_string().cyan(),
        graph.generations().len()
    );

    Ok(())
}

#[derive(Serialize)]
struct VillageRow {
    id: String,
    name: String,
    owner: String,
    characters: u64,
}

impl From<&Village> for VillageRow {
    fn from(village: &Village) -> Self {
        let characters = village.characters_count().unwrap_or_else(|e| {
            warn!("Village {}: {}", village.id, e);
            0
        });
        Self {
            id: village.id.clone(),
            name: village.display_name(),
            owner: village.owner.clone(),
            characters,
        }
    }
}

/// List villages from the subgraph.
pub async fn villages(root: &Path, owner: Option<&str>, breedable: bool, json: bool) -> Result<()> {
    let config = Config::load(root)?;
    let client = SubgraphClient::new(&config.subgraph_url)?;

    let spinner = spinner("Querying subgraph...")?;
    let result = match (owner, breedable) {
        (Some(owner), _) => client.villages_by_owner(owner).await,
        (None, true) => client.breedable_villages().await,
        (None, false) => {
            spinner.finish_and_clear();
            return Err("pass --owner <address> or --breedable".into());
        }
    };
    spinner.finish_and_clear();

    let rows: Vec<VillageRow> = result?.iter().map(VillageRow::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No villages found");
        return Ok(());
    }

    println!("Found {} villages:\n", rows.len());
    for row in rows {
        println!(
            "  {} {} {}",
            row.id.yellow(),
            row.name.cyan(),
            format!("({} characters)", row.characters).dimmed()
        );
    }

    Ok(())
}

/// Lay out characters read from a file.
pub fn layout(root: &Path, file: &Path, output: Option<&Path>) -> Result<()> {
    let config = Config::load(root)?;
    let characters = load_characters(file)?;
    let graph = builder_for(&config).build(&characters);

    debug!(
        "Laid out {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let render = graph.to_render_graph();
    match output {
        Some(path) => write_render_graph(&render, path)?,
        None => println!("{}", render.to_json_pretty()?),
    }

    Ok(())
}

/// Export a village's render graph to JSON.
pub async fn export(root: &Path, address: &str, output: &Path, refresh: bool) -> Result<()> {
    let config = Config::load(root)?;
    let village = load_village(root, &config, address, refresh).await?;
    let graph = builder_for(&config).build(village.characters());

    write_render_graph(&graph.to_render_graph(), output)
}

/// Show ancestors and descendants of one character.
pub async fn lineage(
    root: &Path,
    address: &str,
    character: &str,
    depth: usize,
    json: bool,
) -> Result<()> {
    let config = Config::load(root)?;
    let village = load_village(root, &config, address, false).await?;
    let graph = builder_for(&config).build(village.characters());

    let id = resolve_character(&graph, character)
        .ok_or_else(|| format!("Character '{}' not found in village", character))?;
    let report = graph
        .lineage(&id, depth)
        .ok_or_else(|| format!("Character '{}' not found in village", character))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Lineage".cyan().bold());
    println!(
        "Target: {} (generation {})",
        report.target.name.cyan(),
        report.target.generation
    );
    println!();
    println!("{}", report.summary());
    println!();

    print_relatives("Ancestors:", &report.ancestors);
    print_relatives("Descendants:", &report.descendants);

    Ok(())
}

fn print_relatives(title: &str, relatives: &[Relative]) {
    if relatives.is_empty() {
        return;
    }

    println!("{}", title.yellow());
    for relative in relatives.iter().take(20) {
        println!(
            "  • {} {}",
            relative.node.name,
            format!("({} away, generation {})", relative.distance, relative.node.generation)
                .dimmed()
        );
    }
    if relatives.len() > 20 {
        println!("  ... and {} more", relatives.len() - 20);
    }
    println!();
}

#[derive(Serialize)]
struct StatusReport {
    initialized: bool,
    subgraph_url: String,
    sentinel: String,
    snapshots: Vec<VillageRow>,
}

/// Show configuration and stored snapshots.
pub fn status(root: &Path, json: bool) -> Result<()> {
    let initialized = root.join(CONFIG_DIR).exists();
    let config = Config::load(root)?;

    let snapshot_dir = Config::snapshot_dir(root);
    let snapshots: Vec<VillageRow> = if snapshot_dir.exists() {
        SnapshotStore::open(&snapshot_dir)?
            .list_villages()?
            .iter()
            .map(VillageRow::from)
            .collect()
    } else {
        Vec::new()
    };

    if json {
        let report = StatusReport {
            initialized,
            subgraph_url: config.subgraph_url,
            sentinel: config.sentinel,
            snapshots,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !initialized {
        println!("{} Not initialized in this directory", "✗".red());
        println!("  Run {} to initialize", "shapevillage init".cyan());
        return Ok(());
    }

    println!("{}", "ShapeVillage Status".cyan().bold());
    println!();
    println!("  {} {}", "Subgraph:".dimmed(), config.subgraph_url);
    println!("  {} {}", "Sentinel:".dimmed(), config.sentinel);
    println!("  {} {}", "Port:".dimmed(), config.server.port);
    println!("  {} {}", "Snapshots:".dimmed(), snapshots.len());

    for row in &snapshots {
        println!(
            "    {} {} {}",
            row.id.yellow(),
            row.name,
            format!("({} characters)", row.characters).dimmed()
        );
    }

    Ok(())
}

/// Serve a village's lineage graph.
pub async fn serve(root: &Path, address: &str, port: Option<u16>, headless: bool) -> Result<()> {
    let config = Config::load(root)?;
    let village = load_village(root, &config, address, false).await?;

    let builder = builder_for(&config);
    let graph = builder.build(village.characters());

    println!(
        "{} Loaded {} ({} characters, {} links)",
        "✓".green(),
        village.display_name().cyan(),
        graph.node_count(),
        graph.edge_count()
    );

    let mut server_config = ServerConfig::local(port.unwrap_or(config.server.port));
    server_config.builder = builder;
    if headless {
        server_config.addr.set_ip(Ipv4Addr::UNSPECIFIED.into());
    }
    let addr = server_config.addr;
    let server = VillageServer::new(graph, server_config);

    println!("{} Listening on ws://{}", "✓".green(), addr);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await.map_err(|e| e.to_string())?;

    Ok(())
}

fn builder_for(config: &Config) -> LineageBuilder {
    LineageBuilder::new()
        .with_sentinel(config.sentinel.clone())
        .with_layout(config.layout)
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

/// Returns the village from the snapshot store, fetching it when missing
/// or when `refresh` is set.
async fn load_village(root: &Path, config: &Config, address: &str, refresh: bool) -> Result<Village> {
    let id = normalize_address(address)?;
    let store = SnapshotStore::open(Config::snapshot_dir(root))?;

    if !refresh {
        if let Some(village) = store.load_village(&id)? {
            debug!("Using snapshot of {}", id);
            return Ok(village);
        }
    }

    let client = SubgraphClient::new(&config.subgraph_url)?;
    let spinner = spinner("Fetching village...")?;
    let fetched = client.fetch_village(&id).await;
    spinner.finish_and_clear();

    let village = fetched?.ok_or_else(|| format!("Village {} not found in subgraph", id))?;
    store.save_village(&village)?;

    Ok(village)
}

/// Finds a character by id, then by exact name, then by name substring.
fn resolve_character(graph: &LineageGraph, query: &str) -> Option<String> {
    if graph.contains(query) {
        return Some(query.to_string());
    }

    let matches = graph.search(query);
    matches
        .iter()
        .find(|node| node.name.eq_ignore_ascii_case(query))
        .or_else(|| matches.first())
        .map(|node| node.id.clone())
}

fn write_render_graph(render: &RenderGraph, path: &Path) -> Result<()> {
    fs::write(path, render.to_json_pretty()?)?;
    println!(
        "{} Exported {} nodes and {} links to {}",
        "✓".green(),
        render.nodes.len(),
        render.links.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use village_core::{Character, ZERO_ADDRESS};

    fn graph() -> LineageGraph {
        LineageBuilder::new().build(&[
            Character::new("0xa", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
            Character::new("0xb", "Adam").with_parents(["0xa", ZERO_ADDRESS]),
        ])
    }

    #[test]
    fn test_resolve_character() {
        let graph = graph();
        assert_eq!(resolve_character(&graph, "0xb").as_deref(), Some("0xb"));
        assert_eq!(resolve_character(&graph, "adam").as_deref(), Some("0xb"));
        assert_eq!(resolve_character(&graph, "ada").as_deref(), Some("0xa"));
        assert_eq!(resolve_character(&graph, "dam").as_deref(), Some("0xb"));
        assert_eq!(resolve_character(&graph, "zed"), None);
    }

    #[test]
    fn test_init_then_layout() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();
        assert!(Config::path_in(dir.path()).exists());

        let input = dir.path().join("characters.json");
        fs::write(
            &input,
            serde_json::to_string(&[
                Character::new("0xa", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
                Character::new("0xb", "Adam").with_parents(["0xa", ZERO_ADDRESS]),
            ])
            .unwrap(),
        )
        .unwrap();

        let output = dir.path().join("lineage.json");
        layout(dir.path(), &input, Some(&output)).unwrap();

        let render: RenderGraph =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(render.nodes.len(), 2);
        assert_eq!(render.nodes[1].level, 1);
        assert_eq!(render.nodes[1].y, 550.0);
        assert_eq!(render.links.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_used_before_network() {
        let dir = tempdir().unwrap();
        let id = "0x00000000000000000000000000000000000000aa";
        {
            let store = SnapshotStore::open(Config::snapshot_dir(dir.path())).unwrap();
            store
                .save_village(&Village::new(id).with_characters(vec![Character::new("0xa", "Ada")]))
                .unwrap();
        }

        let mut config = Config::default();
        config.subgraph_url = "http://127.0.0.1:9/unreachable".to_string();

        let village = load_village(dir.path(), &config, id, false).await.unwrap();
        assert_eq!(village.characters().len(), 1);
    }
}
