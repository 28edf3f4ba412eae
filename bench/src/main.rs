use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use keygraph_core::{CompositeKey, Graph, GraphConfig, Traversal};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Demo and benchmark driver for keygraph-core.
#[derive(Parser)]
#[command(name = "keygraph-bench", about = "Composite-key graph BFS demo and benchmark")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample graph and print distances from two sources
    Demo {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Generate synthetic topologies and time BFS over them
    Run {
        /// Topology to generate
        #[arg(value_enum, default_value_t = Mode::All)]
        mode: Mode,
        /// Target vertex count
        #[arg(short, long, default_value_t = 1_000_000)]
        nodes: u64,
        /// Generate a directed graph
        #[arg(short, long)]
        directed: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    All,
    Chain,
    Star,
    Grid,
    Random,
    Barbell,
}

type Generator = fn(u64, bool) -> keygraph_core::Result<Graph>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Demo { json } => demo(json),
        Commands::Run {
            mode,
            nodes,
            directed,
        } => {
            let generators: Vec<(&str, Generator)> = match mode {
                Mode::Chain => vec![("Chain", gen_chain)],
                Mode::Star => vec![("Star", gen_star)],
                Mode::Grid => vec![("Grid (composite keys)", gen_grid)],
                Mode::Random => vec![("Erdos-Renyi random", gen_random)],
                Mode::Barbell => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
                Mode::All => vec![
                    ("Chain", gen_chain as Generator),
                    ("Star", gen_star),
                    ("Grid (composite keys)", gen_grid),
                    ("Erdos-Renyi random", gen_random),
                    ("Barbell (clique-bridge-clique)", gen_barbell),
                ],
            };

            println!("keygraph-bench");
            println!("==============");
            println!();
            for (name, generator) in generators {
                run_benchmark(name, generator, nodes, directed)?;
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Report {
    source: CompositeKey,
    target: CompositeKey,
    min_dist: i64,
    visited: bool,
    path: Option<Vec<CompositeKey>>,
}

/// Plain-integer and composite vertices side by side in one undirected graph.
fn demo(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = Graph::undirected();

    graph.add_edge(1, 2, 1)?;
    graph.add_edge(2, 3, 1)?;

    graph.add_edge((4, 5, 0), (7, 8, 0), 1)?;
    graph.add_edge((7, 8, 0), (9, 9, 9), 1)?;

    let reports = vec![
        report(&graph, CompositeKey::single(1), CompositeKey::single(3))?,
        report(&graph, CompositeKey::new(4, 5, 0), CompositeKey::new(9, 9, 9))?,
    ];

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for p in &reports {
        println!("Distance from {} to {}: {}", p.source, p.target, p.min_dist);
        println!("Is {} visited? {}", p.target, p.visited);
    }
    Ok(())
}

/// A fresh traversal per source: a `Traversal` runs only once.
fn report(
    graph: &Graph,
    source: CompositeKey,
    target: CompositeKey,
) -> keygraph_core::Result<Report> {
    let mut bfs = Traversal::new(graph);
    bfs.run(source)?;
    Ok(Report {
        source,
        target,
        min_dist: bfs.min_dist(target)?,
        visited: bfs.is_visited(target)?,
        path: bfs.path_to(target)?,
    })
}

// ---------------------------------------------------------------------------
// Benchmark
// ---------------------------------------------------------------------------

fn run_benchmark(
    name: &str,
    generator: Generator,
    node_count: u64,
    directed: bool,
) -> keygraph_core::Result<()> {
    println!("--- {} ---", name);
    println!("Target: {} nodes ({})", node_count, if directed { "directed" } else { "undirected" });

    let t = Instant::now();
    let graph = generator(node_count, directed)?;
    let gen_time = t.elapsed();
    tracing::debug!(
        topology = name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph generated"
    );
    println!(
        "Generated in {:.2}s: {} nodes, {} adjacency entries, ~{:.0}MB",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );
    if graph.node_count() == 0 {
        println!();
        return Ok(());
    }

    // BFS from the first registered vertex (root / hub / corner)
    let Some(source) = graph.registry().key_of(0) else {
        return Ok(());
    };
    let t = Instant::now();
    let mut bfs = Traversal::new(&graph);
    bfs.run(source)?;
    let elapsed = t.elapsed();

    let reached = bfs.reached();
    let eccentricity = reached.last().map(|&(_, d)| d).unwrap_or(0);
    println!();
    println!("{:>12} {:>12} {:>12}", "reached", "max hops", "time");
    println!("{:->12} {:->12} {:->12}", "", "", "");
    println!(
        "{:>12} {:>12} {:>10.1}ms",
        reached.len(),
        eccentricity,
        elapsed.as_secs_f64() * 1000.0
    );

    // Path to the last registered vertex
    let last = graph.node_count() - 1;
    if let Some(far) = graph.registry().key_of(last as u32) {
        let t = Instant::now();
        let path = bfs.path_to(far)?;
        let elapsed = t.elapsed();
        match path {
            Some(p) => println!(
                "Path {} → {}: {} hops in {:.1}ms",
                source,
                far,
                p.len() - 1,
                elapsed.as_secs_f64() * 1000.0
            ),
            None => println!(
                "Path {} → {}: unreachable ({:.1}ms)",
                source,
                far,
                elapsed.as_secs_f64() * 1000.0
            ),
        }
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Generators: deterministic, keyed so each exercises a different key shape
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
}

fn config(directed: bool, node_count: u64) -> GraphConfig {
    let base = if directed {
        GraphConfig::directed()
    } else {
        GraphConfig::undirected()
    };
    base.with_capacity(node_count as usize)
}

/// Single path 0 → 1 → … → n-1. Deepest possible BFS.
fn gen_chain(node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
    let mut graph = Graph::with_config(config(directed, node_count));
    for i in 1..node_count as i64 {
        graph.add_edge(CompositeKey::single(i - 1), CompositeKey::single(i), 1)?;
    }
    Ok(graph)
}

/// One hub `(0, 0, 0)` with leaves `(0, i, 0)`. Widest possible frontier.
fn gen_star(node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
    let mut graph = Graph::with_config(config(directed, node_count));
    let hub = CompositeKey::new(0, 0, 0);
    for i in 1..node_count as i64 {
        graph.add_edge(hub, CompositeKey::pair(0, i), 1)?;
    }
    Ok(graph)
}

/// Square lattice keyed `(x, y, 0)`, edges right and down.
///
/// Exercises the composite-key path: every vertex is a pair, never a plain
/// integer. Distances from the corner are Manhattan distances.
fn gen_grid(node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
    let side = ((node_count as f64).sqrt() as i64).max(1);
    let mut graph = Graph::with_config(config(directed, (side * side) as u64));
    for x in 0..side {
        for y in 0..side {
            if x + 1 < side {
                graph.add_edge(CompositeKey::pair(x, y), CompositeKey::pair(x + 1, y), 1)?;
            }
            if y + 1 < side {
                graph.add_edge(CompositeKey::pair(x, y), CompositeKey::pair(x, y + 1), 1)?;
            }
        }
    }
    Ok(graph)
}

/// Erdos-Renyi: ~10 uniform random edges per vertex, random weights.
fn gen_random(node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
    let mut graph = Graph::with_config(config(directed, node_count));
    let mut rng = FastRng::new(54321);

    for i in 0..node_count as i64 {
        graph.add_vertex(CompositeKey::single(i))?;
    }
    for _ in 0..node_count * 10 {
        let from = rng.next(node_count) as i64;
        let to = rng.next(node_count) as i64;
        if from != to {
            let weight = rng.next(100) as i64;
            graph.add_edge(CompositeKey::single(from), CompositeKey::single(to), weight)?;
        }
    }
    Ok(graph)
}

/// Two dense cliques joined by a thin bridge of ~10 vertices.
///
/// Clique A is keyed `(0, i, 0)`, the bridge `(1, i, 0)`, clique B `(2, i, 0)`.
fn gen_barbell(node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
    let bridge_len = 10i64;
    let clique_size = ((node_count as i64 - bridge_len) / 2).max(1);
    let total = (clique_size * 2 + bridge_len) as u64;
    let mut graph = Graph::with_config(config(directed, total));
    let mut rng = FastRng::new(99999);

    for side in [0i64, 2] {
        for i in 0..clique_size {
            for _ in 0..20i64.min(clique_size - 1) {
                let target = rng.next(clique_size as u64) as i64;
                if target != i {
                    graph.add_edge(CompositeKey::pair(side, i), CompositeKey::pair(side, target), 1)?;
                }
            }
        }
    }

    // A's last vertex → bridge → B's first vertex
    graph.add_edge(CompositeKey::pair(0, clique_size - 1), CompositeKey::pair(1, 0), 1)?;
    for i in 1..bridge_len {
        graph.add_edge(CompositeKey::pair(1, i - 1), CompositeKey::pair(1, i), 1)?;
    }
    graph.add_edge(CompositeKey::pair(1, bridge_len - 1), CompositeKey::pair(2, 0), 1)?;

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygraph_core::GraphError;

    fn overfull(_node_count: u64, directed: bool) -> keygraph_core::Result<Graph> {
        let mut graph = Graph::with_config(config(directed, 1));
        graph.add_edge(CompositeKey::single(0), CompositeKey::single(1), 1)?;
        Ok(graph)
    }

    #[test]
    fn test_generators_fit_their_capacity() {
        let generators: [Generator; 5] = [gen_chain, gen_star, gen_grid, gen_random, gen_barbell];
        for generator in generators {
            let graph = generator(100, false).unwrap();
            assert!(graph.node_count() <= graph.capacity().unwrap());
        }
    }

    #[test]
    fn test_rejected_edge_aborts_benchmark() {
        assert_eq!(
            run_benchmark("overfull", overfull, 1, true).unwrap_err(),
            GraphError::CapacityExceeded { id: 1, capacity: 1 }
        );
    }
}
