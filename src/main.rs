use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use cartex::{BBox, Graph, KDTree, Node, RasterConfig, RasterError, RenderGrid, Tile};
use clap::{Parser, Subcommand};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] LoadError);

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {0}: malformed record")]
    Malformed(usize),

    #[error("line {0}: edge references an unknown node")]
    UnknownNode(usize),
}

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select the grid of map tiles covering a bounding box at a viewport's
    /// resolution
    Raster {
        /// Upper-left longitude of the map's root bounding box
        #[arg(long, allow_hyphen_values = true)]
        root_ul_lon: f64,

        /// Upper-left latitude of the map's root bounding box
        #[arg(long, allow_hyphen_values = true)]
        root_ul_lat: f64,

        /// Lower-right longitude of the map's root bounding box
        #[arg(long, allow_hyphen_values = true)]
        root_lr_lon: f64,

        /// Lower-right latitude of the map's root bounding box
        #[arg(long, allow_hyphen_values = true)]
        root_lr_lat: f64,

        /// Edge length of a single square tile, in pixels
        #[arg(long, default_value_t = 256)]
        tile_size: u32,

        /// Deepest available zoom level
        #[arg(long, default_value_t = 7)]
        max_depth: u8,

        /// Upper-left longitude of the query box
        #[arg(allow_hyphen_values = true)]
        ul_lon: f64,

        /// Upper-left latitude of the query box
        #[arg(allow_hyphen_values = true)]
        ul_lat: f64,

        /// Lower-right longitude of the query box
        #[arg(allow_hyphen_values = true)]
        lr_lon: f64,

        /// Lower-right latitude of the query box
        #[arg(allow_hyphen_values = true)]
        lr_lat: f64,

        /// Viewport width in pixels
        width: f64,

        /// Viewport height in pixels
        height: f64,
    },

    /// Find the shortest route between two positions over a street graph
    Route {
        /// The path to the graph file (lines of `node <id> <lat> <lon> [name]`
        /// and `edge <a> <b> [street]`)
        graph_file: PathBuf,

        /// Latitude of the start point
        #[arg(allow_hyphen_values = true)]
        start_lat: f64,

        /// Longitude of the start point
        #[arg(allow_hyphen_values = true)]
        start_lon: f64,

        /// Latitude of the end point
        #[arg(allow_hyphen_values = true)]
        end_lat: f64,

        /// Longitude of the end point
        #[arg(allow_hyphen_values = true)]
        end_lon: f64,

        /// Print turn-by-turn directions instead of a GeoJSON line
        #[arg(long)]
        directions: bool,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Raster {
            root_ul_lon,
            root_ul_lat,
            root_lr_lon,
            root_lr_lat,
            tile_size,
            max_depth,
            ul_lon,
            ul_lat,
            lr_lon,
            lr_lat,
            width,
            height,
        } => {
            let config = RasterConfig {
                root: BBox {
                    ul_lon: root_ul_lon,
                    ul_lat: root_ul_lat,
                    lr_lon: root_lr_lon,
                    lr_lat: root_lr_lat,
                },
                tile_size,
                max_depth,
            };
            let query = BBox {
                ul_lon,
                ul_lat,
                lr_lon,
                lr_lat,
            };

            match cartex::select_tiles(&config, query, width, height) {
                Ok(grid) => print_raster_success(&grid),
                Err(RasterError::InvalidQuery) => print_raster_failure(),
            }
        }

        Command::Route {
            graph_file,
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            directions,
        } => {
            let g = load_graph(&graph_file)?;
            log::info!("loaded graph with {} nodes", g.len());

            let tree =
                KDTree::from_iter(g.iter().copied()).expect("the graph file contains no nodes");
            let start = tree.find_nearest_node(start_lat, start_lon);
            let end = tree.find_nearest_node(end_lat, end_lon);

            let route = cartex::find_route(&g, start.id, end.id, cartex::DEFAULT_STEP_LIMIT)?;

            if directions {
                for step in cartex::describe_route(&g, &route)? {
                    println!("{} on {} ({:.3} km)", step.turn, step.street, step.distance);
                }
            } else {
                print_route_geojson(&g, &route);
            }
        }
    }

    Ok(())
}

fn print_raster_success(grid: &RenderGrid) {
    println!("{{");
    println!("  \"render_grid\": [");
    let mut rows = grid.tiles.iter().peekable();
    while let Some(row) = rows.next() {
        let cells = row
            .iter()
            .map(|tile| format!("\"{}\"", tile.filename()))
            .collect::<Vec<_>>()
            .join(", ");
        let suffix = if rows.peek().is_some() { "," } else { "" };
        println!("    [{}]{}", cells, suffix);
    }
    println!("  ],");
    println!("  \"raster_ul_lon\": {},", grid.bounds.ul_lon);
    println!("  \"raster_ul_lat\": {},", grid.bounds.ul_lat);
    println!("  \"raster_lr_lon\": {},", grid.bounds.lr_lon);
    println!("  \"raster_lr_lat\": {},", grid.bounds.lr_lat);
    println!("  \"depth\": {},", grid.depth);
    println!("  \"query_success\": true");
    println!("}}");
}

fn print_raster_failure() {
    println!("{{");
    println!("  \"render_grid\": [],");
    println!("  \"raster_ul_lon\": 0,");
    println!("  \"raster_ul_lat\": 0,");
    println!("  \"raster_lr_lon\": 0,");
    println!("  \"raster_lr_lat\": 0,");
    println!("  \"depth\": 0,");
    println!("  \"query_success\": false");
    println!("}}");
}

fn print_route_geojson(g: &Graph, route: &[i64]) {
    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{}},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut nodes = route
        .iter()
        .map(|&node_id| g.get_node(node_id).unwrap())
        .peekable();
    while let Some(node) = nodes.next() {
        let suffix = if nodes.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", node.lon, node.lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");
}

fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, GraphLoadError> {
    let path = path.as_ref();
    parse_graph(path).map_err(|e| GraphLoadError(PathBuf::from(path), e))
}

fn parse_graph(path: &Path) -> Result<Graph, LoadError> {
    let mut g = Graph::default();
    let content = fs::read_to_string(path)?;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("node") => {
                let id = parse_field(fields.next(), line_no)?;
                let lat = parse_field(fields.next(), line_no)?;
                let lon = parse_field(fields.next(), line_no)?;
                g.set_node(Node { id, lat, lon });

                let name = fields.collect::<Vec<_>>().join(" ");
                if !name.is_empty() {
                    g.set_node_name(id, name);
                }
            }

            Some("edge") => {
                let from: i64 = parse_field(fields.next(), line_no)?;
                let to: i64 = parse_field(fields.next(), line_no)?;
                let street = {
                    let name = fields.collect::<Vec<_>>().join(" ");
                    if name.is_empty() {
                        g.intern_street("unknown road")
                    } else {
                        g.intern_street(&name)
                    }
                };

                let a = g.get_node(from).ok_or(LoadError::UnknownNode(line_no))?;
                let b = g.get_node(to).ok_or(LoadError::UnknownNode(line_no))?;
                let cost = cartex::earth_distance(a.lat, a.lon, b.lat, b.lon);
                g.connect(from, to, cost, street);
            }

            _ => return Err(LoadError::Malformed(line_no)),
        }
    }

    Ok(g)
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, line_no: usize) -> Result<T, LoadError> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or(LoadError::Malformed(line_no))
}
