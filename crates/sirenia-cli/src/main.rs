use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use sirenia::{Edge, Graph, LayoutSettings, Node, RankingLayout, Rect, Shape};
use std::io::Read;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SIRENIA_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Document(String),
    Layout(sirenia::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Document(msg) => write!(f, "invalid document: {msg}"),
            CliError::Layout(err) => write!(f, "layout failed: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<sirenia::Error> for CliError {
    fn from(value: sirenia::Error) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    pretty: bool,
    settings_path: Option<String>,
    pivot_count: Option<usize>,
    scale_x: Option<f64>,
    scale_y: Option<f64>,
    node_separation: Option<f64>,
    margin: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
}

#[derive(Debug, Deserialize)]
struct NodeIn {
    id: String,
    width: f64,
    height: f64,
    #[serde(default)]
    shape: ShapeKind,
}

#[derive(Debug, Deserialize)]
struct EdgeIn {
    #[serde(default)]
    id: Option<String>,
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct DocumentIn {
    #[serde(default)]
    nodes: Vec<NodeIn>,
    #[serde(default)]
    edges: Vec<EdgeIn>,
    #[serde(default)]
    settings: Option<LayoutSettings>,
}

#[derive(Serialize)]
struct NodeOut<'a> {
    id: &'a str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct EdgeOut<'a> {
    id: &'a str,
    source: &'a str,
    target: &'a str,
    points: Vec<[f64; 2]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    nodes: Vec<NodeOut<'a>>,
    edges: Vec<EdgeOut<'a>>,
    bounding_box: Rect,
}

fn usage() -> &'static str {
    "sirenia-cli\n\
\n\
USAGE:\n\
  sirenia-cli [--pretty] [--settings <json-file>] [--pivots <n>] [--scale-x <f>] [--scale-y <f>] [--separation <f>] [--margin <f>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph document is read from stdin.\n\
  - Input: {\"nodes\":[{\"id\",\"width\",\"height\",\"shape\"?}],\"edges\":[{\"id\"?,\"source\",\"target\"}],\"settings\"?:{...}}\n\
  - Flags override --settings, which overrides the document's own settings.\n\
  - Set SIRENIA_LOG (e.g. SIRENIA_LOG=debug) to log layout stages to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--settings" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.settings_path = Some(path.clone());
            }
            "--pivots" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.pivot_count = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--scale-x" => args.scale_x = Some(parse_f64(it.next())?),
            "--scale-y" => args.scale_y = Some(parse_f64(it.next())?),
            "--separation" => args.node_separation = Some(parse_f64(it.next())?),
            "--margin" => args.margin = Some(parse_f64(it.next())?),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn parse_f64(value: Option<&String>) -> Result<f64, CliError> {
    let Some(value) = value else {
        return Err(CliError::Usage(usage()));
    };
    value.parse::<f64>().map_err(|_| CliError::Usage(usage()))
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn resolve_settings(args: &Args, document: Option<LayoutSettings>) -> Result<LayoutSettings, CliError> {
    let mut settings = match args.settings_path.as_deref() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => document.unwrap_or_default(),
    };
    if let Some(v) = args.pivot_count {
        settings.pivot_count = v;
    }
    if let Some(v) = args.scale_x {
        settings.scale_x = v;
    }
    if let Some(v) = args.scale_y {
        settings.scale_y = v;
    }
    if let Some(v) = args.node_separation {
        settings.node_separation = v;
    }
    if let Some(v) = args.margin {
        settings.margin = v;
    }
    Ok(settings)
}

fn build_graph(nodes: Vec<NodeIn>, edges: Vec<EdgeIn>) -> Result<Graph, CliError> {
    let mut g = Graph::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for n in nodes {
        if !seen.insert(n.id.clone()) {
            return Err(CliError::Document(format!("duplicate node id `{}`", n.id)));
        }
        if !(n.width.is_finite() && n.width >= 0.0 && n.height.is_finite() && n.height >= 0.0) {
            return Err(CliError::Document(format!(
                "node `{}` needs a finite, non-negative size",
                n.id
            )));
        }
        let shape = match n.shape {
            ShapeKind::Rectangle => Shape::rectangle(n.width, n.height),
            ShapeKind::Ellipse => Shape::ellipse(n.width, n.height),
        };
        g.add_node(Node::new(n.id, shape));
    }

    seen.clear();
    for (i, e) in edges.into_iter().enumerate() {
        let id = e.id.unwrap_or_else(|| format!("e{i}"));
        if !seen.insert(id.clone()) {
            return Err(CliError::Document(format!("duplicate edge id `{id}`")));
        }
        g.add_edge(Edge::new(id, e.source, e.target));
    }
    Ok(g)
}

fn render_output(g: &Graph) -> LayoutOut<'_> {
    LayoutOut {
        nodes: g
            .nodes()
            .map(|n| NodeOut {
                id: &n.id,
                x: n.center.x,
                y: n.center.y,
                width: n.shape.width(),
                height: n.shape.height(),
            })
            .collect(),
        edges: g
            .edges()
            .iter()
            .map(|e| EdgeOut {
                id: &e.id,
                source: &e.source,
                target: &e.target,
                points: e
                    .curve
                    .as_ref()
                    .map(|c| c.points.iter().map(|p| [p.x, p.y]).collect())
                    .unwrap_or_default(),
            })
            .collect(),
        bounding_box: g.bounding_box(),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let document: DocumentIn = serde_json::from_str(&text)?;
    let settings = resolve_settings(&args, document.settings)?;
    let mut graph = build_graph(document.nodes, document.edges)?;

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "running ranking layout"
    );
    RankingLayout::new(settings).run(&mut graph)?;

    write_json(&render_output(&graph), args.pretty)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Layout(_)) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}
