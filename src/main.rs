use anyhow::{bail, Context, Result};
use clap::Parser;
use pictograph::{parser, ChartData, Graph, GraphOptions, Outcome};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pictograph")]
#[command(about = "Render count pictograms, bar and pie charts as SVG, bitmap or text", long_about = None)]
struct Args {
    /// Inline data: 'red:3, green:2' (counts), '5, 2' (values) or '5, 2; 3, 4' (groups)
    data: Option<String>,

    /// Read data rows ('label,count' or numeric rows) from a CSV file, '-' for stdin
    #[arg(long, conflicts_with = "data")]
    csv: Option<PathBuf>,

    /// JSON file with a 'data' key and graph options; flags override its keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output type: svg, png, jpg, gif or txt
    #[arg(short = 't', long = "type")]
    kind: Option<String>,

    /// Chart style: circle, cross, manikin, bar or pie
    #[arg(short, long)]
    style: Option<String>,

    /// Wrap the grid after this many items
    #[arg(short, long)]
    columns: Option<usize>,

    #[arg(long)]
    item_width: Option<u32>,

    #[arg(long)]
    item_height: Option<u32>,

    /// Extra inset inside every cell
    #[arg(long)]
    inner_margin: Option<u32>,

    /// Canvas width override
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height override
    #[arg(long)]
    height: Option<u32>,

    /// Bar track length and pie diameter
    #[arg(long)]
    track_length: Option<u32>,

    /// Comma-separated colors, one per category
    #[arg(long, value_delimiter = ',')]
    colors: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    group_labels: Vec<String>,

    /// Comma-separated glyphs for text output
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    background_color: Option<String>,

    /// Write the graph to this file instead of stdout
    #[arg(short = 'o', long)]
    filename: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log layout and backend details to stderr
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Option keys given on the command line, in graph option names
    fn option_overrides(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut set = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };
        set("type", self.kind.as_ref().map(|v| json!(v)));
        set("style", self.style.as_ref().map(|v| json!(v)));
        set("columns", self.columns.map(|v| json!(v)));
        set("item_width", self.item_width.map(|v| json!(v)));
        set("item_height", self.item_height.map(|v| json!(v)));
        set("inner_margin", self.inner_margin.map(|v| json!(v)));
        set("width", self.width.map(|v| json!(v)));
        set("height", self.height.map(|v| json!(v)));
        set("track_length", self.track_length.map(|v| json!(v)));
        set("title", self.title.as_ref().map(|v| json!(v)));
        set("background_color", self.background_color.as_ref().map(|v| json!(v)));
        for (key, list) in [
            ("colors", &self.colors),
            ("labels", &self.labels),
            ("group_labels", &self.group_labels),
            ("symbols", &self.symbols),
        ] {
            set(key, (!list.is_empty()).then(|| json!(list)));
        }
        map
    }
}

fn init_logging(args: &Args) {
    let filter_layer = if args.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if args.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_config(path: &Path) -> Result<Map<String, Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    match serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config '{}'", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("Config '{}' must be a JSON object", path.display()),
    }
}

fn read_csv(path: &Path) -> Result<ChartData> {
    let data = if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read CSV from stdin")?;
        ChartData::from_csv_reader(input.as_bytes())?
    } else {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open CSV '{}'", path.display()))?;
        ChartData::from_csv_reader(file)?
    };
    Ok(data)
}

/// Assemble data and options from config file, CSV and flags into a graph
fn build_graph(args: &Args) -> Result<Graph> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => Map::new(),
    };
    config.extend(args.option_overrides());

    let data = if let Some(expr) = &args.data {
        parser::parse_data(expr)?
    } else if let Some(path) = &args.csv {
        read_csv(path)?
    } else if let Some(data) = config.get("data") {
        ChartData::from_json(data)?
    } else {
        bail!("No data given: pass inline data, --csv or a --config with a 'data' key");
    };

    let mut options = GraphOptions::from_json(&Value::Object(config))?;
    // set after deserializing so non-UTF-8 paths survive
    if let Some(path) = &args.filename {
        options.filename = Some(path.clone());
    }

    Ok(Graph::new(data, options)?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);
    debug!(?args, "arguments");

    let graph = build_graph(&args)?;
    let outcome = graph.render().context("Failed to render graph")?;

    match outcome {
        Outcome::Saved(path) => info!(path = %path.display(), "graph written"),
        Outcome::Rendered(rendered) => match rendered.as_text() {
            Some(text) => println!("{}", text),
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(rendered.as_bytes())
                    .context("Failed to write image to stdout")?;
                handle.flush().context("Failed to flush stdout")?;
            }
        },
    }

    Ok(())
}
