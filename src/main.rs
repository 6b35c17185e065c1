use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use graph_nav_rs::render::{default_svg_output_path, draw_view};
use graph_nav_rs::{build_index, initialize, Flight, NavConfig, NavContext};

#[derive(Parser)]
#[command(author, version, about = "Index and navigate rendered graph SVGs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the node label to bounds index as JSON.
    #[command(name = "index")]
    Index {
        #[command(flatten)]
        nav: NavArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the view reached by flying to a node, one JSON object per line.
    #[command(name = "fly")]
    Fly {
        #[command(flatten)]
        nav: NavArgs,
        #[arg(long)]
        node: Option<String>,
        #[arg(long, default_value_t = false)]
        frames: bool,
    },
    /// Render the view framing a node to PNG and SVG.
    #[command(name = "draw_view")]
    DrawView {
        #[command(flatten)]
        nav: NavArgs,
        #[arg(long)]
        node: Option<String>,
        #[arg(long, default_value = "view.png")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct NavArgs {
    #[arg(long)]
    input: PathBuf,
    /// YAML file with viewport options and preferred labels.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    min_zoom: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    max_zoom: Option<f64>,
    #[arg(long)]
    zoom_snap: Option<f64>,
    #[arg(long, default_value_t = false)]
    no_bounce: bool,
    /// Label to prefer for the initial node; repeat in priority order.
    #[arg(long = "prefer")]
    prefer: Vec<String>,
    #[arg(long, default_value_t = false)]
    skip_invalid_nodes: bool,
}

impl NavArgs {
    fn config(&self) -> Result<NavConfig> {
        let mut config = match &self.config {
            Some(path) => NavConfig::from_yaml_file(path)?,
            None => NavConfig::default(),
        };
        let viewport = &mut config.viewport;
        if let Some(width) = self.width {
            viewport.width = width;
        }
        if let Some(height) = self.height {
            viewport.height = height;
        }
        if let Some(min_zoom) = self.min_zoom {
            viewport.min_zoom = min_zoom;
        }
        if let Some(max_zoom) = self.max_zoom {
            viewport.max_zoom = max_zoom;
        }
        if let Some(zoom_snap) = self.zoom_snap {
            viewport.zoom_snap = zoom_snap;
        }
        if self.no_bounce {
            viewport.bounce_at_zoom_limits = false;
        }
        if !self.prefer.is_empty() {
            config.preferred_labels = self.prefer.clone();
        }
        config.skip_invalid_nodes |= self.skip_invalid_nodes;
        Ok(config)
    }

    fn read_input(&self) -> Result<String> {
        fs::read_to_string(&self.input).with_context(|| format!("Failed to read {:?}", self.input))
    }

    fn setup(&self) -> Result<NavContext> {
        let text = self.read_input()?;
        let config = self.config()?;
        initialize(&text, &config).with_context(|| format!("Failed to set up {:?}", self.input))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("graph_nav_rs=info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Index { nav, output } => write_index(&nav, output.as_deref()),
        Command::Fly { nav, node, frames } => fly(&nav, node.as_deref(), frames),
        Command::DrawView { nav, node, output } => {
            let mut context = nav.setup()?;
            if let Some(node) = node.as_deref() {
                context.select(node)?;
            }
            let svg_path = default_svg_output_path(&output);
            draw_view(&context, &output, &svg_path)
        }
    }
}

fn write_index(nav: &NavArgs, output: Option<&Path>) -> Result<()> {
    let text = nav.read_input()?;
    let config = nav.config()?;
    let index = build_index(&text, config.skip_invalid_nodes)
        .with_context(|| format!("Failed to index {:?}", nav.input))?;
    let json = serde_json::to_string_pretty(&index)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn fly(nav: &NavArgs, node: Option<&str>, frames: bool) -> Result<()> {
    let mut context = nav.setup()?;
    let flight: Flight = match node {
        Some(node) => context.select(node)?,
        None => context.initial_flight().clone(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if frames {
        for (tick, frame) in flight.frames().iter().enumerate() {
            writeln!(out, "{}", json!({ "frame": tick, "view": frame }))?;
        }
    }
    writeln!(
        out,
        "{}",
        json!({
            "node": context.focus(),
            "duration_secs": flight.duration_secs(),
            "viewport": context.viewport().options(),
            "view": flight.target(),
        })
    )?;
    Ok(())
}
