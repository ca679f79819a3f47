use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kinetex::{Director, OutputFormat, Quality, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "kinetex", version, about = "Render the bundled liquidity explainer")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full video (MP4 needs `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render one snapshot as a PNG.
    Frame(FrameArgs),
    /// Print the cue list, or the JSON snapshot at a given time.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// JSON render config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    quality: Option<Quality>,

    /// Artifact file stem.
    #[arg(long)]
    name: Option<String>,

    /// Root output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Open the artifact when done.
    #[arg(long, default_value_t = false)]
    preview: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Timeline time in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = Quality::Low)]
    quality: Quality,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Print the snapshot at this time instead of the cue list.
    #[arg(long)]
    time: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    if let Some(q) = args.quality {
        cfg.quality = q;
    }
    if let Some(name) = args.name {
        cfg.output_name = name;
    }
    if let Some(dir) = args.out_dir {
        cfg.output_dir = dir;
    }
    if let Some(format) = args.format {
        cfg.format = format;
    }
    cfg.preview |= args.preview;

    let script = kinetex::script::liquidity::build().context("build liquidity script")?;
    let outcome = kinetex::render_script(script, &cfg)?;
    if let Some(reason) = &outcome.report.aborted {
        eprintln!("stopped early: {reason}");
    }
    println!("{}", outcome.path.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = kinetex::script::liquidity::build().context("build liquidity script")?;
    kinetex::render_still(script, args.quality, args.time, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let script = kinetex::script::liquidity::build().context("build liquidity script")?;
    let mut director = Director::new(script);
    match args.time {
        Some(t) => {
            director.advance_to(t)?;
            let snapshot = director.render_frame(t);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        None => {
            for row in director.timeline().summary() {
                println!(
                    "{:>3}  {:>7.2}s .. {:>7.2}s  {}",
                    row.index, row.start, row.end, row.label
                );
            }
            println!("total {:.2}s", director.timeline().duration());
        }
    }
    Ok(())
}
