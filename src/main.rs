use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use tracing::{error, info, info_span, warn};
use tracing_subscriber::EnvFilter;

use capforge::layout::{self, DEFAULT_MAX_WORDS};
use capforge::{
    parser, CaptionConfig, CaptionEngine, CaptionMode, Effect, FloorReclaim, IntroHandling,
    OutputFormat,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => (),
        Err(err) => {
            error!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                error!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Generate timed caption tracks for narrated videos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a caption track from a script and its timeline.
    Render(RenderArgs),
    /// Parse an existing ASS track and report events with empty windows.
    Check {
        #[arg(value_name = "FILE")]
        track: PathBuf,
    },
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The script to caption, one segment per line. If not supplied, the script will be read from standard input.",
        default_value = "-"
    )]
    script: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Segment boundaries in seconds, separated by whitespace or commas."
    )]
    timeline: PathBuf,
    #[arg(short, long, value_name = "FILE", help = "JSON caption config.")]
    config: Option<PathBuf>,
    #[arg(short, long, value_name = "FILE", help = "Where to write the track.")]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long, value_enum)]
    mode: Option<CaptionMode>,
    #[arg(long = "intro-handling", value_enum)]
    intro_handling: Option<IntroHandling>,
    #[arg(long, help = "Track end time cap, in seconds.")]
    max_duration: Option<f64>,
    #[arg(long, help = "Words per caption line in line mode; 0 disables wrapping.")]
    wrap_width: Option<usize>,
    #[arg(long, allow_hyphen_values = true, help = "Word start shift in seconds.")]
    timing_offset: Option<f64>,
    #[arg(long, help = "Minimum display time per word, in seconds.")]
    min_word_duration: Option<f64>,
    #[arg(long, value_enum)]
    floor_reclaim: Option<FloorReclaim>,
    #[arg(long, help = "Animate every caption with the word-pop effect.")]
    animate: bool,
    #[arg(
        long,
        help = "Treat the script as prose and split it into segments at sentence breaks."
    )]
    split: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_WORDS, help = "Maximum words per split segment.")]
    max_words: usize,
    #[arg(short, long, value_name = "TEXT", help = "Prepend an intro segment.")]
    intro: Option<String>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Render(args) => render(args),
        Command::Check { track } => check(track),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let script = if args.script == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&args.script)
            .context(format!("Failed to open script file: '{}'", args.script))?
    };

    let mut segments: Vec<String> = if args.split {
        layout::split_for_shorts(&script, args.max_words)
    } else {
        script
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    };
    if let Some(intro) = &args.intro {
        segments.insert(0, intro.clone());
    }
    if segments.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty script."));
    }

    let timeline_text = std::fs::read_to_string(&args.timeline).context(format!(
        "Failed to open timeline file: '{}'",
        args.timeline.display()
    ))?;
    let timeline = parser::parse_timeline(&timeline_text).context(format!(
        "Failed to parse timeline file: '{}'",
        args.timeline.display()
    ))?;

    let config = load_config(&args)?;
    let engine = CaptionEngine::new(config).with_span(info_span!("render", segments = segments.len()));
    let rendered = engine
        .generate(&segments, &timeline)
        .context("Failed to generate captions")?;

    info!(
        "Track ends at {:.2}s: {}",
        rendered.end_time,
        rendered.path.display()
    );
    println!("{}", rendered.end_time);
    Ok(())
}

fn load_config(args: &RenderArgs) -> Result<CaptionConfig> {
    let mut config = match &args.config {
        Some(path) => CaptionConfig::from_file(path)
            .context(format!("Failed to load config: '{}'", path.display()))?,
        None => CaptionConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(intro) = args.intro_handling {
        config.intro = intro;
    }
    if let Some(max) = args.max_duration {
        config.max_duration = max;
    }
    if let Some(width) = args.wrap_width {
        config.wrap_width = if width == 0 { None } else { Some(width) };
    }
    if let Some(offset) = args.timing_offset {
        config.timing_offset = offset;
    }
    if let Some(floor) = args.min_word_duration {
        config.min_word_duration = floor;
    }
    if let Some(policy) = args.floor_reclaim {
        config.floor_reclaim = policy;
    }
    if args.animate {
        config.effect = Some(Effect::word_pop());
    }
    Ok(config)
}

fn check(path: PathBuf) -> Result<()> {
    let data = std::fs::read_to_string(&path)
        .context(format!("Failed to open track: '{}'", path.display()))?;
    let events = parser::parse_track(&data)
        .context(format!("Failed to parse track: '{}'", path.display()))?;

    let mut degenerate = 0;
    for (i, event) in events.iter().enumerate() {
        if event.end <= event.start {
            degenerate += 1;
            warn!(
                "Event {} has an empty window ({:.2}s to {:.2}s): {}",
                i + 1,
                event.start,
                event.end,
                event.text.lines.join(" / ")
            );
        }
    }

    info!("{} events, {} with empty windows", events.len(), degenerate);
    if degenerate > 0 {
        return Err(anyhow!("{} events would never be displayed", degenerate));
    }
    Ok(())
}
