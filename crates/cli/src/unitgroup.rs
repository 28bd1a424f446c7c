//! unitgroup - Group recognized glyph units into text regions
//!
//! Reads a JSON document of minimum units (and optional separator lines)
//! produced by a recognizer, groups them, and writes the regions as JSON or
//! plain text.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;
use unitgroup_core::{
    GroupedRegion, GroupedResult, Grouper, GroupingParams, LineSegment, MergeThresholdKind,
    MinimumUnit, ObstructionIndex, Point, Quad, UnitType, sort_reading_order,
};

/// Output format for grouped regions.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// JSON object with accepted and low_confidence lists (default)
    #[default]
    Json,
    /// One region per line: text, confidence, bounds
    Text,
}

/// Merge threshold strategy.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Strategy {
    /// Fixed 15 px gap tolerance
    #[default]
    Fixed,
    /// Adaptive placeholder (never merges)
    Adaptive,
}

impl From<Strategy> for MergeThresholdKind {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Fixed => MergeThresholdKind::Fixed,
            Strategy::Adaptive => MergeThresholdKind::AdaptiveInference,
        }
    }
}

/// Group recognized glyph units into word and phrase regions.
#[derive(Parser, Debug)]
#[command(name = "unitgroup")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the input JSON document, or "-" for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Regions at or below this confidence (0-1) are reported as low confidence
    #[arg(short = 'c', long = "confidence-threshold", default_value = "0.8")]
    confidence_threshold: f64,

    /// Merge threshold strategy
    #[arg(short = 's', long, value_enum, default_value = "fixed")]
    strategy: Strategy,

    /// Sort units into reading order before grouping
    #[arg(long, action = ArgAction::SetTrue)]
    sort: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Output format
    #[arg(short = 't', long = "format", value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Deserialize)]
struct InputDocument {
    units: Vec<UnitInput>,
    #[serde(default)]
    lines: Option<Vec<[[f64; 2]; 2]>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UnitTypeInput {
    #[default]
    Cjk,
    Latin,
    Number,
    Punctuation,
    CharWithJoin,
    TableLine,
}

impl From<UnitTypeInput> for UnitType {
    fn from(t: UnitTypeInput) -> Self {
        match t {
            UnitTypeInput::Cjk => UnitType::Cjk,
            UnitTypeInput::Latin => UnitType::Latin,
            UnitTypeInput::Number => UnitType::Number,
            UnitTypeInput::Punctuation => UnitType::Punctuation,
            UnitTypeInput::CharWithJoin => UnitType::CharWithJoin,
            UnitTypeInput::TableLine => UnitType::TableLine,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UnitInput {
    text: String,
    confidence: f64,
    #[serde(rename = "type", default)]
    unit_type: UnitTypeInput,
    #[serde(default)]
    hard_break: bool,
    /// upper-left, upper-right, lower-right, lower-left
    corners: [[i32; 2]; 4],
}

impl UnitInput {
    fn into_unit(self) -> MinimumUnit {
        let [ul, ur, lr, ll] = self.corners.map(|[x, y]| Point::new(x, y));
        MinimumUnit::builder(&self.text, Quad::new(ul, ur, lr, ll))
            .confidence(self.confidence)
            .unit_type(self.unit_type.into())
            .hard_break(self.hard_break)
            .build()
    }
}

#[derive(Debug, Serialize)]
struct BoundsOutput {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[derive(Debug, Serialize)]
struct RegionOutput<'a> {
    text: &'a str,
    confidence: u8,
    bounds: BoundsOutput,
}

impl<'a> From<&'a GroupedRegion> for RegionOutput<'a> {
    fn from(r: &'a GroupedRegion) -> Self {
        Self {
            text: &r.text,
            confidence: r.confidence,
            bounds: BoundsOutput {
                x: r.bounds.x,
                y: r.bounds.y,
                width: r.bounds.width,
                height: r.bounds.height,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultOutput<'a> {
    accepted: Vec<RegionOutput<'a>>,
    low_confidence: Vec<RegionOutput<'a>>,
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(path: &str) -> Result<InputDocument> {
    let mut raw = String::new();
    if path == "-" {
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
    } else {
        let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
        BufReader::new(file)
            .read_to_string(&mut raw)
            .with_context(|| format!("failed to read {path}"))?;
    }
    serde_json::from_str(&raw).context("input is not a valid unit document")
}

fn build_params(args: &Args) -> Result<GroupingParams> {
    Ok(GroupingParams::new(
        args.confidence_threshold,
        args.strategy.into(),
    )?)
}

fn write_text(out: &mut dyn Write, result: &GroupedResult) -> io::Result<()> {
    let lists = [("", &result.accepted), ("?", &result.low_confidence)];
    for (marker, regions) in lists {
        for r in regions {
            writeln!(
                out,
                "{marker}{}\t{}\t{},{},{},{}",
                r.text.trim_end(),
                r.confidence,
                r.bounds.x,
                r.bounds.y,
                r.bounds.width,
                r.bounds.height
            )?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let params = build_params(args)?;
    let doc = read_input(&args.input)?;

    let mut units: Vec<MinimumUnit> = doc.units.into_iter().map(UnitInput::into_unit).collect();
    if args.sort {
        sort_reading_order(&mut units, params.same_line_tolerance);
    }
    let index = doc.lines.map(|lines| {
        ObstructionIndex::new(
            lines
                .into_iter()
                .map(|[[x1, y1], [x2, y2]]| LineSegment::new((x1, y1), (x2, y2))),
        )
    });

    let unit_count = units.len();
    let result = Grouper::default()
        .group(units, index.as_ref(), &params)
        .context("grouping failed")?;
    info!(
        units = unit_count,
        accepted = result.accepted.len(),
        low_confidence = result.low_confidence.len(),
        "grouped"
    );

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    match args.format {
        OutputFormat::Json => {
            let out = ResultOutput {
                accepted: result.accepted.iter().map(RegionOutput::from).collect(),
                low_confidence: result.low_confidence.iter().map(RegionOutput::from).collect(),
            };
            serde_json::to_writer_pretty(&mut output, &out)?;
            writeln!(output)?;
        }
        OutputFormat::Text => write_text(&mut output, &result)?,
    }
    output.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);
    run(&args)
}
