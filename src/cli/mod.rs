//! CLI argument definitions and value parsers.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::db::{Axis, AxisCalibration, PinnedFields};
use crate::error::JoyError;

/// joycal - Joystick calibration profile database.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "joycal", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "JOYCAL_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub no_color: bool,

    /// Settings file (default: <config dir>/joycal/config.toml)
    #[arg(long, global = true, env = "JOYCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile directory, overriding the settings file
    #[arg(long, global = true, env = "JOYCAL_DB_DIR")]
    pub db_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Queries ===
    /// List saved profiles
    List(ListArgs),

    /// Decode and print one profile file
    Show(ShowArgs),

    /// Find the profile that applies to a device identity
    Find(IdentityArgs),

    // === Edits ===
    /// Save a calibration profile for a device identity
    Save(SaveArgs),

    /// Delete a profile file
    Remove(RemoveArgs),

    // === Sync ===
    /// Watch the profile directory and reload on changes
    Watch(WatchArgs),

    // === Utilities ===
    /// Print the profile directory
    Path,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show per-axis calibration values
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Profile file name (inside the profile directory) or path
    pub file: PathBuf,
}

/// Device identity; omitted fields are unknown.
#[derive(Parser, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// USB vendor id (hex, e.g. 045e)
    #[arg(long, value_parser = parse_hex_u16)]
    pub vendor: Option<u16>,

    /// USB product id (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    pub product: Option<u16>,

    /// Device version (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    pub dev_version: Option<u16>,

    /// Device name as reported by the kernel
    #[arg(long)]
    pub name: Option<String>,
}

impl IdentityArgs {
    /// Identity in the raw form used by the database, `0`/`""` for unknown.
    pub fn raw(&self) -> (u16, u16, u16, &str) {
        (
            self.vendor.unwrap_or(0),
            self.product.unwrap_or(0),
            self.dev_version.unwrap_or(0),
            self.name.as_deref().unwrap_or(""),
        )
    }
}

#[derive(Parser, Debug)]
pub struct SaveArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Identity fields the profile should match on: all, none, or a list
    /// such as vendor,product
    #[arg(long, default_value = "all", value_parser = parse_pinned)]
    pub pin: PinnedFields,

    /// Axis calibration, AXIS=min,max,fuzz,flat,res[,center]
    /// (e.g. ABS_X=-32768,32767,16,128,0,center)
    #[arg(long = "axis", value_parser = parse_axis_spec, required = true)]
    pub axes: Vec<(Axis, AxisCalibration)>,
}

#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Profile file name (inside the profile directory) or path
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, short = 't', default_value = "0")]
    pub timeout: u64,

    /// Poll interval in milliseconds (default from settings)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{s}' is not a 16-bit hex number: {e}"))
}

fn parse_pinned(s: &str) -> Result<PinnedFields, String> {
    s.parse().map_err(|e: JoyError| e.to_string())
}

/// Parses `AXIS=min,max,fuzz,flat,res[,center]`.
pub fn parse_axis_spec(s: &str) -> Result<(Axis, AxisCalibration), String> {
    let (name, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected AXIS=min,max,fuzz,flat,res, got '{s}'"))?;
    let axis: Axis = name.trim().parse().map_err(|e| format!("{e}"))?;

    let mut parts: Vec<&str> = values.split(',').map(str::trim).collect();
    let centered = matches!(parts.last(), Some(&("center" | "centered")));
    if centered {
        parts.pop();
    }
    if parts.len() != 5 {
        return Err(format!(
            "{axis}: expected 5 values (min,max,fuzz,flat,res), got {}",
            parts.len()
        ));
    }

    let mut numbers = [0_i32; 5];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("{axis}: '{part}' is not an integer"))?;
    }
    let [min, max, fuzz, flat, res] = numbers;

    let mut calibration = AxisCalibration::new(min, max, fuzz, flat, res);
    calibration.flat_centered = centered;
    Ok((axis, calibration))
}
