//! joycal - Joystick calibration profile database.
//!
//! Provides both human-friendly and script-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use console::style;
use serde::Serialize;
use tracing::{debug, warn};

use joycal::cli::{self, Cli, Commands};
use joycal::config::Settings;
use joycal::db::{load_file, ControllerDb, Key, Profile, Reconciler, ReloadReport};
use joycal::error::{JoyError, Result, ResultExt};
use joycal::logging::init_logging;

/// Build information embedded at compile time.
mod build_info {
    pub const NAME: &str = env!("CARGO_PKG_NAME");
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
    }
    if cli.no_color || !io::stderr().is_terminal() {
        console::set_colors_enabled_stderr(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::List(args)) => cmd_list(cli, args),
        Some(Commands::Show(args)) => cmd_show(cli, args),
        Some(Commands::Find(args)) => cmd_find(cli, args),
        Some(Commands::Save(args)) => cmd_save(cli, args),
        Some(Commands::Remove(args)) => cmd_remove(cli, args),
        Some(Commands::Watch(args)) => cmd_watch(cli, args),
        Some(Commands::Path) => cmd_path(cli),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

// === Quick Start (Robot Mode Optimized) ===

fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        let help = RobotQuickStart {
            tool: build_info::NAME,
            version: build_info::VERSION,
            description: "Joystick calibration profiles stored as one editable file per device",
            queries: RobotQueries {
                list_profiles: "joycal list --robot",
                show_file: "joycal show <FILE> --robot",
                find_profile: "joycal find --vendor <HEX> --product <HEX> --robot",
            },
            edits: RobotEdits {
                save_profile: "joycal save --vendor <HEX> --product <HEX> --axis ABS_X=min,max,fuzz,flat,res",
                pin_fields: "--pin vendor,product (match any version and name)",
                remove_profile: "joycal remove <FILE>",
            },
            sync: "joycal watch --robot (one JSON line per reload)",
            output_modes: OutputModes {
                human: "--format=text (default)",
                robot: "--robot or --format=json",
                compact: "--format=json-compact",
            },
        };
        output_json(cli, &help)
    } else {
        print_human_quick_start();
        Ok(())
    }
}

fn print_human_quick_start() {
    println!(
        "{} {} - Joystick calibration profiles\n",
        style(build_info::NAME).bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  List saved profiles", style("joycal list").green());
    println!("  {}  Show one profile file", style("joycal show <FILE>").green());
    println!(
        "  {}  Profile for a device",
        style("joycal find --vendor 045e --product 028e").green()
    );
    println!(
        "  {}  Save a calibration",
        style("joycal save --vendor 045e --product 028e --axis ABS_X=-32768,32767,16,128,0").green()
    );
    println!("  {}  Reload on changes", style("joycal watch").green());
    println!("  {}  Profile directory", style("joycal path").green());
    println!();

    println!("{}", style("ROBOT MODE").bold().underlined());
    println!();
    println!("  {}  JSON output", style("joycal --robot <command>").cyan());
    println!("  {}  Quick-start JSON", style("joycal --robot").cyan());
    println!();

    println!("Run {} for full help", style("joycal --help").yellow());
}

// === Robot Mode JSON Structures ===

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    queries: RobotQueries,
    edits: RobotEdits,
    sync: &'static str,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct RobotQueries {
    list_profiles: &'static str,
    show_file: &'static str,
    find_profile: &'static str,
}

#[derive(Serialize)]
struct RobotEdits {
    save_profile: &'static str,
    pin_fields: &'static str,
    remove_profile: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

/// One loaded profile as printed by `list`, `show` and `find`.
#[derive(Serialize)]
struct ProfileEntry<'a> {
    key: &'a Key,
    #[serde(flatten)]
    profile: &'a Profile,
}

// === Database Setup ===

fn open_settings(cli: &Cli) -> Result<(Settings, PathBuf)> {
    let settings = Settings::load(cli.config.as_deref())?;
    let dir = settings.db_dir(cli.db_dir.as_deref())?;
    debug!(dir = %dir.display(), "Using profile directory");
    Ok((settings, dir))
}

/// Loads the database and reports rejected files on stderr.
fn open_db(cli: &Cli) -> Result<(Settings, Reconciler, ReloadReport)> {
    let (settings, dir) = open_settings(cli)?;
    let mut reconciler = Reconciler::polling(Arc::new(ControllerDb::new(dir)));
    let report = reconciler.initialize()?;
    if !cli.use_json() && !cli.quiet {
        print_issues(&report);
    }
    Ok((settings, reconciler, report))
}

// === Command Implementations ===

fn cmd_list(cli: &Cli, args: &cli::ListArgs) -> Result<()> {
    let (_, reconciler, _) = open_db(cli)?;
    let profiles = reconciler.db().list();

    if cli.use_json() {
        let entries: Vec<_> = profiles
            .iter()
            .map(|(key, profile)| ProfileEntry { key, profile })
            .collect();
        return output_json(cli, &entries);
    }

    if profiles.is_empty() {
        println!("{}", style("No profiles saved").yellow());
        println!("Profile directory: {}", reconciler.db().dir().display());
        return Ok(());
    }

    for (key, profile) in &profiles {
        print_profile_header(key, profile);
        if args.long {
            print_axes(profile);
        }
    }
    Ok(())
}

fn cmd_show(cli: &Cli, args: &cli::ShowArgs) -> Result<()> {
    let (_, dir) = open_settings(cli)?;
    let path = resolve_profile_path(&dir, &args.file);
    if !path.is_file() {
        return Err(JoyError::NotFound { path });
    }

    let (key, profile) = load_file(&path)?;
    if cli.use_json() {
        return output_json(cli, &ProfileEntry { key: &key, profile: &profile });
    }
    print_profile_header(&key, &profile);
    print_axes(&profile);
    Ok(())
}

fn cmd_find(cli: &Cli, args: &cli::IdentityArgs) -> Result<()> {
    let (vendor, product, version, name) = args.raw();
    let query = Key::from_raw(vendor, product, version, name);
    let (_, reconciler, _) = open_db(cli)?;
    let found = reconciler.db().find_key(&query);

    if cli.use_json() {
        return match &found {
            Some((key, profile)) => {
                let entry = ProfileEntry { key, profile };
                output_json(
                    cli,
                    &serde_json::json!({ "found": true, "query": query, "profile": entry }),
                )
            }
            None => output_json(cli, &serde_json::json!({ "found": false, "query": query })),
        };
    }

    match found {
        Some((key, profile)) => {
            print_profile_header(&key, &profile);
            print_axes(&profile);
        }
        None => println!("{} {query}", style("No profile matches").yellow()),
    }
    Ok(())
}

fn cmd_save(cli: &Cli, args: &cli::SaveArgs) -> Result<()> {
    let (vendor, product, version, name) = args.identity.raw();
    let profile: Profile = args.axes.iter().copied().collect();
    let (_, dir) = open_settings(cli)?;
    let db = ControllerDb::new(dir);

    let saved = db.save(vendor, product, version, name, profile, args.pin)?;
    let path = saved.path().map(Path::to_path_buf).unwrap_or_default();

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "saved": path,
                "axes": saved.axis_count(),
                "ok": true,
            }),
        )
    } else {
        if !cli.quiet {
            println!(
                "Saved {} axis calibration(s) to {}",
                saved.axis_count(),
                style(path.display()).green()
            );
        }
        Ok(())
    }
}

fn cmd_remove(cli: &Cli, args: &cli::RemoveArgs) -> Result<()> {
    let (_, dir) = open_settings(cli)?;
    let db = ControllerDb::new(dir);
    let removed = db.remove(&args.file)?;

    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "removed": removed, "ok": true }))
    } else {
        if !cli.quiet {
            println!("Removed {}", removed.display());
        }
        Ok(())
    }
}

fn cmd_watch(cli: &Cli, args: &cli::WatchArgs) -> Result<()> {
    let (settings, mut reconciler, initial) = open_db(cli)?;
    let dir = reconciler.db().dir().to_path_buf();
    report_reload(cli, &dir, &initial);

    if !settings.watch.enabled {
        warn!("Watching is disabled in the settings file");
        reconciler.finalize();
        return Ok(());
    }

    let interval = args
        .interval_ms
        .map_or_else(|| settings.watch.poll_interval(), Duration::from_millis);
    if interval.is_zero() {
        return Err(JoyError::InvalidArgument(
            "--interval-ms must be greater than zero".to_string(),
        ));
    }

    if !cli.quiet && !cli.use_json() {
        println!("Watching {} (Ctrl+C to stop)...", dir.display());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to start async runtime")?;

    let timeout = args.timeout;
    runtime.block_on(async {
        let shutdown = async move {
            if timeout == 0 {
                wait_for_ctrl_c().await;
            } else {
                tokio::select! {
                    () = wait_for_ctrl_c() => {}
                    () = tokio::time::sleep(Duration::from_secs(timeout)) => {}
                }
            }
        };
        reconciler
            .run(interval, shutdown, |report| {
                if !cli.use_json() && !cli.quiet {
                    print_issues(report);
                }
                report_reload(cli, &dir, report);
            })
            .await;
    });

    reconciler.finalize();
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Prints one line per reload; JSON lines are always compact.
fn report_reload(cli: &Cli, dir: &Path, report: &ReloadReport) {
    if cli.use_json() {
        let line = serde_json::json!({
            "event": "reload",
            "dir": dir,
            "summary": report.summary(),
        });
        println!("{line}");
    } else if !cli.quiet {
        println!(
            "{} {} profile(s), {} issue(s)",
            style("Loaded").green(),
            report.loaded,
            report.issues.len()
        );
    }
}

fn cmd_path(cli: &Cli) -> Result<()> {
    let (_, dir) = open_settings(cli)?;
    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "dir": dir }))
    } else {
        println!("{}", dir.display());
        Ok(())
    }
}

fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "name": build_info::NAME,
                "version": build_info::VERSION,
            }),
        )
    } else {
        println!("{} {}", build_info::NAME, build_info::VERSION);
        Ok(())
    }
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(
        args.shell,
        &mut Cli::command(),
        build_info::NAME,
        &mut io::stdout(),
    );
    Ok(())
}

// === Utility Functions ===

/// A bare file name refers to the profile directory unless it exists locally.
fn resolve_profile_path(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() || file.exists() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}

fn print_profile_header(key: &Key, profile: &Profile) {
    let file = profile
        .path()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!(
        "{}  {} axis(es)  {}",
        style(key).green(),
        profile.axis_count(),
        style(file).dim()
    );
}

fn print_axes(profile: &Profile) {
    for (axis, cal) in profile.axes() {
        println!(
            "  {:<16} min={} max={} fuzz={} flat={} res={}{}",
            axis.name(),
            cal.min,
            cal.max,
            cal.fuzz,
            cal.flat,
            cal.res,
            if cal.flat_centered { " center" } else { "" }
        );
    }
}

fn print_issues(report: &ReloadReport) {
    for issue in &report.issues {
        eprintln!("{}: {}", style("Skipped").yellow(), issue);
    }
}

fn output_json<T: Serialize>(cli: &Cli, data: &T) -> Result<()> {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    }
    .with_context(|| "Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn output_error(cli: &Cli, error: &JoyError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json}");
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
