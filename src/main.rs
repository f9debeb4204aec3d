use aqmap::{ControlValues, Dashboard, Pollutant, Settings};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aqmap")]
#[command(author, version, about = "Explore exposure and mortality maps for China under emission scenarios")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Data directory with the scenario tables (optional in GUI mode)
    data_dir: Option<PathBuf>,

    /// Launch GUI folder picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// Fractional residential emissions
    #[arg(long, default_value = "1.0")]
    res: f64,

    /// Fractional industrial emissions
    #[arg(long, default_value = "1.0")]
    ind: f64,

    /// Fractional land transport emissions
    #[arg(long, default_value = "1.0")]
    tra: f64,

    /// Fractional agricultural emissions
    #[arg(long, default_value = "1.0")]
    agr: f64,

    /// Fractional power generation emissions
    #[arg(long, default_value = "1.0")]
    ene: f64,

    /// Output report file (.html, .json, .csv, .svg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Pollutant to show (PM2_5_DRY or O3_6mDM8h)
    #[arg(long)]
    pollutant: Option<Pollutant>,

    /// Settings file (default: <DATA_DIR>/aqmap.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI
    Serve {
        /// Data directory with the scenario tables
        data_dir: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show which scenario keys each table covers
    Keys {
        /// Data directory with the scenario tables
        data_dir: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    // Handle subcommands first
    if let Some(cmd) = &args.command {
        match cmd {
            Command::Serve { data_dir, port } => {
                let settings = settings_or_exit(&args, data_dir.as_deref());
                let port = port.unwrap_or(settings.port);
                let dashboard = dashboard_or_exit(&settings);
                if let Err(e) = aqmap::serve::start(port, dashboard, !args.no_open) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
            }
            Command::Keys { data_dir } => {
                let settings = settings_or_exit(&args, data_dir.as_deref());
                print_coverage(&dashboard_or_exit(&settings));
            }
        }
        return;
    }

    // Determine if we should use GUI mode
    // With GUI feature: launch GUI if --gui flag OR no data dir provided
    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.data_dir.is_none();

    #[cfg(not(feature = "gui"))]
    let use_gui = false;

    #[cfg(feature = "gui")]
    let data_dir = match (&args.data_dir, use_gui) {
        (Some(dir), false) => dir.clone(),
        _ => match pick_data_dir_gui() {
            Some(dir) => dir,
            None => {
                eprintln!("No data folder selected.");
                std::process::exit(0);
            }
        },
    };

    #[cfg(not(feature = "gui"))]
    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"));

    let settings = settings_or_exit(&args, Some(&data_dir));
    let mut dashboard = dashboard_or_exit(&settings);

    let controls = ControlValues {
        res: args.res,
        ind: args.ind,
        tra: args.tra,
        agr: args.agr,
        ene: args.ene,
    };
    let update = match dashboard.apply(controls) {
        Ok(update) => update,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !args.quiet {
        eprintln!("\x1b[1maqmap - Emission scenario maps\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Scenario: {}\n", update.key);
        for panel in &update.panels {
            eprintln!("  {}", panel.title);
        }
        for notice in &update.notices {
            eprintln!("  \x1b[33m! {}\x1b[0m", notice);
        }
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        std::fs::create_dir_all(&settings.report_dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("aqmap_report_{}.html", timestamp);
        Some(settings.report_dir.join(filename))
    } else {
        None
    };

    // Generate report
    if let Some(ref output_path) = report_path {
        if let Err(e) = aqmap::report::generate(output_path, &dashboard) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }

        if !args.no_open {
            if use_gui {
                // In GUI mode, auto-open the report (no prompt)
                let _ = open::that(output_path);
            } else if !args.quiet {
                eprint!("\nOpen report in browser? [Y/n] ");
                io::stderr().flush().ok();

                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_ok() {
                    let input = input.trim().to_lowercase();
                    if input.is_empty() || input == "y" || input == "yes" {
                        if let Err(e) = open::that(output_path) {
                            eprintln!("Failed to open report: {}", e);
                        }
                    }
                }
            }
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "aqmap=debug"
    } else if quiet {
        "aqmap=warn"
    } else {
        "aqmap=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Settings from `--config` or the data dir, with command-line overrides
fn settings_or_exit(args: &Args, data_dir: Option<&Path>) -> Settings {
    let data_dir = data_dir.unwrap_or_else(|| Path::new("data"));
    let loaded = match &args.config {
        Some(path) => Settings::from_file(path).map(|mut s| {
            s.data_dir = data_dir.to_path_buf();
            s
        }),
        None => Settings::discover(data_dir),
    };

    let mut settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to read settings: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(pollutant) = args.pollutant {
        settings.pollutant = pollutant;
    }
    if let Some(ref dir) = args.report_dir {
        settings.report_dir = dir.clone();
    }
    settings
}

fn dashboard_or_exit(settings: &Settings) -> Dashboard {
    match Dashboard::load(settings) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Failed to load {}: {}", settings.data_dir.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_coverage(dashboard: &Dashboard) {
    println!("{:<28} {:>8} {:>8} {:>8}  {}", "TABLE", "REGIONS", "KEYS", "COVER", "DEFAULT");
    println!("{}", "-".repeat(70));
    let coverage = dashboard.coverage();
    for c in &coverage {
        println!(
            "{:<28} {:>8} {:>8} {:>7.2}%  {}",
            c.table,
            c.regions,
            c.present,
            c.percent(),
            if c.has_default { "yes" } else { "\x1b[31mmissing\x1b[0m" }
        );
    }

    // One-slider moves from the default are the scenarios users reach first
    for c in coverage.iter().filter(|c| !c.missing_variants.is_empty()) {
        println!("\n{}: {} single-sector variant(s) missing", c.table, c.missing_variants.len());
        for key in &c.missing_variants {
            println!("  \x1b[33m{}\x1b[0m", key);
        }
    }
}

#[cfg(feature = "gui")]
fn pick_data_dir_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select the scenario data folder")
        .pick_folder()
}
