use chrono::Utc;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use easyframe::imaging::{BorderColor, Quality, RustBackend};
use easyframe::layout::{CanvasTarget, FixedBorder};
use easyframe::mode::{self, ModeOverrides};
use easyframe::process::{self, FrameJob, ProcessEvent};
use easyframe::profile::{DEFAULT_PROFILE, ProfileStore};
use easyframe::{config, logging, naming, output};
use std::path::{Path, PathBuf};

/// Options shared by `frame` and `plan`.
#[derive(clap::Args, Clone, Debug)]
struct FrameArgs {
    /// Image files or folders (folders are scanned one level deep)
    inputs: Vec<PathBuf>,

    /// Use this profile instead of the active one
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Fixed border: 1, 2 or 4 values in px or %, e.g. "20" or "10,5%"
    #[arg(long, value_name = "SPEC")]
    border_size: Option<FixedBorder>,

    /// Fit into a canvas: "1080" (longer side) or "1080,1350"
    #[arg(long, value_name = "SPEC")]
    output_size: Option<CanvasTarget>,

    /// Smallest border allowed when fitting into a canvas
    #[arg(long, value_name = "PX")]
    min_border: Option<u32>,

    /// Border color as R,G,B or #rrggbb
    #[arg(long, value_name = "COLOR")]
    border_color: Option<BorderColor>,

    /// Exact output file (single input only)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Replace the source files
    #[arg(long)]
    overwrite: bool,

    /// JPEG quality
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
}

impl FrameArgs {
    fn overrides(&self) -> ModeOverrides {
        ModeOverrides {
            border_size: self.border_size.clone(),
            output_size: self.output_size,
            min_border: self.min_border,
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
struct PlanArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// Print the plans as JSON
    #[arg(long)]
    json: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("EASYFRAME_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("EASYFRAME_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "easyframe")]
#[command(about = "Add borders to photos, by border size or by output canvas")]
#[command(long_about = "\
Add borders to photos, by border size or by output canvas

Two ways to size the frame:

  border size    every side gets a fixed border, in px or % of the longer side
                   --border-size 20          20px all around
                   --border-size 10,5%       10px left/right, 5% top/bottom
                   --border-size 1,2,3,4     left, top, right, bottom
  output size    the photo is scaled to fit a canvas and centered
                   --output-size 1080,1350   exact canvas, e.g. Instagram portrait
                   --output-size 1080        longer side only, no border
                   --min-border 16           keep at least 16px around the photo

Settings live in the settings directory (--settings-dir, $EASYFRAME_HOME):

  settings.toml              active profile, mode priority, worker count, logging
  profiles/<name>.json       saved frame settings
  logs/app.log               debug log, rotated on startup

Run 'easyframe gen-config' to print a documented settings.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Settings directory [env: EASYFRAME_HOME]
    #[arg(long, value_name = "DIR", global = true)]
    settings_dir: Option<PathBuf>,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    frame: FrameArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Frame images (the default when no command is given)
    Frame(FrameArgs),
    /// Show what framing would do without writing anything
    Plan(PlanArgs),
    /// Manage saved profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Print a stock settings.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// List profiles, marking the active one
    List,
    /// Print a profile (the active one by default)
    Show { name: Option<String> },
    /// Create a profile from the defaults or from another profile
    Create {
        name: String,
        #[arg(long, value_name = "NAME")]
        from: Option<String>,
    },
    /// Delete a profile
    Delete { name: String },
    /// Make a profile the active one
    Use { name: String },
}

/// Settings and profiles, loaded once per invocation.
struct Session {
    settings_dir: PathBuf,
    settings: config::Settings,
    store: ProfileStore,
}

fn open_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let settings_dir = config::resolve_settings_dir(cli.settings_dir.as_deref())?;
    config::init_settings_dir(&settings_dir)?;
    let settings = config::load_config(&settings_dir)?;
    init_logging(cli, &settings_dir, &settings.logging);
    tracing::debug!("settings directory {}", settings_dir.display());

    let store = ProfileStore::open(&settings_dir)?;
    Ok(Session {
        settings_dir,
        settings,
        store,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        None if cli.frame.inputs.is_empty() => {
            Cli::command().print_help()?;
        }
        None => run_frame(&cli.frame, &open_session(&cli)?)?,
        Some(Command::Frame(args)) => run_frame(args, &open_session(&cli)?)?,
        Some(Command::Plan(args)) => run_plan(args, &open_session(&cli)?)?,
        Some(Command::Profile(command)) => run_profile(command, &open_session(&cli)?)?,
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli, settings_dir: &Path, logging_config: &config::LoggingConfig) {
    let log_file = if logging_config.file {
        match logging::open_log_file(settings_dir, logging_config) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("warning: could not open log file: {e}");
                None
            }
        }
    } else {
        None
    };
    logging::init_logging(cli.quiet, cli.verbose, log_file);
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores; settings can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn build_job(args: &FrameArgs, session: &Session) -> Result<FrameJob, Box<dyn std::error::Error>> {
    let settings = &session.settings;
    let profile_name = args.profile.as_deref().unwrap_or(&settings.active_profile);
    let profile = session.store.load(profile_name)?;
    tracing::debug!("using profile {profile_name}");

    let spec = mode::resolve(&args.overrides(), &profile, settings.mode.priority)?;
    Ok(FrameJob {
        spec,
        color: args.border_color.unwrap_or(profile.border_color),
        quality: args.quality.map_or_else(|| profile.quality(), Quality::new),
        output_pattern: profile.output_pattern.clone(),
        overwrite: args.overwrite || profile.overwrite,
        output: args.output.clone(),
        timestamp: naming::format_timestamp(Utc::now()),
    })
}

fn run_frame(args: &FrameArgs, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let job = build_job(args, session)?;
    let collected = process::collect_inputs(&args.inputs)?;
    if collected.files.is_empty() && collected.missing.is_empty() {
        return Err("no images found in the given inputs".into());
    }

    for failure in &collected.missing {
        let event = ProcessEvent::Failed {
            source: failure.source.clone(),
            reason: failure.reason.clone(),
        };
        for line in output::format_process_event(&event) {
            println!("{}", line);
        }
    }

    init_thread_pool(&session.settings.processing);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process_batch(&RustBackend::new(), &collected.files, &job, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let mut report = result?;
    report.failed.extend(collected.missing);

    output::print_summary(&report);
    if !report.is_success() {
        return Err(format!("{} of {} images failed", report.failed.len(), report.total()).into());
    }
    Ok(())
}

fn run_plan(args: &PlanArgs, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let job = build_job(&args.frame, session)?;
    let collected = process::collect_inputs(&args.frame.inputs)?;
    init_thread_pool(&session.settings.processing);

    let mut plans = process::plan_batch(&RustBackend::new(), &collected.files, &job.spec);
    plans.extend(
        collected
            .missing
            .into_iter()
            .map(|failure| (failure.source, Err(failure.reason))),
    );

    if args.json {
        let entries: Vec<serde_json::Value> = plans
            .iter()
            .map(|(source, result)| match result {
                Ok((original, plan)) => serde_json::json!({
                    "source": source,
                    "original": original,
                    "resize": plan.resize,
                    "borders": plan.borders,
                    "final": plan.final_dimensions(*original),
                }),
                Err(reason) => serde_json::json!({
                    "source": source,
                    "error": reason,
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Mode: {}", job.spec);
        output::print_plans(&plans);
    }

    let failed = plans.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(format!("{failed} of {} images cannot be framed", plans.len()).into());
    }
    Ok(())
}

fn run_profile(
    command: &ProfileCommand,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = &session.store;
    let active = session.settings.active_profile.as_str();
    match command {
        ProfileCommand::List => {
            output::print_profile_list(&store.list()?, active);
        }
        ProfileCommand::Show { name } => {
            let name = name.as_deref().unwrap_or(active);
            let profile = store.load(name)?;
            output::print_profile(name, &profile);
        }
        ProfileCommand::Create { name, from } => {
            let template = from.as_deref().map(|src| store.load(src)).transpose()?;
            store.create(name, template)?;
            println!("Created profile {name}");
        }
        ProfileCommand::Delete { name } => {
            store.delete(name)?;
            println!("Deleted profile {name}");
            if name == active {
                config::set_active_profile(&session.settings_dir, DEFAULT_PROFILE)?;
                println!("Active profile is now {DEFAULT_PROFILE}");
            }
        }
        ProfileCommand::Use { name } => {
            // Reject broken profiles before making them active.
            let profile = store.load(name)?;
            profile.frame_mode()?;
            config::set_active_profile(&session.settings_dir, name)?;
            println!("Active profile is now {name}");
        }
    }
    Ok(())
}
