use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

use blood_match::{
    format_label, format_wire_label, is_compatible, BloodGroup,
    CompatibilityTable, Dataset, DatasetParser, DonorFinder, FileConfig, FileDiscovery,
    Location, MapReport, ReportFormat, ReportGenerator, RequestMatcher, Settings,
    TabularReport, UserProfile, UserRole,
};

/// Blood group compatibility and donor matching tool
#[derive(Parser, Debug)]
#[command(
    name = "blood-match",
    version,
    about = "Blood group compatibility checks and donor/request matching",
    long_about = r#"
Answers donor/recipient blood group compatibility questions and works on
exported platform data (JSON or CSV):
- Which open requests a donor can serve
- Which available donors can give to a blood group
- Donor and request markers for the live map

Blood groups may be written as labels (A+, ab-, O−) or wire names (aPositive).
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// TOML config file with output_dir, format, threads and recursive
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, env = "BLOOD_MATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format for reports
    #[arg(short, long, value_enum, global = true)]
    format: Option<ReportFormat>,

    /// Output directory for reports
    #[arg(short, long, global = true, value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Recursively search directories for dataset files
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Interactive compatibility check
    #[arg(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether a donor can give to a recipient
    Check {
        donor: BloodGroup,
        recipient: BloodGroup,
    },
    /// Print the donor -> recipient compatibility table
    Table,
    /// Format raw blood group values as labels (unknown values are echoed)
    Label {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// List open requests a donor can serve
    Match {
        /// Principal of the donor
        #[arg(long)]
        principal: String,

        /// Donor blood group, when the donor has no profile in the data
        #[arg(long)]
        blood_group: Option<BloodGroup>,

        /// Dataset files or directories
        #[arg(required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
        inputs: Vec<PathBuf>,
    },
    /// List available donors for a recipient blood group
    Donors {
        #[arg(long)]
        blood_group: BloodGroup,

        #[arg(required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
        inputs: Vec<PathBuf>,
    },
    /// Build the live map markers and summary from active locations
    Map {
        #[arg(required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
        inputs: Vec<PathBuf>,
    },
    /// List supported dataset formats
    Formats,
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    init_logging(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        file_config,
        cli.output.clone(),
        cli.format,
        cli.threads,
        cli.recursive,
    );

    init_thread_pool(settings.thread_count())?;

    if cli.interactive {
        return run_interactive_check();
    }

    match cli.command {
        Some(Commands::Check { donor, recipient }) => print_check(donor, recipient),
        Some(Commands::Table) => print_table(),
        Some(Commands::Label { values }) => {
            for value in values {
                println!("{}", format_wire_label(&value));
            }
        }
        Some(Commands::Match {
            principal,
            blood_group,
            inputs,
        }) => run_match(&settings, &principal, blood_group, &inputs)?,
        Some(Commands::Donors {
            blood_group,
            inputs,
        }) => run_donors(&settings, blood_group, &inputs)?,
        Some(Commands::Map { inputs }) => run_map(&settings, &inputs)?,
        Some(Commands::Formats) => list_formats(),
        Some(Commands::Completions { .. }) | None => {}
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("blood_match={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(num_threads: usize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

fn print_check(donor: BloodGroup, recipient: BloodGroup) {
    if is_compatible(donor, recipient) {
        println!(
            "{} {} can donate to {}",
            style("✓").green().bold(),
            style(format_label(donor)).bold(),
            style(format_label(recipient)).bold()
        );
    } else {
        println!(
            "{} {} cannot donate to {}",
            style("✗").red().bold(),
            style(format_label(donor)).bold(),
            style(format_label(recipient)).bold()
        );
    }
}

fn print_table() {
    let table = CompatibilityTable::global();
    println!("{}", style("Blood Group Compatibility:").bold().cyan());
    println!();
    println!(
        "  {:<5} {:<32} {}",
        style("Group").bold(),
        style("Can donate to").bold(),
        style("Can receive from").bold()
    );

    for (donor, recipients) in table.entries() {
        let gives: Vec<&str> = recipients.iter().map(BloodGroup::label).collect();
        let receives: Vec<&str> = table
            .donors_for(donor)
            .iter()
            .map(BloodGroup::label)
            .collect();
        println!(
            "  {:<5} {:<32} {}",
            style(donor.label()).red().bold(),
            gives.join(", "),
            receives.join(", ")
        );
    }
}

fn list_formats() {
    println!("{}", style("Supported Dataset Formats:").bold().cyan());
    println!();

    let formats = [
        (
            "JSON",
            "(.json)",
            "Array of requests, profiles or active locations, or an object with all three",
        ),
        (
            "CSV",
            "(.csv)",
            "One record kind per file, detected from the header row",
        ),
    ];

    for (name, ext, desc) in formats {
        println!("  {} {}", style(name).green().bold(), style(ext).yellow());
        println!("         {}", style(desc).dim());
    }
}

fn run_interactive_check() -> Result<()> {
    println!(
        "{}",
        style("Blood Group Compatibility - Interactive Mode")
            .cyan()
            .bold()
    );
    println!();

    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = BloodGroup::ALL.iter().map(BloodGroup::label).collect();

    let donor_idx = Select::with_theme(&theme)
        .with_prompt("Donor blood group")
        .default(0)
        .items(&labels)
        .interact()?;

    let recipient_idx = Select::with_theme(&theme)
        .with_prompt("Recipient blood group")
        .default(0)
        .items(&labels)
        .interact()?;

    print_check(BloodGroup::ALL[donor_idx], BloodGroup::ALL[recipient_idx]);
    Ok(())
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Discover and parse every dataset file under `inputs`, merging the records
fn load_dataset(settings: &Settings, inputs: &[PathBuf], pb: &ProgressBar) -> Result<Dataset> {
    pb.set_message("Discovering dataset files...");
    let discovery = FileDiscovery::new(settings.recursive);
    let files = discovery.discover(inputs)?;
    if files.is_empty() {
        return Err(anyhow!("No JSON or CSV dataset files found in the given inputs"));
    }
    info!("Found {} dataset files", files.len());
    pb.set_position(20);

    pb.set_message("Parsing dataset files...");
    let dataset = DatasetParser::new().parse_all(&files)?;
    if dataset.is_empty() {
        warn!("Dataset files parsed but contain no records");
    }
    pb.set_position(60);

    info!(
        "Loaded {} profiles, {} requests, {} locations",
        dataset.profiles.len(),
        dataset.requests.len(),
        dataset.locations.len()
    );

    Ok(dataset)
}

fn write_report<R: TabularReport>(settings: &Settings, report: &R, pb: &ProgressBar) -> Result<()> {
    pb.set_message("Generating reports...");
    let generator = ReportGenerator::new(&settings.output_dir)?;
    let written = generator.generate(report, settings.format)?;
    pb.set_position(100);
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} ({} file{}) saved to: {}",
        style("✓").green().bold(),
        report.title(),
        written.len(),
        if written.len() == 1 { "" } else { "s" },
        style(settings.output_dir.display()).cyan()
    );

    Ok(())
}

fn run_match(
    settings: &Settings,
    principal: &str,
    blood_group: Option<BloodGroup>,
    inputs: &[PathBuf],
) -> Result<()> {
    let pb = progress_bar()?;
    let dataset = load_dataset(settings, inputs, &pb)?;

    let donor = match (dataset.profile(principal), blood_group) {
        (_, Some(group)) => UserProfile {
            principal: principal.to_string(),
            name: principal.to_string(),
            contact_pref: String::new(),
            role: UserRole::User,
            available: true,
            blood_group: group,
            location: Location::default(),
        },
        (Some(profile), None) => profile.clone(),
        (None, None) => {
            return Err(anyhow!(
                "No profile for principal {} in the data; pass --blood-group",
                principal
            ))
        }
    };

    pb.set_message("Matching requests...");
    let report = RequestMatcher::new(&donor).report(&dataset.requests);
    pb.set_position(80);

    write_report(settings, &report, &pb)
}

fn run_donors(settings: &Settings, recipient: BloodGroup, inputs: &[PathBuf]) -> Result<()> {
    let pb = progress_bar()?;
    let dataset = load_dataset(settings, inputs, &pb)?;

    pb.set_message("Finding donors...");
    let report = DonorFinder::new().report(recipient, &dataset.profiles);
    pb.set_position(80);

    write_report(settings, &report, &pb)
}

fn run_map(settings: &Settings, inputs: &[PathBuf]) -> Result<()> {
    let pb = progress_bar()?;
    let dataset = load_dataset(settings, inputs, &pb)?;

    pb.set_message("Building map markers...");
    let report = MapReport::from_locations(&dataset.locations);
    pb.set_position(80);

    write_report(settings, &report, &pb)
        .context("Failed to write location report")
}
