use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use attentrack::{
    dataset,
    report::{self, ReportSummary},
    Config, Monitor, PoseSource, ReplaySource, SessionLog,
};
use clap::{Parser, Subcommand};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "attentrack", version, about = "Classroom attentiveness from tracked poses")]
struct Opts {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a pose stream and log the session summary
    Run {
        /// Pose stream in `<ts>:<json>` lines, `-` for stdin
        #[arg(long, default_value = "-")]
        poses: String,

        /// Video file or camera index shown alongside the poses
        #[arg(long)]
        video: Option<String>,

        /// Session log, overrides the configured path
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Print the recorded sessions
    Report {
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Convert labelled poses into a keypoint CSV
    ExportDataset {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Write the default configuration
    InitConfig { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match opts.cmd {
        Command::Run { poses, video, log } => {
            let log = SessionLog::new(log.unwrap_or_else(|| config.session.log_path.clone()));
            run(&config, &poses, video.as_deref(), &log)
        }
        Command::Report { log } => {
            let log = SessionLog::new(log.unwrap_or_else(|| config.session.log_path.clone()));
            print_report(&log)
        }
        Command::ExportDataset { input, output } => export_dataset(&config, &input, &output),
        Command::InitConfig { path } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            config.save(&path)?;
            info!("default configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn open_source(config: &Config, poses: &str) -> anyhow::Result<Box<dyn PoseSource>> {
    let interval = config.source.frame_interval_secs;

    Ok(if poses == "-" {
        info!("reading poses from stdin");
        Box::new(ReplaySource::new(io::stdin().lock(), interval))
    } else {
        Box::new(
            ReplaySource::open(poses, interval)
                .with_context(|| format!("opening pose stream {}", poses))?,
        )
    })
}

fn run(config: &Config, poses: &str, video: Option<&str>, log: &SessionLog) -> anyhow::Result<()> {
    let mut source = open_source(config, poses)?;
    let mut monitor = Monitor::new(config);

    let failure = match video {
        Some(video) => play(config, video, &mut source, &mut monitor)?,
        None => {
            let mut alerted = 0u64;
            let end = attentrack::run_source(&mut source, &mut monitor, |report| {
                if report.alert_active {
                    alerted += 1;
                }
            });
            info!("{} frames processed, {} under alert", end.frames, alerted);
            end.error
        }
    };

    monitor.close(log, chrono::Local::now().naive_local());

    // an unreadable frame ends the session like end of stream
    if let Some(err) = failure {
        warn!("session closed early, pose stream {}: {}", poses, err);
    }

    Ok(())
}

/// Returns the error that cut playback short, if any.
#[cfg(feature = "opencv")]
fn play(
    config: &Config,
    video: &str,
    source: &mut Box<dyn PoseSource>,
    monitor: &mut Monitor,
) -> anyhow::Result<Option<attentrack::Error>> {
    use attentrack::video::{Player, Stop, VideoInput};

    let mut player = Player::open(&VideoInput::parse(video), &config.display)?;
    Ok(match player.run(source, monitor) {
        Stop::Failed(err) => Some(err),
        stop => {
            info!("playback stopped: {:?}", stop);
            None
        }
    })
}

#[cfg(not(feature = "opencv"))]
fn play(
    _config: &Config,
    _video: &str,
    _source: &mut Box<dyn PoseSource>,
    _monitor: &mut Monitor,
) -> anyhow::Result<Option<attentrack::Error>> {
    bail!("video display needs the `opencv` feature")
}

fn print_report(log: &SessionLog) -> anyhow::Result<()> {
    if !log.exists() {
        println!(
            "No session log found at '{}'. Run a session first.",
            log.path().display()
        );
        return Ok(());
    }

    let rows = log
        .read_rows()
        .with_context(|| format!("reading {}", log.path().display()))?;

    let summary = match ReportSummary::from_rows(&rows) {
        Some(summary) => summary,
        None => {
            warn!("the session log {} is empty", log.path().display());
            return Ok(());
        }
    };

    println!("Session Data\n");
    print!("{}", report::table(&rows));
    println!("\nEngagement Over Time\n");
    print!("{}", report::trend(&rows));
    println!(
        "\n{} sessions, {:.1} min recorded, mean engagement {:.1}%",
        summary.sessions,
        summary.total_duration_secs / 60.0,
        summary.mean_engagement_pct
    );
    println!(
        "best {} ({:.1}%), worst {} ({:.1}%)",
        summary.best.timestamp.format(attentrack::journal::TIMESTAMP_FORMAT),
        summary.best.avg_engagement_pct,
        summary.worst.timestamp.format(attentrack::journal::TIMESTAMP_FORMAT),
        summary.worst.avg_engagement_pct
    );

    Ok(())
}

fn export_dataset(config: &Config, input: &Path, output: &Path) -> anyhow::Result<()> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let writer = File::create(output).with_context(|| format!("creating {}", output.display()))?;

    let summary = dataset::export(
        reader,
        writer,
        config.classifier.layout,
        &config.dataset.label_map,
    )?;

    if summary.written > 0 {
        info!(
            "wrote {} rows to {} ({} skipped)",
            summary.written,
            output.display(),
            summary.skipped
        );
    } else {
        warn!(
            "no labels matched the label map, {} rows skipped",
            summary.skipped
        );
    }

    Ok(())
}
