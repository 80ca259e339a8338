use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use liftrs::config::{parse_mapping_entry, AppConfig};
use liftrs::correlation::SetHrCorrelator;
use liftrs::error::{ErrorSeverity, LiftError};
use liftrs::heart_rate::{stream_summary, PeakDetector};
use liftrs::history::{progression, ExerciseHistory, HistoryCalculator, HistoryComparison, ProgressPoint};
use liftrs::import::{load_hr_stream, ImportManager};
use liftrs::logging::{init_logging, LogLevel};
use liftrs::models::{format_number, CorrelatedSet, HrPeak, HrWindowSummary, Workout};
use liftrs::muscles::unmapped_exercises;
use liftrs::stats::{filter_by_date_range, sort_newest_first, StatsAggregator, WorkoutStats};

/// liftrs - Strength Training Log Analysis CLI
///
/// Parses workout spreadsheets, attributes volume to muscle groups, tracks
/// personal records and history, and lines heart-rate peaks up with sets.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(author = "liftrs Contributors")]
#[command(version)]
#[command(about = "Strength Training Log Analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workout totals and per-workout breakdown
    Summary {
        /// Workbook .json file or directory of .csv sheets
        #[arg(short, long)]
        input: PathBuf,

        /// Date range start (YYYY-MM-DD)
        #[arg(short, long)]
        from: Option<NaiveDate>,

        /// Date range end (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<NaiveDate>,
    },

    /// Personal records per exercise
    Prs {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Volume attributed to each muscle group
    Muscles {
        #[arg(short, long)]
        input: PathBuf,

        /// Date range start (YYYY-MM-DD)
        #[arg(short, long)]
        from: Option<NaiveDate>,

        /// Date range end (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<NaiveDate>,
    },

    /// Rolling averages and changes for one exercise
    History {
        #[arg(short, long)]
        input: PathBuf,

        /// Exercise name (case-insensitive)
        #[arg(short, long)]
        exercise: String,

        /// Compare the session on this date against everything before it
        #[arg(short, long)]
        at: Option<NaiveDate>,
    },

    /// Detect heart-rate peaks in a stream
    Peaks {
        /// Heart-rate stream .json file
        #[arg(short, long)]
        stream: PathBuf,
    },

    /// Attach heart-rate data to the sets of one workout
    Correlate {
        #[arg(short, long)]
        input: PathBuf,

        /// Sheet label of the workout, e.g. 1/29/2026
        #[arg(long)]
        sheet: String,

        /// Heart-rate stream .json file
        #[arg(short, long)]
        stream: PathBuf,

        /// Workout duration in seconds (defaults to the stream length)
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Configure application settings
    Config {
        /// List the current configuration
        #[arg(short, long)]
        list: bool,

        /// Add a custom muscle mapping: "exercise=id1,id2"
        #[arg(short, long)]
        map: Option<String>,

        /// Remove a custom muscle mapping by exercise name
        #[arg(short, long)]
        unmap: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        let message = match e.downcast_ref::<LiftError>() {
            Some(err) => {
                match err.severity() {
                    ErrorSeverity::Warning => tracing::warn!(error = %err, "command failed"),
                    _ => tracing::error!(error = %err, "command failed"),
                }
                err.user_message()
            }
            None => format!("{:#}", e),
        };
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config).context("Failed to initialize logging")?;

    let importer = ImportManager::new(config.muscles.custom_mappings.clone()).with_progress(!cli.json);

    match cli.command {
        Commands::Summary { input, from, to } => {
            let workouts = load_workouts(&importer, &input, from, to)?;
            let stats = StatsAggregator::aggregate(&workouts);
            let unmapped = unmapped_exercises(&workouts);

            if cli.json {
                #[derive(Serialize)]
                struct SummaryReport<'a> {
                    stats: &'a WorkoutStats,
                    workouts: &'a [Workout],
                    unmapped_exercises: &'a [String],
                }
                return print_json(&SummaryReport {
                    stats: &stats,
                    workouts: &workouts,
                    unmapped_exercises: &unmapped,
                });
            }

            println!("{}", "Workout Summary".green().bold());
            println!("  Workouts:   {}", stats.total_workouts);
            println!("  Exercises:  {}", stats.total_exercises);
            println!("  Volume:     {}", format_number(stats.total_volume.round()));
            println!("  PRs:        {}", stats.pr_count);
            println!();

            let rows: Vec<WorkoutRow> = workouts.iter().map(WorkoutRow::from).collect();
            print_table(rows);

            if !unmapped.is_empty() {
                println!();
                println!(
                    "{} {}",
                    "No muscle mapping for:".yellow(),
                    unmapped.join(", ")
                );
                println!("{}", "  add one with: liftrs config --map \"name=id1,id2\"".dimmed());
            }
        }

        Commands::Prs { input } => {
            let workouts = load_workouts(&importer, &input, None, None)?;
            let stats = StatsAggregator::aggregate(&workouts);

            if cli.json {
                return print_json(&stats.personal_records);
            }

            println!("{}", format!("Personal Records ({})", stats.pr_count).green().bold());
            let rows: Vec<RecordRow> = stats
                .personal_records
                .iter()
                .map(|pr| RecordRow {
                    exercise: pr.name.clone(),
                    weight: format_number(pr.weight),
                    date: pr.date.clone(),
                })
                .collect();
            print_table(rows);
        }

        Commands::Muscles { input, from, to } => {
            let workouts = load_workouts(&importer, &input, from, to)?;
            let volumes = StatsAggregator::muscle_volume(&workouts);

            if cli.json {
                return print_json(&volumes);
            }

            let catalog = config.muscles.catalog();
            let mut rows: Vec<(f64, MuscleRow)> = volumes
                .iter()
                .map(|(id, mv)| {
                    let category = catalog
                        .get(id)
                        .map(|g| g.category.clone())
                        .unwrap_or_else(|| "-".to_string());
                    (
                        mv.volume,
                        MuscleRow {
                            muscle: catalog.display_name(id).to_string(),
                            category,
                            volume: format_number(mv.volume),
                            exercises: mv.exercises.join(", "),
                        },
                    )
                })
                .collect();
            rows.sort_by(|a, b| b.0.total_cmp(&a.0));

            println!("{}", "Muscle Group Volume".cyan().bold());
            print_table(rows.into_iter().map(|(_, row)| row).collect::<Vec<_>>());
        }

        Commands::History { input, exercise, at } => {
            let workouts = load_workouts(&importer, &input, None, None)?;
            let reference = at.and_then(|d| d.and_hms_opt(0, 0, 0));
            let history = HistoryCalculator::history(&exercise, reference, &workouts);

            let current = at.and_then(|date| {
                workouts
                    .iter()
                    .filter(|w| w.date_object == Some(date))
                    .find_map(|w| w.find_exercise(&exercise))
            });
            let comparison = current.map(|e| HistoryComparison::compare(e, &history));
            let points = progression(&exercise, &workouts);

            if cli.json {
                #[derive(Serialize)]
                struct HistoryReport<'a> {
                    exercise: &'a str,
                    history: &'a ExerciseHistory,
                    comparison: Option<&'a HistoryComparison>,
                    progression: &'a [ProgressPoint],
                }
                return print_json(&HistoryReport {
                    exercise: &exercise,
                    history: &history,
                    comparison: comparison.as_ref(),
                    progression: &points,
                });
            }

            print_history(&exercise, &history, comparison.as_ref(), &points);
        }

        Commands::Peaks { stream } => {
            let stream = load_hr_stream(&stream)?;
            let peaks = PeakDetector::with_config(config.peaks.clone()).detect(&stream);
            let summary = stream_summary(&stream);

            if cli.json {
                #[derive(Serialize)]
                struct PeaksReport<'a> {
                    summary: &'a HrWindowSummary,
                    peaks: &'a [HrPeak],
                }
                return print_json(&PeaksReport {
                    summary: &summary,
                    peaks: &peaks,
                });
            }

            println!("{}", "Heart Rate".red().bold());
            println!(
                "  Samples: {}  Avg: {}  Max: {}  Min: {}",
                stream.len(),
                fmt_bpm(summary.avg_hr),
                fmt_bpm(summary.max_hr),
                fmt_bpm(summary.min_hr)
            );
            println!();
            println!("{}", format!("Peaks ({})", peaks.len()).red().bold());
            let rows: Vec<PeakRow> = peaks.iter().map(PeakRow::from).collect();
            print_table(rows);
        }

        Commands::Correlate {
            input,
            sheet,
            stream,
            duration,
        } => {
            let workout = importer.import_sheet(&input, &sheet)?;
            let stream = load_hr_stream(&stream)?;
            let peaks = PeakDetector::with_config(config.peaks.clone()).detect(&stream);
            let correlated = SetHrCorrelator::with_config(config.correlation.clone()).correlate(
                &workout.sets(),
                &peaks,
                &stream,
                duration,
            );

            if cli.json {
                return print_json(&correlated);
            }

            println!(
                "{}",
                format!("Sets vs Heart Rate: {} ({} peaks)", workout.date, peaks.len())
                    .magenta()
                    .bold()
            );
            let rows: Vec<SetRow> = correlated.iter().map(SetRow::from).collect();
            print_table(rows);
        }

        Commands::Config { list, map, unmap } => {
            if let Some(entry) = map {
                let (name, ids) = parse_mapping_entry(&entry).map_err(LiftError::from)?;
                config.set_custom_mapping(&name, ids.clone())?;
                config.save_to_file(&config_path)?;
                println!(
                    "{} {} -> {}",
                    "✓ Mapped".green(),
                    name,
                    ids.join(", ")
                );
            } else if let Some(name) = unmap {
                if config.remove_custom_mapping(&name) {
                    config.save_to_file(&config_path)?;
                    println!("{} {}", "✓ Removed mapping for".green(), name);
                } else {
                    println!("{} {}", "No custom mapping for".yellow(), name);
                }
            } else if list || cli.json {
                if cli.json {
                    return print_json(&config);
                }
                println!("{} {}", "Config file:".white().bold(), config_path.display());
                let content = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", content);
            } else {
                println!("Nothing to do. Use --list, --map or --unmap.");
            }
        }
    }

    Ok(())
}

fn load_workouts(
    importer: &ImportManager,
    input: &Path,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Workout>> {
    let workouts = importer.import(input)?;
    Ok(sort_newest_first(&filter_by_date_range(&workouts, from, to)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "  (none)".dimmed());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_history(
    exercise: &str,
    history: &ExerciseHistory,
    comparison: Option<&HistoryComparison>,
    points: &[ProgressPoint],
) {
    println!("{}", format!("History: {}", exercise).blue().bold());

    match &history.previous_session {
        Some(previous) => println!(
            "  Previous session: {} ({} max, {} volume)",
            previous.date,
            format_number(previous.exercise.max_weight),
            format_number(previous.exercise.volume)
        ),
        None => println!("  Previous session: {}", "none".dimmed()),
    }
    println!();

    let windows = [
        ("1 week", &history.one_week_avg),
        ("2 weeks", &history.two_week_avg),
        ("4 weeks", &history.four_week_avg),
        ("All time", &history.all_time_avg),
    ];
    let rows: Vec<WindowRow> = windows
        .iter()
        .map(|(label, avg)| WindowRow {
            window: label.to_string(),
            sessions: avg.sessions.to_string(),
            avg_volume: fmt_opt(avg.avg_volume),
            avg_max_weight: fmt_opt(avg.avg_max_weight),
        })
        .collect();
    print_table(rows);

    if let Some(comparison) = comparison {
        println!();
        println!("{}", "Change vs".blue().bold());
        let baselines = [
            ("Previous", &comparison.vs_previous),
            ("1 week", &comparison.vs_one_week),
            ("2 weeks", &comparison.vs_two_week),
            ("4 weeks", &comparison.vs_four_week),
            ("All time", &comparison.vs_all_time),
        ];
        let rows: Vec<ChangeRow> = baselines
            .iter()
            .map(|(label, changes)| ChangeRow {
                baseline: label.to_string(),
                volume: changes.volume.to_string(),
                max_weight: changes.max_weight.to_string(),
            })
            .collect();
        print_table(rows);
    }

    if !points.is_empty() {
        println!();
        println!("{}", "Progression".blue().bold());
        let rows: Vec<ProgressRow> = points
            .iter()
            .map(|p| ProgressRow {
                date: p.date.format("%Y-%m-%d").to_string(),
                max_weight: format_number(p.max_weight),
                volume: format_number(p.volume),
            })
            .collect();
        print_table(rows);
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "-".to_string())
}

fn fmt_bpm(value: Option<u16>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Exercises")]
    exercises: usize,
    #[tabled(rename = "Volume")]
    volume: String,
}

impl From<&Workout> for WorkoutRow {
    fn from(workout: &Workout) -> Self {
        WorkoutRow {
            date: workout.date.clone(),
            exercises: workout.exercise_count,
            volume: format_number(workout.total_volume.round()),
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Date")]
    date: String,
}

#[derive(Tabled)]
struct MuscleRow {
    #[tabled(rename = "Muscle")]
    muscle: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Exercises")]
    exercises: String,
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Sessions")]
    sessions: String,
    #[tabled(rename = "Avg Volume")]
    avg_volume: String,
    #[tabled(rename = "Avg Max Weight")]
    avg_max_weight: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Max Weight")]
    max_weight: String,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Max Weight")]
    max_weight: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct PeakRow {
    #[tabled(rename = "Time (s)")]
    time: String,
    #[tabled(rename = "HR")]
    hr: String,
    #[tabled(rename = "Local Avg")]
    avg_hr: String,
}

impl From<&HrPeak> for PeakRow {
    fn from(peak: &HrPeak) -> Self {
        PeakRow {
            time: format_number(peak.time),
            hr: format_number(peak.hr.round()),
            avg_hr: format!("{:.1}", peak.avg_hr),
        }
    }
}

#[derive(Tabled)]
struct SetRow {
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Set")]
    set_number: usize,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Reps")]
    reps: String,
    #[tabled(rename = "Peak HR")]
    peak_hr: String,
    #[tabled(rename = "Avg HR")]
    avg_hr: String,
    #[tabled(rename = "Matched By")]
    matched_by: String,
}

impl From<&CorrelatedSet> for SetRow {
    fn from(correlated: &CorrelatedSet) -> Self {
        let set = &correlated.set;
        let hr = correlated.hr_data.as_ref();
        SetRow {
            exercise: set.exercise.clone(),
            set_number: set.set_number,
            weight: format_number(set.weight),
            reps: fmt_opt(set.reps),
            peak_hr: fmt_opt(hr.and_then(|d| d.peak_hr).map(f64::round)),
            avg_hr: fmt_bpm(hr.and_then(|d| d.avg_hr)),
            matched_by: hr
                .map(|d| d.matched_by.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
