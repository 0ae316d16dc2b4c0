mod draw;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use draw::{draw_overview, with_bitmap, BitmapSurface};
use ecgview_lib::{
    config::ViewerConfig,
    detectors::{AnnotationDetector, PanTompkinsDetector, PeakDetector},
    io::{store::load_all, text as text_io, wfdb as wfdb_io},
    metrics::{
        histogram::{rr_histogram, RrHistogram},
        intervals::{interval_stats, IntervalStats},
        rate::{AnalysisResult, RateAnalyzer, RateStatus},
    },
    plot::{render, PlotBackend},
    session::AppState,
    signal::Events,
};
use log::info;
use serde::Serialize;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "ecgview",
    version,
    about = "ecgview: heart rate analysis and clinical strip charts for WFDB recordings"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory scanned (recursively) for WFDB records
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Strip length in seconds
    #[arg(long, global = true)]
    duration: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded records with sampling rate, lead count, length and diagnosis
    Records,
    /// Detect beats on one lead of a record and print rate statistics as JSON
    Analyze {
        #[arg(long)]
        record: String,
        /// Lead name; defaults to II when present, else the first lead
        #[arg(long)]
        lead: Option<String>,
        /// Reference beats (.atr or newline-delimited sample indices) instead of detection
        #[arg(long)]
        annotations: Option<PathBuf>,
        /// Also write a beat table (beat, sample, time_s, rr_s) as CSV
        #[arg(long)]
        rr_csv: Option<PathBuf>,
    },
    /// Analyse newline-delimited samples read from stdin or --input file
    AnalyzeSamples {
        #[arg(long, default_value_t = 500.0)]
        fs: f64,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        annotations: Option<PathBuf>,
        /// Draw the strip with beat markers to this PNG
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Draw every lead of a record on a 3 x 4 clinical grid (PNG)
    Overview {
        #[arg(long)]
        record: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Draw one lead with detected beats marked (PNG)
    Lead {
        #[arg(long)]
        record: String,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        annotations: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Draw the RR-interval distribution of one lead (PNG)
    RrHistogram {
        #[arg(long)]
        record: String,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        annotations: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    record: Option<&'a str>,
    lead: &'a str,
    fs: f64,
    heart_rate: f64,
    status: RateStatus,
    summary: String,
    mean_rr: Option<f64>,
    stats: IntervalStats,
    peaks: &'a [usize],
    rr_intervals: &'a [f64],
    histogram: &'a RrHistogram,
}

impl<'a> AnalysisReport<'a> {
    fn new(
        record: Option<&'a str>,
        lead: &'a str,
        fs: f64,
        analysis: &'a AnalysisResult,
        histogram: &'a RrHistogram,
    ) -> Self {
        Self {
            record,
            lead,
            fs,
            heart_rate: analysis.heart_rate,
            status: analysis.status(),
            summary: format!("{:.1} bpm, {}", analysis.heart_rate, analysis.status()),
            mean_rr: analysis.mean_rr(),
            stats: interval_stats(&analysis.rr),
            peaks: &analysis.peaks.indices,
            rr_intervals: &analysis.rr.rr,
            histogram,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    match cli.command {
        Commands::Records => cmd_records(&cfg)?,
        Commands::Analyze {
            record,
            lead,
            annotations,
            rr_csv,
        } => cmd_analyze(
            &cfg,
            &record,
            lead.as_deref(),
            annotations.as_deref(),
            rr_csv.as_deref(),
        )?,
        Commands::AnalyzeSamples {
            fs,
            input,
            annotations,
            out,
        } => cmd_analyze_samples(
            &cfg,
            fs,
            input.as_deref(),
            annotations.as_deref(),
            out.as_deref(),
        )?,
        Commands::Overview { record, out } => cmd_overview(&cfg, &record, &out)?,
        Commands::Lead {
            record,
            lead,
            annotations,
            out,
        } => cmd_lead(&cfg, &record, lead.as_deref(), annotations.as_deref(), &out)?,
        Commands::RrHistogram {
            record,
            lead,
            annotations,
            out,
        } => cmd_rr_histogram(&cfg, &record, lead.as_deref(), annotations.as_deref(), &out)?,
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }
    if let Some(duration) = cli.duration {
        cfg.duration_sec = duration;
    }
    Ok(cfg)
}

fn load_state(cfg: &ViewerConfig) -> AppState {
    AppState::from_report(load_all(&cfg.data_dir))
}

fn detector(cfg: &ViewerConfig, annotations: Option<&Path>) -> Result<Box<dyn PeakDetector>> {
    let Some(path) = annotations else {
        return Ok(Box::new(PanTompkinsDetector::new(cfg.detector)));
    };
    let is_atr = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("atr"));
    let events = if is_atr {
        wfdb_io::load_wfdb_events(path)?
    } else {
        Events::from_indices(text_io::read_event_indices(path)?)
    };
    info!("using {} reference beats from {}", events.len(), path.display());
    Ok(Box::new(AnnotationDetector::new(events)))
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)
        }
    }
}

fn cmd_records(cfg: &ViewerConfig) -> Result<()> {
    let report = load_all(&cfg.data_dir);
    for meta in report.metadata() {
        println!("{}", serde_json::to_string(&meta)?);
    }
    for failure in &report.failures {
        eprintln!("skipped {}: {}", failure.path.display(), failure.reason);
    }
    Ok(())
}

fn cmd_analyze(
    cfg: &ViewerConfig,
    record_id: &str,
    lead: Option<&str>,
    annotations: Option<&Path>,
    rr_csv: Option<&Path>,
) -> Result<()> {
    let state = load_state(cfg);
    let analyzer = RateAnalyzer::new(detector(cfg, annotations)?);
    let view = state.lead_view(record_id, lead, cfg.duration_sec, &analyzer)?;
    let fs = state.record(record_id)?.fs();
    if let Some(path) = rr_csv {
        write_beat_table(path, &view.analysis, fs)?;
    }
    let report = AnalysisReport::new(
        Some(record_id),
        &view.lead,
        fs,
        &view.analysis,
        &view.histogram,
    );
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_analyze_samples(
    cfg: &ViewerConfig,
    fs: f64,
    input: Option<&Path>,
    annotations: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let samples = read_samples(input)?;
    let analyzer = RateAnalyzer::new(detector(cfg, annotations)?);
    let analysis = analyzer.analyze(&samples, fs)?;
    if let Some(path) = out {
        let size = (cfg.output.width, cfg.output.height);
        with_bitmap(path, size, |root| {
            let mut surface = BitmapSurface::new(root);
            render(
                &mut surface,
                &samples,
                fs,
                "ECG",
                Some(&analysis.peaks.indices),
                cfg.duration_sec,
            )?;
            Ok(())
        })?;
    }
    let histogram = rr_histogram(&analysis.rr);
    let report = AnalysisReport::new(None, "input", fs, &analysis, &histogram);
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_overview(cfg: &ViewerConfig, record_id: &str, out: &Path) -> Result<()> {
    let state = load_state(cfg);
    let panels = state.overview(record_id, cfg.duration_sec)?;
    let size = (cfg.output.overview_width, cfg.output.overview_height);
    draw_overview(out, size, &panels)
}

fn cmd_lead(
    cfg: &ViewerConfig,
    record_id: &str,
    lead: Option<&str>,
    annotations: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let state = load_state(cfg);
    let analyzer = RateAnalyzer::new(detector(cfg, annotations)?);
    let view = state.lead_view(record_id, lead, cfg.duration_sec, &analyzer)?;
    let size = (cfg.output.width, cfg.output.height);
    with_bitmap(out, size, |root| {
        BitmapSurface::new(root).draw_strip(&view.detail)
    })?;
    match view.analysis.mean_rr() {
        Some(mean) => println!(
            "{} / {}: {:.1} bpm ({}), mean RR {:.2} s",
            record_id,
            view.lead,
            view.analysis.heart_rate,
            view.status,
            mean
        ),
        None => println!(
            "{} / {}: fewer than two beats detected ({})",
            record_id, view.lead, view.status
        ),
    }
    Ok(())
}

fn cmd_rr_histogram(
    cfg: &ViewerConfig,
    record_id: &str,
    lead: Option<&str>,
    annotations: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let state = load_state(cfg);
    let analyzer = RateAnalyzer::new(detector(cfg, annotations)?);
    let view = state.lead_view(record_id, lead, cfg.duration_sec, &analyzer)?;
    let size = (cfg.output.histogram_width, cfg.output.histogram_height);
    with_bitmap(out, size, |root| {
        BitmapSurface::new(root).draw_histogram(&view.histogram, "RR interval distribution")
    })
}

#[derive(Serialize)]
struct BeatRow {
    beat: usize,
    sample: usize,
    time_s: f64,
    rr_s: Option<f64>,
}

fn write_beat_table(path: &Path, analysis: &AnalysisResult, fs: f64) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for (beat, &sample) in analysis.peaks.indices.iter().enumerate() {
        let rr_s = beat
            .checked_sub(1)
            .and_then(|prev| analysis.rr.rr.get(prev))
            .copied();
        writer.serialize(BeatRow {
            beat,
            sample,
            time_s: sample as f64 / fs,
            rr_s,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
