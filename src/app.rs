//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - converts arguments into plain config
//! - runs the pipeline
//! - writes the chart and prints reports

use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, GrowthArgs, PlotArgs, SourceArgs};
use crate::data::fetch::base_url_from_env;
use crate::domain::{CropPolicy, DEFAULT_REGIONS, GrowthConfig, Metric, PlotConfig, Source};
use crate::error::AppError;
use crate::plot::{SvgOptions, render_ascii_plot, render_svg, write_svg};

pub mod pipeline;

/// Entry point for the `ecdc` binary.
pub fn run() -> Result<(), AppError> {
    // `ecdc` and `ecdc -d sheet.xlsx` behave like `ecdc plot ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Plot(args) => handle_plot(&args),
        Command::Growth(args) => handle_growth(&args),
    };
    if let Err(err) = &result {
        error!(exit_code = err.exit_code(), "{err}");
    }
    result
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let config = plot_config_from_args(args, today())?;
    let run = pipeline::run_plot(&config)?;
    let normalized = run.schema.normalize;

    let options = SvgOptions {
        width: config.width,
        height: config.height,
        title: config.title(normalized),
        footnote: Some(format!("Source: {}", config.source)),
    };
    let svg = render_svg(&run.series, run.min_y, &options)?;
    let path = config.output_path(normalized);
    write_svg(&path, &svg)?;
    info!("Wrote {}", path.display());

    print!("{}", crate::report::format_totals(&run.series, config.metric.label()));

    if config.ascii {
        println!();
        print!(
            "{}",
            render_ascii_plot(&run.series, run.min_y, config.ascii_width, config.ascii_height)
        );
    }

    if let Some(path) = &config.export_series {
        crate::io::export::write_series_csv(path, &run.series)?;
    }

    Ok(())
}

fn handle_growth(args: &GrowthArgs) -> Result<(), AppError> {
    let config = growth_config_from_args(args, today())?;
    let rows = pipeline::run_growth(&config)?;
    crate::report::write_growth_tsv(&rows, std::io::stdout().lock())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Build the plot config. `today` dates the default download and `--timestamp`.
pub fn plot_config_from_args(args: &PlotArgs, today: NaiveDate) -> Result<PlotConfig, AppError> {
    if let Some(start) = args.start {
        if !(start.is_finite() && start > 0.0) {
            return Err(AppError::config(format!(
                "--start must be a positive number on a log axis (got {start})."
            )));
        }
    }
    if args.width == 0 || args.height == 0 {
        return Err(AppError::config("--width and --height must be positive."));
    }

    let regions = if args.countries.is_empty() {
        DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect()
    } else {
        normalize_codes(&args.countries)
    };
    if regions.is_empty() {
        return Err(AppError::config("--countries lists no region codes."));
    }

    Ok(PlotConfig {
        source: source_from_args(&args.source, today),
        metric: metric_from_args(&args.source),
        normalize: args.normalize,
        start: args.start,
        regions,
        crop: CropPolicy {
            padding: (!args.no_crop).then_some(args.crop_padding),
        },
        timeout: timeout_from_args(&args.source)?,
        output: args.output.clone(),
        timestamp: args.timestamp.then_some(today),
        width: args.width,
        height: args.height,
        ascii: args.ascii,
        ascii_width: args.ascii_width,
        ascii_height: args.ascii_height,
        export_series: args.export.clone(),
    })
}

/// Build the growth config.
pub fn growth_config_from_args(
    args: &GrowthArgs,
    today: NaiveDate,
) -> Result<GrowthConfig, AppError> {
    if args.days < 2 {
        return Err(AppError::config("--days must be at least 2."));
    }
    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() {
            return Err(AppError::config("--threshold must be a finite number."));
        }
    }

    Ok(GrowthConfig {
        source: source_from_args(&args.source, today),
        metric: metric_from_args(&args.source),
        days: args.days,
        threshold: args.threshold,
        exclude: normalize_codes(&args.exclude),
        timeout: timeout_from_args(&args.source)?,
    })
}

fn source_from_args(args: &SourceArgs, today: NaiveDate) -> Source {
    match &args.source {
        Some(raw) => Source::parse(raw),
        None => Source::for_date(&base_url_from_env(), args.date.unwrap_or(today)),
    }
}

fn metric_from_args(args: &SourceArgs) -> Metric {
    if args.deaths {
        Metric::Deaths
    } else {
        Metric::from_key(args.key.as_deref())
    }
}

fn timeout_from_args(args: &SourceArgs) -> Result<Option<Duration>, AppError> {
    args.timeout
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                AppError::config(format!("--timeout must be a non-negative number (got {secs})."))
            })
        })
        .transpose()
}

fn normalize_codes(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Rewrite argv so `ecdc` defaults to `ecdc plot`.
///
/// Rules:
/// - `ecdc`                       -> `ecdc plot`
/// - `ecdc -d sheet.xlsx ...`     -> `ecdc plot -d sheet.xlsx ...`
/// - `ecdc -v growth ...`         -> unchanged (first bare word is a subcommand)
/// - `ecdc --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        argv.push("plot".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let first_word = argv.iter().skip(1).find(|a| !a.starts_with('-'));
    let has_subcommand = first_word.is_some_and(|w| matches!(w.as_str(), "plot" | "growth" | "help"));
    if !has_subcommand {
        argv.insert(1, "plot".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plot_args(args: &[&str]) -> PlotArgs {
        let mut full = vec!["ecdc", "plot"];
        full.extend_from_slice(args);
        match Cli::parse_from(full).command {
            Command::Plot(args) => args,
            other => panic!("expected plot, got {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_defaults_to_plot() {
        assert_eq!(rewrite_args(argv(&["ecdc"])), argv(&["ecdc", "plot"]));
        assert_eq!(
            rewrite_args(argv(&["ecdc", "-d", "sheet.xlsx"])),
            argv(&["ecdc", "plot", "-d", "sheet.xlsx"])
        );
        assert_eq!(
            rewrite_args(argv(&["ecdc", "sheet.xlsx"])),
            argv(&["ecdc", "plot", "sheet.xlsx"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        for args in [
            &["ecdc", "growth", "--days", "7"][..],
            &["ecdc", "-v", "growth"][..],
            &["ecdc", "plot"][..],
            &["ecdc", "--help"][..],
            &["ecdc", "-V"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn plot_defaults() {
        let config = plot_config_from_args(&plot_args(&["sheet.xlsx"]), date(2020, 3, 30)).unwrap();
        assert_eq!(config.source, Source::File(PathBuf::from("sheet.xlsx")));
        assert_eq!(config.metric, Metric::Cases);
        assert_eq!(config.regions, DEFAULT_REGIONS.map(String::from).to_vec());
        assert_eq!(config.crop, CropPolicy::default());
        assert_eq!(config.timeout, None);
        assert_eq!(config.min_y(false), 100.0);
        assert_eq!(config.output_path(false), PathBuf::from("covid-19-cases-ecdc.svg"));
    }

    #[test]
    fn key_and_deaths_flag_select_deaths() {
        let today = date(2020, 3, 30);
        let by_key = plot_config_from_args(&plot_args(&["x.xlsx", "--key", "Deaths"]), today).unwrap();
        let by_flag = plot_config_from_args(&plot_args(&["x.xlsx", "-d"]), today).unwrap();
        let other = plot_config_from_args(&plot_args(&["x.xlsx", "--key", "recovered"]), today).unwrap();
        assert_eq!(by_key.metric, Metric::Deaths);
        assert_eq!(by_flag.metric, Metric::Deaths);
        assert_eq!(other.metric, Metric::Cases);
        assert_eq!(by_flag.min_y(false), 10.0);
    }

    #[test]
    fn output_name_reflects_normalization_and_timestamp() {
        let config =
            plot_config_from_args(&plot_args(&["x.xlsx", "-d", "-n", "-t"]), date(2020, 3, 30)).unwrap();
        assert_eq!(
            config.output_path(true),
            PathBuf::from("covid-19-deaths-ecdc-normalized-2020-03-30.svg")
        );
        assert!((config.min_y(true) - 0.2).abs() < 1e-12);
        assert_eq!(
            config.title(true),
            "Coronavirus Total Deaths Normalized (per Mio. Population)"
        );
    }

    #[test]
    fn crop_and_timeout_flags() {
        let today = date(2020, 3, 30);
        let config = plot_config_from_args(
            &plot_args(&["x.xlsx", "--crop-padding", "9", "--timeout", "2.5"]),
            today,
        )
        .unwrap();
        assert_eq!(config.crop.padding, Some(9));
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));

        let config = plot_config_from_args(&plot_args(&["x.xlsx", "--no-crop"]), today).unwrap();
        assert_eq!(config.crop.padding, None);
    }

    #[test]
    fn countries_are_trimmed_and_kept_in_order() {
        let config = plot_config_from_args(
            &plot_args(&["x.xlsx", "--countries", "IT, US ,CN"]),
            date(2020, 3, 30),
        )
        .unwrap();
        assert_eq!(config.regions, vec!["IT", "US", "CN"]);
    }

    #[test]
    fn invalid_arguments_are_config_errors() {
        let today = date(2020, 3, 30);
        for args in [
            &["x.xlsx", "--start", "0"][..],
            &["x.xlsx", "--timeout=-1"][..],
            &["x.xlsx", "--width", "0"][..],
        ] {
            let err = plot_config_from_args(&plot_args(args), today).unwrap_err();
            assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG, "{args:?}");
        }
    }

    #[test]
    fn explicit_date_builds_dated_url() {
        let args = match Cli::parse_from(["ecdc", "growth", "--date", "2020-03-27"]).command {
            Command::Growth(args) => args,
            other => panic!("expected growth, got {other:?}"),
        };
        let config = growth_config_from_args(&args, date(2020, 4, 1)).unwrap();
        assert!(config.source.to_string().ends_with(
            "/COVID-19-geographic-disbtribution-worldwide-2020-03-27.xlsx"
        ));
        assert_eq!(config.days, 5);
        assert_eq!(config.threshold(), 500.0);
        assert_eq!(config.exclude, vec!["JPG11668"]);
    }
}
