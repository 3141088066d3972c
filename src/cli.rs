//! CLI definition and dispatch.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::adapters::build_data_port;
use crate::adapters::csv_export::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::{dividend_note, HtmlChartAdapter};
use crate::domain::analysis::{run_analysis, AnalysisRequest, AnalysisResult};
use crate::domain::date_range::{local_today, parse_date, parse_range_input, RangeRequest};
use crate::domain::error::DivyieldError;
use crate::domain::settings::{build_settings, Settings};
use crate::domain::ticker::normalize_ticker;
use crate::domain::yield_series::YieldPolicy;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "divyield",
    about = "Dividend yield analysis over a stock's price history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one ticker, print a summary and export CSV + HTML
    Analyze(AnalyzeArgs),
    /// Prompt for tickers and ranges until `q`
    Interactive {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Interactive { config } => run_interactive_command(config.as_ref()),
        Command::Serve { config } => run_serve(config.as_ref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

/// Without a path every key takes its default.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, DivyieldError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| DivyieldError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_settings(path: Option<&PathBuf>) -> Result<Settings, DivyieldError> {
    let config = load_config(path)?;
    build_settings(&config)
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Defaults to `[analysis] ticker`
    #[arg(short, long)]
    pub ticker: Option<String>,
    /// Days back from today; defaults to `[analysis] days`
    #[arg(short, long, conflicts_with = "start")]
    pub days: Option<i64>,
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// End date, YYYY-MM-DD; defaults to today
    #[arg(long, requires = "start")]
    pub end: Option<String>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// `static` or `per-year`
    #[arg(long)]
    pub policy: Option<YieldPolicy>,
    /// Skip writing the CSV and HTML files
    #[arg(long)]
    pub no_export: bool,
}

/// Turn command-line flags into a request, falling back to `settings`.
pub fn build_request(
    args: &AnalyzeArgs,
    settings: &Settings,
    today: NaiveDate,
) -> Result<AnalysisRequest, DivyieldError> {
    let range = match (&args.start, args.days) {
        (Some(start), _) => RangeRequest::Explicit {
            start: parse_date(start)?,
            end: match &args.end {
                Some(end) => parse_date(end)?,
                None => today,
            },
        },
        (None, Some(days)) => RangeRequest::Days(days),
        (None, None) => RangeRequest::Days(settings.default_days),
    };

    Ok(AnalysisRequest {
        ticker: args
            .ticker
            .clone()
            .unwrap_or_else(|| settings.default_ticker.clone()),
        range,
        policy: args.policy.unwrap_or(settings.policy),
    })
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), DivyieldError> {
    let mut settings = load_settings(args.config.as_ref())?;
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }

    let today = local_today();
    let request = build_request(&args, &settings, today)?;
    let port = build_data_port(&settings.provider)?;

    eprintln!("Fetching {}...", request.ticker.trim().to_uppercase());
    let result = run_analysis(&*port, &request, today)?;

    let mut stdout = io::stdout().lock();
    write_summary(&mut stdout, &result)?;

    if !args.no_export {
        for path in export_result(&result, &settings)? {
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Print the headline figures for `result`.
pub fn write_summary<W: Write>(out: &mut W, result: &AnalysisResult) -> io::Result<()> {
    let s = &result.summary;
    writeln!(out, "{} {}", result.ticker, result.range)?;
    writeln!(out, "{}", dividend_note(result))?;
    writeln!(out, "Trading days:   {}", result.bars.len())?;
    writeln!(out, "Latest close:   {:.2}", s.latest_close)?;
    writeln!(out, "Period high:    {:.2}", s.highest_close)?;
    writeln!(out, "Period low:     {:.2}", s.lowest_close)?;
    writeln!(out, "Average yield:  {:.2}%", s.average_yield)?;
    Ok(())
}

/// Write whichever artifacts `settings` enables into its output directory.
pub fn export_result(
    result: &AnalysisResult,
    settings: &Settings,
) -> Result<Vec<PathBuf>, DivyieldError> {
    let mut reporters: Vec<Box<dyn ReportPort>> = Vec::new();
    if settings.export_csv {
        reporters.push(Box::new(CsvExportAdapter));
    }
    if settings.export_html {
        reporters.push(Box::new(HtmlChartAdapter::new()));
    }
    reporters
        .iter()
        .map(|r| r.write(result, &settings.output_dir))
        .collect()
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read one request from the prompt. `Ok(None)` means quit.
fn read_request<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    settings: &Settings,
    today: NaiveDate,
) -> Result<Option<AnalysisRequest>, DivyieldError> {
    let Some(ticker) = prompt(
        input,
        output,
        &format!("Ticker [{}] (q to quit): ", settings.default_ticker),
    )?
    else {
        return Ok(None);
    };
    if ticker.eq_ignore_ascii_case("q") || ticker.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    let ticker = if ticker.is_empty() {
        settings.default_ticker.clone()
    } else {
        ticker
    };

    let Some(range_text) = prompt(
        input,
        output,
        &format!(
            "Days back or start date YYYY-MM-DD [{}]: ",
            settings.default_days
        ),
    )?
    else {
        return Ok(None);
    };
    let mut range = if range_text.is_empty() {
        RangeRequest::Days(settings.default_days)
    } else {
        parse_range_input(&range_text, today)?
    };

    if let RangeRequest::Explicit { start, .. } = range {
        let Some(end_text) = prompt(input, output, "End date YYYY-MM-DD [today]: ")? else {
            return Ok(None);
        };
        if !end_text.is_empty() {
            range = RangeRequest::Explicit {
                start,
                end: parse_date(&end_text)?,
            };
        }
    }

    Ok(Some(AnalysisRequest {
        ticker,
        range,
        policy: settings.policy,
    }))
}

/// Serve `request` from `last` when it matches, otherwise run the pipeline.
/// Returns whether a fresh result was produced.
fn analyze_with_cache(
    port: &dyn MarketDataPort,
    request: &AnalysisRequest,
    today: NaiveDate,
    last: &mut Option<AnalysisResult>,
) -> Result<bool, DivyieldError> {
    let ticker = normalize_ticker(&request.ticker)?;
    let range = request.range.resolve(today)?;
    if last
        .as_ref()
        .is_some_and(|r| r.matches(&ticker, range, request.policy))
    {
        log::debug!("reusing cached analysis for {ticker} over {range}");
        return Ok(false);
    }
    *last = Some(run_analysis(port, request, today)?);
    Ok(true)
}

/// The prompt loop. Errors are reported to `output` and the loop continues;
/// the last good result stays cached for identical requests.
pub fn run_interactive<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    port: &dyn MarketDataPort,
    settings: &Settings,
    today: NaiveDate,
) -> Result<(), DivyieldError> {
    let mut last: Option<AnalysisResult> = None;

    loop {
        let request = match read_request(&mut input, output, settings, today) {
            Ok(Some(request)) => request,
            Ok(None) => break,
            Err(err @ DivyieldError::Io(_)) => return Err(err),
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };

        let fresh = match analyze_with_cache(port, &request, today, &mut last) {
            Ok(fresh) => fresh,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };
        let Some(result) = last.as_ref() else {
            continue;
        };

        if !fresh {
            writeln!(output, "(cached)")?;
        }
        write_summary(output, result)?;

        if fresh {
            match export_result(result, settings) {
                Ok(paths) => {
                    for path in paths {
                        writeln!(output, "Wrote {}", path.display())?;
                    }
                }
                Err(err) => writeln!(output, "error: {err}")?,
            }
        }
    }

    writeln!(output, "Bye.")?;
    Ok(())
}

fn run_interactive_command(config: Option<&PathBuf>) -> Result<(), DivyieldError> {
    let settings = load_settings(config)?;
    let port = build_data_port(&settings.provider)?;
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    run_interactive(stdin, &mut stdout, &*port, &settings, local_today())
}

fn run_serve(config: Option<&PathBuf>) -> Result<(), DivyieldError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{serve, AppState};
        use std::sync::Arc;

        let settings = load_settings(config)?;
        let listen = settings.listen.clone();
        // built outside the runtime: the blocking HTTP client owns its own
        let port = build_data_port(&settings.provider)?;
        let state = AppState::new(Arc::clone(&port), settings);

        eprintln!("Starting web server on {listen}");
        let runtime = tokio::runtime::Runtime::new()?;
        let served = runtime.block_on(serve(state, &listen));
        drop(runtime);
        drop(port);
        served
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config;
        Err(DivyieldError::Io(io::Error::other(
            "built without the web feature",
        )))
    }
}
