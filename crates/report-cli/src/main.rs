//! Financial report command line tool
//!
//! Generates Markdown reports from cached financial Q&A data, either read
//! from a JSON file or fetched from the Market Lens API.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use report_core::{
    config::ReportConfig,
    services::{format_periods, parse_periods_list},
    MarkdownReportGenerator, MarketLensClient, ReportJob, ReportPipeline, ReportRequest,
    SummaryRequest,
};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let matches = cli().get_matches();

    if let Err(e) = run(&matches).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("financial-report")
        .version("1.0.0")
        .about("Financial report Markdown generator")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .global(true)
        )
        .arg(
            Arg::new("storage-dir")
                .long("storage-dir")
                .value_name("DIR")
                .help("Directory for generated reports when no save path is given")
                .global(true)
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .value_name("KEY")
                .env("MARKET_LENS_API_KEY")
                .hide_env_values(true)
                .help("Market Lens API key")
                .global(true)
        )
        .subcommand(
            output_args(
                Command::new("generate")
                    .about("Generate a Markdown report from a report_data JSON file")
                    .arg(input_arg())
            )
        )
        .subcommand(
            Command::new("periods")
                .about("Render a periods_list JSON file as Markdown tables")
                .arg(input_arg())
                .arg(markdown_output_arg())
        )
        .subcommand(
            output_args(
                Command::new("fetch-report")
                    .about("Fetch a cached report and generate its Markdown report")
                    .arg(
                        Arg::new("ticker")
                            .long("ticker")
                            .value_name("SYMBOL")
                            .help("Stock ticker")
                            .required(true)
                    )
                    .arg(
                        Arg::new("year")
                            .long("year")
                            .value_name("YEAR")
                            .value_parser(clap::value_parser!(i64))
                            .help("Report year")
                    )
                    .arg(
                        Arg::new("quarter")
                            .long("quarter")
                            .value_name("QUARTER")
                            .value_parser(clap::value_parser!(i64))
                            .help("Report quarter")
                    )
            )
        )
        .subcommand(
            Command::new("fetch-periods")
                .about("Fetch cached report periods and render them as Markdown")
                .arg(markdown_output_arg())
        )
        .subcommand(
            Command::new("summary")
                .about("Request a custom report summary")
                .arg(
                    Arg::new("company-symbol")
                        .long("company-symbol")
                        .value_name("SYMBOL")
                        .help("Company symbol")
                        .required(true)
                )
                .arg(
                    Arg::new("report-period")
                        .long("report-period")
                        .value_name("PERIOD")
                        .help("Report period, e.g. 2024Q3")
                )
                .arg(
                    Arg::new("questions")
                        .long("questions")
                        .value_name("TEXT")
                        .help("JSON array of questions or a single question")
                )
        )
        .subcommand(
            Command::new("questions")
                .about("List the predefined report questions")
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .value_name("FILE")
        .help("Input JSON file")
        .required(true)
}

fn markdown_output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_name("FILE")
        .help("Write the Markdown here instead of stdout")
}

fn output_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("company-name")
                .long("company-name")
                .value_name("NAME")
                .help("Company name for the title and file name")
        )
        .arg(
            Arg::new("output-filename")
                .long("output-filename")
                .value_name("NAME")
                .help("File name stem inside the storage directory")
        )
        .arg(
            Arg::new("save-path")
                .long("save-path")
                .value_name("FILE")
                .help("Exact path of the Markdown file")
        )
        .arg(
            Arg::new("print")
                .long("print")
                .help("Also print the Markdown to stdout")
                .action(ArgAction::SetTrue)
        )
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("generate", sub)) => {
            let input = read_json(sub.get_one::<String>("input").map(String::as_str).unwrap_or_default())?;
            let generator = MarkdownReportGenerator::new(config.storage.clone(), config.document.clone());

            let request = ReportRequest {
                report_data: input,
                company_name: sub.get_one::<String>("company-name").cloned(),
                output_filename: sub.get_one::<String>("output-filename").cloned(),
                save_path: sub.get_one::<String>("save-path").map(PathBuf::from),
            };

            let generated = generator.generate(&request).context("Failed to generate MD report")?;
            log::info!("{}", generated.status);
            println!("{}", generated.file_path.display());
            if sub.get_flag("print") {
                println!("{}", generated.md_content);
            }
        }
        Some(("periods", sub)) => {
            let input = read_json(sub.get_one::<String>("input").map(String::as_str).unwrap_or_default())?;
            let periods = parse_periods_list(&input)?;
            let rendered = format_periods(&periods, Some(chrono::Local::now().naive_local()));

            log::info!("Rendered {} periods", rendered.periods_count);
            emit_markdown(sub, &rendered.markdown)?;
        }
        Some(("fetch-report", sub)) => {
            let client = MarketLensClient::new(config.market_lens.clone())?;
            let generator = MarkdownReportGenerator::new(config.storage.clone(), config.document.clone());
            let pipeline = ReportPipeline::new(client, generator);

            let job = ReportJob {
                ticker: sub.get_one::<String>("ticker").cloned().unwrap_or_default(),
                year: sub.get_one::<i64>("year").copied(),
                quarter: sub.get_one::<i64>("quarter").copied(),
                company_name: sub.get_one::<String>("company-name").cloned(),
                output_filename: sub.get_one::<String>("output-filename").cloned(),
                save_path: sub.get_one::<String>("save-path").map(PathBuf::from),
            };

            let generated = pipeline.generate_report(&job).await?;
            println!("{}", generated.file_path.display());
            if sub.get_flag("print") {
                println!("{}", generated.md_content);
            }
        }
        Some(("fetch-periods", sub)) => {
            let client = MarketLensClient::new(config.market_lens.clone())?;
            let generator = MarkdownReportGenerator::new(config.storage.clone(), config.document.clone());
            let pipeline = ReportPipeline::new(client, generator);

            let rendered = pipeline
                .list_periods(Some(chrono::Local::now().naive_local()))
                .await?;
            emit_markdown(sub, &rendered.markdown)?;
        }
        Some(("summary", sub)) => {
            let client = MarketLensClient::new(config.market_lens.clone())?;
            let request = SummaryRequest::new(
                sub.get_one::<String>("company-symbol").map(String::as_str).unwrap_or_default(),
                sub.get_one::<String>("report-period").map(String::as_str),
                sub.get_one::<String>("questions").map(String::as_str),
            );

            let summary = client.generate_report_summary(&request).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(("questions", _)) => {
            let client = MarketLensClient::new(config.market_lens.clone())?;
            let questions = client.get_predefined_questions().await?;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
        _ => anyhow::bail!("No action specified. Use --help for options."),
    }

    Ok(())
}

/// Config file (if any) overlaid with command line values
fn load_config(matches: &ArgMatches) -> anyhow::Result<ReportConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let config = ReportConfig::from_file(path)?;
            log::info!("Loaded configuration from {}", path);
            config
        }
        None => ReportConfig::default(),
    };

    if let Some(dir) = matches.get_one::<String>("storage-dir") {
        config.storage.storage_dir = PathBuf::from(dir);
    }
    if let Some(key) = matches.get_one::<String>("api-key") {
        config.market_lens.api_key = key.clone();
    }

    config.validate()?;
    log::info!("Using storage directory: {}", config.storage.storage_dir.display());
    Ok(config)
}

fn read_json(path: &str) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path))
}

fn emit_markdown(sub: &ArgMatches, markdown: &str) -> anyhow::Result<()> {
    match sub.get_one::<String>("output") {
        Some(path) => {
            let path = Path::new(path);
            report_core::paths::ensure_parent_dir(path)?;
            std::fs::write(path, markdown)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", markdown),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_parse_fetch_report_args() {
        let matches = cli()
            .try_get_matches_from([
                "financial-report",
                "fetch-report",
                "--ticker",
                "AAPL",
                "--year",
                "2024",
                "--quarter",
                "3",
            ])
            .unwrap();

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "fetch-report");
        assert_eq!(sub.get_one::<String>("ticker").unwrap(), "AAPL");
        assert_eq!(sub.get_one::<i64>("year"), Some(&2024));
        assert_eq!(sub.get_one::<i64>("quarter"), Some(&3));
    }

    #[test]
    fn test_storage_dir_overrides_default() {
        let matches = cli()
            .try_get_matches_from([
                "financial-report",
                "--storage-dir",
                "/tmp/reports",
                "questions",
            ])
            .unwrap();

        let config = load_config(&matches).unwrap();
        assert_eq!(config.storage.storage_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_generate_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.json");
        std::fs::write(
            &input,
            r#"{"data": {"year": 2024, "quarter": 3, "reports": [{"question": "利润", "answer": "增长"}]}}"#,
        )
        .unwrap();

        let storage = dir.path().join("out");
        let matches = cli()
            .try_get_matches_from([
                "financial-report",
                "--storage-dir",
                storage.to_str().unwrap(),
                "generate",
                "--input",
                input.to_str().unwrap(),
                "--company-name",
                "ABC Corp",
            ])
            .unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(run(&matches)).unwrap();

        let written = std::fs::read_to_string(storage.join("ABC_Corp_financial_report_2024Q3.md")).unwrap();
        assert!(written.contains("## 1. 利润"));
    }
}
