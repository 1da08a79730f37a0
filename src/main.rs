use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use payoff::core::{
    DEFAULT_MONTHLY_CAP, Debt, DebtStrategy, ProjectionOptions, active_debts, compare_strategies,
    project, validate_cap, validate_debts, validate_extra,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Snowball,
    Avalanche,
    Minimums,
}

impl From<CliStrategy> for DebtStrategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => DebtStrategy::Snowball,
            CliStrategy::Avalanche => DebtStrategy::Avalanche,
            CliStrategy::Minimums => DebtStrategy::Minimums,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Debt payoff projections (snowball, avalanche, minimums) as a CLI or HTTP API"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "PAYOFF_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Project a JSON array of debts and print the result
    Project {
        #[arg(long, help = "Path to a JSON array of debts, or - for stdin")]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = CliStrategy::Snowball)]
        strategy: CliStrategy,
        #[arg(long, default_value_t = 0.0, help = "Extra monthly payment on top of minimums")]
        extra: f64,
        #[arg(long, default_value_t = DEFAULT_MONTHLY_CAP, help = "Months simulated before giving up")]
        cap: u32,
        #[arg(long, help = "Run every strategy and print the comparison instead")]
        compare: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Command::Serve { port } => payoff::api::run_http_server(port)
            .await
            .context("HTTP server failed")?,
        Command::Project {
            input,
            strategy,
            extra,
            cap,
            compare,
        } => {
            let debts = read_debts(&input)?;
            println!("{}", render_projection(&debts, strategy.into(), extra, cap, compare)?);
        }
    }
    Ok(())
}

/// Validates the inputs the same way the API does and renders pretty JSON.
fn render_projection(
    debts: &[Debt],
    strategy: DebtStrategy,
    extra: f64,
    cap: u32,
    compare: bool,
) -> Result<String> {
    let extra = validate_extra(Some(extra)).context("invalid --extra")?;
    let cap = validate_cap(Some(cap)).context("invalid --cap")?;
    validate_debts(debts).context("invalid debts input")?;

    let debts = active_debts(debts);
    let output = if compare {
        serde_json::to_string_pretty(&compare_strategies(&debts, extra, cap))?
    } else {
        let options = ProjectionOptions::new(strategy, extra).with_cap(cap);
        let projection = project(&debts, &options);
        if !projection.converged {
            tracing::warn!(cap, "debts are not paid off within the safety cap");
        }
        serde_json::to_string_pretty(&projection)?
    };
    Ok(output)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("payoff=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_debts(input: &Path) -> Result<Vec<Debt>> {
    if input.as_os_str() == "-" {
        return parse_debts(io::stdin().lock()).context("failed to read debts from stdin");
    }
    let file =
        fs::File::open(input).with_context(|| format!("failed to read {}", input.display()))?;
    parse_debts(io::BufReader::new(file))
        .with_context(|| format!("failed to parse {}", input.display()))
}

fn parse_debts(mut reader: impl Read) -> Result<Vec<Debt>> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    serde_json::from_str(&raw).context("debts must be a JSON array of debt objects")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_command_parses_flags() {
        let cli = Cli::try_parse_from([
            "payoff",
            "project",
            "--input",
            "debts.json",
            "--strategy",
            "avalanche",
            "--extra",
            "150",
            "--cap",
            "360",
        ])
        .expect("args should parse");

        match cli.command {
            Command::Project {
                input,
                strategy,
                extra,
                cap,
                compare,
            } => {
                assert_eq!(input, PathBuf::from("debts.json"));
                assert_eq!(DebtStrategy::from(strategy), DebtStrategy::Avalanche);
                assert_eq!(extra, 150.0);
                assert_eq!(cap, 360);
                assert!(!compare);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn project_command_rejects_unknown_strategy() {
        let err = Cli::try_parse_from([
            "payoff", "project", "--input", "-", "--strategy", "hybrid",
        ])
        .expect_err("must reject unknown strategy");
        assert!(err.to_string().contains("hybrid"));
    }

    #[test]
    fn read_debts_parses_json_file() {
        let path = std::env::temp_dir().join(format!("payoff-debts-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"[{"id": "a", "currentBalance": 250, "interestRateAnnual": 12, "minimumPayment": 25}]"#,
        )
        .expect("write temp file");

        let debts = read_debts(&path).expect("debts should parse");
        fs::remove_file(&path).ok();

        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].id, "a");
        assert_eq!(debts[0].current_balance, 250.0);
    }

    fn sample_debts() -> Vec<Debt> {
        vec![
            Debt::new("a", "Card A", 1_000.0, 20.0, 50.0),
            Debt::new("b", "Loan B", 500.0, 10.0, 30.0),
        ]
    }

    #[test]
    fn parse_debts_reads_any_reader() {
        let input = br#"[{"id": "b", "balance": 500, "interestRate": 10, "minPayment": 30}]"#;
        let debts = parse_debts(&input[..]).expect("debts should parse");
        assert_eq!(debts, vec![Debt::new("b", "", 500.0, 10.0, 30.0)]);

        let err = parse_debts(&b"{\"id\": \"b\"}"[..]).expect_err("must reject non-array");
        assert!(format!("{err:#}").contains("JSON array"));
    }

    #[test]
    fn render_projection_prints_single_strategy() {
        let output = render_projection(&sample_debts(), DebtStrategy::Snowball, 100.0, 360, false)
            .expect("projection should render");
        let json: serde_json::Value = serde_json::from_str(&output).expect("output is JSON");
        assert_eq!(json["strategy"], "snowball");
        assert_eq!(json["monthsToPayoff"], 11);
        assert_eq!(json["converged"], true);
    }

    #[test]
    fn render_projection_compares_every_strategy() {
        let output = render_projection(&sample_debts(), DebtStrategy::Snowball, 100.0, 360, true)
            .expect("comparison should render");
        let json: serde_json::Value = serde_json::from_str(&output).expect("output is JSON");
        for strategy in DebtStrategy::ALL {
            let months = &json[strategy.as_str()]["projection"]["monthsToPayoff"];
            assert!(months.as_u64().is_some(), "{strategy} missing");
        }
        assert_eq!(json["minimums"]["monthsSaved"], 0);
        assert_eq!(json["extraMonthlyPayment"], 100.0);
    }

    #[test]
    fn render_projection_rejects_out_of_range_cap() {
        for cap in [0, 5_000, u32::MAX] {
            let err = render_projection(&sample_debts(), DebtStrategy::Minimums, 0.0, cap, false)
                .expect_err("cap must be bounded");
            assert!(format!("{err:#}").contains("--cap"), "cap {cap}: {err:#}");
        }
    }

    #[test]
    fn render_projection_rejects_duplicate_ids_and_bad_extra() {
        let mut debts = sample_debts();
        debts.push(Debt::new("a", "Card A again", 10.0, 1.0, 1.0));
        let err = render_projection(&debts, DebtStrategy::Avalanche, 0.0, 120, true)
            .expect_err("duplicate ids must be rejected");
        assert!(format!("{err:#}").contains("duplicate"));

        let err = render_projection(&sample_debts(), DebtStrategy::Avalanche, -1.0, 120, false)
            .expect_err("negative extra must be rejected");
        assert!(format!("{err:#}").contains("--extra"));
    }
}
