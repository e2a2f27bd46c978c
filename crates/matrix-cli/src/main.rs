//! `matrix` command line tool

use anyhow::Context;
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use matrix_cli::config::MatrixConfig;
use matrix_cli::{checkout, describe_outcome, logging, PayTarget, Reporter, StatusOutput};
use matrix_gate::{JsonFileStore, PremiumGate};
use matrix_payment::{HttpPaymentClient, PaymentBackend, PaymentFlow};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_parser(parse_date)
        .help("Reference date for validation and the forecast (default: local date)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn target_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("service")
            .long("service")
            .value_parser(["personal", "compatibility"])
            .help("Report type"),
    )
    .arg(Arg::new("date").long("date").help("Birth date, YYYY-MM-DD (personal)"))
    .arg(Arg::new("name").long("name").help("Name (personal)"))
    .arg(Arg::new("first").long("first").help("First partner's birth date (compatibility)"))
    .arg(Arg::new("second").long("second").help("Second partner's birth date (compatibility)"))
}

fn cli() -> Command {
    Command::new("matrix")
        .version(matrix_cli::VERSION)
        .about("Destiny matrix reports with a payment-gated premium section")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./matrix.toml if present)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("personal")
                .about("Personal matrix report")
                .arg(Arg::new("date").long("date").required(true).help("Birth date, YYYY-MM-DD"))
                .arg(Arg::new("name").long("name").required(true).help("Name"))
                .arg(today_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("compatibility")
                .about("Compatibility matrix report for two birth dates")
                .arg(Arg::new("first").long("first").required(true).help("First birth date"))
                .arg(Arg::new("second").long("second").required(true).help("Second birth date"))
                .arg(today_arg())
                .arg(json_arg()),
        )
        .subcommand(
            target_args(Command::new("pay").about("Start a payment for the premium report"))
                .mut_arg("service", |a| a.required(true))
                .arg(
                    Arg::new("return-url")
                        .long("return-url")
                        .required(true)
                        .help("Where the provider sends the user after paying"),
                )
                .arg(today_arg())
                .arg(json_arg()),
        )
        .subcommand(
            target_args(
                Command::new("confirm")
                    .about("Check the pending payment and unlock the report when paid"),
            )
            .arg(today_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Show premium access and pending payment")
                .arg(json_arg()),
        )
        .subcommand(Command::new("health").about("Probe the payment backend"))
}

fn today(args: &ArgMatches) -> NaiveDate {
    args.get_one::<NaiveDate>("today")
        .copied()
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn required<'a>(args: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("--{id} is required for this report type"))
}

fn target(args: &ArgMatches) -> anyhow::Result<Option<PayTarget>> {
    let target = match args.get_one::<String>("service").map(String::as_str) {
        Some("personal") => Some(PayTarget::Personal {
            date: required(args, "date")?.to_string(),
            name: required(args, "name")?.to_string(),
        }),
        Some(_) => Some(PayTarget::Compatibility {
            first: required(args, "first")?.to_string(),
            second: required(args, "second")?.to_string(),
        }),
        None => None,
    };
    Ok(target)
}

fn emit<T: Serialize + Display>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

fn open_gate(config: &MatrixConfig) -> anyhow::Result<PremiumGate<JsonFileStore>> {
    let store = JsonFileStore::open(&config.storage.path)
        .with_context(|| format!("cannot open client state {}", config.storage.path.display()))?;
    Ok(PremiumGate::new(store))
}

fn open_flow(config: &MatrixConfig) -> anyhow::Result<PaymentFlow<HttpPaymentClient, JsonFileStore>> {
    let client = HttpPaymentClient::new(&config.payment.base_url, config.payment.retry_policy())?;
    Ok(PaymentFlow::new(client, open_gate(config)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"));

    let config = MatrixConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?
        .with_env_overrides();

    match matches.subcommand() {
        Some(("personal", args)) => {
            let reporter = Reporter::from_config(&config)?;
            let mut gate = open_gate(&config)?;
            let output = reporter.personal(
                &mut gate,
                required(args, "date")?,
                required(args, "name")?,
                today(args),
            )?;
            emit(&output, args.get_flag("json"))?;
        }
        Some(("compatibility", args)) => {
            let reporter = Reporter::from_config(&config)?;
            let mut gate = open_gate(&config)?;
            let output = reporter.compatibility(
                &mut gate,
                required(args, "first")?,
                required(args, "second")?,
                today(args),
            )?;
            emit(&output, args.get_flag("json"))?;
        }
        Some(("pay", args)) => {
            let target = target(args)?.context("--service is required")?;
            let return_url = required(args, "return-url")?;
            let mut flow = open_flow(&config)?;
            let created = checkout::pay(&mut flow, &target, return_url, today(args)).await?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&created)?);
            } else {
                println!("payment {} created", created.payment_id);
                println!("pay at: {}", created.confirmation_url);
                println!("then run `matrix confirm`");
            }
        }
        Some(("confirm", args)) => {
            let shown = target(args)?;
            let mut flow = open_flow(&config)?;
            let outcome = checkout::confirm(&mut flow, shown.as_ref(), today(args)).await?;
            println!("{}", describe_outcome(&outcome));
        }
        Some(("status", args)) => {
            let flow = open_flow(&config)?;
            emit(&StatusOutput::read(&flow)?, args.get_flag("json"))?;
        }
        Some(("health", _)) => {
            let client =
                HttpPaymentClient::new(&config.payment.base_url, config.payment.retry_policy())?;
            let health = client.health().await?;
            println!("backend {}: {}", client.base_url(), health.status);
            if !health.is_ok() {
                anyhow::bail!("backend reported status {:?}", health.status);
            }
        }
        _ => {}
    }
    Ok(())
}
