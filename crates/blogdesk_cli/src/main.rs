//! CLI probe for `blogdesk_core`.
//!
//! # Responsibility
//! - `ping`: verify core crate linkage.
//! - `<action> <caller-json> <request-json>`: run one gateway action against
//!   the database named by `BLOGDESK_DB_PATH`.
//!
//! Exit status is 0 on success, 1 on rejection, 2 on usage errors.

use blogdesk_core::{
    init_logging_from_config, parse_action_name, ActionGateway, ActionRequest, Caller,
    CoreConfig, SqliteModelRegistry,
};
use std::process::ExitCode;

const USAGE: &str = "usage: blogdesk_cli ping\n       blogdesk_cli <action> <caller-json> <request-json>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [command] if command == "ping" => {
            println!("{}", ping_report());
            ExitCode::SUCCESS
        }
        [action, caller, request] => {
            let outcome = CoreConfig::from_env()
                .map_err(|err| Failure::Usage(err.to_string()))
                .and_then(|config| run(&config, action, caller, request));
            match outcome {
                Ok(output) => {
                    println!("{output}");
                    ExitCode::SUCCESS
                }
                Err(Failure::Usage(message)) => {
                    eprintln!("{message}\n{USAGE}");
                    ExitCode::from(2)
                }
                Err(Failure::Rejected(reason)) => {
                    eprintln!("{reason}");
                    ExitCode::from(1)
                }
            }
        }
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Usage(String),
    Rejected(String),
}

fn ping_report() -> String {
    format!(
        "blogdesk_core ping={}\nblogdesk_core version={}",
        blogdesk_core::ping(),
        blogdesk_core::core_version()
    )
}

fn run(config: &CoreConfig, action: &str, caller: &str, request: &str) -> Result<String, Failure> {
    let action = parse_action_name(action).map_err(|err| Failure::Usage(err.to_string()))?;
    let caller: Caller = serde_json::from_str(caller)
        .map_err(|err| Failure::Usage(format!("invalid caller json: {err}")))?;
    let request: ActionRequest = serde_json::from_str(request)
        .map_err(|err| Failure::Usage(format!("invalid request json: {err}")))?;

    if let Err(err) = init_logging_from_config(config) {
        eprintln!("warning: {err}");
    }

    let registry =
        SqliteModelRegistry::open(config).map_err(|err| Failure::Rejected(err.to_string()))?;
    let gateway = ActionGateway::new(registry);
    let outcome = gateway
        .execute(action, &caller, &request)
        .map_err(|err| Failure::Rejected(err.reason()))?;
    log::debug!("event=cli_action module=cli status=ok action={action}");

    serde_json::to_string_pretty(&outcome).map_err(|err| Failure::Rejected(err.to_string()))
}
