mod debug_report;

use regrade::{HintMode, Question};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "REGRADE_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let question = match Question::load(&config.question) {
        Ok(question) => question,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut hint = question.hint_state(config.hints);
    if let Some(mode) = config.hint_mode {
        hint.mode = mode;
    }

    let run = question.closest_verbose(&config.response, &hint);
    let grade = question.grade(&config.response);

    let report = debug_report::Report {
        response: &config.response,
        question: &question,
        run: &run,
        grade: &grade,
        hint: &hint,
        show_alternates: config.alternates,
    };
    debug_report::print_run(&report, config.color);
}

/// Log filter from `REGRADE_LOG` (e.g. `regrade=debug`), warnings by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(io::stderr).init();
}

struct CliConfig {
    question: PathBuf,
    response: String,
    hints: usize,
    hint_mode: Option<HintMode>,
    alternates: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut question: Option<PathBuf> = None;
    let mut response: Option<String> = None;
    let mut hints = 0;
    let mut hint_mode = None;
    let mut alternates = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("regrade {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--alternates" => alternates = true,
            "--question" | "-q" => {
                let value = args.next().ok_or_else(|| "error: --question expects a file".to_string())?;
                question = Some(PathBuf::from(value));
            }
            "--hints" => {
                let value = args.next().ok_or_else(|| "error: --hints expects a number".to_string())?;
                hints = parse_hints(&value)?;
            }
            "--hint-mode" => {
                let value = args.next().ok_or_else(|| "error: --hint-mode expects a value".to_string())?;
                hint_mode = Some(parse_hint_mode(&value)?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    response = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--question=") => {
                question = Some(PathBuf::from(arg.trim_start_matches("--question=")));
            }
            _ if arg.starts_with("--hints=") => hints = parse_hints(arg.trim_start_matches("--hints="))?,
            _ if arg.starts_with("--hint-mode=") => {
                hint_mode = Some(parse_hint_mode(arg.trim_start_matches("--hint-mode="))?);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                response = Some(std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" "));
                break;
            }
        }
    }

    let question = question.ok_or_else(|| format!("error: no question file given\n\n{}", help_text()))?;
    let response = match response {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    Ok(CliConfig { question, response, hints, hint_mode, alternates, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_hints(value: &str) -> Result<usize, String> {
    value.parse().map_err(|_| format!("error: invalid --hints '{value}' (expected a whole number)"))
}

fn parse_hint_mode(value: &str) -> Result<HintMode, String> {
    match value {
        "none" => Ok(HintMode::None),
        "adaptive" => Ok(HintMode::Adaptive),
        "adaptive-no-penalty" => Ok(HintMode::AdaptiveNoPenalty),
        _ => Err(format!("error: invalid --hint-mode '{value}' (expected none, adaptive or adaptive-no-penalty)")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "regrade {version}

Grade a free-text response against a question's answer patterns and show
the closest correct answer.

Usage:
  regrade [OPTIONS] --question <file.toml> [--] <response...>
  echo <response> | regrade [OPTIONS] --question <file.toml>

Options:
  -q, --question <file>      Question definition (TOML).
  --hints <n>                Hint units bought since the last check. Default: 0
  --hint-mode <mode>         none, adaptive or adaptive-no-penalty.
                             Default: the question's setting.
  --alternates               Print every accepted alternate answer.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}                Log filter, e.g. regrade=debug. Default: warn

Exit codes:
  0  Success.
  1  The question could not be loaded.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
