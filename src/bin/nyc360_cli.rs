//!
//! nyc360 console CLI
//! ------------------
//! Signs in against the NYC360 backend and drives the admin API from a
//! terminal. Runs one login and `whoami` by default, or an interactive
//! interpreter with `--repl`.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use nyc360::cli::{Flow, Repl, HELP_TEXT};
use nyc360::config::ConsoleConfig;
use nyc360::console::Console;
use nyc360::identity::LoginRequest;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--token-file <path>] [--email <e> --password <p>]\n  {program} --repl [--api <url>] [--token-file <path>] [--email <e> --password <p>]\n\nFlags:\n  --api <url>              Backend base URL (default: NYC360_API_BASE_URL or the public API)\n  --token-file <path>      Persist tokens between runs in this JSON file\n  --email <e>              Email used by 'login' with no arguments\n  --password <p>           Password used by 'login' with no arguments\n  --repl                   Start interactive mode\n  -h, --help               Show this help\n\n{HELP_TEXT}\n\nEnvironment:\n  NYC360_API_BASE_URL, NYC360_TOKEN_FILE, NYC360_REQUEST_TIMEOUT_SECS\n  RUST_LOG controls log output (default: warn)"
    );
}

struct Args {
    api: Option<String>,
    token_file: Option<PathBuf>,
    email: Option<String>,
    password: Option<String>,
    repl: bool,
}

fn parse_args(argv: &[String]) -> Result<Option<Args>> {
    let mut args = Args { api: None, token_file: None, email: None, password: None, repl: false };
    let mut i = 1;
    while i < argv.len() {
        let flag = argv[i].as_str();
        let mut value = || -> Result<String> {
            i += 1;
            argv.get(i).cloned().ok_or_else(|| anyhow!("{} requires a value", flag))
        };
        match flag {
            "--api" => args.api = Some(value()?),
            "--token-file" => args.token_file = Some(PathBuf::from(value()?)),
            "--email" => args.email = Some(value()?),
            "--password" => args.password = Some(value()?),
            "--repl" => args.repl = true,
            "-h" | "--help" => return Ok(None),
            other => return Err(anyhow!("unknown argument '{}'", other)),
        }
        i += 1;
    }
    Ok(Some(args))
}

fn main() -> Result<()> {
    let argv: Vec<String> = env::args().collect();
    let program = argv.first().cloned().unwrap_or_else(|| "nyc360_cli".to_string());
    let args = match parse_args(&argv) {
        Ok(Some(a)) => a,
        Ok(None) => {
            print_usage(&program);
            return Ok(());
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&program);
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut cfg = ConsoleConfig::from_env().map_err(|e| anyhow!("{}", e))?;
    if let Some(api) = args.api {
        cfg = cfg.with_base_url(api);
    }
    if let Some(path) = args.token_file {
        cfg.token_file = Some(path);
    }
    let credentials = match (args.email, args.password) {
        (Some(email), Some(password)) => Some(LoginRequest { email, password }),
        (None, None) => None,
        _ => return Err(anyhow!("--email and --password must be given together")),
    };

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().context("failed to start runtime")?;
    rt.block_on(async move {
        let console = Console::from_config(cfg).map_err(|e| anyhow!("{}", e))?;
        let mut repl = Repl::new(console, credentials.clone());
        if args.repl {
            run_repl(&mut repl).await
        } else {
            run_once(&mut repl, credentials.is_some()).await
        }
    })
}

async fn run_once(repl: &mut Repl, login: bool) -> Result<()> {
    if login {
        report(repl.handle_line("login").await);
    }
    report(repl.handle_line("whoami").await);
    Ok(())
}

async fn run_repl(repl: &mut Repl) -> Result<()> {
    println!("nyc360 console ({}). Type 'help' for commands.", repl.console().config().api_base_url);
    let stdin = io::stdin();
    loop {
        print!("{}", repl.prompt());
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        match repl.handle_line(line.trim()).await {
            Flow::Quit => break,
            flow => report(flow),
        }
    }
    Ok(())
}

fn report(flow: Flow) {
    if let Flow::Continue(text) = flow {
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}
