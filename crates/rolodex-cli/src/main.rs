// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;
mod shell;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::Runtime;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rolodex --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let level = env::var("ROLODEX_LOG").unwrap_or_else(|_| config.log_level().to_owned());
    init_tracing(&level)?;

    let mut runtime = Runtime::from_config(&config)?;
    if options.check_only {
        return Ok(());
    }

    let reloaded = runtime.reload();
    if let Some(status) = runtime.table().status_line() {
        match reloaded {
            Ok(_) => eprintln!("{status}"),
            Err(_) => eprintln!("warning: {status}"),
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    shell::run_shell(stdin.lock(), stdout.lock(), &mut runtime)
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level {level:?}; use a level such as \"warn\""))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rolodex: a contact table over HTTP or a local database");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and gateway setup, then exit");
    println!("  --help                   Show this help");
    println!();
    println!("Set ROLODEX_LOG (for example rolodex_app=debug) to override [log].level.");
}
