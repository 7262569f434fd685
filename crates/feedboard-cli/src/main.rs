// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use feedboard_app::AppState;
use feedboard_store::CookieFile;
use feedboard_tui::{AppRuntime, ViewOptions};
use runtime::{DEMO_SEED, DEMO_SOURCES, PageRuntime, PageSource};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
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
            "load config {}; run `feedboard --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let cookie_path = config.cookie_path()?;
    if options.print_cookie_path {
        println!("{}", cookie_path.display());
        return Ok(());
    }

    let source = page_source(&options, &config)?;

    init_logging(&feedboard_store::default_log_path()?)?;
    info!(config = %options.config_path.display(), cookies = %cookie_path.display(), "starting");

    let jar = if config.restore_session() {
        CookieFile::open(&cookie_path)
    } else {
        CookieFile::open_fresh(&cookie_path)
    }
    .with_context(|| {
        format!(
            "open cookie jar {} -- if this path is wrong, set [cookies].jar_path or FEEDBOARD_COOKIE_PATH",
            cookie_path.display()
        )
    })?;

    let mut runtime = PageRuntime::new(jar, source);
    if options.check_only {
        let mut page = runtime.load_page()?;
        runtime.apply_filters_on_load(&mut page)?;
        return Ok(());
    }

    let mut state = AppState::default();
    feedboard_tui::run_app(
        &mut state,
        &mut runtime,
        ViewOptions {
            show_generated_at: config.show_generated_at(),
        },
    )
}

fn page_source(options: &CliOptions, config: &Config) -> Result<PageSource> {
    if options.demo {
        return Ok(PageSource::Demo {
            seed: DEMO_SEED,
            count: DEMO_SOURCES,
        });
    }

    if let Some(path) = &options.snapshot_path {
        feedboard_store::validate_snapshot_path(&path.to_string_lossy())?;
        return Ok(PageSource::Snapshot(path.clone()));
    }

    config.snapshot_path().map(PageSource::Snapshot).ok_or_else(|| {
        anyhow!(
            "no feed snapshot configured; set [source].snapshot_path, pass --snapshot <path>, or run with --demo"
        )
    })
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("FEEDBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    snapshot_path: Option<PathBuf>,
    print_config_path: bool,
    print_cookie_path: bool,
    demo: bool,
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
        snapshot_path: None,
        print_config_path: false,
        print_cookie_path: false,
        demo: false,
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
            "--snapshot" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--snapshot requires a JSON file path"))?;
                options.snapshot_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-cookie-path" => {
                options.print_cookie_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
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
    println!("feedboard: CAP feed source status board");
    println!("  --config <path>          Use a specific config path");
    println!("  --snapshot <path>        Read feed sources from this JSON snapshot");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-cookie-path      Print resolved cookie jar path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with generated demo feed sources");
    println!("  --check                  Validate config, cookie jar and snapshot, then exit");
    println!("  --help                   Show this help");
}
