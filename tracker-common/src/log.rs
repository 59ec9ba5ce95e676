use std::env::VarError;
use std::error::Error;
use std::path::PathBuf;
use std::{env, fs, io};

use anyhow::{Context, Result};
use log::debug;
use tracing::metadata::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::FromEnvError;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer, EnvFilter, Registry};
use tracing_unwrap::ResultExt;

/// Where log output goes, read from the environment:
///
/// - `NO_STDOUT_LOG`: disables the stdout writer
/// - `LOG_FORMAT=json`: stdout writes json lines instead of the human readable format
/// - `DEBUG_FILE_LOG`: enables a daily rolling json file (release builds only)
/// - `LOG_DIR`: directory for said file, defaults to `logs`
#[derive(Debug)]
pub struct LogOptions {
    pub stdout: bool,
    pub stdout_json: bool,
    pub file_dir: Option<PathBuf>,
}

impl LogOptions {
    pub fn from_env() -> Self {
        let file_dir = if cfg!(debug_assertions) || env::var_os("DEBUG_FILE_LOG").is_none() {
            None
        } else {
            Some(env::var_os("LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from))
        };

        LogOptions {
            stdout: env::var_os("NO_STDOUT_LOG").is_none(),
            stdout_json: env::var("LOG_FORMAT").map_or(false, |format| format.eq_ignore_ascii_case("json")),
            file_dir,
        }
    }
}

/// Installs the global subscriber for `module`. `directives` are only applied if `RUST_LOG` is unset.
///
/// The returned guards flush their writer on drop, so they need to live until the process exits.
pub fn init_logger(module: &str, directives: &'static [&str]) -> Result<Vec<WorkerGuard>> {
    let options = LogOptions::from_env();
    let mut guards = Vec::with_capacity(2);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|err| default_env(err, directives));

    let stdout_layer = stdout(&options).map(|(layer, guard)| {
        guards.push(guard);
        layer
    });

    let file_layer = log_file(module, &options)?.map(|(layer, guard)| {
        guards.push(guard);
        layer
    });

    // https://stackoverflow.com/a/66138267
    Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logger")?;

    debug!("Successfully initialized logger for {} ({:?})", module, options);

    guards.shrink_to_fit();
    Ok(guards)
}

fn stdout<S: Subscriber + for<'a> LookupSpan<'a> + 'static>(
    options: &LogOptions,
) -> Option<(Box<dyn layer::Layer<S> + Send + Sync>, WorkerGuard)> {
    if !options.stdout {
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let fmt_layer = Layer::new().with_thread_ids(true).with_writer(writer);

    let layer: Box<dyn layer::Layer<S> + Send + Sync> = if options.stdout_json {
        Box::new(fmt_layer.json())
    } else {
        Box::new(fmt_layer)
    };

    Some((layer, guard))
}

fn log_file<S: Subscriber + for<'a> LookupSpan<'a>>(
    module: &str,
    options: &LogOptions,
) -> Result<Option<(impl layer::Layer<S>, WorkerGuard)>> {
    let dir = match &options.file_dir {
        Some(dir) => dir,
        None => return Ok(None),
    };

    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("Unable to create log directory {}", dir.display()))?;
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, module));

    let layer = Layer::new()
        .with_thread_ids(true)
        .with_writer(writer)
        .json();

    Ok(Some((layer, guard)))
}

/// Fallback filter used when `RUST_LOG` is missing or invalid. Only warns about the latter.
pub fn default_env(err: FromEnvError, directives: &[&str]) -> EnvFilter {
    let not_found = err
        .source()
        .and_then(|source| source.downcast_ref::<VarError>())
        .map_or(false, |err| matches!(err, VarError::NotPresent));

    if !not_found {
        eprintln!("Warning: Unable to parse `{}` environment variable, using default values: {}", EnvFilter::DEFAULT_ENV, err);
    }

    let level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    directives
        .iter()
        .fold(EnvFilter::default().add_directive(level.into()), |filter, directive| {
            filter.add_directive(directive.parse().unwrap_or_log())
        })
}
