//! CLI: run one processor against standard input or a directory of files.
//!
//! Usage: `run_processor [OPTIONS] <processor>`
//! Example: run_processor -all -input=data/ RouteOnParity
//!
//! Both the single-dash spellings (`-content`, `-attrs`, `-all`, `-input=<dir>`,
//! `-nar-path=<path>`, `-attrfile=<path>`) and `--` spellings are accepted.
//!
//! Set RUST_LOG=flowfile_harness=trace for TRACE-level span enter/exit and events.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use flowfile_harness::error::{EXIT_SUCCESS, EXIT_USAGE};
use flowfile_harness::{ExtensionRegistry, ReportOptions, RunOptions, run_named};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Flags that may be written with a single leading dash.
const LEGACY_FLAGS: &[&str] = &[
  "content",
  "attrs",
  "all",
  "input",
  "nar-path",
  "nifi-path",
  "attrfile",
];

/// Run a flow-file processor once per input and report its routing.
#[derive(Parser, Debug)]
#[command(name = "run_processor")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  PROC_TESTER_NAR_PATH  Registry search path (see --nar-path).
  PROC_TESTER_RUN_LOG   Path for the JSON run log (see --run-log).

Exit statuses:
  0 success, 1 usage, 3 attribute file missing, 4 input not a directory,
  5 attribute file unreadable, 6 input directory missing, 7 input read error,
  11 unknown processor, 20 instantiation failure, 30 contract violation,
  31 processor failure, 32 run log write error, 33 report write error

Examples:
  echo hello | run_processor -all UpdateAttribute
  run_processor -attrs -input=data/ -attrfile=incoming.properties RouteOnParity"#
)]
struct Args {
  /// Output flow file contents.
  #[arg(long)]
  content: bool,

  /// Output flow file attributes.
  #[arg(long)]
  attrs: bool,

  /// Output contents and attributes of every transferred flow file.
  #[arg(long)]
  all: bool,

  /// Send each file under this directory (recursively) as a flow file.
  /// An empty value reads standard input instead.
  #[arg(long, value_name = "DIR")]
  input: Option<OsString>,

  /// Registry search path. Accepted for compatibility; processors are compiled in.
  #[arg(long = "nar-path", alias = "nifi-path", value_name = "PATH")]
  nar_path: Option<OsString>,

  /// Key/value file of attributes added to every incoming flow file.
  /// An empty value means no attribute file.
  #[arg(long, value_name = "PATH")]
  attrfile: Option<OsString>,

  /// Processor property override (repeatable). Unknown names become dynamic properties.
  #[arg(short = 'P', long = "property", value_name = "NAME=VALUE", value_parser = parse_property)]
  properties: Vec<(String, String)>,

  /// Write a JSON run log (one entry per trigger) to this path.
  #[arg(long = "run-log", value_name = "PATH")]
  run_log: Option<OsString>,

  /// List registered processors and exit.
  #[arg(long)]
  list: bool,

  /// Simple name of the processor to run.
  #[arg(value_name = "processor")]
  processor: Option<String>,
}

fn parse_property(s: &str) -> Result<(String, String), String> {
  match s.split_once('=') {
    Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
    _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
  }
}

/// Empty path values count as not given.
fn non_empty_path(value: Option<&OsString>) -> Option<PathBuf> {
  value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Builds run options from parsed flags. Non-empty env values override flags.
fn run_options(
  args: &Args,
  nar_path_env: Option<OsString>,
  run_log_env: Option<OsString>,
) -> RunOptions {
  let report = if args.all {
    ReportOptions::all()
  } else {
    ReportOptions {
      attributes: args.attrs,
      content: args.content,
    }
  };
  RunOptions {
    report,
    input_dir: non_empty_path(args.input.as_ref()),
    attribute_file: non_empty_path(args.attrfile.as_ref()),
    registry_path: non_empty_path(nar_path_env.as_ref())
      .or_else(|| non_empty_path(args.nar_path.as_ref())),
    properties: args.properties.iter().cloned().collect::<BTreeMap<_, _>>(),
    run_log: non_empty_path(run_log_env.as_ref()).or_else(|| non_empty_path(args.run_log.as_ref())),
  }
}

/// Rewrites `-flag` and `-flag=value` to their `--` form for known flags.
fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
  I: IntoIterator<Item = OsString>,
{
  args
    .into_iter()
    .map(|arg| {
      let Some(s) = arg.to_str() else {
        return arg;
      };
      let Some(rest) = s.strip_prefix('-') else {
        return arg;
      };
      if rest.starts_with('-') {
        return arg;
      }
      let name = rest.split('=').next().unwrap_or(rest);
      if LEGACY_FLAGS.contains(&name) {
        OsString::from(format!("-{}", s))
      } else {
        arg
      }
    })
    .collect()
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(io::stderr)
    .init();

  let args = match Args::try_parse_from(normalize_legacy_args(env::args_os())) {
    Ok(a) => a,
    Err(e) => {
      let code = match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_USAGE,
      };
      let _ = e.print();
      process::exit(code);
    }
  };

  let registry = ExtensionRegistry::with_builtins();
  if args.list {
    for name in registry.names() {
      println!("{}", name);
    }
    return;
  }

  let Some(processor) = args.processor.as_deref() else {
    eprintln!("No processor specified");
    eprintln!("{}", Args::command().render_usage());
    process::exit(EXIT_USAGE);
  };

  let options = run_options(
    &args,
    env::var_os("PROC_TESTER_NAR_PATH"),
    env::var_os("PROC_TESTER_RUN_LOG"),
  );
  info!(processor, options = ?options, "run_processor starting");

  let stdin = io::stdin();
  let mut stdin_lock = stdin.lock();
  let reader: Option<&mut dyn Read> = if options.input_dir.is_none() && !stdin.is_terminal() {
    Some(&mut stdin_lock)
  } else {
    None
  };

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match run_named(&registry, processor, &options, reader, &mut out) {
    Ok(outcome) => {
      info!(seeded = outcome.seeded, triggers = outcome.triggers, "run completed");
    }
    Err(e) => {
      eprintln!("{}", e);
      process::exit(e.exit_code());
    }
  }
}
