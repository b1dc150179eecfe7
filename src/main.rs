mod report;

use dee_schema::{EventTypeMap, KeyFieldPlan, Options, SchemaCatalog, available_templates, get_event_template};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_env("DEE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

enum Source {
    ListTemplates,
    Template(String),
    Spec { spec: Option<PathBuf>, map: PathBuf },
}

struct CliConfig {
    source: Source,
    key_rank: Option<u32>,
    strict: bool,
    json: bool,
    color: bool,
}

fn run(config: &CliConfig) -> dee_schema::Result<()> {
    let palette = report::Palette::new(config.color);

    match &config.source {
        Source::ListTemplates => {
            for name in available_templates() {
                println!("{name}");
            }
            Ok(())
        }
        Source::Template(name) => {
            let catalog = get_event_template(name)?;
            emit(&catalog, None, config, &palette)
        }
        Source::Spec { spec, map } => {
            let text = match spec {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_stdin_input()?,
            };
            let mapping: EventTypeMap = serde_json::from_str(&std::fs::read_to_string(map)?)?;
            let options = Options { strict: config.strict };

            let res = dee_schema::compile_triggers_verbose_with(&text, &mapping, &options)?;
            let plan = match config.key_rank {
                Some(rank) => KeyFieldPlan::from_rank(&res.spec, &mapping, rank),
                None => KeyFieldPlan::default(),
            };
            let catalog = res.drafts.finalize_with(&plan)?;
            emit(&catalog, Some(&res.details), config, &palette)
        }
    }
}

fn emit(
    catalog: &SchemaCatalog,
    details: Option<&dee_schema::CompileDetails>,
    config: &CliConfig,
    palette: &report::Palette,
) -> dee_schema::Result<()> {
    if config.json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
    } else {
        report::print_catalog(catalog, details, palette);
    }
    Ok(())
}

fn parse_args() -> Result<CliConfig, String> {
    let mut spec: Option<PathBuf> = None;
    let mut map: Option<PathBuf> = None;
    let mut template: Option<String> = None;
    let mut list = false;
    let mut key_rank: Option<u32> = None;
    let mut strict = false;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("dee-schema {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--strict" => strict = true,
            "--json" => json = true,
            "--list-templates" => list = true,
            "-s" | "--spec" => spec = Some(PathBuf::from(value("--spec")?)),
            "-m" | "--map" => map = Some(PathBuf::from(value("--map")?)),
            "-t" | "--template" => template = Some(value("--template")?),
            "--key-rank" => key_rank = Some(parse_key_rank(&value("--key-rank")?)?),
            _ => return Err(format!("error: unknown option '{arg}'\n\n{}", help_text())),
        }
    }

    let source = match (list, template, map) {
        (true, None, None) => Source::ListTemplates,
        (false, Some(name), None) if spec.is_none() => Source::Template(name),
        (false, None, Some(map)) => Source::Spec { spec, map },
        (false, None, None) => return Err(format!("error: --map or --template is required\n\n{}", help_text())),
        _ => return Err("error: --list-templates, --template and --spec/--map are mutually exclusive".to_string()),
    };

    if key_rank.is_some() && !matches!(source, Source::Spec { .. }) {
        return Err("error: --key-rank only applies to --spec/--map".to_string());
    }

    Ok(CliConfig { source, key_rank, strict, json, color })
}

/// Ranks are numbered from 1.
fn parse_key_rank(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(rank) if rank > 0 => Ok(rank),
        _ => Err(format!("error: invalid --key-rank '{raw}' (expected a positive integer)")),
    }
}

fn read_stdin_input() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "dee-schema {version}

Compile trigger specifications into event schemas.

Usage:
  dee-schema [OPTIONS] --map <file> [--spec <file>]
  dee-schema [OPTIONS] --template <name>
  dee-schema --list-templates

Options:
  -s, --spec <file>          Trigger specification text. Read from stdin when omitted.
  -m, --map <file>           JSON object mapping event type names to identifiers.
  -t, --template <name>      Print a built-in template instead of compiling a spec.
  --key-rank <n>             Narrow key fields to each event type's rank-<n> fields.
  --strict                   Fail on malformed blocks instead of skipping them.
  --json                     Print the schema catalog as JSON.
  --list-templates           List built-in templates.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  DEE_LOG                    Log filter (default: warn), e.g. DEE_LOG=debug.

Exit codes:
  0  Success.
  1  Compilation, configuration or IO error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
