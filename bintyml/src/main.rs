//! TYML command-line tool for checking and converting TYML documents.
//!
//! Usage: tyml [OPTIONS] [FILE|DIR|-]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (tree, yaml, toml, cbor) [default: tree]
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! Set `TYML_LOG` (e.g. `TYML_LOG=libtyml=trace`) to see tokenizer and parser
//! logging on stderr.

use libtyml::{parse_with_filename, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod transcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Tree,
    Yaml,
    Toml,
    Cbor,
}

impl Format {
    fn from_name(s: &str) -> Option<Format> {
        match s {
            "tree" => Some(Format::Tree),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            "cbor" => Some(Format::Cbor),
            _ => None,
        }
    }
}

/// Output of a conversion.
enum Output {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Default)]
struct Options {
    to: Option<Format>,
    output_file: Option<String>,
    check_only: bool,
    input_path: Option<String>,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("TYML_LOG").unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args[1..]) {
        Ok(Some(options)) => options,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    debug!(?options, "options");

    let format = options.to.unwrap_or(Format::Tree);

    if let Some(path) = options.input_path.as_deref() {
        if Path::new(path).is_dir() {
            if options.output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, format, options.check_only));
        }
    }

    let input = match options.input_path.as_deref() {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let exit_code = process_input(
        &input,
        options.input_path.as_deref(),
        format,
        options.output_file.as_deref(),
        options.check_only,
        false,
    );
    process::exit(exit_code);
}

/// Parse command-line arguments. `Ok(None)` means help or version was
/// printed and there is nothing left to do.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("tyml {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "-t" | "--to" => {
                i += 1;
                let name = args.get(i).ok_or("-t requires a format argument")?;
                let format =
                    Format::from_name(name).ok_or_else(|| format!("Unknown format: {}", name))?;
                options.to = Some(format);
            }
            "-o" | "--output" => {
                i += 1;
                let path = args.get(i).ok_or("--output requires an argument")?;
                options.output_file = Some(path.clone());
            }
            "--check" => {
                options.check_only = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if options.input_path.is_some() {
                    return Err("Multiple input paths not supported".to_string());
                }
                options.input_path = Some(arg.to_string());
            }
        }
        i += 1;
    }

    if options.check_only && options.output_file.is_some() {
        return Err("--check and --output are mutually exclusive".to_string());
    }
    Ok(Some(options))
}

/// Check or convert every `.tyml` file in a directory. Converted output goes
/// to stdout, each file preceded by a header line.
fn process_directory(dir_path: &str, format: Format, check_only: bool) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "tyml"))
        .collect();
    paths.sort();
    info!(dir = dir_path, files = paths.len(), "processing directory");

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let input = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(&*path_str), format, None, check_only, true) != 0 {
            had_errors = true;
        }
    }
    if had_errors {
        1
    } else {
        0
    }
}

fn process_input(
    input: &str,
    input_file: Option<&str>,
    format: Format,
    output_file: Option<&str>,
    check_only: bool,
    with_header: bool,
) -> i32 {
    let filename = input_file.map(|p| {
        Path::new(p)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.to_string())
    });

    let value: Value = match parse_with_filename(input, filename.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            return 1;
        }
    };

    if check_only {
        match input_file {
            Some(path) => println!("{}: ok", path),
            None => println!("ok"),
        }
        return 0;
    }

    let output = match convert(&value, format) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if with_header {
        if let Some(path) = input_file {
            println!("==> {} <==", path);
        }
    }
    match write_output(&output, output_file) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn convert(value: &Value, format: Format) -> Result<Output, String> {
    match format {
        Format::Tree => Ok(Output::Text(transcode::tree::encode(value))),
        Format::Yaml => transcode::yaml::encode(value)
            .map(Output::Text)
            .map_err(|e| format!("Cannot convert to YAML: {}", e)),
        Format::Toml => transcode::toml::encode(value)
            .map(Output::Text)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
        Format::Cbor => transcode::cbor::encode(value)
            .map(Output::Binary)
            .map_err(|e| format!("Cannot convert to CBOR: {}", e)),
    }
}

fn write_output(output: &Output, output_file: Option<&str>) -> Result<(), String> {
    if let Some(path) = output_file {
        let bytes = match output {
            Output::Text(s) => s.as_bytes(),
            Output::Binary(b) => b.as_slice(),
        };
        return fs::write(path, bytes).map_err(|e| format!("writing {}: {}", path, e));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let result = match output {
        Output::Text(s) => {
            // Ensure output ends with newline
            if s.ends_with('\n') {
                handle.write_all(s.as_bytes())
            } else {
                writeln!(handle, "{}", s)
            }
        }
        Output::Binary(b) => handle.write_all(b),
    };
    result.map_err(|e| format!("writing to stdout: {}", e))
}

fn print_help() {
    println!(
        "tyml - TYML command-line tool

USAGE:
    tyml [OPTIONS] [FILE|DIR|-]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided or -)
                  When a directory is given, processes all .tyml files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: tree]
                           Supported: tree, yaml, toml, cbor
    -o, --output <FILE>    Write output to specified file (not valid with directory input)
    --check                Check if input is valid (exit 0 if valid, 1 if invalid)
    -h, --help             Print help
    -V, --version          Print version

ENVIRONMENT:
    TYML_LOG               Log filter for diagnostics on stderr [default: warn]

EXAMPLES:
    # Show the syntax tree of a document
    tyml config.tyml

    # Validate all TYML files in a directory
    tyml --check ./configs/

    # Convert TYML to YAML
    tyml -t yaml config.tyml

    # Convert TYML to CBOR (binary)
    tyml -t cbor config.tyml -o config.cbor

    # Trace the tokenizer while parsing stdin
    TYML_LOG=libtyml=trace tyml - < config.tyml
"
    );
}
