use clap::{Parser as ClapParser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Once;
use std::time::{Duration, Instant};
use temple_compiler::{tokenize_with, Error, Parser, References, TokenizeOptions};
use walkdir::WalkDir;

#[derive(ClapParser)]
#[command(name = "temple")]
#[command(about = "Temple - template tokenizer and data-literal evaluator")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize .tml/.dtml files
    Tokenize {
        /// Path to a template file or directory
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Read the template from stdin
        #[arg(long)]
        stdin: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,

        /// Print the document summary instead of the full token tree
        #[arg(long)]
        summary: bool,

        /// Deepest allowed element nesting
        #[arg(long, default_value_t = 256)]
        max_depth: usize,
    },

    /// Evaluate a data literal such as `{ a: [1, 2] }`
    Data {
        literal: String,

        /// JSON object that identifiers resolve against
        #[arg(long)]
        refs: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}

/// How tokenize output is written
#[derive(Clone, Copy)]
struct Output {
    pretty: bool,
    summary: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tokenize { path, stdin, pretty, summary, max_depth } => {
            let options = TokenizeOptions { max_depth };
            let output = Output { pretty, summary };
            if stdin {
                tokenize_stdin(options, output);
            } else if let Some(path) = path {
                tokenize_path(&path, options, output);
            } else {
                fail("provide a file/directory or use --stdin");
            }
        }
        Commands::Data { literal, refs, pretty } => evaluate(&literal, refs.as_deref(), pretty),
    }
}

static INIT: Once = Once::new();

/// Install env_logger once. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(match verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            });
        }

        builder.write_style(env_logger::WriteStyle::Auto);
        builder.init();

        log::debug!("logging initialized");
    });
}

fn tokenize_stdin(options: TokenizeOptions, output: Output) {
    let mut source = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut source) {
        fail(&format!("failed to read stdin: {}", err));
    }

    match render_document(&source, options, output) {
        Ok(json) => println!("{}", json),
        Err(err) => report(&err, &source, "<stdin>"),
    }
}

fn tokenize_path(path: &Path, options: TokenizeOptions, output: Output) {
    if path.is_file() {
        if !is_template(path) {
            fail(&format!("{} is not a .tml or .dtml file", path.display()));
        }
        let source = read(path);
        match render_document(&source, options, output) {
            Ok(json) => println!("{}", json),
            Err(err) => report(&err, &source, &path.display().to_string()),
        }
    } else if path.is_dir() {
        tokenize_directory(path, options, output);
    } else {
        fail(&format!("{} does not exist", path.display()));
    }
}

fn tokenize_directory(dir: &Path, options: TokenizeOptions, output: Output) {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failures = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_template(e.path()))
    {
        let path = entry.path();
        let source = read(path);
        match render_document(&source, options, output) {
            Ok(json) => {
                let target = tokens_path(path);
                if let Err(err) = fs::write(&target, json + "\n") {
                    fail(&format!("failed to write {}: {}", target.display(), err));
                }
                print_generated(&target.display().to_string());
                file_count += 1;
            }
            Err(err) => {
                eprint!("{}", render_error(&err, &source, &path.display().to_string()));
                failures += 1;
            }
        }
    }

    if file_count == 0 && failures == 0 {
        fail(&format!("no .tml or .dtml files found in {}", dir.display()));
    }

    print_summary(file_count, start.elapsed());
    if failures > 0 {
        process::exit(1);
    }
}

fn evaluate(literal: &str, refs: Option<&Path>, pretty: bool) {
    let references: Option<References> = refs.map(|path| {
        let text = read(path);
        match serde_json::from_str(&text) {
            Ok(references) => references,
            Err(err) => fail(&format!("{} is not a JSON object: {}", path.display(), err)),
        }
    });

    match Parser::parse(literal, references.as_ref()) {
        Ok(value) => println!("{}", to_json(&value, pretty)),
        Err(err) => report(&err, literal, "<literal>"),
    }
}

fn render_document(source: &str, options: TokenizeOptions, output: Output) -> Result<String, Error> {
    let document = tokenize_with(source, options)?;
    Ok(if output.summary {
        to_json(&document.summary(), output.pretty)
    } else {
        to_json(&document, output.pretty)
    })
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let json = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    match json {
        Ok(json) => json,
        Err(err) => fail(&format!("failed to serialize: {}", err)),
    }
}

fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "tml" || ext == "dtml")
}

/// `page.dtml` -> `page.dtml.tokens.json`
fn tokens_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tokens.json");
    PathBuf::from(name)
}

fn read(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => fail(&format!("failed to read {}: {}", path.display(), err)),
    }
}

fn render_error(err: &Error, source: &str, filename: &str) -> String {
    if io::stderr().is_terminal() {
        err.render_color(source, filename)
    } else {
        err.render(source, filename)
    }
}

fn report(err: &Error, source: &str, filename: &str) -> ! {
    eprint!("{}", render_error(err, source, filename));
    process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn print_generated(path: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: Duration) {
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1m✨ Tokenized {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Tokenized {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
