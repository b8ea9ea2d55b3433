use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::exit,
};

use clap::{Parser, Subcommand};
use dollar::{
    DEFAULT_SIGIL, Spanned, Template, TemplateError, Tokenizer,
    context::{assign, load_file, merge, parse_assignment},
    diagnostics::{get_diagnostics, report},
    render_with, Options,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command to render and inspect templates
#[derive(Parser, Debug)]
#[command(name = "dollar", author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template against context data
    Render {
        /// Path to template, use - to read from stdin
        path: String,

        /// Load context data from a JSON or TOML file, later files win
        #[arg(short = 'd', long = "data")]
        data: Vec<PathBuf>,

        /// Set a context value, dotted keys assign in to nested mappings
        #[arg(short = 'V', long = "var", value_parser = parse_assignment)]
        vars: Vec<(String, String)>,

        /// Character that opens and closes directives
        #[arg(long, default_value_t = DEFAULT_SIGIL)]
        sigil: char,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the tokens in a template
    Tokens {
        /// Path to template, use - to read from stdin
        path: String,

        /// Character that opens and closes directives
        #[arg(long, default_value_t = DEFAULT_SIGIL)]
        sigil: char,
    },
    /// Produce a syntax tree for a template
    Ast {
        /// Path to template, use - to read from stdin
        path: String,

        /// Character that opens and closes directives
        #[arg(long, default_value_t = DEFAULT_SIGIL)]
        sigil: char,
    },
    /// Check a template for errors
    Check {
        /// Path to template, use - to read from stdin
        path: String,

        /// Character that opens and closes directives
        #[arg(long, default_value_t = DEFAULT_SIGIL)]
        sigil: char,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Render {
            path,
            data,
            vars,
            sigil,
            output,
        } => {
            let source = read_template(&path);

            let mut context = match data.iter().map(load_file).collect::<Result<Vec<_>, _>>() {
                Ok(maps) => merge(maps),
                Err(err) => {
                    eprintln!("{}", TemplateError::from(err));
                    exit(1);
                }
            };

            assign(&mut context, &vars);

            debug!(files = data.len(), vars = vars.len(), "built context");

            let rendered = match render_with(&source, &context, &Options { sigil }) {
                Ok(rendered) => rendered,
                Err(err) => fail_with_report(err, &path, &source),
            };

            match output {
                Some(output) => {
                    if let Err(err) = fs::write(&output, rendered) {
                        eprintln!("Unable to write '{}': {err}", output.display());
                        exit(1);
                    }
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Tokens { path, sigil } => {
            let source = read_template(&path);

            for token in Tokenizer::with_sigil(&source, sigil) {
                match token {
                    Ok((token, _)) => println!("{token}"),
                    Err(err) => fail_with_report(err, &path, &source),
                }
            }
        }
        Commands::Ast { path, sigil } => {
            let source = read_template(&path);

            let template = match Template::parse_with(&source, &Options { sigil }) {
                Ok(template) => template,
                Err(err) => fail_with_report(err, &path, &source),
            };

            match serde_json::to_string_pretty(template.root()) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("Unable to serialize syntax tree: {err}");
                    exit(1);
                }
            }
        }
        Commands::Check { path, sigil } => {
            let source = read_template(&path);

            let errs: Vec<Spanned<TemplateError>> = Template::parse_with(&source, &Options { sigil })
                .err()
                .into_iter()
                .collect();

            let diagnostics = get_diagnostics(&errs, &source);

            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("Unable to serialize diagnostics: {err}");
                    exit(1);
                }
            }

            if !diagnostics.is_empty() {
                eprintln!("Invalid template");
                exit(1);
            }
        }
    }
}

fn read_template(path: &str) -> String {
    let result = if path == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).map(|_| source)
    } else {
        fs::read_to_string(path)
    };

    match result {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Unable to read template '{path}': {err}");
            exit(1);
        }
    }
}

fn fail_with_report(err: Spanned<TemplateError>, path: &str, source: &str) -> ! {
    let name = if path == "-" { "<stdin>" } else { path };

    eprint!("{}", report(&[err], name, source));
    exit(1);
}
