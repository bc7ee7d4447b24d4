//! Constraint DSL CLI
//!
//! Usage:
//!   constraint-dsl [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --constraints  Print compiled constraints instead of frames
//!   -g, --grammar      Show constraint grammar reference
//!   -v, --verbose      More logging (-v debug, -vv trace)
//!   -h, --help         Print help

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use constraint_dsl::{Document, DocumentError};

#[derive(Parser)]
#[command(name = "constraint-dsl")]
#[command(about = "Compile and solve layout constraint documents")]
struct Cli {
    /// Layout document in TOML (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Print each constraint with the descriptors it compiled to
    #[arg(short, long)]
    constraints: bool,

    /// Show constraint grammar reference
    #[arg(short, long)]
    grammar: bool,

    /// Increase logging (-v debug, -vv trace); RUST_LOG is used otherwise
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.grammar {
        print_grammar();
        return;
    }

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let (name, source) = match &cli.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => ("<stdin>".to_string(), buffer),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let solved = Document::parse(&source).and_then(|doc| doc.solve());
    match solved {
        Ok(solved) if cli.constraints => println!("{}", solved.render_constraints()),
        Ok(solved) => println!("{}", solved.render_frames()),
        Err(DocumentError::Compile(e)) => {
            eprint!("{}", e.format(&name));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_intro() {
    println!(
        r#"Constraint DSL - layout constraints as text

USAGE:
    constraint-dsl [OPTIONS] [FILE]
    cat layout.toml | constraint-dsl

OPTIONS:
    -c, --constraints  Print compiled constraints instead of frames
    -g, --grammar      Show constraint grammar reference
    -v, --verbose      More logging (-v debug, -vv trace)
    -h, --help         Print help

QUICK START:
    printf '[container]\nwidth = 100\nheight = 50\n' | constraint-dsl

Prints one frame per view. Run --grammar for the constraint syntax."#
    );
}

fn print_grammar() {
    println!(
        r#"CONSTRAINT DSL GRAMMAR
======================

EXTENDED FORMAT
---------------
X: <key>.<attr> <relation> <key>.<attr> [* value | / value] [+ value | - value]

    X: title.centerX == parent.centerX
    X: image.width == parent.width * 0.5 - pad
    X: a.left >= b.right + 8

Exactly one constraint per string. `/ v` multiplies by 1/v.

STANDARD FORMAT
---------------
H:|-(pad)-[a]-[b(==80)]-(>=8@250)-|
V:|[header][body]|

    |          container edge
    -          standard spacing (8 between views, 20 to the edge)
    -(x)-      explicit spacing: a number or a metric
    [a(==80)]  size along the chain's axis
    @250       priority for one predicate

ATTRIBUTES
----------
left right top bottom leading trailing width height centerX centerY baseline

RELATIONS
---------
==  >=  <=

KEYS
----
parent        the container view
TOP_GUIDE     top layout guide, when declared
BOTTOM_GUIDE  bottom layout guide, when declared

DOCUMENTS
---------
constraints = ["H:|-(pad)-[title]-(pad)-|", {{ format = "V:|-[title]", priority = 750 }}]

[container]
width = 320
height = 480

[metrics]
pad = 16

[[views]]
key = "title"
size = [120, 24]
hugging = {{ horizontal = 750 }}

[linear]
axis = "vertical"
margins = {{ ends = 20, sides = 16, between = 8 }}
batches = [{{ views = ["title"], centered = true }}]
close = true"#
    );
}
