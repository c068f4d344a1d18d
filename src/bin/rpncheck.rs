//! Check programs of the reverse-Polish language, one per line.
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use rpn_ll1::parsing::rpn::{self, build_rpn_lexer, LexerConfig, RpnTerminal};
use rpn_ll1::parsing::{Grammar, Lexer, ParsingTable, PredictiveParser};

#[derive(Parser, Debug)]
#[clap(version, about = "Validate reverse-Polish programs against an LL(1) grammar")]
struct Args {
    /// Grammar file to use instead of the built-in one
    #[clap(short, long)]
    grammar: Option<PathBuf>,

    /// Characters allowed inside identifiers after the first letter
    #[clap(short, long, default_value = "_")]
    separators: String,

    /// Print the tokens of every program
    #[clap(long)]
    tokens: bool,

    /// Print the derivation trace of every program
    #[clap(long)]
    trace: bool,

    /// Print the parsing table and exit
    #[clap(long)]
    print_table: bool,

    /// Input file, one program per line (standard input if absent)
    file: Option<PathBuf>,
}

/// Drop comments and surrounding blanks; `None` for lines holding no program.
fn program_text(line: &str) -> Option<&str> {
    let code = match line.find('#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let code = code.trim();
    (!code.is_empty()).then_some(code)
}

fn load_table(path: Option<&PathBuf>) -> anyhow::Result<ParsingTable<RpnTerminal>> {
    let path = match path {
        Some(path) => path,
        None => return Ok(rpn::default_table().clone()),
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read grammar {}", path.display()))?;
    let grammar = Grammar::from_text(&text)
        .with_context(|| format!("cannot load grammar {}", path.display()))?;
    let table = ParsingTable::from_grammar(&grammar)?;
    info!("loaded grammar {}", path.display());
    Ok(table)
}

/// Check one program, printing what was asked for. Returns whether it is valid.
fn check_program(
    args: &Args,
    lexer: &Lexer<RpnTerminal>,
    parser: &PredictiveParser<RpnTerminal>,
    line_number: usize,
    program: &str,
) -> bool {
    let tokens = match lexer.tokenize(program) {
        Ok(tokens) => tokens,
        Err(error) => {
            println!("{}: error: {}", line_number, error);
            return false;
        }
    };
    if args.tokens {
        let listing: Vec<String> = tokens
            .iter()
            .map(|token| format!("{}({:?})", token.kind, token.lexeme))
            .collect();
        println!("{}: tokens: {}", line_number, listing.join(" "));
    }

    let result = parser.parse(&tokens);
    if args.trace {
        for step in &result.derivation {
            println!("    {}", step.describe(parser.table().grammar()));
        }
    }
    match result.error {
        None => {
            println!("{}: ok", line_number);
            true
        }
        Some(error) => {
            println!("{}: error: {}", line_number, error);
            false
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let table = load_table(args.grammar.as_ref())?;
    if args.print_table {
        print!("{}", table);
        return Ok(());
    }

    let lexer = build_rpn_lexer(&LexerConfig {
        identifier_separators: args.separators.chars().collect(),
    });
    let parser = PredictiveParser::new(&table);

    let input = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("cannot read standard input")?;
            input
        }
    };

    let mut failures = 0;
    for (index, line) in input.lines().enumerate() {
        if let Some(program) = program_text(line) {
            if !check_program(&args, &lexer, &parser, index + 1, program) {
                failures += 1;
            }
        }
    }
    debug!("{} program(s) rejected", failures);

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
