use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use zawk::{Error, Lexer, LexerOptions, ProgramSource, TokenKind};

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    match run(&args[1..]) {
        Ok(code) => process::exit(code),
        Err(e) => {
            match e.downcast_ref::<Error>() {
                // Already "<file>: <line>: <message>"
                Some(lex @ Error::Lexer { .. }) => eprintln!("{}", lex),
                _ => eprintln!("zawk: {}", e),
            }
            process::exit(2);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ZAWK_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &[String]) -> Result<i32, Box<dyn std::error::Error>> {
    let mut program_text: Option<String> = None;
    let mut program_files: Vec<PathBuf> = Vec::new();
    let mut options = LexerOptions::default();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];

        if arg == "--help" || arg == "-h" {
            print_help();
            return Ok(0);
        }

        if arg == "--version" {
            println!("zawk {}", env!("CARGO_PKG_VERSION"));
            return Ok(0);
        }

        if arg == "-f" {
            i += 1;
            if i >= args.len() {
                return Err("option -f requires an argument".into());
            }
            program_files.push(PathBuf::from(&args[i]));
        } else if let Some(file) = arg.strip_prefix("-f") {
            program_files.push(PathBuf::from(file));
        } else if arg == "-p" {
            options.echo_source = true;
        } else if arg == "--" {
            // End of options
            i += 1;
            if program_files.is_empty() && program_text.is_none() {
                program_text = args.get(i).cloned();
            }
            break;
        } else if arg.starts_with('-') && arg != "-" {
            return Err(format!("unknown option: {}", arg).into());
        } else if program_files.is_empty() && program_text.is_none() {
            // First non-option argument is the program
            program_text = Some(arg.clone());
        }
        // Remaining operands would be data files; scanning does not read them.

        i += 1;
    }

    let source = if !program_files.is_empty() {
        ProgramSource::Files(program_files)
    } else {
        ProgramSource::Text(program_text.ok_or("no program provided")?)
    };

    let mut lexer = Lexer::with_options(source, options)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        let result = lexer.next_token().cloned();
        for warning in lexer.take_warnings() {
            eprintln!("{}", warning);
        }
        let token = result?;
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            token.location.line,
            token.kind.class(),
            token.kind,
            escape_text(&token.text)
        )?;
        if token.kind == TokenKind::Eof {
            break;
        }
    }

    Ok(0)
}

/// Token text with control bytes made visible
fn escape_text(text: &[u8]) -> String {
    text.escape_ascii().to_string()
}

fn print_help() {
    println!(
        r#"Usage: zawk [OPTIONS] 'program'
       zawk [OPTIONS] -f progfile [-f progfile]...

Scan an AWK program and print its tokens, one per line:
  <line> <class> <kind> <text>

Options:
  -f progfile    Read the AWK program from file ('-' for stdin)
  -p             Echo program lines to stderr as they are read
  --version      Print version information
  --help         Print this help message

Environment:
  ZAWK_LOG       Log filter (e.g. debug, zawk=trace)

Examples:
  zawk '{{ print $1 }}'
  zawk -f prog.awk -f lib.awk
"#
    );
}
