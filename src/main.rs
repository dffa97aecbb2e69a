use clap::{Parser, Subcommand};

mod board;
mod ir;
mod parser;
mod semantics;

use board::Board;
use ir::Instruction;
use semantics::equivalence::EquivSide;
use semantics::{
    build_trace, check_equivalence, check_equivalence_interpreted, compile_trace, run_program,
    EquivalenceResult,
};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "bitgrid")]
#[command(about = "bitgrid - bit-board program interpreter and equivalence checker")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and print its instructions, one per line
    Parse {
        /// Program text, e.g. '^ (#10/01) >A mh'
        program: String,
    },
    /// Run a program against an input board and print the final focus
    Run {
        /// Program text
        program: String,
        /// Input board literal, e.g. '#10/01' or 'o3x3'
        #[arg(short, long)]
        input: String,
        /// Also print every stored named board
        #[arg(long)]
        show_state: bool,
    },
    /// Compile a program over a symbolic input and print the op tape
    Compile {
        /// Program text
        program: String,
        /// Input board height
        #[arg(long)]
        height: usize,
        /// Input board width
        #[arg(long)]
        width: usize,
        /// Name prefix for tape assignments
        #[arg(long, default_value = "a_")]
        prefix: String,
    },
    /// Exhaustively check two programs for equivalence at a fixed size
    Equiv {
        /// First program text
        program_a: String,
        /// Second program text
        program_b: String,
        /// Input board height
        #[arg(long)]
        height: usize,
        /// Input board width
        #[arg(long)]
        width: usize,
        /// Re-run the interpreter per input instead of compiling
        #[arg(long)]
        interpreted: bool,
    },
}

/// Parse a single board literal such as `#10/01` or `o3x3`
fn parse_board(text: &str) -> Result<Board<bool>, Box<dyn std::error::Error>> {
    let program = parser::parse_program(text)?;
    match program.as_slice() {
        [Instruction::Literal(board)] => Ok(board.clone()),
        _ => Err(format!("'{}' is not a board literal", text).into()),
    }
}

/// Render a board as a grid of 0/1 rows for human consumption
fn render_grid(board: &Board<bool>) -> String {
    let mut out = String::new();
    for row in board.rows() {
        for &bit in row {
            out.push(if bit { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

fn cmd_parse(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let program = parser::parse_program(source)?;
    for instruction in &program {
        println!("{}", instruction);
    }
    Ok(())
}

fn cmd_run(source: &str, input: &str, show_state: bool) -> Result<(), Box<dyn std::error::Error>> {
    let program = parser::parse_program(source)?;
    let board = parse_board(input)?;
    let state = run_program(&program, board, &mut ())?;
    println!("{}", state.focus);
    print!("{}", render_grid(&state.focus));
    if show_state {
        for (name, board) in state.named_boards() {
            println!(">{} {}", name, board);
        }
    }
    Ok(())
}

fn cmd_compile(
    source: &str,
    height: usize,
    width: usize,
    prefix: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let program = parser::parse_program(source)?;
    let trace = build_trace(&program, height, width)?;
    let tape = compile_trace(&trace, prefix)?;
    print!("{}", tape);
    Ok(())
}

fn cmd_equiv(
    source_a: &str,
    source_b: &str,
    height: usize,
    width: usize,
    interpreted: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let program_a = parser::parse_program(source_a)?;
    let program_b = parser::parse_program(source_b)?;
    let result = if interpreted {
        check_equivalence_interpreted(
            &EquivSide::Program(&program_a),
            &EquivSide::Program(&program_b),
            height,
            width,
        )?
    } else {
        check_equivalence(&program_a, &program_b, height, width)?
    };
    match result {
        EquivalenceResult::Equivalent { tested_count } => {
            println!("equivalent ({} inputs tested)", tested_count);
        }
        EquivalenceResult::NotEquivalent {
            tested_count,
            witness,
        } => {
            println!("not equivalent ({} inputs tested)", tested_count);
            println!("witness: {}", witness);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .ok();

    let outcome = match &args.command {
        Commands::Parse { program } => cmd_parse(program),
        Commands::Run {
            program,
            input,
            show_state,
        } => cmd_run(program, input, *show_state),
        Commands::Compile {
            program,
            height,
            width,
            prefix,
        } => cmd_compile(program, *height, *width, prefix),
        Commands::Equiv {
            program_a,
            program_b,
            height,
            width,
            interpreted,
        } => cmd_equiv(program_a, program_b, *height, *width, *interpreted),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
