//! Hissp CLI entry point.
//!
//! Two modes: pass one or more `.lissp` files and the CLI reads, macroexpands,
//! and compiles each to host (Python) source, printing it to stdout
//! (`--batch`) or evaluating it against a shared [`TreeWalkingHost`] and then
//! dropping into an interactive REPL seeded with whatever those files
//! defined.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use hissp_cli::{Repl, RustylineEditor};
use hissp_core::host::HostBridge;
use hissp_core::value::Value;
use hissp_core::{compile_source, ReaderConfig};
use hissp_host::TreeWalkingHost;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    module: Option<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[1;31merror:\x1b[0m {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "-m" | "--module" => {
                i += 1;
                if i >= args.len() {
                    return Err("--module requires a value".into());
                }
                config.module = Some(args[i].clone());
            }
            arg if arg.starts_with('-') => return Err(format!("unknown option: {arg}").into()),
            path => config.files.push(PathBuf::from(path)),
        }
        i += 1;
    }
    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }
    if config.show_version {
        println!("hissp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let module = config.module.clone().unwrap_or_else(|| "__main__".to_string());
    let host = TreeWalkingHost::new();

    if config.batch_mode {
        for file in &config.files {
            let source = fs::read_to_string(file)?;
            let module_name = module_name_for(file, &module);
            let env = host.make_env(&module_name);
            let compiled = compile_source(&source, ReaderConfig::for_module(module_name.clone()), &host, &env)?;
            print!("{compiled}");
        }
        return Ok(());
    }

    for file in &config.files {
        let source = fs::read_to_string(file)?;
        let module_name = module_name_for(file, &module);
        let env = host.make_env(&module_name);
        let compiled = compile_source(&source, ReaderConfig::for_module(module_name.clone()), &host, &env)?;
        let value = host.eval(&compiled, &env)?;
        if !matches!(value, Value::None) {
            println!("{}", host.repr(&value));
        }
        host.register_module(module_name, env);
    }

    let editor = RustylineEditor::new()?;
    let mut repl = Repl::new(editor, module);
    repl.run()?;
    Ok(())
}

/// A loaded file's module name: its stem, unless `--module` pinned one
/// explicitly and only a single file was given.
fn module_name_for(file: &PathBuf, default_module: &str) -> String {
    if default_module != "__main__" {
        return default_module.to_string();
    }
    file.file_stem()
        .and_then(|s| s.to_str())
        .map_or_else(|| default_module.to_string(), str::to_string)
}

fn print_help() {
    println!(
        "\x1b[1mHissp\x1b[0m - a Lisp that compiles to a functional subset of Python

\x1b[1mUSAGE:\x1b[0m
    hissp [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    .lissp files to compile, in order

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    -b, --batch          Compile and print host source; skip evaluation and the REPL
    -m, --module NAME     Qualify read symbols against NAME instead of each file's stem

\x1b[1mEXAMPLES:\x1b[0m
    hissp                       Start an interactive REPL
    hissp prelude.lissp         Load prelude.lissp, then start the REPL
    hissp -b prelude.lissp      Print prelude.lissp's compiled Python and exit"
    );
}
