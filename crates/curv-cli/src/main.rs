mod args;
mod logging;

use std::io::{self, Read};
use std::process::ExitCode;
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use curv_lang::gpu_program::not_a_shape;
use curv_lang::{compile, describe, Config, GpuProgram, Location, System};

use crate::args::{parse_args, Args, Format, USAGE};
use crate::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("curv: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    init_logging(LoggingConfig::verbose(args.verbose));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn read_source(path: &std::path::Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("reading standard input")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("cannot read `{}`", path.display()))
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let system = System::new(config).context("loading the prelude")?;

    let mut opts = system.config().frag.clone();
    for option in &args.options {
        opts.parse_option(&system, option).map_err(|e| anyhow!("-O {option}: {e}"))?;
    }

    let path = args.file.as_deref().context("no input file")?;
    let source = read_source(path)?;
    let name = path.display().to_string();

    let program = compile(&system, &name, &source).map_err(|errors| {
        let lines: Vec<String> = errors
            .iter()
            .map(|e| format!("{}: [{}] {}", Location { source: name.as_str().into(), span: e.span }, e.code, e.message))
            .collect();
        anyhow!(lines.join("\n"))
    })?;

    let value = program.run().map_err(anyhow::Error::msg)?;
    let gpu = GpuProgram::from_value(&system, name.as_str(), program.nub(), &value, &opts)
        .map_err(|e| anyhow!(describe(&program, &e)))?
        .ok_or_else(|| anyhow!(describe(&program, &not_a_shape(&program.nub(), &value))))?;

    let stdout = io::stdout().lock();
    match args.format {
        Format::Json => gpu.write_json(stdout)?,
        Format::Curv => gpu.write_curv(stdout)?,
    }
    Ok(())
}
