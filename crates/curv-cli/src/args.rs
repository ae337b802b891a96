use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
usage: curv [-o json|curv] [-O name=value]... [--config FILE] [-v] FILE

  -o FORMAT        output format: json (default) or curv
  -O name=value    set an export option (aa, taa, fdur, bg); value is Curv source
  --config FILE    read configuration from a JSON file
  -v, --verbose    log compiler activity to stderr
  -h, --help       print this message";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Curv,
}

#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub format: Format,
    pub options: Vec<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
    pub file: Option<PathBuf>,
}

/// Parse everything after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut out = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => out.help = true,
            "-v" | "--verbose" => out.verbose = true,
            "-o" => {
                let fmt = args.next().context("-o needs a format")?;
                out.format = match fmt.as_str() {
                    "json" => Format::Json,
                    "curv" => Format::Curv,
                    other => bail!("unknown output format `{other}` (expected json or curv)"),
                };
            }
            "-O" => out.options.push(args.next().context("-O needs name=value")?),
            "--config" => out.config = Some(args.next().context("--config needs a file")?.into()),
            s if s.starts_with("-O") => out.options.push(s[2..].to_string()),
            s if s.starts_with('-') && s != "-" => bail!("unknown flag `{s}`"),
            _ => {
                if out.file.is_some() {
                    bail!("only one input file may be given");
                }
                out.file = Some(arg.into());
            }
        }
    }

    if out.file.is_none() && !out.help {
        bail!("no input file");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_json() {
        let a = parse(&["shape.curv"]).unwrap();
        assert_eq!(a.format, Format::Json);
        assert_eq!(a.file, Some(PathBuf::from("shape.curv")));
        assert!(a.options.is_empty());
    }

    #[test]
    fn all_flags() {
        let a = parse(&["-o", "curv", "-O", "aa=4", "-Ofdur=0.1", "--config", "c.json", "-v", "s.curv"]).unwrap();
        assert_eq!(a.format, Format::Curv);
        assert_eq!(a.options, vec!["aa=4".to_string(), "fdur=0.1".to_string()]);
        assert_eq!(a.config, Some(PathBuf::from("c.json")));
        assert!(a.verbose);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["-o", "svg", "s.curv"]).is_err());
        assert!(parse(&["-o"]).is_err());
        assert!(parse(&["--frobnicate", "s.curv"]).is_err());
        assert!(parse(&["a.curv", "b.curv"]).is_err());
    }

    #[test]
    fn help_needs_no_file() {
        assert!(parse(&["--help"]).unwrap().help);
    }
}
