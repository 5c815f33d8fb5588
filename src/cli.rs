use std::env;
use std::path::PathBuf;

use crate::io::export::ExportSeries;

/// What the binary does after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run the HTTP API.
    Serve,
    /// Run the terminal dashboard against a running API.
    Dashboard,
    /// Generate one series and write it as CSV.
    Export { series: ExportSeries, out: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub bind: Option<String>,
    pub api_url: Option<String>,
    pub mode: Mode,
}

/// Outcome of argument parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(CliOptions),
    Help,
}

pub fn parse_args() -> Result<Parsed, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<Parsed, String> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Parsed::Help);
    }
    parse_options(&args).map(Parsed::Run)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut seed = None;
    let mut bind = None;
    let mut api_url = None;
    let mut dashboard = false;
    let mut export = None;
    let mut out = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --seed (expected an unsigned integer)",
                )?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| {
                        format!("invalid --seed \"{raw}\" (expected an unsigned integer)")
                    })?;
                if seed.replace(value).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--bind" => {
                i += 1;
                let addr = args.next_or_err(i, "missing value for --bind (expected host:port)")?;
                if bind.replace(addr.to_string()).is_some() {
                    return Err("--bind provided more than once".to_string());
                }
            }
            "--dashboard" => {
                if dashboard {
                    return Err("--dashboard provided more than once".to_string());
                }
                dashboard = true;
            }
            "--api-url" => {
                i += 1;
                let url = args.next_or_err(i, "missing value for --api-url (expected a URL)")?;
                if api_url.replace(url.to_string()).is_some() {
                    return Err("--api-url provided more than once".to_string());
                }
            }
            "--export" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --export (expected a series name)")?;
                let series = ExportSeries::parse(name).ok_or_else(|| {
                    format!(
                        "unknown series \"{name}\", available: {}",
                        ExportSeries::NAMES.join(", ")
                    )
                })?;
                if export.replace(series).is_some() {
                    return Err("--export provided more than once".to_string());
                }
            }
            "--out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --out (expected a file path)")?;
                if out.replace(PathBuf::from(path)).is_some() {
                    return Err("--out provided more than once".to_string());
                }
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if dashboard && export.is_some() {
        return Err(
            "arguments `--dashboard` and `--export` are mutually exclusive; choose one mode".to_string(),
        );
    }
    if api_url.is_some() && !dashboard {
        return Err("--api-url requires --dashboard".to_string());
    }

    let mode = match (dashboard, export, out) {
        (true, _, _) => Mode::Dashboard,
        (false, Some(series), Some(out)) => Mode::Export { series, out },
        (false, Some(_), None) => return Err("--export requires --out <path>".to_string()),
        (false, None, Some(_)) => return Err("--out requires --export".to_string()),
        (false, None, None) => Mode::Serve,
    };

    Ok(CliOptions {
        config,
        seed,
        bind,
        api_url,
        mode,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  grid-market-sim [--config <path>] [--seed <u64>] [--bind <addr>]");
    eprintln!("  grid-market-sim --dashboard [--api-url <url>] [--config <path>]");
    eprintln!(
        "  grid-market-sim --export <{}> --out <path> [--seed <u64>]",
        ExportSeries::NAMES.join("|")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, String> {
        match parse_args_from(args.iter().map(|s| s.to_string()).collect())? {
            Parsed::Run(opts) => Ok(opts),
            Parsed::Help => Err("help".to_string()),
        }
    }

    #[test]
    fn no_args_serves() {
        let opts = parse(&[]).expect("parse should succeed");
        assert_eq!(opts.mode, Mode::Serve);
        assert!(opts.config.is_none() && opts.seed.is_none());
    }

    #[test]
    fn serve_with_overrides() {
        let opts = parse(&["--config", "grid.toml", "--seed", "42", "--bind", "127.0.0.1:0"])
            .expect("parse should succeed");
        assert_eq!(opts.config.as_deref().and_then(|p| p.to_str()), Some("grid.toml"));
        assert_eq!(opts.seed, Some(42));
        assert_eq!(opts.bind.as_deref(), Some("127.0.0.1:0"));
    }

    #[test]
    fn dashboard_with_api_url() {
        let opts = parse(&["--dashboard", "--api-url", "http://remote:5000"])
            .expect("parse should succeed");
        assert_eq!(opts.mode, Mode::Dashboard);
        assert_eq!(opts.api_url.as_deref(), Some("http://remote:5000"));
    }

    #[test]
    fn export_requires_out() {
        assert!(parse(&["--export", "historical"]).is_err());
        let opts = parse(&["--export", "price-spread", "--out", "spread.csv"])
            .expect("parse should succeed");
        assert_eq!(
            opts.mode,
            Mode::Export {
                series: ExportSeries::PriceSpread,
                out: PathBuf::from("spread.csv"),
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--seed", "-1"]).is_err());
        assert!(parse(&["--export", "weather", "--out", "x.csv"]).is_err());
        assert!(parse(&["--dashboard", "--export", "historical", "--out", "x.csv"]).is_err());
        assert!(parse(&["--api-url", "http://x"]).is_err());
        assert!(parse(&["--seed", "1", "--seed", "2"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn help_anywhere() {
        let parsed = parse_args_from(vec!["--seed".into(), "1".into(), "-h".into()]);
        assert_eq!(parsed, Ok(Parsed::Help));
    }
}
