use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use srd_core::{
    ConfigRecord, DiscoveryConfig, EnvironmentDiscovery, FilesystemDiscovery, ReaderSchemas,
};
use srd_model::RegionId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("srd")
        .version(srd_core::VERSION)
        .about("Support Resource Discovery")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("discover")
                .about("Discover the environment and print it as JSON")
                .arg(
                    Arg::new("root")
                        .long("root")
                        .value_parser(value_parser!(PathBuf))
                        .help("Filesystem discovery root"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML discovery config"),
                )
                .group(ArgGroup::new("source").args(["root", "config"]).required(true)),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode one envelope against the current reader schema")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_parser(["environment", "landing-zone"])
                        .help("Record kind"),
                )
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Envelope file"),
                ),
        )
        .subcommand(Command::new("regions").about("List recognized region identifiers"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn discover(args: &ArgMatches) -> anyhow::Result<()> {
    let environment = if let Some(root) = args.get_one::<PathBuf>("root") {
        FilesystemDiscovery::new(root)?.discover_environment()?
    } else {
        let path = args
            .get_one::<PathBuf>("config")
            .context("either --root or --config is required")?;
        let config = DiscoveryConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        config.open_discovery()?.discover_environment()?
    };
    println!("{}", serde_json::to_string_pretty(&environment)?);
    Ok(())
}

fn decode(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("envelope file is required")?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let record = ConfigRecord::from_envelope(&bytes)?;

    let schemas = ReaderSchemas::load()?;
    let decoder = match args.get_one::<String>("kind").map(String::as_str) {
        Some("landing-zone") => schemas.landing_zone(),
        _ => schemas.environment(),
    };
    let datum = decoder.decode(record.writer_schema(), record.payload())?;
    println!("{}", serde_json::to_string_pretty(&datum.to_plain_json())?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("discover", args)) => discover(args),
        Some(("decode", args)) => decode(args),
        Some(("regions", _)) => {
            for region in RegionId::all() {
                println!("{region}");
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn discover_requires_a_source() {
        assert!(cli().try_get_matches_from(["srd", "discover"]).is_err());
        assert!(cli()
            .try_get_matches_from(["srd", "discover", "--root", "/a", "--config", "/b"])
            .is_err());
        assert!(cli().try_get_matches_from(["srd", "discover", "--root", "/a"]).is_ok());
    }

    #[test]
    fn decode_kind_is_restricted() {
        assert!(cli()
            .try_get_matches_from(["srd", "decode", "--kind", "bucket", "x.json"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["srd", "decode", "--kind", "landing-zone", "x.json"])
            .is_ok());
    }
}
