//! Command line options of `petri-eval`.
//! `petri-eval NET [-s KEY=VALUE]... [-p KEY=VALUE]... [-t TIME] [-e KIND] [-c FILE]`

use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::PathBuf;

use crate::config::PetriConfig;
use crate::net::Key;
use crate::vectorfield::EvaluatorKind;

fn make_options_parser() -> clap::Command {
    Command::new("petri-eval")
        .no_binary_name(true)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Evaluates the mass-action vectorfield of a stored Petri net")
        .arg(
            Arg::new("net")
                .value_name("NET")
                .help("Net file (.json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("The file holds an open net; its apex is evaluated")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .value_name("KEY=VALUE")
                .help("Species value overriding the initial concentration")
                .long_help(
                    "Species value overriding the initial concentration. KEY is a species \
                     name on a labelled net and a 1-based index otherwise; a KEY of digits \
                     also matches a species named by those digits.",
                )
                .action(ArgAction::Append)
                .value_parser(parse_assignment),
        )
        .arg(
            Arg::new("param")
                .short('p')
                .long("param")
                .value_name("KEY=VALUE")
                .help("Value of a parameter rate, keyed by transition name or index")
                .action(ArgAction::Append)
                .value_parser(parse_assignment),
        )
        .arg(
            Arg::new("time")
                .short('t')
                .long("time")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("evaluator")
                .short('e')
                .long("evaluator")
                .value_parser(["interpreted", "planned"]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("petri.toml"),
        )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub net: PathBuf,
    pub open: bool,
    pub state: Vec<(Key, f64)>,
    pub parameters: Vec<(Key, f64)>,
    pub time: Option<f64>,
    pub evaluator: Option<EvaluatorKind>,
    pub config: PathBuf,
}

impl Options {
    pub fn parse_from_args<S: AsRef<str>>(flags: &[S]) -> Result<Self, Box<dyn Error>> {
        let matches = make_options_parser().try_get_matches_from(flags.iter().map(|flag| flag.as_ref()))?;
        let net = matches
            .get_one::<String>("net")
            .map(PathBuf::from)
            .ok_or("missing net file")?;
        let assignments = |id: &str| -> Vec<(Key, f64)> {
            matches
                .get_many::<(Key, f64)>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        let evaluator = matches
            .get_one::<String>("evaluator")
            .map(|kind| kind.parse::<EvaluatorKind>())
            .transpose()?;
        Ok(Options {
            net,
            open: matches.get_flag("open"),
            state: assignments("state"),
            parameters: assignments("param"),
            time: matches.get_one::<f64>("time").copied(),
            evaluator,
            config: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("petri.toml")),
        })
    }

    /// Command line values take precedence over the configuration file.
    pub fn apply(&self, config: &mut PetriConfig) {
        if let Some(kind) = self.evaluator {
            config.evaluator = kind;
        }
        if let Some(time) = self.time {
            config.time = time;
        }
        for (key, value) in &self.parameters {
            config.parameters.insert(key.clone(), *value);
        }
    }
}

fn parse_assignment(s: &str) -> Result<(Key, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found `{s}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for `{key}`: {e}"))?;
    let Ok(key) = key.trim().parse::<Key>();
    Ok((key, value))
}
