mod cli;
mod compiler;
mod output;
mod processors;

#[cfg(test)]
mod test_utils;

use anyhow::Error as AnyError;
use clap::parser::ValueSource;
use cli::{cli, compile, inspect, reflect};
use log::{error, warn, LevelFilter};
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env("LOG")
        .filter_level(LevelFilter::Info)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = cli().get_matches();

    let (task, result) = match matches.subcommand() {
        None => {
            let input = matches
                .get_one::<PathBuf>("input")
                .cloned()
                .unwrap_or_default();
            let output = matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("output"));

            if matches.value_source("output") == Some(ValueSource::DefaultValue) {
                warn!(
                    "no output path specified. using `{}` as the output path.",
                    output.display()
                );
            }

            ("compile shaders", compile(input, output))
        }
        Some(("inspect", matches)) => {
            let containers = matches
                .get_many::<PathBuf>("containers")
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>();

            (
                "inspect containers",
                inspect(&containers, matches.get_flag("json")),
            )
        }
        Some(("reflect", matches)) => {
            let input = matches
                .get_one::<PathBuf>("input")
                .cloned()
                .unwrap_or_default();

            ("reflect shaders", reflect(input, matches.get_flag("json")))
        }
        _ => unreachable!(),
    };

    if let Err(err) = result {
        report(task, &err);
        std::process::exit(1);
    }
}

fn report(task: &str, err: &AnyError) {
    let mut errors = Vec::new();

    for cause in err.chain() {
        errors.push(format!("- {}", cause));
    }

    error!("failed to {}. error:\n{}", task, errors.join("\n"));
}
