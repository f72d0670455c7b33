mod compile;
mod inspect;
mod reflect;

pub use compile::*;
pub use inspect::*;
pub use reflect::*;

use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("input")
                .help("directory containing the shader sources")
                .value_parser(ValueParser::path_buf())
                .required(true),
        )
        .arg(
            Arg::new("output")
                .help("directory the containers are written to; replaced on success")
                .value_parser(ValueParser::path_buf())
                .default_value("output"),
        )
        .subcommand(
            Command::new("inspect")
                .about("prints the stage records of compiled containers")
                .arg(
                    Arg::new("containers")
                        .value_parser(ValueParser::path_buf())
                        .num_args(1..)
                        .required(true),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("reflect")
                .about("prints the descriptor sets of every shader module")
                .arg(
                    Arg::new("input")
                        .value_parser(ValueParser::path_buf())
                        .required(true),
                )
                .arg(json_arg()),
        )
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("prints JSON instead of text")
        .action(ArgAction::SetTrue)
}
