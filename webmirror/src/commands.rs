use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("webmirror")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("webmirror")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("mirror")
                .about(
                    "Mirror a website into a browsable local directory tree. Same-origin \
                resources and hyperlinked pages are downloaded and rewritten to local paths.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The seed URL to mirror; omit to read seed URLs from stdin")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-d --"directory" <PATH>)
                        .required(false)
                        .help("Destination directory; each site lands in a URL-encoded subdirectory")
                        .default_value("."),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(-r --"retries" <COUNT>)
                        .required(false)
                        .help("Extra download attempts after a failed fetch")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"user-agent" <STRING>)
                        .required(false)
                        .help("User-Agent header to present (some origins refuse unknown clients)"),
                )
                .arg(
                    arg!(--"charset" <LABEL>)
                        .required(false)
                        .help("Charset assumed for pages whose response declares none")
                        .default_value("utf-8"),
                )
                .arg(
                    arg!(--"no-hyperlinks" "Do not follow or download hyperlinked pages")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-images" "Do not download images")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-multimedia" "Do not download audio and video resources")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write a JSON summary of the finished job to this file")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
