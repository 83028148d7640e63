use std::io::{Read, stdin};
use std::process::ExitCode;

use rjv::{Parser, ParserOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    #[rustfmt::skip]
    let cmd = clap::Command::new("rjv-cli")
        .about("Parse a JSON document and print its value tree")
        .arg(clap::Arg::new("json"))
        .arg(clap::Arg::new("max-depth")
            .long("max-depth")
            .value_parser(clap::value_parser!(usize))
            .help("Deepest allowed nesting of arrays and objects"),
        )
        .arg(clap::Arg::new("unbounded")
            .long("unbounded")
            .action(clap::ArgAction::SetTrue)
            .conflicts_with("max-depth")
            .help("Disable the nesting depth limit"),
        )
        .arg(clap::Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(clap::ArgAction::SetTrue)
            .help("Only report errors"),
        );

    let m = cmd.try_get_matches().unwrap_or_else(|e| e.exit());
    let json = match m.get_one::<String>("json") {
        Some(json) => json.clone(),
        None => {
            let mut buf = String::new();
            if let Err(e) = stdin().lock().read_to_string(&mut buf) {
                eprintln!("rjv-cli: failed to read stdin: {e}");
                return ExitCode::from(2);
            }
            buf
        }
    };

    let mut options = ParserOptions::default();
    if let Some(max_depth) = m.get_one::<usize>("max-depth") {
        options = options.with_max_depth(*max_depth);
    }
    if m.get_flag("unbounded") {
        options = options.unbounded();
    }
    tracing::debug!(?options, "parser configured");

    match Parser::with_options(&json, options).parse() {
        Ok(parsed) => {
            if !m.get_flag("quiet") {
                println!("{:#?}", parsed);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("rjv-cli: {e}");
            ExitCode::FAILURE
        }
    }
}
