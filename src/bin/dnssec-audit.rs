//! Process entry point.
//!
//! Grounded on `main()` in
//! `examples/original_source/tests/application/Main.py` for the overall
//! shape (parse params, fail loud with a numbered exit code, build the
//! report sink, run every configured zone), and on the teacher's
//! `src/bin/atlas.rs` for bootstrapping a tracing subscriber before doing
//! any real work.

use dnssec_audit::config::cli;
use dnssec_audit::pipeline;
use dnssec_audit::report::Sink;
use std::env;
use std::io;
use std::process::ExitCode;

const HELP: &str = "\
Usage: dnssec-audit [OPTIONS]

  -h, --help              Print this help and exit.
      --config=FILE        Read all options from an INI file; every other
                            option on the command line is ignored.
      --level=LEVEL        Minimum severity to report (debug, info,
                            warning, error, critical). Default: error.
      --time=TIME           Reference time for RRSIG checks: \"now\",
                            \"run\" (frozen at start-up, the default), or
                            an explicit \"YYYY-MM-DD HH:MM:SS\".
      --sformat=FORMAT      Log line template (Python logging style).
      --dformat=FORMAT      strftime date format for %(asctime)s.
      --type=TYPE           Zone source type: \"file\" (default) or \"axfr\".
      --input=LIST          Semicolon-separated zone source paths/names.
      --anchor=LIST         Semicolon-separated extra trust anchor files.
      --resolver=LIST       Semicolon-separated resolver IP addresses.
      --key=\"NAME ALG DATA\" TSIG key for AXFR transfers.
      --bs=N                Owner-group buffer size. Default: 1.
      --bw=BOOL             Warn on owner-group buffer overflow. Default: true.
      --check=LIST          Semicolon-separated checks to run exclusively.
      --nocheck=LIST        Semicolon-separated checks to exclude.
      --sn                  Skip zones whose SOA serial hasn't advanced.
";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();

    let config = match cli::parse(&argv) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("CRITICAL: {}", e.message);
            return ExitCode::from(e.code as u8);
        }
    };

    if config.general.help {
        print!("{}", HELP);
        return ExitCode::SUCCESS;
    }

    let mut sink = Sink::new(
        io::stderr(),
        config.general.level,
        config.general.sformat.clone(),
        config.general.dformat.clone(),
    )
    .with_stats_writer(io::stdout());

    pipeline::run(&config, &mut sink);

    ExitCode::SUCCESS
}
