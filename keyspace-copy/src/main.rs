use std::io::{self, Write};
use std::process::ExitCode;

use keyspace_copy::args::{parse_args, usage, CopyRequest};
use keyspace_copy::confirm::{confirm, Confirmation};
use keyspace_copy::copier::Copier;
use keyspace_copy::session::{CassandraSink, CassandraSource, ClusterHandle};
use keyspace_copy::{Error, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

// usage errors and aborts exit with -1
const EXIT_ABORT: u8 = 255;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let program = std::env::args_os()
        .next()
        .map(|program| program.to_string_lossy().into_owned())
        .unwrap_or_else(|| "keyspace-copy".into());

    let request = match parse_args(std::env::args_os()) {
        Ok(request) => request,
        Err(Error::Help(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(error) if error.is_usage() => {
            eprintln!("ERROR: {error}");
            println!("{}", usage(&program));
            return ExitCode::from(EXIT_ABORT);
        }
        Err(error) => {
            error!(%error, "Cannot parse arguments.");
            return ExitCode::FAILURE;
        }
    };

    match run(request).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Aborted) => {
            println!("Aborted");
            ExitCode::from(EXIT_ABORT)
        }
        Err(error) => {
            error!(%error, "Copy failed.");
            ExitCode::FAILURE
        }
    }
}

async fn run(request: CopyRequest) -> Result<()> {
    let stdout = io::stdout();
    let confirmation = confirm(
        &request.summary(),
        &mut io::stdin().lock(),
        &mut stdout.lock(),
    )?;
    if confirmation == Confirmation::Abort {
        return Err(Error::Aborted);
    }

    let cluster = ClusterHandle::new(&request.cluster, &request.credentials);
    let source = cluster.connect(&request.source_keyspace).await?;
    let destination = cluster.connect(&request.dest_keyspace).await?;

    let copier = Copier::new(
        CassandraSource::new(source, request.page_size),
        CassandraSink::new(destination),
        request.table,
        &request.predicate,
    );

    let mut output = stdout.lock();
    copier.run(&mut output).await?;
    output.flush()?;

    Ok(())
}
