//! Service runners: one unit per listener and per background task.

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::lifecycle::Logger;
use crate::observability::metrics;
use crate::registry::{ListenerEntry, Task};

/// Serve one listener until it stops.
///
/// [`Error::ServerClosed`] is the expected result of a graceful stop and is
/// not a failure.
pub async fn run_listener(entry: ListenerEntry, log: Logger) -> Result<(), Error> {
    let endpoint = &entry.endpoint;
    if endpoint.is_tls() {
        log.info(format_args!("starting ListenAndServeTLS at {:?}", endpoint.addr));
    } else {
        log.info(format_args!("starting ListenAndServe at {:?}", endpoint.addr));
    }
    metrics::record_unit_started("listener");

    match entry.listener.serve(endpoint).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_server_closed() => {
            tracing::debug!(addr = %endpoint.addr, "Listener closed");
            Ok(())
        }
        Err(err) => {
            metrics::record_unit_failure("listener");
            Err(err)
        }
    }
}

/// Run a background task once.
///
/// Both the "server closed" and end-of-file sentinels count as a clean exit.
pub async fn run_task(task: Task, token: CancellationToken, log: Logger) -> Result<(), Error> {
    log.info(format_args!("starting {:?}", task.name()));
    metrics::record_unit_started("task");

    let name = task.name().to_string();
    match task.run(token).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_server_closed() || err.is_eof() => {
            tracing::debug!(task = %name, error = %err, "Task finished with a closing sentinel");
            Ok(())
        }
        Err(err) => {
            metrics::record_unit_failure("task");
            Err(err)
        }
    }
}
