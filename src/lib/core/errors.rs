use anyhow::Error;
use std::io;

/// Returns `true` if the error originated from a broken pipe.
///
/// Writing candidates to a downstream consumer that exits early (e.g. `head`)
/// is a normal way to end a run, not a failure.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}
