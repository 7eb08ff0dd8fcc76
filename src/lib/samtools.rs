//! Spawning of the external samtools collaborators.
//!
//! The engine consumes the alignment stream and the reference window through
//! plain readers; this module is the only place that knows those readers are
//! backed by `samtools view` and `samtools faidx` child processes.

use crate::regions::Region;
use anyhow::{bail, Context, Result};
use std::io::BufReader;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

/// Flag passed to `samtools view -F`: excludes unmapped, secondary, and
/// supplementary records before they reach the stream.
pub const SAMTOOLS_VIEW_FILTER_FLAG: u32 = 2308;

/// How far the fetched reference window extends beyond a requested contig
/// range on each side, so reads overlapping the range boundary still resolve
/// their reference bases.
pub const EXPAND_REFERENCE_REGION: u32 = 1_000_000;

/// Spawn `samtools view` over the given region and hand back the child and a
/// buffered reader over its stdout.
///
/// The caller is responsible for draining the reader and then calling
/// [`finish_view`].
pub fn spawn_view(
    samtools: &str,
    bam: &Path,
    region: &Region,
) -> Result<(Child, BufReader<ChildStdout>)> {
    let mut child = Command::new(samtools)
        .arg("view")
        .arg("-F")
        .arg(SAMTOOLS_VIEW_FILTER_FLAG.to_string())
        .arg(bam)
        .arg(region.samtools_string())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {} view on {}", samtools, bam.display()))?;
    let stdout = child
        .stdout
        .take()
        .context("samtools view stdout was not captured")?;
    Ok((child, BufReader::new(stdout)))
}

/// Reap the `samtools view` child after its stream has been drained.
///
/// The exit status is not treated as fatal; a truncated stream simply means
/// fewer records were processed.
pub fn finish_view(mut child: Child) -> Result<()> {
    let status = child.wait().context("Failed to wait on samtools view")?;
    if !status.success() {
        log::warn!("samtools view exited with {}", status);
    }
    Ok(())
}

/// Fetch the uppercase reference bases for `region` via `samtools faidx`.
///
/// The first output line is the `>name` header and is dropped; the remaining
/// lines are concatenated. A non-zero exit status is fatal.
pub fn reference_sequence_from(samtools: &str, fasta: &Path, region: &Region) -> Result<Vec<u8>> {
    let output = Command::new(samtools)
        .arg("faidx")
        .arg(fasta)
        .arg(region.samtools_string())
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("Failed to run {} faidx on {}", samtools, fasta.display()))?;
    if !output.status.success() {
        bail!(
            "samtools faidx exited with {} while fetching {} from {}",
            output.status,
            region.samtools_string(),
            fasta.display()
        );
    }
    let mut sequence = Vec::new();
    for line in output.stdout.split(|&byte| byte == b'\n').skip(1) {
        sequence.extend(
            line.iter()
                .filter(|&&byte| byte != b'\r')
                .map(u8::to_ascii_uppercase),
        );
    }
    Ok(sequence)
}
