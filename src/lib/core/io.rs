use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use grep_cli::stdout;
use gzp::{deflate::Gzip, Compression, ZBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use termcolor::ColorChoice;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a text file that may or may not be gzip-compressed.
///
/// The compression is sniffed from the leading magic bytes rather than the
/// file extension, so `.gz`-named plain files and extensionless compressed
/// files both work.
pub fn get_text_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let mut file = File::open(&path)
        .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;
    if read == magic.len() && magic == GZIP_MAGIC {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Build a line writer targeting a gzip-compressed file or raw stdout.
///
/// `None` or `-` selects stdout, which is left uncompressed for piping.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    threads: usize,
    compression_level: u32,
) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) if path.as_ref().to_str() != Some("-") => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
            Box::new(
                ZBuilder::<Gzip, _>::new()
                    .num_threads(threads)
                    .compression_level(Compression::new(compression_level))
                    .from_writer(BufWriter::new(file)),
            )
        }
        _ => Box::new(stdout(ColorChoice::Never)),
    };
    Ok(writer)
}
