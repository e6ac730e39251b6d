use crate::error::{MirrorError, MirrorResult};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Stream `source` into `dest` in `chunk_size` byte reads, creating or
/// truncating the destination. Returns the number of bytes written.
///
/// Only a zero-length read terminates the loop: tokio file reads may
/// legitimately return fewer bytes than requested before end-of-input, so a
/// short read is not EOF.
///
/// There is no temp-file-then-rename staging: the destination is visible
/// while partially written, and a crash mid-copy leaves a truncated file.
pub async fn copy(source: &Path, dest: &Path, chunk_size: usize) -> MirrorResult<u64> {
    let io_err = |e: std::io::Error| MirrorError::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    };

    let mut reader = tokio::fs::File::open(source).await.map_err(io_err)?;
    let mut writer = tokio::fs::File::create(dest).await.map_err(io_err)?;

    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).await.map_err(io_err)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read]).await.map_err(io_err)?;
        total += bytes_read as u64;
    }

    writer.flush().await.map_err(io_err)?;
    Ok(total)
}
