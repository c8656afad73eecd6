use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::WorkspaceError;

/// Zip the contents of `source` into a new archive at `destination`.
///
/// Entry names are relative to `source` with `/` separators; the source
/// directory itself is not an entry. Children are visited in name order so
/// the archive layout is reproducible. `destination` must not be inside
/// `source`. Blocking; call from `spawn_blocking`. Returns the number of
/// files written.
pub fn zip_directory(source: &Path, destination: &Path) -> Result<usize, WorkspaceError> {
    let file = File::create(destination)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let files = add_tree(&mut writer, source, "", options)?;

    // Flush here; errors from the drop-time flush would be discarded.
    writer
        .finish()?
        .into_inner()
        .map_err(|e| e.into_error())?
        .sync_all()?;
    Ok(files)
}

fn add_tree(
    writer: &mut ZipWriter<BufWriter<File>>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<usize, WorkspaceError> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = 0;
    for entry in entries {
        let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
            files += add_tree(writer, &entry.path(), &format!("{name}/"), options)?;
        } else if file_type.is_file() {
            let size = entry.metadata()?.len();
            writer.start_file(name, options.large_file(size >= u64::from(u32::MAX)))?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, writer)?;
            files += 1;
        }
    }
    Ok(files)
}
