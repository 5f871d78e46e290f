use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;

/// Writes each program to `dir/<index>`, creating `dir` if needed.
///
/// Returns the written paths in program order.
pub fn write_programs(dir: &Path, programs: &[String]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(programs.len());
    for (index, text) in programs.iter().enumerate() {
        let path = dir.join(index.to_string());
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        info!("Program {} saved to {}", index, path.display());
        paths.push(path);
    }
    Ok(paths)
}
