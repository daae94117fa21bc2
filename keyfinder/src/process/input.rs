use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::io::{MediaSource, ReadOnlySource};

/// Opens `path` as a media source. `-` selects standard input, which cannot seek.
pub fn open_source(path: &Path) -> io::Result<Box<dyn MediaSource>> {
    if is_pipe(path) {
        return Ok(Box::new(ReadOnlySource::new(io::stdin())));
    }

    let file = File::open(path)?;
    Ok(Box::new(file))
}

pub fn is_pipe(path: &Path) -> bool {
    path.as_os_str() == "-"
}
