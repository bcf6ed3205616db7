use std::fs::File;
use std::io::{self, BufReader, Read};

use anyhow::{Context, Result};

/// Open `paths` for reading, concatenated in order, or stdin if `paths` is
/// empty (§6: "positional input files (or stdin if none)").
pub fn open_inputs(paths: &[std::path::PathBuf]) -> Result<Box<dyn Read + Send>> {
    if paths.is_empty() {
        return Ok(Box::new(io::stdin()));
    }

    let mut readers: Vec<BufReader<File>> = Vec::with_capacity(paths.len());
    for path in paths {
        let file = File::open(path).with_context(|| format!("opening input file {path:?}"))?;
        readers.push(BufReader::new(file));
    }

    Ok(Box::new(ConcatRead { readers, next: 0 }))
}

struct ConcatRead {
    readers: Vec<BufReader<File>>,
    next: usize,
}

impl Read for ConcatRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.next < self.readers.len() {
            let n = self.readers[self.next].read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.next += 1;
        }
        Ok(0)
    }
}
