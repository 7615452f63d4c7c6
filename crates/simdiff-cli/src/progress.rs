//! Single-line progress bar, redrawn in place with `\r`.

use std::io::{self, Write};

const BAR_WIDTH: usize = 70;

pub struct ProgressBar<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: BAR_WIDTH }
    }

    /// Draw `[===>   ] NN %`. A zero total draws nothing.
    pub fn update(&mut self, done: usize, total: usize) -> io::Result<()> {
        if total == 0 {
            return Ok(());
        }
        let fraction = done.min(total) as f64 / total as f64;
        let position = (fraction * self.width as f64) as usize;

        let mut line = String::with_capacity(self.width + 8);
        line.push('[');
        for column in 0..self.width {
            line.push(match column.cmp(&position) {
                std::cmp::Ordering::Less => '=',
                std::cmp::Ordering::Equal => '>',
                std::cmp::Ordering::Greater => ' ',
            });
        }
        line.push_str(&format!("] {} %\r", (fraction * 100.0) as u32));
        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }

    /// Move past the bar so later output starts on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
