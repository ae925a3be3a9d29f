// ============================================================
//  reader.rs - Citirea log-ului în batch-uri de N linii
// ============================================================
//
//  Distincția importantă:
//    - `Ok(None)`            : nu s-a mai putut citi NICIO linie (EOF)
//    - `Ok(Some(batch))`     : s-au citit linii, chiar dacă toate au fost
//                              invalide și `batch.records` e gol
//  Fără ea, un batch complet neparsabil ar opri analiza prematur.
// ============================================================

use crate::parser::{LogParser, Record};
use serde::Serialize;
use std::io::{self, BufRead};
use tracing::debug;

/// Un grup de înregistrări reconstruite din linii consecutive.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records:    Vec<Record>,
    /// Câte linii fizice au fost citite (înainte de filtrare)
    pub lines_read: usize,
}

/// Totaluri cumulate pe toată durata citirii
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    pub lines_read: usize,
    pub parsed:     usize,
    pub skipped:    usize,
}

pub struct BatchReader<'p, R> {
    input:      R,
    parser:     &'p dyn LogParser,
    batch_size: usize,
    stats:      ReadStats,
    buf:        Vec<u8>,
}

impl<'p, R: BufRead> BatchReader<'p, R> {
    /// `batch_size` de 0 ar bucla la infinit; e validat în `Config::validate`,
    /// aici îl ridicăm oricum la 1.
    pub fn new(input: R, parser: &'p dyn LogParser, batch_size: usize) -> Self {
        BatchReader {
            input,
            parser,
            batch_size: batch_size.max(1),
            stats: ReadStats::default(),
            buf: Vec::new(),
        }
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Citește până la `batch_size` linii și le reconstruiește.
    ///
    /// Erorile de I/O sunt propagate (fatale); liniile care nu respectă
    /// șablonul sunt ignorate în tăcere.
    pub fn next_batch(&mut self) -> io::Result<Option<Batch>> {
        let mut batch = Batch::default();

        while batch.lines_read < self.batch_size {
            self.buf.clear();
            // `read_until` în loc de `read_line`: un octet non-UTF-8 nu
            // trebuie să oprească analiza, îl înlocuim cu U+FFFD
            if self.input.read_until(b'\n', &mut self.buf)? == 0 {
                break;
            }
            batch.lines_read += 1;

            let line = String::from_utf8_lossy(&self.buf);
            if line.trim().is_empty() {
                self.stats.skipped += 1;
                continue;
            }

            match self.parser.parse(&line) {
                Some(record) => batch.records.push(record),
                None => {
                    self.stats.skipped += 1;
                    debug!(line = %line.trim_end(), "linie ignorată: nu respectă șablonul");
                }
            }
        }

        if batch.lines_read == 0 {
            return Ok(None);
        }

        self.stats.lines_read += batch.lines_read;
        self.stats.parsed += batch.records.len();
        Ok(Some(batch))
    }
}
