// ============================================================
//  engine.rs - Bucla principală: batch-uri -> detectoare
// ============================================================
//
//  Citim batch după batch până la EOF și trimitem fiecare batch la
//  toate detectoarele. Semnalul de anulare (Ctrl+C) e verificat doar
//  ÎNTRE batch-uri: un batch început e mereu terminat, deci starea
//  detectoarelor nu rămâne niciodată pe jumătate actualizată.
// ============================================================

use crate::detector::DetectorSet;
use crate::reader::{BatchReader, ReadStats};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Cum s-a încheiat o rulare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub stats:    ReadStats,
    pub batches:  usize,
    /// `false` dacă rularea a fost întreruptă înainte de EOF
    pub complete: bool,
}

pub struct Engine {
    detectors: DetectorSet,
    parallel:  bool,
}

impl Engine {
    pub fn new(detectors: DetectorSet, parallel: bool) -> Self {
        Engine { detectors, parallel }
    }

    pub fn run<R: BufRead>(
        &mut self,
        reader: &mut BatchReader<'_, R>,
        cancel: &AtomicBool,
    ) -> Result<RunOutcome> {
        let mut batches = 0;
        let mut complete = true;

        loop {
            if cancel.load(Ordering::Relaxed) {
                warn!(batches, "analiză întreruptă; raportul va fi parțial");
                complete = false;
                break;
            }

            let Some(batch) = reader.next_batch().context("Eroare la citirea log-ului")? else {
                break;
            };
            batches += 1;

            debug!(
                batch = batches,
                lines = batch.lines_read,
                records = batch.records.len(),
                "batch citit"
            );
            self.detectors.analyze(&batch.records, self.parallel);
        }

        let stats = reader.stats();
        info!(
            lines = stats.lines_read,
            parsed = stats.parsed,
            skipped = stats.skipped,
            batches,
            "citire terminată"
        );

        Ok(RunOutcome { stats, batches, complete })
    }

    pub fn detectors(&self) -> &DetectorSet {
        &self.detectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandCatalog, DetectionConfig};
    use crate::parser::TemplateParser;
    use std::io::Cursor;

    const LAYOUT: &str = "%{ip} %{method} %{endpoint} %{code}";

    fn engine(parallel: bool) -> Engine {
        let detectors = DetectorSet::new(
            &DetectionConfig::default(),
            CommandCatalog::from_lines("cat\nwget"),
        );
        Engine::new(detectors, parallel)
    }

    fn sample_log() -> String {
        let mut log = String::new();
        for i in 0..12 {
            log.push_str(&format!("6.6.6.6 GET /admin/{} 404\n", i));
        }
        log.push_str("6.6.6.6 GET /admin/ok 200\n");
        log.push_str("not a log line\n");
        log.push_str("1.2.3.4 GET /x?q=UNION+SELECT+1 200\n");
        log.push_str("1.2.3.4 GET /x?f=../../etc/passwd 200\n");
        log.push_str("1.2.3.4 GET /x?cmd=cat+/etc/passwd 403\n");
        log.push_str("1.2.3.4 GET /x?q=UNION+SELECT+1 200\n");
        log
    }

    fn run(engine: &mut Engine, log: &str, batch_size: usize) -> RunOutcome {
        let parser = TemplateParser::new(LAYOUT).unwrap();
        let mut reader = BatchReader::new(Cursor::new(log.to_string()), &parser, batch_size);
        engine.run(&mut reader, &AtomicBool::new(false)).unwrap()
    }

    fn section(engine: &Engine, name: &str) -> crate::detector::Summary {
        engine
            .detectors()
            .content()
            .find(|d| d.name() == name)
            .map(|d| d.summary())
            .unwrap()
    }

    #[test]
    fn duplicate_line_across_batches_is_reported_once() {
        let mut engine = engine(false);
        let outcome = run(&mut engine, &sample_log(), 3);

        assert!(outcome.complete);
        assert_eq!(outcome.stats.lines_read, 18);
        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(section(&engine, "SQL injection").vulnerable.len(), 1);
    }

    #[test]
    fn every_detector_sees_every_batch() {
        let mut engine = engine(false);
        run(&mut engine, &sample_log(), 4);

        assert_eq!(section(&engine, "LFI / RFI").vulnerable.len(), 1);
        assert_eq!(section(&engine, "RCE").potential.len(), 1);

        let flagged = engine.detectors().fuzz().flagged();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].address, "6.6.6.6");
    }

    #[test]
    fn parallel_run_matches_sequential_run() {
        let mut sequential = engine(false);
        let mut parallel = engine(true);
        run(&mut sequential, &sample_log(), 5);
        run(&mut parallel, &sample_log(), 5);

        for name in ["XSS", "LFI / RFI", "RCE", "SQL injection", "User-Agent"] {
            let a = section(&sequential, name);
            let b = section(&parallel, name);
            assert_eq!(a.potential, b.potential, "{}", name);
            assert_eq!(a.vulnerable, b.vulnerable, "{}", name);
        }
        assert_eq!(sequential.detectors().fuzz().scores(), parallel.detectors().fuzz().scores());
    }

    #[test]
    fn cancelled_run_stops_before_reading() {
        let mut engine = engine(false);
        let parser = TemplateParser::new(LAYOUT).unwrap();
        let mut reader = BatchReader::new(Cursor::new(sample_log()), &parser, 2);

        let outcome = engine.run(&mut reader, &AtomicBool::new(true)).unwrap();
        assert!(!outcome.complete);
        assert_eq!(outcome.batches, 0);
        assert_eq!(outcome.stats.lines_read, 0);
    }
}
