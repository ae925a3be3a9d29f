// ============================================================
//  report.rs - Raportul final (text sau JSON) și ecoul în consolă
// ============================================================
//
//  Structura raportului text:
//
//    [XSS]
//    Tentative de exploatare:
//    - <linia originală>
//    Exploatări reușite:
//    - <linia originală>
//
//  Fișierul se scrie întâi într-un fișier temporar alăturat și apoi
//  se redenumește: o eroare de I/O nu lasă în urmă un raport trunchiat.
// ============================================================

use crate::config::ReportFormat;
use crate::detector::{DetectorSet, FuzzScore};
use crate::display;
use crate::engine::RunOutcome;
use crate::parser::Record;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct Section {
    pub detector:   &'static str,
    /// Input malițios respins de server (status >= 400)
    pub attempted:  Vec<Record>,
    /// Input malițios acceptat (status < 400)
    pub successful: Vec<Record>,
}

/// O adresă raportată pentru fuzzing, cu cererile ei care au reușit
#[derive(Debug, Serialize)]
pub struct FuzzSection {
    #[serde(flatten)]
    pub score:      FuzzScore,
    /// Răspunsurile 200 ale adresei
    pub successful: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub source:       PathBuf,
    pub outcome:      RunOutcome,
    /// Doar adresele peste pragul de raportare
    pub fuzz:         Vec<FuzzSection>,
    pub sections:     Vec<Section>,
}

impl Report {
    pub fn build(source: &Path, detectors: &DetectorSet, outcome: RunOutcome) -> Self {
        let sections = detectors
            .content()
            .map(|detector| {
                let summary = detector.summary();
                Section {
                    detector:   detector.name(),
                    attempted:  dedup(summary.potential),
                    successful: dedup(summary.vulnerable),
                }
            })
            .collect();

        let detector = detectors.fuzz();
        let fuzz = detector
            .flagged()
            .into_iter()
            .map(|score| {
                let successful = detector.successes(&score.address).to_vec();
                FuzzSection { score, successful }
            })
            .collect();

        Report {
            generated_at: Local::now(),
            source: source.to_path_buf(),
            outcome,
            fuzz,
            sections,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("Raportul nu a putut fi serializat în JSON")
            }
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let stats = &self.outcome.stats;

        // `write!` într-un String nu poate eșua
        let _ = writeln!(out, "==== Raport analiză log ====");
        let _ = writeln!(out, "Generat: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Sursă:   {}", self.source.display());
        let _ = writeln!(
            out,
            "Linii citite: {} | Înregistrări: {} | Ignorate: {} | Batch-uri: {}",
            stats.lines_read, stats.parsed, stats.skipped, self.outcome.batches
        );
        if !self.outcome.complete {
            let _ = writeln!(out, "[!] RAPORT INCOMPLET: analiza a fost întreruptă");
        }

        let _ = writeln!(out, "\n[Fuzzing / Brute-force]");
        if self.fuzz.is_empty() {
            let _ = writeln!(out, "  (nicio adresă suspectă)");
        }
        for entry in &self.fuzz {
            let _ = writeln!(out, "{}", fuzz_line(&entry.score));
            for record in &entry.successful {
                let _ = writeln!(out, "- {}", record);
            }
        }

        for section in &self.sections {
            let _ = writeln!(out, "\n[{}]", section.detector);
            write_entries(&mut out, "Tentative de exploatare:", &section.attempted);
            write_entries(&mut out, "Exploatări reușite:", &section.successful);
        }

        out
    }

    /// Scrie raportul pe disc, creând directorul părinte dacă lipsește.
    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let body = self.render(format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Nu s-a putut crea directorul '{}'", parent.display()))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let result = fs::write(&tmp, body)
            .with_context(|| format!("Nu s-a putut scrie raportul în '{}'", tmp.display()))
            .and_then(|()| {
                fs::rename(&tmp, path)
                    .with_context(|| format!("Nu s-a putut finaliza raportul '{}'", path.display()))
            });

        if result.is_err() {
            // fișierul temporar poate lipsi deja
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Ecoul condensat în consolă: doar exploatările reușite și scorurile de fuzzing
    pub fn echo(&self) {
        for entry in &self.fuzz {
            let score = &entry.score;
            display::log_fuzz_score(&score.address, score.score, score.errors, score.successes);
        }
        for section in &self.sections {
            for record in &section.successful {
                display::log_vulnerable(section.detector, record);
            }
        }
    }

    /// Numărul total de exploatări reușite, din toate secțiunile
    pub fn successful_count(&self) -> usize {
        self.sections.iter().map(|s| s.successful.len()).sum()
    }
}

fn fuzz_line(score: &FuzzScore) -> String {
    format!(
        "probabilitate de fuzzing/brute-force de la {}: {:.2}% ({} erori / {} succese)",
        score.address, score.score, score.errors, score.successes
    )
}

fn write_entries(out: &mut String, title: &str, records: &[Record]) {
    let _ = writeln!(out, "{}", title);
    if records.is_empty() {
        let _ = writeln!(out, "  (niciuna)");
    }
    for record in records {
        let _ = writeln!(out, "- {}", record);
    }
}

fn dedup(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.raw.clone()))
        .collect()
}
