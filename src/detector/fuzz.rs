// ============================================================
//  detector/fuzz.rs - Detecția brute-force / fuzzing per IP
// ============================================================
//
//  Pentru fiecare adresă sursă numărăm:
//    - erori   : status > 400
//    - succese : status == 200
//  Scorul = erori / (erori + succese) * 100, calculat doar când
//  eșantionul depășește `min_samples` - altfel scor 0 (trafic prea mic
//  pentru o concluzie).
// ============================================================

use super::{Detector, FindingSet, Summary};
use crate::parser::Record;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Tally {
    errors:    usize,
    successes: usize,
    /// Răspunsurile 200 ale adresei - devin "vulnerable" dacă scorul e mare
    accepted:  FindingSet,
}

/// Scorul calculat pentru o adresă
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzScore {
    pub address:   String,
    pub errors:    usize,
    pub successes: usize,
    pub score:     f64,
}

pub struct FuzzDetector {
    min_samples:      usize,
    report_threshold: f64,
    tallies:          HashMap<String, Tally>,
}

/// Procentul de erori; 0 sub pragul minim de eșantioane.
pub fn fuzz_score(errors: usize, successes: usize, min_samples: usize) -> f64 {
    let total = errors + successes;
    if total <= min_samples {
        return 0.0;
    }
    errors as f64 / total as f64 * 100.0
}

impl FuzzDetector {
    pub fn new(min_samples: usize, report_threshold: f64) -> Self {
        FuzzDetector {
            min_samples,
            report_threshold,
            tallies: HashMap::new(),
        }
    }

    /// Scorurile tuturor adreselor, descrescător după scor
    pub fn scores(&self) -> Vec<FuzzScore> {
        let mut scores: Vec<FuzzScore> = self
            .tallies
            .iter()
            .map(|(address, tally)| FuzzScore {
                address:   address.clone(),
                errors:    tally.errors,
                successes: tally.successes,
                score:     fuzz_score(tally.errors, tally.successes, self.min_samples),
            })
            .collect();

        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.address.cmp(&b.address))
        });
        scores
    }

    /// Doar adresele cu scor peste pragul de raportare
    pub fn flagged(&self) -> Vec<FuzzScore> {
        self.scores()
            .into_iter()
            .filter(|s| s.score > self.report_threshold)
            .collect()
    }

    /// Răspunsurile 200 primite de o adresă, în ordinea apariției
    pub fn successes(&self, address: &str) -> &[Record] {
        self.tallies
            .get(address)
            .map(|tally| tally.accepted.records())
            .unwrap_or(&[])
    }
}

impl Detector for FuzzDetector {
    fn name(&self) -> &'static str {
        "Fuzzing / Brute-force"
    }

    fn analyze(&mut self, batch: &[Record]) {
        for record in batch {
            let tally = self.tallies.entry(record.address.clone()).or_default();
            if record.status > 400 {
                tally.errors += 1;
            } else if record.status == 200 {
                tally.successes += 1;
                tally.accepted.insert(record);
            }
        }
    }

    // "potential" rămâne gol: semnalul util sunt răspunsurile reușite
    // ale adreselor cu rată mare de erori
    fn summary(&self) -> Summary {
        let mut vulnerable = Vec::new();
        for score in self.flagged() {
            vulnerable.extend_from_slice(self.successes(&score.address));
        }

        Summary {
            potential: Vec::new(),
            vulnerable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::test_support::record;

    fn feed(detector: &mut FuzzDetector, address: &str, errors: usize, successes: usize) {
        let mut batch = Vec::new();
        for i in 0..errors {
            batch.push(record(address, &format!("/missing/{}", i), 404));
        }
        for i in 0..successes {
            batch.push(record(address, &format!("/found/{}", i), 200));
        }
        detector.analyze(&batch);
    }

    #[test]
    fn small_samples_score_zero() {
        let mut detector = FuzzDetector::new(10, 1.0);
        feed(&mut detector, "10.0.0.1", 3, 2);

        let scores = detector.scores();
        assert_eq!(scores[0].score, 0.0);
        assert!(detector.flagged().is_empty());
    }

    #[test]
    fn eleven_samples_are_scored() {
        let mut detector = FuzzDetector::new(10, 1.0);
        feed(&mut detector, "10.0.0.2", 8, 3);

        let score = &detector.flagged()[0];
        assert_eq!((score.errors, score.successes), (8, 3));
        assert!((score.score - 72.727).abs() < 0.01);
    }

    #[test]
    fn tallies_accumulate_across_batches() {
        let mut detector = FuzzDetector::new(10, 1.0);
        feed(&mut detector, "10.0.0.3", 4, 1);
        feed(&mut detector, "10.0.0.3", 4, 2);
        assert_eq!(detector.flagged().len(), 1);
    }

    #[test]
    fn status_400_and_redirects_are_not_counted() {
        let mut detector = FuzzDetector::new(0, 1.0);
        detector.analyze(&[
            record("10.0.0.4", "/a", 400),
            record("10.0.0.4", "/b", 302),
        ]);
        let score = &detector.scores()[0];
        assert_eq!((score.errors, score.successes), (0, 0));
    }

    #[test]
    fn summary_exposes_successes_of_flagged_addresses() {
        let mut detector = FuzzDetector::new(10, 1.0);
        feed(&mut detector, "10.0.0.5", 9, 3);
        feed(&mut detector, "10.0.0.6", 1, 1);

        let summary = detector.summary();
        assert!(summary.potential.is_empty());
        assert_eq!(summary.vulnerable.len(), 3);
        assert!(summary.vulnerable.iter().all(|r| r.address == "10.0.0.5"));
    }

    #[test]
    fn successes_are_kept_per_address() {
        let mut detector = FuzzDetector::new(10, 1.0);
        feed(&mut detector, "10.0.0.7", 10, 2);

        assert_eq!(detector.successes("10.0.0.7").len(), 2);
        assert!(detector.successes("10.0.0.7").iter().all(|r| r.status == 200));
        assert!(detector.successes("192.0.2.1").is_empty());
    }
}
