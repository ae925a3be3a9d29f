// ============================================================
//  detector/lfi.rs - Local / Remote File Inclusion
// ============================================================
//
//  Spre deosebire de celelalte detectoare de conținut, ORICE potrivire
//  intră în "potential"; doar cele cu status 200 sunt în plus și
//  "vulnerable" (fișierul a fost probabil servit).
// ============================================================

use super::{query_values, Detector, Findings, Summary};
use crate::parser::Record;

/// Secvențe de traversare și variantele lor codate (după o decodare)
const TRAVERSAL_MARKERS: &[&str] = &[
    "../", "..\\", "//", "\\\\", "%2f", "%5c", "%2e%2e", "..%2f", "..%5c",
];

pub struct LfiDetector {
    findings: Findings,
}

impl LfiDetector {
    pub fn new() -> Self {
        LfiDetector {
            findings: Findings::default(),
        }
    }
}

pub fn is_file_inclusion(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    if TRAVERSAL_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }

    // Căi absolute cu cel puțin două segmente: /etc/passwd, /proc/self/environ
    if let Some(rest) = lower.strip_prefix('/') {
        if rest.contains('/') {
            return true;
        }
    }

    // C:\windows\win.ini
    let bytes = lower.as_bytes();
    bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

impl Detector for LfiDetector {
    fn name(&self) -> &'static str {
        "LFI / RFI"
    }

    fn analyze(&mut self, batch: &[Record]) {
        for record in batch {
            if !query_values(record).iter().any(|v| is_file_inclusion(v)) {
                continue;
            }
            self.findings.potential.insert(record);
            if record.status == 200 {
                self.findings.vulnerable.insert(record);
            }
        }
    }

    fn summary(&self) -> Summary {
        self.findings.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::test_support::record;

    #[test]
    fn traversal_and_remote_patterns() {
        assert!(is_file_inclusion("../../etc/passwd"));
        assert!(is_file_inclusion("..\\..\\boot.ini"));
        assert!(is_file_inclusion("http://evil.example/shell.txt"));
        assert!(is_file_inclusion("..%2f..%2fetc%2fpasswd"));
        assert!(is_file_inclusion("/etc/shadow"));
        assert!(is_file_inclusion("C:\\Windows\\win.ini"));
        assert!(!is_file_inclusion("report.pdf"));
        assert!(!is_file_inclusion("/home"));
    }

    #[test]
    fn accepted_hit_is_both_potential_and_vulnerable() {
        let mut detector = LfiDetector::new();
        detector.analyze(&[record("1.1.1.1", "/x?f=../../etc/passwd", 200)]);

        let summary = detector.summary();
        assert_eq!(summary.potential.len(), 1);
        assert_eq!(summary.vulnerable.len(), 1);
    }

    #[test]
    fn rejected_or_redirected_hit_is_only_potential() {
        let mut detector = LfiDetector::new();
        detector.analyze(&[
            record("1.1.1.1", "/x?f=../../etc/passwd", 404),
            record("1.1.1.1", "/x?f=../../etc/hosts", 302),
        ]);

        let summary = detector.summary();
        assert_eq!(summary.potential.len(), 2);
        assert!(summary.vulnerable.is_empty());
    }
}
