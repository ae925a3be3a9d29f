// ============================================================
//  detector/xss.rs - Cross-site scripting în parametrii din query
// ============================================================

use super::{scan_query, Detector, Findings, Summary};
use crate::parser::Record;

/// Indicatori de markup / script căutați (case-insensitive) în valori
const XSS_MARKERS: &[&str] = &[
    "<", ">", "/*", "*/", "script", " src=", " href=", "javascript",
    "cookie", "document.", "onerror", "onload", "alert(",
];

pub struct XssDetector {
    findings: Findings,
}

impl XssDetector {
    pub fn new() -> Self {
        XssDetector {
            findings: Findings::default(),
        }
    }
}

pub fn is_xss(value: &str) -> bool {
    // Un singur caracter nu poate forma un payload
    if value.chars().count() <= 1 {
        return false;
    }
    let lower = value.to_lowercase();
    XSS_MARKERS.iter().any(|m| lower.contains(m))
}

impl Detector for XssDetector {
    fn name(&self) -> &'static str {
        "XSS"
    }

    fn analyze(&mut self, batch: &[Record]) {
        scan_query(batch, &mut self.findings, is_xss);
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
    fn markers_are_case_insensitive() {
        assert!(is_xss("<SCRIPT>alert(1)</SCRIPT>"));
        assert!(is_xss("JavaScript:void(0)"));
        assert!(is_xss("x\" onerror=\"y"));
        assert!(!is_xss("hello world"));
        assert!(!is_xss("<"));
    }

    #[test]
    fn accepted_payload_is_vulnerable() {
        let mut detector = XssDetector::new();
        detector.analyze(&[
            record("1.1.1.1", "/search?q=%3Cscript%3Ealert(1)%3C/script%3E", 200),
            record("1.1.1.1", "/search?q=<img+src=x>", 403),
            record("1.1.1.1", "/search?q=shoes", 200),
        ]);

        let summary = detector.summary();
        assert_eq!(summary.vulnerable.len(), 1);
        assert_eq!(summary.potential.len(), 1);
    }
}
