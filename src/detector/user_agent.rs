// ============================================================
//  detector/user_agent.rs - Semnături malițioase în User-Agent
// ============================================================
//
//  Aici nu ne uităm la endpoint, ci la câmpul User-Agent.
//  Patru familii de indicatori, comparate case-insensitive.
// ============================================================

use super::{Detector, Findings, Summary};
use crate::parser::Record;
use tracing::debug;

const MARKUP: &[&str] = &[
    "<script", "</", "javascript:", "document.", "cookie", "onerror", "onload", "alert(",
];

const SHELL: &[&str] = &[
    "() {", "${jndi", "${", "/bin/", "bash", "cmd.exe", "powershell", "wget", "curl/",
    "python-requests", "nc -e", "eval(",
];

const SQL: &[&str] = &[
    "select ", "union ", "sleep(", "benchmark(", "' or ", "\" or ", "--", "/*", "waitfor delay",
];

const SCANNERS: &[&str] = &[
    "sqlmap", "nikto", "nmap", "masscan", "zgrab", "dirbuster", "gobuster", "dirb/",
    "wfuzz", "ffuf", "nuclei", "acunetix", "nessus", "openvas", "w3af", "whatweb",
    "hydra", "burp", "zaproxy", "arachni", "skipfish", "wpscan", "commix", "feroxbuster",
];

/// Familia de indicatori care s-a potrivit, dacă există
pub fn classify_agent(agent: &str) -> Option<&'static str> {
    if agent.is_empty() || agent == "-" {
        return None;
    }
    let lower = agent.to_lowercase();

    let families: [(&'static str, &[&str]); 4] = [
        ("markup", MARKUP),
        ("shell", SHELL),
        ("sql", SQL),
        ("scanner", SCANNERS),
    ];

    families
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
        .map(|(family, _)| *family)
}

pub struct UserAgentDetector {
    findings: Findings,
}

impl UserAgentDetector {
    pub fn new() -> Self {
        UserAgentDetector {
            findings: Findings::default(),
        }
    }
}

impl Detector for UserAgentDetector {
    fn name(&self) -> &'static str {
        "User-Agent"
    }

    fn analyze(&mut self, batch: &[Record]) {
        for record in batch {
            if let Some(family) = classify_agent(&record.user_agent) {
                debug!(family, agent = %record.user_agent, "user-agent suspect");
                self.findings.classify(record);
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
    use crate::detector::test_support::with_agent;

    #[test]
    fn each_family_is_recognised() {
        assert_eq!(classify_agent("<script>alert(1)</script>"), Some("markup"));
        assert_eq!(classify_agent("() { :; }; /bin/bash -c id"), Some("shell"));
        assert_eq!(classify_agent("x' OR 1=1 --"), Some("sql"));
        assert_eq!(classify_agent("sqlmap/1.7.2#stable (https://sqlmap.org)"), Some("scanner"));
        assert_eq!(classify_agent("Mozilla/5.0 (Nikto/2.1.6)"), Some("scanner"));
    }

    #[test]
    fn ordinary_browsers_pass() {
        assert_eq!(
            classify_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"),
            None
        );
        assert_eq!(classify_agent("-"), None);
    }

    #[test]
    fn uses_status_split() {
        let mut detector = UserAgentDetector::new();
        detector.analyze(&[
            with_agent("Nikto/2.1.6", 200),
            with_agent("gobuster/3.6", 404),
            with_agent("Mozilla/5.0", 200),
        ]);

        let summary = detector.summary();
        assert_eq!(summary.vulnerable.len(), 1);
        assert_eq!(summary.potential.len(), 1);
    }
}
