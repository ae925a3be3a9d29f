// ============================================================
//  detector/mod.rs - Trait-ul Detector și setul fix de detectoare
// ============================================================
//
//  Fiecare detector:
//    - primește batch-uri succesive de `Record` (doar citire)
//    - își acumulează singur constatările (nicio stare partajată)
//    - la final expune două mulțimi: "potential" și "vulnerable"
//
//  Regula comună pentru detectoarele de conținut:
//    status < 400  -> vulnerable (serverul a acceptat input-ul malițios)
//    status >= 400 -> potential  (doar o tentativă, respinsă)
// ============================================================

pub mod fuzz;
pub mod lfi;
pub mod rce;
pub mod sqli;
pub mod user_agent;
pub mod xss;

pub use fuzz::{FuzzDetector, FuzzScore};
pub use lfi::LfiDetector;
pub use rce::RceDetector;
pub use sqli::SqliDetector;
pub use user_agent::UserAgentDetector;
pub use xss::XssDetector;

use crate::config::{CommandCatalog, DetectionConfig};
use crate::parser::Record;
use percent_encoding::percent_decode_str;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Contractul unui detector.
//
// `Send` permite rularea fiecărui detector pe propriul thread când
// analiza paralelă e activată (vezi `DetectorSet::analyze`).
// ---------------------------------------------------------------------------
pub trait Detector: Send {
    /// Eticheta folosită în raport (ex: "XSS")
    fn name(&self) -> &'static str;

    fn analyze(&mut self, batch: &[Record]);

    fn summary(&self) -> Summary;
}

/// Constatările unui detector la un moment dat.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub potential:  Vec<Record>,
    pub vulnerable: Vec<Record>,
}

/// Mulțime de Record-uri deduplicată după linia originală,
/// păstrând ordinea primei apariții.
#[derive(Debug, Clone, Default)]
pub struct FindingSet {
    seen:    HashSet<String>,
    records: Vec<Record>,
}

impl FindingSet {
    /// `true` dacă înregistrarea nu mai fusese văzută
    pub fn insert(&mut self, record: &Record) -> bool {
        if !self.seen.insert(record.raw.clone()) {
            return false;
        }
        self.records.push(record.clone());
        true
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Perechea potential/vulnerable folosită de detectoarele de conținut.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    pub potential:  FindingSet,
    pub vulnerable: FindingSet,
}

impl Findings {
    /// Clasificarea după status-ul răspunsului
    pub fn classify(&mut self, record: &Record) {
        if record.is_accepted() {
            self.vulnerable.insert(record);
        } else {
            self.potential.insert(record);
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            potential:  self.potential.records().to_vec(),
            vulnerable: self.vulnerable.records().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extragerea valorilor din query string.
//
// `/x?a=1&b=%3Cscript%3E` -> ["1", "<script>"]
// O pereche fără `=` este inspectată întreagă. `+` devine spațiu,
// apoi decodăm %XX încă o dată (prinde și payload-urile dublu codate).
// ---------------------------------------------------------------------------
pub fn query_values(record: &Record) -> Vec<String> {
    let Some(query) = record.query() else {
        return Vec::new();
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let value = pair.split_once('=').map_or(pair, |(_, v)| v);
            let spaced = value.replace('+', " ");
            percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
        })
        .collect()
}

/// Aplică un test pe fiecare valoare din query și clasifică Record-ul
/// la prima valoare suspectă.
pub(crate) fn scan_query<F>(batch: &[Record], findings: &mut Findings, is_malicious: F)
where
    F: Fn(&str) -> bool,
{
    for record in batch {
        if query_values(record).iter().any(|v| is_malicious(v.as_str())) {
            findings.classify(record);
        }
    }
}

// ---------------------------------------------------------------------------
// Setul fix de detectoare, construit o singură dată.
// Ordinea e cea din raport; nu afectează rezultatele.
// ---------------------------------------------------------------------------
pub struct DetectorSet {
    fuzz:    FuzzDetector,
    content: Vec<Box<dyn Detector>>,
}

impl DetectorSet {
    pub fn new(config: &DetectionConfig, commands: CommandCatalog) -> Self {
        DetectorSet {
            fuzz: FuzzDetector::new(config.fuzz_min_samples, config.fuzz_report_threshold),
            content: vec![
                Box::new(XssDetector::new()),
                Box::new(LfiDetector::new()),
                Box::new(RceDetector::new(commands, config.check_host_executables)),
                Box::new(SqliDetector::new()),
                Box::new(UserAgentDetector::new()),
            ],
        }
    }

    /// Trimite batch-ul la toate detectoarele.
    ///
    /// În modul paralel fiecare detector rulează pe un thread propriu;
    /// `thread::scope` așteaptă toate thread-urile înainte de a returna,
    /// deci batch-ul următor nu începe până nu s-a terminat acesta.
    pub fn analyze(&mut self, batch: &[Record], parallel: bool) {
        let mut all: Vec<&mut (dyn Detector + 'static)> = Vec::with_capacity(self.content.len() + 1);
        all.push(&mut self.fuzz);
        all.extend(self.content.iter_mut().map(|d| &mut **d));

        if parallel {
            std::thread::scope(|scope| {
                for detector in all {
                    scope.spawn(move || detector.analyze(batch));
                }
            });
        } else {
            for detector in all {
                detector.analyze(batch);
            }
        }
    }

    pub fn fuzz(&self) -> &FuzzDetector {
        &self.fuzz
    }

    /// Detectoarele de conținut, în ordinea raportului
    pub fn content(&self) -> impl Iterator<Item = &dyn Detector> {
        self.content.iter().map(|d| d.as_ref())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::parser::Record;

    /// Record minimal pentru testele detectoarelor
    pub fn record(address: &str, endpoint: &str, status: u16) -> Record {
        Record {
            raw:        format!("{} GET {} {}", address, endpoint, status),
            timestamp:  None,
            level:      "INFO".to_string(),
            address:    address.to_string(),
            method:     "GET".to_string(),
            endpoint:   endpoint.to_string(),
            protocol:   "HTTP/1.1".to_string(),
            status,
            user_agent: "-".to_string(),
        }
    }

    pub fn with_agent(agent: &str, status: u16) -> Record {
        let mut r = record("10.0.0.9", "/", status);
        r.raw = format!("{} UA={}", r.raw, agent);
        r.user_agent = agent.to_string();
        r
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn query_values_are_form_decoded() {
        let r = record("1.1.1.1", "/s?a=1&b=x+y&c=%253C&flag", 200);
        assert_eq!(query_values(&r), vec!["1", "x y", "%3C", "flag"]);
    }

    #[test]
    fn no_query_no_values() {
        assert!(query_values(&record("1.1.1.1", "/plain", 200)).is_empty());
    }

    #[test]
    fn finding_set_deduplicates_by_raw_line() {
        let mut set = FindingSet::default();
        let r = record("1.1.1.1", "/", 200);
        assert!(set.insert(&r));
        assert!(!set.insert(&r.clone()));
        assert_eq!(set.records().len(), 1);
    }

    #[test]
    fn classify_splits_on_status_400() {
        let mut findings = Findings::default();
        findings.classify(&record("1.1.1.1", "/a", 399));
        findings.classify(&record("1.1.1.1", "/b", 400));

        let summary = findings.summary();
        assert_eq!(summary.vulnerable.len(), 1);
        assert_eq!(summary.potential.len(), 1);
        assert_eq!(summary.potential[0].status, 400);
    }
}
