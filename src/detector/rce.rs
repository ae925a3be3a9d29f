// ============================================================
//  detector/rce.rs - Remote Code Execution prin parametri
// ============================================================
//
//  Valoarea fiecărui parametru este spartă în token-uri după spații
//  și separatorii de shell (`;`, `|`, `&`, backtick, `$(`).
//  Un token suspect = numele unei comenzi din catalogul de comenzi
//  periculoase (ex: `cat`, `wget`, `nc`).
//
//  Verificarea "există acest executabil pe mașina curentă?" depinde
//  de host, deci e opțională (`check_host_executables`).
// ============================================================

use super::{query_values, Detector, Findings, Summary};
use crate::config::CommandCatalog;
use crate::parser::Record;
use std::collections::HashMap;
use std::env;

const SHELL_SEPARATORS: &[char] = &[';', '|', '&', '`', '$', '(', ')', '\n', '\r', '<', '>'];

pub struct RceDetector {
    commands:   CommandCatalog,
    check_host: bool,
    /// Rezultatele căutării în PATH, ca să nu scanăm directoarele la fiecare token
    host_cache: HashMap<String, bool>,
    findings:   Findings,
}

impl RceDetector {
    pub fn new(commands: CommandCatalog, check_host: bool) -> Self {
        RceDetector {
            commands,
            check_host,
            host_cache: HashMap::new(),
            findings: Findings::default(),
        }
    }

    /// Primul token care e o comandă cunoscută, dacă există
    pub fn find_command(&mut self, value: &str) -> Option<String> {
        let normalized: String = value
            .chars()
            .map(|c| if SHELL_SEPARATORS.contains(&c) { ' ' } else { c })
            .collect();

        for token in normalized.split_whitespace() {
            let token = token.trim_matches(|c: char| c == '\'' || c == '"');
            // `/bin/cat` -> `cat`
            let name = token.rsplit(['/', '\\']).next().unwrap_or(token);
            if name.is_empty() {
                continue;
            }

            if self.commands.contains(name) || (self.check_host && self.on_host(name)) {
                return Some(name.to_string());
            }
        }
        None
    }

    fn on_host(&mut self, name: &str) -> bool {
        if let Some(&known) = self.host_cache.get(name) {
            return known;
        }
        let found = is_host_executable(name);
        self.host_cache.insert(name.to_string(), found);
        found
    }
}

// Caută un fișier cu acest nume în directoarele din PATH.
// Numele cu alte caractere decât [A-Za-z0-9._-] nu pot fi comenzi simple.
fn is_host_executable(name: &str) -> bool {
    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !plain || name.starts_with('.') {
        return false;
    }

    let Some(path) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path).any(|dir| dir.join(name).is_file())
}

impl Detector for RceDetector {
    fn name(&self) -> &'static str {
        "RCE"
    }

    fn analyze(&mut self, batch: &[Record]) {
        for record in batch {
            for value in query_values(record) {
                if let Some(command) = self.find_command(&value) {
                    tracing::debug!(command = %command, endpoint = %record.endpoint, "comandă detectată");
                    self.findings.classify(record);
                    break;
                }
            }
        }
    }

    fn summary(&self) -> Summary {
        self.findings.summary()
    }
}
