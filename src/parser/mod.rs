// ============================================================
//  parser/mod.rs - Trait-ul LogParser și tipul Record
// ============================================================
//
//  - `template` : compilează șablonul `%{...}` într-un Regex ancorat
//  - `record`   : reconstruiește un `Record` dintr-o linie potrivită
// ============================================================

pub mod record;
pub mod template;

pub use record::{Record, TemplateParser};
pub use template::DEFAULT_LAYOUT;

// ---------------------------------------------------------------------------
// Contractul oricărui parser de linii.
//
// `Option<Record>`: `None` = linia nu respectă formatul. Nu e o eroare
// fatală - cititorul de batch-uri pur și simplu sare peste ea.
// `Send + Sync` permite partajarea parser-ului cu thread-ul de analiză.
// ---------------------------------------------------------------------------
pub trait LogParser: Send + Sync {
    fn parse(&self, line: &str) -> Option<Record>;

    /// Numele parser-ului (pentru logging și diagnostice)
    fn name(&self) -> &str;
}
