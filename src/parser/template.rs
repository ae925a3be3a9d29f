// ============================================================
//  parser/template.rs - Compilatorul de șabloane `%{...}`
// ============================================================
//
//  Un șablon descrie cum arată o linie de log:
//
//    %{Y}-%{m}-%{D} %{H}:%{M}:%{S},%{MS} - %{level} - %{ip} ...
//
//  Textul literal trebuie să apară exact (îl escapăm), iar fiecare
//  placeholder devine un grup de captură numit. Rezultatul este un
//  singur `Regex` ancorat `^...$` - potrivirile parțiale sunt respinse.
// ============================================================

use crate::error::TemplateError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Șablonul implicit: formatul `logging` Python + linia de acces werkzeug.
///
/// `2024-03-01 12:00:00,123 - INFO - 10.0.0.5 - - [01/Mar/2024 12:00:00] "GET /x HTTP/1.1" 200 -`
pub const DEFAULT_LAYOUT: &str = r#"%{Y}-%{m}-%{D} %{H}:%{M}:%{S},%{MS} - %{level} - %{ip} - - [%{clock}] "%{method} %{endpoint} %{proto}" %{code} %{size}"#;

/// Componentele de timp nu pot apărea de două ori în același șablon
const TIME_FIELDS: &[&str] = &["Y", "m", "D", "H", "M", "S", "MS"];

/// Fragmentul de regex pentru fiecare nume din catalog.
/// Orice nume necunoscut acceptă "cel puțin un caracter", ne-lacom.
fn fragment_for(name: &str) -> &'static str {
    match name {
        "Y" => r"\d{4}",
        "m" | "D" | "H" | "M" | "S" => r"\d{1,2}",
        "MS" => r"\d{1,3}",
        "ip" | "endpoint" => r"\S+",
        "method" | "level" => r"[A-Za-z]+",
        "proto" => r"[A-Za-z]+/\d+(?:\.\d+)?",
        "code" => r"\d{3}",
        "user_agent" => r".*?",
        _ => r".+?",
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Un slot de captură: identificatorul intern (unic în regex) și numele
/// semantic din șablon, plus a câta apariție a numelui este (de la 0).
#[derive(Debug, Clone)]
struct FieldSlot {
    id:         String,
    name:       String,
    occurrence: usize,
}

/// O valoare capturată dintr-o linie, deja mapată înapoi la numele semantic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCapture<'a> {
    pub name:       &'a str,
    pub occurrence: usize,
    pub value:      &'a str,
}

/// Rezultatul compilării unui șablon. Se construiește o singură dată la
/// pornire și se refolosește pentru fiecare linie.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    layout: String,
    regex:  Regex,
    slots:  Vec<FieldSlot>,
}

/// Compilează un șablon într-un `CompiledMatcher`.
///
/// Eșuează doar pentru șabloane greșit scrise (erori de configurare).
/// Liniile care nu se potrivesc sunt respinse mai târziu, la `captures`.
pub fn compile(layout: &str) -> Result<CompiledMatcher, TemplateError> {
    let segments = split_layout(layout)?;
    check_time_fields(&segments)?;

    let mut pattern = String::from("^");
    let mut slots = Vec::new();
    let mut used_ids: HashSet<String> = HashSet::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for segment in &segments {
        match segment {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Field(name) => {
                let occurrence = seen.entry(name.as_str()).or_insert(0);
                let id = unique_id(name, &mut used_ids);

                pattern.push_str(&format!("(?P<{}>{})", id, fragment_for(name)));
                slots.push(FieldSlot {
                    id,
                    name: name.clone(),
                    occurrence: *occurrence,
                });
                *occurrence += 1;
            }
        }
    }
    pattern.push('$');

    let regex = Regex::new(&pattern)?;
    tracing::debug!(layout, pattern = %pattern, fields = slots.len(), "șablon compilat");

    Ok(CompiledMatcher {
        layout: layout.to_string(),
        regex,
        slots,
    })
}

impl CompiledMatcher {
    /// Șablonul original, așa cum a fost primit
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Numele semantice, în ordinea apariției în șablon
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// Aplică pattern-ul pe întreaga linie. `None` dacă linia nu respectă
    /// structura șablonului (de la început până la sfârșit).
    pub fn captures<'a>(&'a self, line: &'a str) -> Option<Vec<FieldCapture<'a>>> {
        let caps = self.regex.captures(line)?;

        let fields = self
            .slots
            .iter()
            .filter_map(|slot| {
                caps.name(&slot.id).map(|m| FieldCapture {
                    name:       slot.name.as_str(),
                    occurrence: slot.occurrence,
                    value:      m.as_str(),
                })
            })
            .collect();

        Some(fields)
    }
}

// ---------------------------------------------------------------------------
// Scanare stânga-dreapta: text literal și placeholdere `%{nume}`
// ---------------------------------------------------------------------------
fn split_layout(layout: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = layout;
    let mut offset = 0;

    while let Some(start) = rest.find("%{") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }

        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(TemplateError::Unterminated { position: offset + start })?;

        let name = after[..end].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName { position: offset + start });
        }
        segments.push(Segment::Field(name.to_string()));

        let consumed = start + 2 + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(segments)
}

fn check_time_fields(segments: &[Segment]) -> Result<(), TemplateError> {
    for time_field in TIME_FIELDS {
        let count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Field(n) if n == time_field))
            .count();

        if count > 1 {
            return Err(TemplateError::RepeatedTimeField {
                name: time_field.to_string(),
                count,
            });
        }
    }
    Ok(())
}

// Numele de grup din `regex` acceptă doar litere, cifre și '_',
// iar duplicatele primesc sufixul `_2`, `_3`, ...
fn unique_id(name: &str, used: &mut HashSet<String>) -> String {
    let mut base: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert_str(0, "f_");
    }

    let mut id = base.clone();
    let mut n = 2;
    while used.contains(&id) {
        id = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(id.clone());
    id
}
