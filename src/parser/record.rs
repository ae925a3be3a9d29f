// ============================================================
//  parser/record.rs - Reconstruirea unei cereri HTTP dintr-o linie
// ============================================================
//
//  Format log exemplu (șablonul implicit):
//  2024-03-01 12:00:00,123 - INFO - 10.0.0.5 - - [01/Mar/2024 12:00:00] "GET /x?q=1 HTTP/1.1" 200 -
//
//  Câmpurile lipsă sau neconvertibile nu invalidează linia:
//  fiecare are o valoare implicită documentată mai jos.
// ============================================================

use super::template::{compile, CompiledMatcher, FieldCapture};
use super::LogParser;
use crate::error::TemplateError;
use chrono::{NaiveDate, NaiveDateTime};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::fmt;

const DEFAULT_LEVEL:    &str = "INFO";
const DEFAULT_ADDRESS:  &str = "-";
const DEFAULT_METHOD:   &str = "GET";
const DEFAULT_ENDPOINT: &str = "/";
const DEFAULT_PROTOCOL: &str = "HTTP/1.1";
const DEFAULT_STATUS:   u16  = 200;
const DEFAULT_AGENT:    &str = "-";

// ---------------------------------------------------------------------------
// O intrare de log reconstruită. Imutabilă după construcție; detectoarele
// primesc doar referințe `&Record`.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    /// Linia originală, păstrată pentru raport
    pub raw: String,

    /// `None` dacă șablonul nu are toate componentele de timp sau data e invalidă
    pub timestamp: Option<NaiveDateTime>,

    pub level:      String,
    pub address:    String,
    pub method:     String,

    /// Deja decodat (%XX -> caracter)
    pub endpoint:   String,
    pub protocol:   String,
    pub status:     u16,
    pub user_agent: String,
}

impl Record {
    /// Construiește un Record din câmpurile capturate de `CompiledMatcher`.
    pub fn from_captures(raw: &str, fields: &[FieldCapture<'_>]) -> Self {
        let text = |name: &str, default: &str| -> String {
            first(fields, name).unwrap_or(default).to_string()
        };

        let status = first(fields, "code")
            .and_then(|code| code.parse::<u16>().ok())
            .unwrap_or(DEFAULT_STATUS);

        let endpoint = first(fields, "endpoint")
            .map(|e| percent_decode_str(e).decode_utf8_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Record {
            raw:        raw.to_string(),
            timestamp:  build_timestamp(fields),
            level:      text("level", DEFAULT_LEVEL),
            address:    text("ip", DEFAULT_ADDRESS),
            method:     text("method", DEFAULT_METHOD),
            endpoint,
            protocol:   text("proto", DEFAULT_PROTOCOL),
            status,
            user_agent: text("user_agent", DEFAULT_AGENT),
        }
    }

    /// Serverul a acceptat cererea (status < 400)
    pub fn is_accepted(&self) -> bool {
        self.status < 400
    }

    /// Partea de după primul `?` din endpoint, dacă există
    pub fn query(&self) -> Option<&str> {
        self.endpoint.split_once('?').map(|(_, q)| q)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// Prima apariție a unui nume este cea autoritară; o valoare goală
// e tratată ca absentă.
fn first<'a>(fields: &[FieldCapture<'a>], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.name == name && f.occurrence == 0)
        .map(|f| f.value)
        .filter(|v| !v.is_empty())
}

fn build_timestamp(fields: &[FieldCapture<'_>]) -> Option<NaiveDateTime> {
    let number = |name: &str| -> Option<u32> { first(fields, name)?.parse().ok() };

    let year: i32 = first(fields, "Y")?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number("m")?, number("D")?)?;

    // fracțiune de secundă: ",5" = 500 ms, ",05" = 50 ms
    let millis = match first(fields, "MS") {
        Some(ms) => format!("{:0<3}", ms).parse().ok()?,
        None => 0,
    };

    date.and_hms_milli_opt(number("H")?, number("M")?, number("S")?, millis)
}

// ---------------------------------------------------------------------------
// Parser-ul bazat pe șablon: compilat o singură dată, folosit pentru
// fiecare linie din fișier.
// ---------------------------------------------------------------------------
pub struct TemplateParser {
    matcher: CompiledMatcher,
}

impl TemplateParser {
    pub fn new(layout: &str) -> Result<Self, TemplateError> {
        Ok(TemplateParser {
            matcher: compile(layout)?,
        })
    }

    pub fn matcher(&self) -> &CompiledMatcher {
        &self.matcher
    }
}

impl LogParser for TemplateParser {
    fn name(&self) -> &str {
        self.matcher.layout()
    }

    fn parse(&self, line: &str) -> Option<Record> {
        let raw = line.trim_end_matches(['\r', '\n']);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let fields = self.matcher.captures(trimmed)?;
        Some(Record::from_captures(raw, &fields))
    }
}
