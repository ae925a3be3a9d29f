// ============================================================
//  display.rs - Output vizual în consolă
// ============================================================
//
//  Raportul complet merge în fișier; în consolă afișăm doar
//  mesajele de stare și ecoul condensat al constatărilor grave
//  (exploatări reușite și adrese cu scor mare de fuzzing).
// ============================================================

use crate::engine::RunOutcome;
use crate::parser::Record;
use chrono::Local;
use colored::Colorize;
use std::path::Path;

// Lățimea separatorului orizontal (în caractere)
const SEPARATOR_WIDTH: usize = 70;

// Liniile foarte lungi din log sunt scurtate în consolă
const MAX_ECHO_CHARS: usize = 160;

pub fn print_banner() {
    let border = "═".repeat(SEPARATOR_WIDTH - 2);
    println!();
    println!("{}", format!("╔{}╗", border).bold().cyan());
    println!(
        "{}",
        format!(
            "║{:^width$}║",
            "RUST LOG FORENSICS  v0.1.0",
            width = SEPARATOR_WIDTH - 2
        )
        .bold()
        .cyan()
    );
    println!(
        "{}",
        format!(
            "║{:^width$}║",
            "XSS | LFI/RFI | SQLi | RCE | Fuzzing | User-Agent",
            width = SEPARATOR_WIDTH - 2
        )
        .cyan()
    );
    println!("{}", format!("╚{}╝", border).bold().cyan());
    println!();
}

/// Linie separatoare orizontală pentru lizibilitate vizuală
pub fn print_separator() {
    let line = "─".repeat(SEPARATOR_WIDTH);
    println!("{}", line.dimmed());
}

/// Mesaj informațional - verde, pentru operații normale
pub fn log_info(msg: &str) {
    let ts = timestamp();
    println!(
        "{} {} {}",
        ts.bold().white(),
        " INFO ".on_green().black().bold(),
        msg.white()
    );
}

/// Avertisment - galben, pentru situații care merită atenție
pub fn log_warn(msg: &str) {
    let ts = timestamp();
    println!(
        "{} {} {}",
        ts.bold().white(),
        " WARN ".on_yellow().black().bold(),
        msg.yellow()
    );
}

/// Eroare fatală - roșu aprins, pe stderr
pub fn log_error(msg: &str) {
    let ts = timestamp();
    eprintln!(
        "{} {} {}",
        ts.bold().white(),
        " ERR  ".on_red().white().bold(),
        msg.red()
    );
}

/// Exploatare reușită: input malițios acceptat de server
pub fn log_vulnerable(detector: &str, record: &Record) {
    let ts = timestamp();
    println!(
        "{} {} {} {} {}",
        ts.bold().white(),
        " VULN ".on_red().white().bold(),
        format!("[{}]", detector).red().bold(),
        format!("[IP: {}]", record.address).red(),
        shorten(&record.raw).white()
    );
}

/// Adresă cu rată mare de erori (fuzzing / brute-force)
pub fn log_fuzz_score(address: &str, score: f64, errors: usize, successes: usize) {
    let ts = timestamp();
    println!(
        "{} {} {} {} ({} erori / {} succese)",
        ts.bold().white(),
        " FUZZ ".on_yellow().black().bold(),
        format!("[IP: {}]", address).yellow().bold(),
        format!("{:.2}%", score).yellow().bold(),
        errors,
        successes
    );
}

/// Rezumatul rulării, afișat după scrierea raportului
pub fn print_summary(outcome: &RunOutcome, successful: usize, report_path: &Path) {
    print_separator();
    log_info(&format!(
        "Linii citite: {} | Înregistrări: {} | Ignorate: {} | Batch-uri: {}",
        outcome.stats.lines_read, outcome.stats.parsed, outcome.stats.skipped, outcome.batches
    ));

    let verdict = format!("{} exploatări reușite", successful);
    if successful > 0 {
        log_warn(&verdict);
    } else {
        log_info(&verdict);
    }
    if !outcome.complete {
        log_warn("Analiza a fost întreruptă - raportul este parțial");
    }
    log_info(&format!("Raport scris în {}", report_path.display().to_string().underline()));
}

fn shorten(line: &str) -> String {
    if line.chars().count() <= MAX_ECHO_CHARS {
        return line.to_string();
    }
    let head: String = line.chars().take(MAX_ECHO_CHARS).collect();
    format!("{}…", head)
}

fn timestamp() -> String {
    Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lines_are_shortened() {
        let long = "a".repeat(MAX_ECHO_CHARS + 10);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), MAX_ECHO_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(shorten("abc"), "abc");
    }
}
