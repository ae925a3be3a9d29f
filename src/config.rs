// ============================================================
//  config.rs - Structurile de configurare și încărcarea TOML
// ============================================================
//
//  Două surse de configurare:
//    - `config.toml`            : căi, dimensiunea batch-ului, șablonul,
//                                 pragurile detectoarelor
//    - `dangerous_commands.txt` : catalogul de comenzi pentru detectorul RCE
//
//  Toate cheile din TOML sunt opționale (`#[serde(default)]`);
//  argumentele din linia de comandă le suprascriu în `main.rs`.
// ============================================================

use crate::parser::DEFAULT_LAYOUT;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Catalogul implicit, scris pe disc de comanda `init`
pub const DEFAULT_COMMANDS: &str = include_str!("../dangerous_commands.txt");

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub analysis:  AnalysisConfig,
    pub detection: DetectionConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fișierul de log analizat
    pub log_path: PathBuf,

    /// Unde se scrie raportul final
    pub report_path: PathBuf,

    pub report_format: ReportFormat,

    /// Câte linii se citesc într-un batch
    pub batch_size: usize,

    /// Șablonul liniei de log, cu placeholdere `%{...}`
    pub layout: String,

    /// Detectoarele rulează în paralel pe fiecare batch
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            log_path:      PathBuf::from("logs/app.log"),
            report_path:   PathBuf::from("logs/report.txt"),
            report_format: ReportFormat::Text,
            batch_size:    1000,
            layout:        DEFAULT_LAYOUT.to_string(),
            parallel:      false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Text lizibil, cu secțiuni per detector
    #[default]
    Text,
    /// JSON pentru procesare automată
    Json,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DetectionConfig {
    /// Fuzzing: sub acest număr de răspunsuri (erori + succese) scorul e 0
    pub fuzz_min_samples: usize,

    /// Fuzzing: adresele cu scor peste acest prag apar în raport
    pub fuzz_report_threshold: f64,

    /// Lista de comenzi periculoase, una pe linie
    pub dangerous_commands: PathBuf,

    /// RCE: caută token-urile și printre executabilele din PATH-ul local
    pub check_host_executables: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            fuzz_min_samples:       10,
            fuzz_report_threshold:  1.0,
            dangerous_commands:     PathBuf::from("dangerous_commands.txt"),
            check_host_executables: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Nu s-a putut citi fișierul de configurare: '{}'", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Eroare la parsarea TOML din '{}'", path.display()))?;

        Ok(config)
    }

    /// Verificări care nu pot fi exprimate prin tipuri
    pub fn validate(&self) -> Result<()> {
        if self.analysis.batch_size == 0 {
            bail!("analysis.batch_size trebuie să fie cel puțin 1");
        }
        let threshold = self.detection.fuzz_report_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            bail!("detection.fuzz_report_threshold invalid: {}", threshold);
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Configurația nu a putut fi serializată în TOML")
    }
}

// ---------------------------------------------------------------------------
// Catalogul de comenzi periculoase.
//
// Se încarcă o singură dată la pornire și este mutat în detectorul RCE.
// Lipsa fișierului e o eroare de configurare: analiza nu pornește.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    names: HashSet<String>,
}

impl CommandCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| {
            format!("Lista de comenzi periculoase lipsește sau nu poate fi citită: '{}'", path.display())
        })?;
        Ok(Self::from_lines(&content))
    }

    pub fn from_lines(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        CommandCatalog { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            batch_size = 50
            report_format = "json"

            [detection]
            check_host_executables = true
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.batch_size, 50);
        assert_eq!(config.analysis.report_format, ReportFormat::Json);
        assert_eq!(config.analysis.layout, DEFAULT_LAYOUT);
        assert_eq!(config.detection.fuzz_min_samples, 10);
        assert!(config.detection.check_host_executables);
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let text = Config::default().to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.analysis.layout, DEFAULT_LAYOUT);
        assert_eq!(back.analysis.batch_size, 1000);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = Config::default();
        config.analysis.batch_size = 0;
        assert!(config.validate().is_err());

        config.analysis.batch_size = 1;
        config.detection.fuzz_report_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_is_reported_by_name() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/config.toml"));
    }

    #[test]
    fn command_catalog_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header\n\n  wget  \ncat\n").unwrap();

        let catalog = CommandCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("wget"));
        assert!(!catalog.contains("# header"));
    }

    #[test]
    fn missing_command_catalog_is_a_config_error() {
        let err = CommandCatalog::load(Path::new("/nonexistent/dangerous.txt")).unwrap_err();
        assert!(err.to_string().contains("dangerous.txt"));
    }

    #[test]
    fn bundled_catalog_is_not_empty() {
        let catalog = CommandCatalog::from_lines(DEFAULT_COMMANDS);
        assert!(catalog.contains("wget"));
        assert!(!catalog.is_empty());
    }
}
