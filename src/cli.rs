// ============================================================
//  cli.rs - Argumentele liniei de comandă (clap derive)
// ============================================================
//
//  rust-log-forensics analyze -l 500 --layout '%{ip} %{method} ...'
//  rust-log-forensics init --dir ./proiect
//
//  Valorile date aici au prioritate față de cele din config.toml.
// ============================================================

use crate::config::{Config, ReportFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Analiză forensică a log-urilor de acces HTTP.
#[derive(Parser, Debug)]
#[command(name = "rust-log-forensics", version, about, long_about = None)]
pub struct Cli {
    /// Fișierul de configurare (lipsa lui = valori implicite)
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analizează log-ul și scrie raportul
    Analyze(AnalyzeArgs),

    /// Creează config.toml și dangerous_commands.txt implicite
    Init(InitArgs),
}

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Câte linii se citesc într-un batch
    #[arg(short = 'l', long = "lines")]
    pub batch_size: Option<usize>,

    /// Șablonul liniei de log, ex: '%{ip} "%{method} %{endpoint} %{proto}" %{code}'
    #[arg(long)]
    pub layout: Option<String>,

    /// Fișierul de log analizat
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Unde se scrie raportul
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Formatul raportului
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Rulează detectoarele în paralel pe fiecare batch
    #[arg(long)]
    pub parallel: bool,

    /// RCE: verifică și executabilele din PATH-ul mașinii curente
    #[arg(long)]
    pub check_host_executables: bool,
}

impl AnalyzeArgs {
    /// Suprascrie în `config` doar ce a fost dat explicit
    pub fn apply(&self, config: &mut Config) {
        if let Some(n) = self.batch_size {
            config.analysis.batch_size = n;
        }
        if let Some(layout) = &self.layout {
            config.analysis.layout = layout.clone();
        }
        if let Some(input) = &self.input {
            config.analysis.log_path = input.clone();
        }
        if let Some(output) = &self.output {
            config.analysis.report_path = output.clone();
        }
        if let Some(format) = self.format {
            config.analysis.report_format = format;
        }
        if self.parallel {
            config.analysis.parallel = true;
        }
        if self.check_host_executables {
            config.detection.check_host_executables = true;
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directorul proiectului
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Suprascrie fișierele existente
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags_override_config() {
        let cli = Cli::parse_from([
            "rust-log-forensics", "analyze", "-l", "50", "--format", "json", "--parallel",
        ]);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.analysis.batch_size, 50);
        assert_eq!(config.analysis.report_format, ReportFormat::Json);
        assert!(config.analysis.parallel);
        assert_eq!(config.analysis.log_path, PathBuf::from("logs/app.log"));
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let mut config = Config::default();
        config.analysis.batch_size = 7;
        AnalyzeArgs::default().apply(&mut config);
        assert_eq!(config.analysis.batch_size, 7);
    }
}
