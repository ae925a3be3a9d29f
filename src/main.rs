// ============================================================
//  main.rs - Punctul de intrare al analizorului
// ============================================================
//
//  Fluxul comenzii `analyze`:
//    1. configurația (config.toml + argumente CLI) și validarea ei
//    2. șablonul compilat o singură dată + catalogul de comenzi
//    3. analiza propriu-zisă pe un thread blocant (`spawn_blocking`),
//       în timp ce runtime-ul tokio ascultă Ctrl+C
//    4. raportul pe disc + ecoul condensat în consolă
//
//  Orice eroare de configurare sau I/O oprește rularea cu un mesaj
//  care numește resursa problematică.
// ============================================================

mod cli;
mod config;
mod detector;
mod display;
mod engine;
mod error;
mod init;
mod parser;
mod reader;
mod report;

use cli::{AnalyzeArgs, Cli, Commands, InitArgs};
use config::{CommandCatalog, Config};
use detector::DetectorSet;
use engine::Engine;
use init::Provisioned;
use parser::{LogParser, TemplateParser};
use reader::BatchReader;
use report::Report;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::future::Future;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // RUST_LOG are prioritate; altfel doar mesajele info ale aplicației
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rust_log_forensics=info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => analyze(&cli.config, args).await,
        Commands::Init(args) => init_project(args),
    };

    if let Err(e) = result {
        // `{:#}` afișează tot lanțul de context: "mesaj: cauză: cauză"
        display::log_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Tot ce trebuie validat înainte de a citi prima linie din log
struct Prepared {
    config:   Config,
    parser:   TemplateParser,
    commands: CommandCatalog,
    file:     File,
}

async fn analyze(config_path: &Path, args: AnalyzeArgs) -> Result<()> {
    display::print_banner();

    let Prepared { config, parser, commands, file } = prepare(config_path, &args)?;
    let log_path = config.analysis.log_path.clone();

    display::log_info(&format!(
        "Analizez {} în batch-uri de {} linii{}",
        log_path.display(),
        config.analysis.batch_size,
        if config.analysis.parallel { " (detectoare în paralel)" } else { "" }
    ));
    display::print_separator();

    // -----------------------------------------------------------------------
    // 3. Ctrl+C: se termină batch-ul curent, apoi se scrie un raport parțial.
    //    Al doilea Ctrl+C oprește procesul imediat.
    // -----------------------------------------------------------------------
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, &cancel).await {
                display::log_error("Oprire forțată - raportul nu a fost scris");
                std::process::exit(130);
            }
        });
    }

    let analysis = config.analysis.clone();
    let detection = config.detection.clone();

    let (engine, outcome) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut reader = BatchReader::new(BufReader::new(file), &parser, analysis.batch_size);
        let mut engine = Engine::new(DetectorSet::new(&detection, commands), analysis.parallel);
        let outcome = engine.run(&mut reader, &cancel)?;
        Ok((engine, outcome))
    })
    .await
    .context("Thread-ul de analiză s-a oprit neașteptat")??;

    // -----------------------------------------------------------------------
    // 4. Raportul
    // -----------------------------------------------------------------------
    let report = Report::build(&log_path, engine.detectors(), outcome);
    report.write(&config.analysis.report_path, config.analysis.report_format)?;

    report.echo();
    display::print_summary(&outcome, report.successful_count(), &config.analysis.report_path);

    Ok(())
}

/// Primul semnal cere oprirea după batch-ul curent. Întoarce `true` la al
/// doilea semnal (oprire forțată), `false` dacă sursa de semnale eșuează.
async fn watch_interrupts<F, Fut>(mut next_signal: F, cancel: &AtomicBool) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    display::log_warn(
        "Întrerupere cerută - se termină batch-ul curent (Ctrl+C din nou pentru oprire imediată)...",
    );
    cancel.store(true, Ordering::Relaxed);

    next_signal().await.is_ok()
}

fn prepare(config_path: &Path, args: &AnalyzeArgs) -> Result<Prepared> {
    // -----------------------------------------------------------------------
    // 1. Configurația
    // -----------------------------------------------------------------------
    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        display::log_warn(&format!(
            "'{}' nu există - se folosesc valorile implicite (vezi `init`)",
            config_path.display()
        ));
        Config::default()
    };
    args.apply(&mut config);
    config.validate().context("Configurație invalidă")?;

    // -----------------------------------------------------------------------
    // 2. Resursele de configurare, înainte de a citi vreo linie din log
    // -----------------------------------------------------------------------
    let parser = TemplateParser::new(&config.analysis.layout)
        .with_context(|| format!("Șablonul de linie este invalid: '{}'", config.analysis.layout))?;
    display::log_info(&format!(
        "Șablon activ ({} câmpuri): {}",
        parser.matcher().field_names().count(),
        parser.name()
    ));

    let commands = CommandCatalog::load(&config.detection.dangerous_commands)?;
    if commands.is_empty() {
        display::log_warn("Catalogul de comenzi periculoase este gol - detectorul RCE nu va semnala nimic");
    }
    display::log_info(&format!(
        "{} comenzi periculoase încărcate din {}",
        commands.len(),
        config.detection.dangerous_commands.display()
    ));

    let log_path = &config.analysis.log_path;
    let file = File::open(log_path)
        .with_context(|| format!("Nu s-a putut deschide log-ul '{}'", log_path.display()))?;

    Ok(Prepared { config, parser, commands, file })
}

fn init_project(args: InitArgs) -> Result<()> {
    for result in init::provision(&args.dir, args.force)? {
        match result {
            Provisioned::Written(path) => display::log_info(&format!("Creat {}", path.display())),
            Provisioned::Kept(path) => display::log_warn(&format!(
                "{} există deja - păstrat (folosiți --force pentru suprascriere)",
                path.display()
            )),
        }
    }
    Ok(())
}
