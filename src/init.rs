// ============================================================
//  init.rs - Comanda `init`: fișierele implicite ale proiectului
// ============================================================
//
//  Creează în directorul ales:
//    - config.toml             (valorile implicite din `Config::default`)
//    - dangerous_commands.txt  (catalogul livrat cu aplicația)
//    - logs/                   (locul implicit pentru log și raport)
//  Fișierele existente rămân neatinse, cu excepția `--force`.
// ============================================================

use crate::config::{Config, DEFAULT_COMMANDS};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_HEADER: &str = "# Configurația analizorului de log-uri HTTP.\n\
# Placeholdere: %{Y} %{m} %{D} %{H} %{M} %{S} %{MS} %{ip} %{endpoint}\n\
#               %{method} %{level} %{proto} %{code} %{user_agent}\n\n";

/// Ce s-a întâmplat cu fiecare fișier
#[derive(Debug, PartialEq, Eq)]
pub enum Provisioned {
    Written(PathBuf),
    Kept(PathBuf),
}

pub fn provision(dir: &Path, force: bool) -> Result<Vec<Provisioned>> {
    fs::create_dir_all(dir.join("logs"))
        .with_context(|| format!("Nu s-a putut crea '{}'", dir.join("logs").display()))?;

    let config = format!("{}{}", CONFIG_HEADER, Config::default().to_toml()?);

    let files = [
        (dir.join("config.toml"), config),
        (dir.join("dangerous_commands.txt"), DEFAULT_COMMANDS.to_string()),
    ];

    let mut results = Vec::new();
    for (path, content) in files {
        if path.exists() && !force {
            results.push(Provisioned::Kept(path));
            continue;
        }
        fs::write(&path, content)
            .with_context(|| format!("Nu s-a putut scrie '{}'", path.display()))?;
        results.push(Provisioned::Written(path));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let results = provision(dir.path(), false).unwrap();

        assert!(results.iter().all(|r| matches!(r, Provisioned::Written(_))));
        assert!(dir.path().join("logs").is_dir());

        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.analysis.batch_size, 1000);
    }

    #[test]
    fn existing_files_are_kept_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[analysis]\nbatch_size = 5\n").unwrap();

        let results = provision(dir.path(), false).unwrap();
        assert!(results.contains(&Provisioned::Kept(config_path.clone())));
        assert!(fs::read_to_string(&config_path).unwrap().contains("batch_size = 5"));

        provision(dir.path(), true).unwrap();
        assert!(fs::read_to_string(&config_path).unwrap().contains("batch_size = 1000"));
    }
}
