use anyhow::{anyhow, Result};
use aprofiler::profile::export_csv;
use aprofiler::{
    profile_all, Ensemble, FastaSequenceSource, PrecomputedEmbeddings, ProfileParameters,
    ProteinId,
};
use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use std::path::PathBuf;

/// Per-residue aggregation propensity and aggregation-prone regions
#[derive(Parser, Debug)]
#[command(name = "aprofiler", version, about)]
struct Cli {
    /// Fasta file containing the sequences
    #[arg(long)]
    fasta: PathBuf,

    /// Directory of precomputed embeddings (`<id>.csv`, one line per residue)
    #[arg(long)]
    embeddings: PathBuf,

    /// Ensemble json file, or directory of classifier json files
    #[arg(long)]
    models: PathBuf,

    /// Proteins to profile (UniProt accession, optional isoform suffix)
    #[arg(long = "id")]
    ids: Vec<String>,

    /// Profile every record of the fasta file
    #[arg(long)]
    all: bool,

    /// Json file with the profile parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Moving average width (odd)
    #[arg(long)]
    window: Option<usize>,

    /// Smoothed score at or above which a residue is aggregation prone
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum number of residues of a reported region
    #[arg(long)]
    min_length: Option<usize>,

    /// Number of residues given to a model at once
    #[arg(long)]
    batch_size: Option<usize>,

    /// Output files are `<prefix>_profile.csv` and `<prefix>_regions.csv`
    #[arg(long, default_value = "aprofiler")]
    out_prefix: String,

    /// Also write `<prefix>_profiles.json`
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn parameters(&self) -> Result<ProfileParameters> {
        let mut params = match &self.config {
            Some(path) => ProfileParameters::load_json(path)?,
            None => ProfileParameters::default(),
        };
        if let Some(w) = self.window {
            params.window_size = w;
        }
        if let Some(t) = self.threshold {
            params.threshold = t;
        }
        if let Some(m) = self.min_length {
            params.min_region_length = m;
        }
        if self.batch_size.is_some() {
            params.batch_size = self.batch_size;
        }
        params.validate()?;
        Ok(params)
    }

    fn protein_ids(&self, source: &FastaSequenceSource) -> Result<Vec<ProteinId>> {
        let mut ids = self
            .ids
            .iter()
            .map(|s| ProteinId::parse(s))
            .collect::<Result<Vec<_>>>()?;
        if self.all {
            for key in source.keys() {
                match ProteinId::parse(key) {
                    Ok(id) if !ids.contains(&id) => ids.push(id),
                    Ok(_) => {}
                    Err(_) => warn!("Skipping fasta record {} (not a UniProt accession)", key),
                }
            }
        }
        if ids.is_empty() {
            return Err(anyhow!("Nothing to do: give at least one --id, or --all"));
        }
        Ok(ids)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let params = cli.parameters()?;
    let source = FastaSequenceSource::from_path(&cli.fasta)?;
    let ids = cli.protein_ids(&source)?;
    let ensemble = Ensemble::load(&cli.models)?;
    let provider = PrecomputedEmbeddings::new(&cli.embeddings);
    info!(
        "{} models, window {}, threshold {}, min length {}",
        ensemble.len(),
        params.window_size,
        params.threshold,
        params.min_region_length
    );

    let profiles = profile_all(&ids, &source, &provider, &ensemble, &params)?;
    for p in &profiles {
        info!(
            "{}: {} residues, {} regions ({:.1}% of the sequence){}",
            p.uniprot_id,
            p.len(),
            p.regions.len(),
            100. * p.apr_fraction(),
            if p.regions.is_empty() {
                String::new()
            } else {
                format!(": {}", p.regions.iter().join(", "))
            }
        );
    }

    export_csv(&cli.out_prefix, &profiles)?;
    if cli.json {
        let path = format!("{}_profiles.json", cli.out_prefix);
        std::fs::write(&path, serde_json::to_string_pretty(&profiles)?)?;
    }
    info!("Results written with prefix {}", cli.out_prefix);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FASTA: &str = ">sp|P05067|A4_HUMAN\nMKTAYIAK\n>P05067-2\nMKTA\n>my_protein\nMKV\n";

    fn cli(args: &[&str]) -> Cli {
        let base = ["aprofiler", "--fasta", "a.fa", "--embeddings", "emb", "--models", "m"];
        Cli::try_parse_from(base.iter().chain(args).copied()).unwrap()
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        ProfileParameters::new(9, 0.4, 6).save_json(&path).unwrap();
        let config = path.to_str().unwrap();

        let params = cli(&["--config", config]).parameters().unwrap();
        assert_eq!(params, ProfileParameters::new(9, 0.4, 6));

        let params = cli(&["--config", config, "--window", "3", "--batch-size", "16"])
            .parameters()
            .unwrap();
        assert_eq!(params.window_size, 3);
        assert_eq!(params.threshold, 0.4);
        assert_eq!(params.min_region_length, 6);
        assert_eq!(params.batch_size, Some(16));

        assert_eq!(cli(&[]).parameters().unwrap(), ProfileParameters::default());
        assert!(cli(&["--window", "4"]).parameters().is_err());
    }

    #[test]
    fn all_records_without_duplicates() {
        let source = FastaSequenceSource::from_reader(FASTA.as_bytes()).unwrap();

        let ids = cli(&["--id", "P05067", "--all"]).protein_ids(&source).unwrap();
        let names: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(names, vec!["P05067", "P05067-2"]);

        let ids = cli(&["--id", "Q9Y6K9"]).protein_ids(&source).unwrap();
        assert_eq!(ids.len(), 1);

        assert!(cli(&[]).protein_ids(&source).is_err());
        assert!(cli(&["--id", "not an id"]).protein_ids(&source).is_err());
    }
}
