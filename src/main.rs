use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dynmix::{DynamicMixer, Example, MixConfig, SpeakerIndex, load_config, save_wav, source_key};
use tracing_subscriber::EnvFilter;

/// Generate speech-separation training mixtures on the fly.
#[derive(Parser, Debug)]
#[command(name = "dynmix")]
#[command(about = "Generate speech-separation training mixtures on the fly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the source directory and print per-speaker utterance counts
    Index(Common),
    /// Draw mixtures and write them as WAV files
    Mix {
        #[command(flatten)]
        common: Common,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Number of mixtures to write
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// RNG seed for a reproducible set
        #[arg(long)]
        seed: Option<u64>,

        /// Sources per mixture
        #[arg(long)]
        num_spks: Option<usize>,

        /// Maximum segment length in samples
        #[arg(long)]
        training_signal_len: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct Common {
    /// TOML config file
    #[arg(short, long, env = "DYNMIX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of single-speaker utterances (overrides the config)
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

impl Common {
    fn load(&self) -> Result<MixConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => MixConfig::default(),
        };
        if let Some(dir) = &self.source_dir {
            config.source_dir = dir.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Index(common) => index(&common.load()?),
        Command::Mix {
            common,
            out,
            count,
            seed,
            num_spks,
            training_signal_len,
        } => {
            let mut config = common.load()?;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(n) = num_spks {
                config.num_spks = n;
            }
            if let Some(len) = training_signal_len {
                config.training_signal_len = len;
            }
            mix(config, &out, count)
        }
    }
}

fn index(config: &MixConfig) -> Result<()> {
    config.validate()?;
    let index = SpeakerIndex::build(
        &config.source_dir,
        config.sample_rate,
        config.speaker_id_len,
    )
    .with_context(|| format!("indexing {}", config.source_dir.display()))?;

    for (speaker, weight) in index.speakers().iter().zip(index.weights()) {
        println!(
            "{}\t{}\t{:.5}",
            speaker.id,
            speaker.utterances.len(),
            weight
        );
    }
    println!(
        "{} speakers, {} utterances",
        index.len(),
        index.utterance_count()
    );
    Ok(())
}

fn mix(config: MixConfig, out: &Path, count: usize) -> Result<()> {
    let sample_rate = config.sample_rate;
    let mut mixer = DynamicMixer::from_config(config).context("building mixer")?;
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    let ids: Vec<String> = (0..count).map(|i| format!("mix_{i:06}")).collect();
    for example in mixer.epoch(&ids) {
        let example = example?;
        write_example(&example, out, sample_rate)
            .with_context(|| format!("writing {}", example.id))?;
    }

    tracing::info!("Wrote {} mixtures to {}", count, out.display());
    Ok(())
}

fn write_example(example: &Example, out: &Path, sample_rate: u32) -> Result<()> {
    let id = &example.id;
    save_wav(&example.mix_sig, &out.join(format!("{id}_mix.wav")), sample_rate)?;
    for (i, source) in example.sources.iter().enumerate() {
        let key = source_key(i + 1);
        let name = key.trim_end_matches("_sig");
        save_wav(source, &out.join(format!("{id}_{name}.wav")), sample_rate)?;
    }

    std::fs::write(out.join(format!("{id}.ron")), example.recipe.to_ron()?)?;
    Ok(())
}
