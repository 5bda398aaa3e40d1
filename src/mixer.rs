use std::path::PathBuf;

use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::MixConfig;
use crate::error::{MixError, Result};
use crate::level::{db_to_amplitude, normalization_scale, random_gain_db, scale_in_place};
use crate::sampling::{random_offset, uniform_index, weighted_choice_without_replacement};
use crate::speakers::SpeakerIndex;
use crate::wav::read_wav_window;

/// Where one source of a mixture is cut from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceWindow {
    pub speaker: String,
    pub path: PathBuf,
    pub start: usize,
}

/// Every random decision behind one mixture, before any audio is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixPlan {
    pub sources: Vec<SourceWindow>,
    /// Common segment length in samples.
    pub len: usize,
    pub gain_db: f32,
}

impl MixPlan {
    /// Linear gain per source: the drawn level on the first source, the
    /// same level with inverted polarity on every other one.
    pub fn source_gains(&self) -> Vec<f32> {
        let level = db_to_amplitude(self.gain_db);
        (0..self.sources.len())
            .map(|i| if i == 0 { level } else { -level })
            .collect()
    }
}

/// Record of a rendered mixture, stored next to the audio by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixRecipe {
    pub plan: MixPlan,
    pub gains: Vec<f32>,
    pub scale: f32,
}

impl MixRecipe {
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

#[derive(Debug, Clone)]
pub struct Mixture {
    pub mix: Vec<f32>,
    pub sources: Vec<Vec<f32>>,
    pub recipe: MixRecipe,
}

/// Applies `gains`, sums the sources and peak-normalizes everything together.
///
/// Returns the mixture, the gained sources and the shared scale factor. When
/// every sample is zero the signals are left unscaled and the factor is 1.
pub fn mix_sources(
    mut sources: Vec<Vec<f32>>,
    gains: &[f32],
    peak: f32,
) -> Result<(Vec<f32>, Vec<Vec<f32>>, f32)> {
    let len = sources.first().map_or(0, Vec::len);
    for (index, src) in sources.iter().enumerate() {
        if src.len() != len {
            return Err(MixError::LengthMismatch {
                index,
                expected: len,
                found: src.len(),
            });
        }
    }

    if gains.len() != sources.len() {
        return Err(MixError::GainCountMismatch {
            sources: sources.len(),
            gains: gains.len(),
        });
    }

    for (src, &gain) in sources.iter_mut().zip(gains) {
        scale_in_place(src, gain);
    }

    let mut mix = vec![0.0f32; len];
    for src in &sources {
        for (m, &s) in mix.iter_mut().zip(src) {
            *m += s;
        }
    }

    let scale = match normalization_scale(
        peak,
        std::iter::once(mix.as_slice()).chain(sources.iter().map(Vec::as_slice)),
    ) {
        Some(scale) => scale,
        None => {
            tracing::warn!("Mixture of {} sources is silent, leaving it unscaled", sources.len());
            1.0
        }
    };
    scale_in_place(&mut mix, scale);
    for src in sources.iter_mut() {
        scale_in_place(src, scale);
    }

    Ok((mix, sources, scale))
}

/// Draws fresh mixtures from a speaker index on every call.
pub struct DynamicMixer {
    index: SpeakerIndex,
    weights: Vec<f64>,
    config: MixConfig,
    rng: Rng,
}

impl DynamicMixer {
    pub fn new(index: SpeakerIndex, config: MixConfig) -> Result<Self> {
        config.validate()?;
        if index.len() < config.num_spks {
            return Err(MixError::NotEnoughSpeakers {
                requested: config.num_spks,
                available: index.len(),
            });
        }
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        let weights = index.weights();
        Ok(Self {
            index,
            weights,
            config,
            rng,
        })
    }

    /// Builds the speaker index from `config.source_dir` and wraps it.
    pub fn from_config(config: MixConfig) -> Result<Self> {
        config.validate()?;
        let index = SpeakerIndex::build(
            &config.source_dir,
            config.sample_rate,
            config.speaker_id_len,
        )?;
        Self::new(index, config)
    }

    pub fn index(&self) -> &SpeakerIndex {
        &self.index
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    /// Picks speakers, utterances, windows and gain without touching audio.
    pub fn plan(&mut self) -> Result<MixPlan> {
        let picked =
            weighted_choice_without_replacement(&mut self.rng, &self.weights, self.config.num_spks)?;

        let mut chosen = Vec::with_capacity(picked.len());
        for spk_idx in picked {
            let speaker = &self.index.speakers()[spk_idx];
            let utt = &speaker.utterances[uniform_index(&mut self.rng, speaker.utterances.len())];
            if utt.frames == 0 {
                return Err(MixError::EmptyUtterance(utt.path.clone()));
            }
            chosen.push((speaker.id.clone(), utt));
        }

        let len = chosen
            .iter()
            .map(|(_, utt)| utt.frames)
            .fold(self.config.training_signal_len, usize::min);

        let sources = chosen
            .into_iter()
            .map(|(speaker, utt)| SourceWindow {
                speaker,
                path: utt.path.clone(),
                start: random_offset(&mut self.rng, utt.frames, len),
            })
            .collect();

        let gain_db = random_gain_db(
            &mut self.rng,
            self.config.min_gain_db,
            self.config.max_gain_db,
        );

        Ok(MixPlan {
            sources,
            len,
            gain_db,
        })
    }

    /// Reads the planned windows and mixes them.
    pub fn render(&self, plan: MixPlan) -> Result<Mixture> {
        let sources = plan
            .sources
            .iter()
            .map(|w| read_wav_window(&w.path, w.start, plan.len))
            .collect::<Result<Vec<_>>>()?;
        let gains = plan.source_gains();
        let (mix, sources, scale) = mix_sources(sources, &gains, self.config.peak)?;

        tracing::debug!(
            "Mixed {:?} over {} samples at {:.2} dB, scale {:.3}",
            plan.sources.iter().map(|w| w.speaker.as_str()).collect::<Vec<_>>(),
            plan.len,
            plan.gain_db,
            scale
        );

        Ok(Mixture {
            mix,
            sources,
            recipe: MixRecipe { plan, gains, scale },
        })
    }

    pub fn next_mixture(&mut self) -> Result<Mixture> {
        let plan = self.plan()?;
        self.render(plan)
    }
}
