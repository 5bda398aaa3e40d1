//! Per-row view of dynamically mixed examples.
//!
//! A row id only names the example; the audio behind it is drawn fresh on
//! every access, so iterating the same ids twice yields two different epochs.

use crate::error::Result;
use crate::mixer::{DynamicMixer, MixRecipe};

pub const ID_KEY: &str = "id";
pub const MIX_KEY: &str = "mix_sig";

/// Field names produced per example: `id`, `mix_sig`, then `s1_sig`, `s2_sig`, ...
pub fn output_keys(num_spks: usize) -> Vec<String> {
    let mut keys = vec![ID_KEY.to_string(), MIX_KEY.to_string()];
    keys.extend((1..=num_spks).map(source_key));
    keys
}

pub fn source_key(n: usize) -> String {
    format!("s{n}_sig")
}

#[derive(Debug, Clone)]
pub struct Example {
    pub id: String,
    pub mix_sig: Vec<f32>,
    /// Scaled sources in speaker-sampling order.
    pub sources: Vec<Vec<f32>>,
    pub recipe: MixRecipe,
}

impl Example {
    /// Looks up a signal by output key.
    pub fn signal(&self, key: &str) -> Option<&[f32]> {
        if key == MIX_KEY {
            return Some(&self.mix_sig);
        }
        let n: usize = key.strip_prefix('s')?.strip_suffix("_sig")?.parse().ok()?;
        self.sources.get(n.checked_sub(1)?).map(Vec::as_slice)
    }

    /// The mixture followed by every source.
    pub fn signals(&self) -> impl Iterator<Item = &[f32]> {
        std::iter::once(self.mix_sig.as_slice()).chain(self.sources.iter().map(Vec::as_slice))
    }
}

impl DynamicMixer {
    /// Mixes a fresh example and tags it with `id`; the id does not influence
    /// which speakers are drawn.
    pub fn example(&mut self, id: &str) -> Result<Example> {
        let mixture = self.next_mixture()?;
        Ok(Example {
            id: id.to_string(),
            mix_sig: mixture.mix,
            sources: mixture.sources,
            recipe: mixture.recipe,
        })
    }

    pub fn epoch<I>(&mut self, ids: I) -> Epoch<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Epoch {
            mixer: self,
            ids: ids.into_iter(),
        }
    }
}

/// One pass over a list of row ids.
pub struct Epoch<'m, I> {
    mixer: &'m mut DynamicMixer,
    ids: I,
}

impl<I> Iterator for Epoch<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Example>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(self.mixer.example(id.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}
