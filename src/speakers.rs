use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{MixError, Result};
use crate::wav::wav_info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub path: PathBuf,
    pub frames: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub id: String,
    pub utterances: Vec<Utterance>,
}

/// Speakers keyed by filename prefix, each with the utterances it owns.
///
/// Speakers are kept sorted by id so a seeded mixer sees the same order on
/// every run.
#[derive(Debug, Clone, Default)]
pub struct SpeakerIndex {
    speakers: Vec<Speaker>,
}

impl SpeakerIndex {
    /// Scans `dir` recursively for `.wav` files and groups them by speaker.
    ///
    /// Every file must be mono at `sample_rate`; the first one that is not
    /// aborts the build.
    pub fn build(dir: &Path, sample_rate: u32, speaker_id_len: usize) -> Result<Self> {
        let mut pairs = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_wav(entry.path()) {
                continue;
            }
            let path = entry.path();
            let info = wav_info(path)?;
            if info.sample_rate != sample_rate {
                return Err(MixError::SampleRateMismatch {
                    path: path.to_path_buf(),
                    expected: sample_rate,
                    found: info.sample_rate,
                });
            }
            if info.channels != 1 {
                return Err(MixError::NotMono {
                    path: path.to_path_buf(),
                    channels: info.channels,
                });
            }
            let id = speaker_id(path, speaker_id_len)?;
            pairs.push((
                id,
                Utterance {
                    path: path.to_path_buf(),
                    frames: info.frames,
                },
            ));
        }

        if pairs.is_empty() {
            return Err(MixError::EmptyIndex(dir.to_path_buf()));
        }

        let index = Self::from_utterances(pairs);
        tracing::info!(
            "Indexed {} utterances from {} speakers under {}",
            index.utterance_count(),
            index.len(),
            dir.display()
        );
        Ok(index)
    }

    pub fn from_utterances(pairs: impl IntoIterator<Item = (String, Utterance)>) -> Self {
        let mut grouped: BTreeMap<String, Vec<Utterance>> = BTreeMap::new();
        for (id, utt) in pairs {
            grouped.entry(id).or_default().push(utt);
        }
        let speakers = grouped
            .into_iter()
            .map(|(id, utterances)| Speaker { id, utterances })
            .collect();
        Self { speakers }
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub fn get(&self, idx: usize) -> Option<&Speaker> {
        self.speakers.get(idx)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn utterance_count(&self) -> usize {
        self.speakers.iter().map(|s| s.utterances.len()).sum()
    }

    /// Per-speaker sampling probabilities, proportional to utterance count.
    pub fn weights(&self) -> Vec<f64> {
        let total = self.utterance_count() as f64;
        if total == 0.0 {
            return vec![0.0; self.speakers.len()];
        }
        self.speakers
            .iter()
            .map(|s| s.utterances.len() as f64 / total)
            .collect()
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Leading `width` characters of the file stem, e.g. `019` for `019o031a.wav`.
pub fn speaker_id(path: &Path, width: usize) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MixError::NonUtf8FileName(path.to_path_buf()))?;
    if stem.chars().count() < width {
        return Err(MixError::SpeakerIdTooShort {
            path: path.to_path_buf(),
            width,
        });
    }
    Ok(stem.chars().take(width).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::tests::write_pcm16;

    #[test]
    fn test_speaker_id_prefix() {
        assert_eq!(speaker_id(Path::new("a/b/019o031a.wav"), 3).unwrap(), "019");
        assert_eq!(speaker_id(Path::new("01vo030q.wav"), 3).unwrap(), "01v");
        assert!(matches!(
            speaker_id(Path::new("ab.wav"), 3),
            Err(MixError::SpeakerIdTooShort { width: 3, .. })
        ));
    }

    #[test]
    fn test_build_groups_and_weights() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("si_tr_s").join("019");
        std::fs::create_dir_all(&nested).unwrap();
        write_pcm16(&nested.join("019a0101.wav"), 8000, 1, &[1; 50]);
        write_pcm16(&nested.join("019a0102.wav"), 8000, 1, &[1; 60]);
        write_pcm16(&nested.join("019a0103.WAV"), 8000, 1, &[1; 70]);
        write_pcm16(&dir.path().join("01va0101.wav"), 8000, 1, &[1; 80]);
        std::fs::write(dir.path().join("notes.txt"), "not audio").unwrap();

        let index = SpeakerIndex::build(dir.path(), 8000, 3).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.utterance_count(), 4);

        let ids: Vec<_> = index.speakers().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["019", "01v"]);
        assert_eq!(index.speakers()[0].utterances.len(), 3);
        assert_eq!(index.speakers()[0].utterances[1].frames, 60);
        assert_eq!(index.speakers()[1].utterances[0].frames, 80);

        let weights = index.weights();
        assert!((weights[0] - 0.75).abs() < 1e-12);
        assert!((weights[1] - 0.25).abs() < 1e-12);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        write_pcm16(&dir.path().join("019a0101.wav"), 8000, 1, &[0; 10]);
        write_pcm16(&dir.path().join("020a0101.wav"), 16000, 1, &[0; 10]);

        let err = SpeakerIndex::build(dir.path(), 8000, 3).unwrap_err();
        assert!(matches!(
            err,
            MixError::SampleRateMismatch {
                expected: 8000,
                found: 16000,
                ..
            }
        ));
    }

    #[test]
    fn test_build_rejects_stereo() {
        let dir = tempfile::tempdir().unwrap();
        write_pcm16(&dir.path().join("019a0101.wav"), 8000, 2, &[0; 10]);

        assert!(matches!(
            SpeakerIndex::build(dir.path(), 8000, 3),
            Err(MixError::NotMono { channels: 2, .. })
        ));
    }

    #[test]
    fn test_build_rejects_short_stem() {
        let dir = tempfile::tempdir().unwrap();
        write_pcm16(&dir.path().join("019a0101.wav"), 8000, 1, &[0; 10]);
        write_pcm16(&dir.path().join("ab.wav"), 8000, 1, &[0; 10]);

        assert!(matches!(
            SpeakerIndex::build(dir.path(), 8000, 3),
            Err(MixError::SpeakerIdTooShort { width: 3, .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_rejects_non_utf8_stem() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"01\xff\xfe0101.wav");
        write_pcm16(&dir.path().join(name), 8000, 1, &[0; 10]);

        assert!(matches!(
            SpeakerIndex::build(dir.path(), 8000, 3),
            Err(MixError::NonUtf8FileName(_))
        ));
    }

    #[test]
    fn test_build_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SpeakerIndex::build(dir.path(), 8000, 3),
            Err(MixError::EmptyIndex(_))
        ));
    }
}
