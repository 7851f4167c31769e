use ndarray::{s, Array3, Axis};
use serde::{Serialize, Serializer};

use crate::error::{FetchError, FetchResult};

/// One decoded file, shaped `[1, channels, frames]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub samples: Array3<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn channels(&self) -> usize {
        self.samples.len_of(Axis(1))
    }

    pub fn frames(&self) -> usize {
        self.samples.len_of(Axis(2))
    }
}

/// Batched audio handed back to the host, shaped `[batch, channels, frames]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBatch {
    pub waveform: Array3<f32>,
    pub sample_rate: u32,
}

impl AudioBatch {
    /// Batch `waveforms`, enforcing a single sample rate.
    ///
    /// A lone waveform is returned as-is; several are tail-padded with zeros
    /// to the longest and stacked.
    pub fn from_waveforms(waveforms: Vec<Waveform>) -> FetchResult<Self> {
        let mut builder = BatchBuilder::default();
        for waveform in waveforms {
            builder.push(waveform)?;
        }
        builder.finish()
    }

    pub fn batch_size(&self) -> usize {
        self.waveform.len_of(Axis(0))
    }

    pub fn channels(&self) -> usize {
        self.waveform.len_of(Axis(1))
    }

    pub fn frames(&self) -> usize {
        self.waveform.len_of(Axis(2))
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.batch_size(), self.channels(), self.frames()]
    }
}

#[derive(Serialize)]
struct SerializedBatch {
    sample_rate: u32,
    shape: [usize; 3],
    waveform: Vec<Vec<Vec<f32>>>,
}

impl Serialize for AudioBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let waveform: Vec<Vec<Vec<f32>>> = self
            .waveform
            .outer_iter()
            .map(|item| item.outer_iter().map(|channel| channel.to_vec()).collect())
            .collect();
        SerializedBatch {
            sample_rate: self.sample_rate,
            shape: self.shape(),
            waveform,
        }
        .serialize(serializer)
    }
}

/// Collects waveforms one at a time, rejecting a sample rate change as soon
/// as it shows up.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    items: Vec<Array3<f32>>,
    sample_rate: Option<u32>,
}

impl BatchBuilder {
    pub fn push(&mut self, waveform: Waveform) -> FetchResult<()> {
        match self.sample_rate {
            None => self.sample_rate = Some(waveform.sample_rate),
            Some(expected) if expected != waveform.sample_rate => {
                return Err(FetchError::SampleRateMismatch {
                    expected,
                    found: waveform.sample_rate,
                });
            }
            Some(_) => {}
        }
        self.items.push(waveform.samples);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(mut self) -> FetchResult<AudioBatch> {
        let sample_rate = match self.sample_rate {
            Some(rate) if !self.is_empty() => rate,
            _ => return Err(FetchError::MalformedResult("nothing to batch".into())),
        };

        let waveform = if self.items.len() == 1 {
            self.items.remove(0)
        } else {
            pad_cat(&self.items)?
        };

        Ok(AudioBatch { waveform, sample_rate })
    }
}

/// Right-pad every item with zeros to the longest frame count and concatenate
/// along the batch axis.
pub fn pad_cat(waveforms: &[Array3<f32>]) -> FetchResult<Array3<f32>> {
    let Some(first) = waveforms.first() else {
        return Ok(Array3::zeros((0, 0, 0)));
    };
    let channels = first.len_of(Axis(1));
    if let Some(odd) = waveforms.iter().find(|w| w.len_of(Axis(1)) != channels) {
        return Err(FetchError::ChannelMismatch {
            expected: channels,
            found: odd.len_of(Axis(1)),
        });
    }

    let max_len = waveforms.iter().map(|w| w.len_of(Axis(2))).max().unwrap_or(0);
    let total: usize = waveforms.iter().map(|w| w.len_of(Axis(0))).sum();

    let mut out = Array3::<f32>::zeros((total, channels, max_len));
    let mut offset = 0;
    for w in waveforms {
        let (batch, _, frames) = w.dim();
        out.slice_mut(s![offset..offset + batch, .., ..frames]).assign(w);
        offset += batch;
    }
    Ok(out)
}
