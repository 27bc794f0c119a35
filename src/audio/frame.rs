use serde::Deserialize;
use std::borrow::Cow;

/// What to do with a trailing frame shorter than the frame length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastFramePolicy {
    #[default]
    Pad,
    Drop,
}

/// One analysis window: `len` samples of the source waveform starting at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub start: usize,
    pub len: usize,
}

impl Frame {
    pub fn center(&self) -> usize {
        self.start + self.len / 2
    }

    /// The frame's samples. Borrowed from `waveform`, except for a frame running
    /// past its end, which is copied and zero-padded to `len`.
    pub fn samples<'a>(&self, waveform: &'a [f32]) -> Cow<'a, [f32]> {
        let end = (self.start + self.len).min(waveform.len());
        let available = &waveform[self.start.min(end)..end];
        if available.len() == self.len {
            Cow::Borrowed(available)
        } else {
            let mut padded = available.to_vec();
            padded.resize(self.len, 0.0);
            Cow::Owned(padded)
        }
    }
}

/// Splits a waveform into back-to-back frames aligned to the output frame rate.
///
/// Frame `k` covers `[floor(k·sr/fps), floor((k+1)·sr/fps))`, so its start is
/// always at `k / fps` seconds and no rounding error accumulates over long
/// inputs. Frame lengths differ from [`Framer::frame_length`] by at most one
/// sample when `sr / fps` is fractional.
#[derive(Clone, Copy, Debug)]
pub struct Framer {
    sample_rate: u64,
    fps: u64,
    policy: LastFramePolicy,
}

impl Framer {
    pub fn new(sample_rate: u32, fps: u32, policy: LastFramePolicy) -> Self {
        Self {
            sample_rate: sample_rate.max(1) as u64,
            fps: fps.max(1) as u64,
            policy,
        }
    }

    /// Nominal frame length, `round(sample_rate / fps)`.
    pub fn frame_length(&self) -> usize {
        ((2 * self.sample_rate + self.fps) / (2 * self.fps)).max(1) as usize
    }

    /// First sample of frame `index`.
    pub fn frame_start(&self, index: usize) -> usize {
        (index as u64 * self.sample_rate / self.fps) as usize
    }

    pub fn frame_count(&self, num_samples: usize) -> usize {
        // floor(k·sr/fps) < n  <=>  k < n·fps/sr
        let padded = (num_samples as u64 * self.fps).div_ceil(self.sample_rate) as usize;
        match self.policy {
            LastFramePolicy::Pad => padded,
            LastFramePolicy::Drop => {
                if padded > 0 && self.frame_start(padded) > num_samples {
                    padded - 1
                } else {
                    padded
                }
            }
        }
    }

    pub fn frames(&self, samples: &[f32]) -> Vec<Frame> {
        (0..self.frame_count(samples.len()))
            .map(|index| {
                let start = self.frame_start(index);
                let end = self.frame_start(index + 1);
                Frame {
                    index,
                    start,
                    len: (end - start).max(1),
                }
            })
            .collect()
    }
}
