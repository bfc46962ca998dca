/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time, one
/// per `Cue`. Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::sim::event::Cue;

    pub const SAMPLE_RATE: u32 = 22050;

    pub const ALL_CUES: [Cue; 8] = [
        Cue::Jump, Cue::Shoot, Cue::Hurt, Cue::Bomb,
        Cue::Explosion, Cue::Select, Cue::Hit, Cue::Dash,
    ];

    /// Playback volume per cue.
    pub fn volume(cue: Cue) -> f32 {
        match cue {
            Cue::Hit => 0.2,
            _ => 0.1,
        }
    }

    pub fn samples(cue: Cue) -> Vec<f32> {
        match cue {
            Cue::Jump => gen_jump(),
            Cue::Shoot => gen_shoot(),
            Cue::Hurt => gen_hurt(),
            Cue::Bomb => gen_bomb(),
            Cue::Explosion => gen_explosion(),
            Cue::Select => gen_select(),
            Cue::Hit => gen_hit(),
            Cue::Dash => gen_dash(),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn len(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    fn square(phase: f32) -> f32 {
        if phase.fract() < 0.5 { 1.0 } else { -1.0 }
    }

    /// Frequency sweep with a linear fade. Phase is accumulated so the
    /// sweep stays click-free.
    fn sweep(from: f32, to: f32, duration: f32, wave: fn(f32) -> f32) -> Vec<f32> {
        let n = len(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                wave(phase) * (1.0 - t)
            })
            .collect()
    }

    /// Decaying white noise mixed with a low tone. Seeded so every build
    /// of a cue sounds the same.
    fn noise(duration: f32, decay: f32, tone: f32, seed: u64) -> Vec<f32> {
        let n = len(duration);
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let white = rng.gen::<f32>() * 2.0 - 1.0;
                let low = (ti * tone * TAU).sin();
                (white * 0.7 + low * 0.3) * (1.0 - t).powf(decay)
            })
            .collect()
    }

    /// Jump: quick rising square chirp
    fn gen_jump() -> Vec<f32> {
        sweep(300.0, 750.0, 0.12, square)
    }

    /// Shoot: falling zap over a noise click
    fn gen_shoot() -> Vec<f32> {
        let zap = sweep(1200.0, 300.0, 0.09, square);
        let click = noise(0.03, 2.0, 0.0, 7);
        zap.iter()
            .enumerate()
            .map(|(i, s)| s * 0.6 + click.get(i).copied().unwrap_or(0.0) * 0.4)
            .collect()
    }

    /// Hurt: descending notes
    fn gen_hurt() -> Vec<f32> {
        let mut out = Vec::new();
        for freq in [440.0_f32, 330.0, 220.0] {
            out.extend(sweep(freq, freq * 0.9, 0.08, square));
        }
        out
    }

    /// Portal destroyed: long low rumble
    fn gen_bomb() -> Vec<f32> {
        noise(0.5, 1.5, 55.0, 11)
    }

    /// Barrel: sharp crack into a rumble
    fn gen_explosion() -> Vec<f32> {
        let mut out = noise(0.05, 0.5, 120.0, 23);
        out.extend(noise(0.45, 1.2, 60.0, 29));
        out
    }

    /// Select: two-note blip
    fn gen_select() -> Vec<f32> {
        let mut out = sweep(880.0, 880.0, 0.04, sine);
        out.extend(sweep(1320.0, 1320.0, 0.06, sine));
        out
    }

    /// Hit: short thud
    fn gen_hit() -> Vec<f32> {
        noise(0.07, 2.5, 90.0, 31)
    }

    /// Dash: airy whoosh with a rising undertone
    fn gen_dash() -> Vec<f32> {
        let air = noise(0.15, 1.0, 0.0, 37);
        let tone = sweep(200.0, 500.0, 0.15, sine);
        air.iter().zip(&tone).map(|(a, b)| a * 0.6 + b * 0.4).collect()
    }

    fn sine(phase: f32) -> f32 {
        (phase * TAU).sin()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;
    use crate::sim::event::Cue;

    /// Pre-generated WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Cue, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            let buffers = synth::ALL_CUES
                .iter()
                .map(|&cue| (cue, Arc::new(synth::make_wav(&synth::samples(cue)))))
                .collect();

            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, cue: Cue) {
            let Some(buf) = self.buffers.get(&cue) else {
                return;
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.set_volume(synth::volume(cue));
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API, compiling to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: crate::sim::event::Cue) {}
}
