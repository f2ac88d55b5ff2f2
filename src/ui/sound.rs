/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is synthesised once at startup into an in-memory WAV buffer.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to drop audio entirely (the stub
/// SoundEngine does nothing). `[sound] enabled = false` in config.toml
/// skips opening the output device at runtime.

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_eat: Arc<Vec<u8>>,
        sfx_bonus: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_start: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_eat: Arc::new(make_wav(&gen_chomp())),
                sfx_bonus: Arc::new(make_wav(&gen_bonus())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_die: Arc::new(make_wav(&gen_die())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_start: Arc::new(make_wav(&gen_start())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("sink unavailable: {e}");
                    return;
                }
            };
            let cursor = Cursor::new(buf.as_ref().clone());
            if let Ok(src) = rodio::Decoder::new(cursor) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_eat(&self) { self.play(&self.sfx_eat); }
        pub fn play_bonus(&self) { self.play(&self.sfx_bonus); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_start(&self) { self.play(&self.sfx_start); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn sample_count(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Note sequence: each `(freq, seconds)` gets a decaying envelope.
    /// `overtone` mixes in the 2nd harmonic for a brighter tone.
    fn gen_notes(notes: &[(f32, f32)], overtone: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = sample_count(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.7;
                let wave = (t * freq * TAU).sin() * (1.0 - overtone)
                    + (t * freq * 2.0 * TAU).sin() * overtone;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Eat: short "waka" pitch dip, square-ish.
    fn gen_chomp() -> Vec<f32> {
        let n = sample_count(0.07);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 500.0 - (t * 2.0 - 1.0).abs().mul_add(-250.0, 250.0);
                phase += freq / SAMPLE_RATE as f32;
                let square = if phase.fract() < 0.5 { 1.0 } else { -1.0 };
                square * (1.0 - t) * 0.15
            })
            .collect()
    }

    /// Bonus fruit: rising arpeggio E5→G5→B5→E6.
    fn gen_bonus() -> Vec<f32> {
        gen_notes(&[(659.0, 0.05), (784.0, 0.05), (988.0, 0.05), (1319.0, 0.12)], 0.3, 0.25)
    }

    /// Hit: low buzz with noise.
    fn gen_hit() -> Vec<f32> {
        let n = sample_count(0.2);
        let mut lcg: u32 = 0x2545_F491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * 110.0 * TAU).sin();
                lcg = lcg.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = (lcg as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.6 + noise * 0.4) * (1.0 - t) * 0.35
            })
            .collect()
    }

    /// Death: long descending glide.
    fn gen_die() -> Vec<f32> {
        let n = sample_count(0.9);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let wobble = (t * 40.0).sin() * 30.0;
                let freq = 700.0 - t * 550.0 + wobble;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t).powf(0.5) * 0.3
            })
            .collect()
    }

    /// Level clear: fanfare C5→E5→G5→C6 with a held top note.
    fn gen_clear() -> Vec<f32> {
        gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)], 0.4, 0.3)
    }

    /// Level start: two-bar jingle.
    fn gen_start() -> Vec<f32> {
        gen_notes(&[(494.0, 0.08), (988.0, 0.08), (740.0, 0.08), (622.0, 0.08), (988.0, 0.16)], 0.2, 0.25)
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_eat(&self) {}
    pub fn play_bonus(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_die(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_start(&self) {}
}
