/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// One-shot effects (swish, enemy grunts, death, victory) are
/// fire-and-forget via detached Sinks. Three sounds get dedicated
/// persistent sinks:
///   - the player hurt grunt, which must not retrigger while playing
///     (contact damage fires every frame),
///   - the footstep loop while running,
///   - the background tune, off at launch and toggled with pause/play.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::source::Source;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_swish: Arc<Vec<u8>>,
        sfx_grunt: [Arc<Vec<u8>>; 3],
        sfx_player_grunt: Arc<Vec<u8>>,
        sfx_step: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_victory: Arc<Vec<u8>>,
        grunt_sink: Sink,
        walk_sink: Sink,
        music_sink: Sink,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            let sfx_swish = Arc::new(make_wav(&gen_swish()));
            let sfx_grunt = [
                Arc::new(make_wav(&gen_grunt(160.0))),
                Arc::new(make_wav(&gen_grunt(120.0))),
                Arc::new(make_wav(&gen_grunt(95.0))),
            ];
            let sfx_player_grunt = Arc::new(make_wav(&gen_player_grunt()));
            let sfx_step = Arc::new(make_wav(&gen_step()));
            let sfx_die = Arc::new(make_wav(&gen_die()));
            let sfx_victory = Arc::new(make_wav(&gen_victory()));

            let grunt_sink = Sink::try_new(&handle).ok()?;
            let walk_sink = Sink::try_new(&handle).ok()?;

            // Background tune starts paused; the first 'm' starts it.
            let music_sink = Sink::try_new(&handle).ok()?;
            let tune = make_wav(&gen_tune());
            if let Ok(src) = rodio::Decoder::new(Cursor::new(tune)) {
                music_sink.append(src.repeat_infinite());
            }
            music_sink.set_volume(0.5);
            music_sink.pause();

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_swish,
                sfx_grunt,
                sfx_player_grunt,
                sfx_step,
                sfx_die,
                sfx_victory,
                grunt_sink,
                walk_sink,
                music_sink,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_swish(&self) {
            self.play(&self.sfx_swish);
        }

        /// Enemy hurt grunt, variant 1..=3. Out-of-range falls back to 3.
        pub fn play_enemy_grunt(&self, variant: u8) {
            let idx = match variant {
                1 => 0,
                2 => 1,
                _ => 2,
            };
            self.play(&self.sfx_grunt[idx]);
        }

        /// Player hurt grunt. Does not retrigger while still playing, so
        /// per-frame contact damage produces one groan, not a buzz.
        pub fn play_player_grunt(&self) {
            if !self.grunt_sink.empty() {
                return;
            }
            let cursor = Cursor::new(self.sfx_player_grunt.as_ref().clone());
            if let Ok(src) = rodio::Decoder::new(cursor) {
                self.grunt_sink.append(src);
            }
        }

        /// Footstep tick while the player is running. Appends the next
        /// step only when the previous one finished, producing a steady
        /// walking rhythm; going idle lets the sink drain naturally.
        pub fn walk(&self, running: bool) {
            if !running || !self.walk_sink.empty() {
                return;
            }
            let cursor = Cursor::new(self.sfx_step.as_ref().clone());
            if let Ok(src) = rodio::Decoder::new(cursor) {
                self.walk_sink.append(src);
            }
        }

        pub fn play_die(&self) {
            self.play(&self.sfx_die);
        }

        pub fn play_victory(&self) {
            self.play(&self.sfx_victory);
        }

        /// Toggle the background tune. Returns true if now playing.
        pub fn toggle_music(&self) -> bool {
            if self.music_sink.is_paused() {
                self.music_sink.play();
                true
            } else {
                self.music_sink.pause();
                false
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Sword swish: descending noise whoosh
    fn gen_swish() -> Vec<f32> {
        let duration = 0.10;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 9871;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let freq = 900.0 - t * 600.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                let env = (1.0 - t).powf(1.5);
                (noise * 0.5 + tone * 0.5) * env * 0.25
            })
            .collect()
    }

    /// Enemy grunt: low buzzy thump around a base frequency.
    /// Three variants differ only in pitch.
    fn gen_grunt(base: f32) -> Vec<f32> {
        let duration = 0.14;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = base * (1.0 - t * 0.3);
                // Sine + 2nd harmonic for a growly timbre
                let wave = (ti * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (ti * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                let env = (1.0 - t).powf(0.7);
                wave * env * 0.3
            })
            .collect()
    }

    /// Player hurt: a longer, lower groan than the enemy grunts
    fn gen_player_grunt() -> Vec<f32> {
        let duration = 0.30;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 140.0 - t * 50.0;
                let wave = (ti * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (ti * freq * 1.5 * 2.0 * std::f32::consts::PI).sin() * 0.4;
                let env = (1.0 - t).powf(0.5);
                wave * env * 0.3
            })
            .collect()
    }

    /// Footstep: very short muffled noise tick, followed by silence so the
    /// per-frame `walk` calls space the steps out
    fn gen_step() -> Vec<f32> {
        let tick = (SAMPLE_RATE as f32 * 0.03) as usize;
        let gap = (SAMPLE_RATE as f32 * 0.22) as usize;
        let mut rng: u32 = 424242;
        let mut samples: Vec<f32> = (0..tick)
            .map(|i| {
                let t = i as f32 / tick as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                noise * (1.0 - t) * 0.12
            })
            .collect();
        samples.extend(std::iter::repeat(0.0).take(gap));
        samples
    }

    /// Death: sad descending tone
    fn gen_die() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let note_dur = 0.12;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin();
                samples.push(wave * env * 0.3);
            }
        }
        // Final fade
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for i in (total - fade_len)..total {
            let ratio = (total - i) as f32 / fade_len as f32;
            samples[i] *= ratio;
        }
        samples
    }

    /// Victory: ascending fanfare with a sustained final note
    fn gen_victory() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0]; // C5→E5→G5→C6
        let note_dur = 0.1;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let last_freq = 1047.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let wave = (t * last_freq * 2.0 * std::f32::consts::PI).sin();
            samples.push(wave * env * 0.3);
        }
        samples
    }

    /// Background tune: an eight-bar pentatonic loop, soft square-ish waves
    fn gen_tune() -> Vec<f32> {
        // A minor pentatonic walk
        let notes = [
            220.0_f32, 261.6, 293.7, 329.6, 293.7, 261.6, 220.0, 196.0,
        ];
        let note_dur = 0.28;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let frac = i as f32 / n as f32;
                let env = (1.0 - frac * 0.4).min(frac * 20.0); // soft attack
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.2;
                samples.push(wave * env * 0.12);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
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
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play_swish(&self) {}
    pub fn play_enemy_grunt(&self, _variant: u8) {}
    pub fn play_player_grunt(&self) {}
    pub fn walk(&self, _running: bool) {}
    pub fn play_die(&self) {}
    pub fn play_victory(&self) {}
    pub fn toggle_music(&self) -> bool {
        false
    }
}
