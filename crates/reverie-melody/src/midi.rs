//! MIDI output for note sequences.
//!
//! Encodes a melody as a single-track Standard MIDI File: one tempo meta
//! event, then for each note a `note_on` at delta 0 and a `note_off` after
//! the note's duration in ticks. Strict onset/offset pairing, no overlaps.
//!
//! Uses the `midly` crate for SMF writing.

use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use tracing::info;

use crate::error::{MelodyError, Result};
use crate::mapper::Note;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Default tempo in microseconds per quarter note (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Fixed note velocity.
const VELOCITY: u8 = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Encoder
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for note-sequence encoders.
///
/// The orchestrator only talks to this seam, so tests can substitute a
/// recording encoder and file formats can vary.
pub trait NoteEncoder {
    /// Encode the notes and write them to `path`.
    fn encode(&self, notes: &[Note], path: &Path) -> Result<()>;
}

/// Standard MIDI File encoder.
#[derive(Debug, Clone, Copy)]
pub struct SmfEncoder {
    /// Tempo meta event value, microseconds per quarter note.
    tempo: u32,
}

impl SmfEncoder {
    /// Create an encoder with the given tempo (µs per quarter note).
    pub fn new(tempo: u32) -> Self {
        Self { tempo }
    }
}

impl Default for SmfEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO)
    }
}

impl NoteEncoder for SmfEncoder {
    fn encode(&self, notes: &[Note], path: &Path) -> Result<()> {
        let smf = self.to_smf(notes);

        let mut buf = Vec::new();
        smf.write_std(&mut buf)
            .map_err(|e| MelodyError::Encoding(e.to_string()))?;
        std::fs::write(path, &buf)?;

        info!(?path, notes = notes.len(), "wrote MIDI file");
        Ok(())
    }
}

impl SmfEncoder {
    /// Build the in-memory SMF for a note sequence.
    fn to_smf(&self, notes: &[Note]) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));

        let channel = u4::new(0);
        let mut track: Track<'static> = Vec::new();

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(self.tempo))),
        });

        for note in notes {
            let key = u7::new(note.pitch.min(127));
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(note.duration),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key,
                        vel: u7::new(VELOCITY),
                    },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
        smf
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> Vec<Note> {
        vec![
            Note { pitch: 60, duration: 480 },
            Note { pitch: 64, duration: 240 },
            Note { pitch: 67, duration: 960 },
        ]
    }

    #[test]
    fn test_smf_event_stream_structure() {
        let smf = SmfEncoder::default().to_smf(&notes());
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        // Tempo + (on, off) per note + end of track.
        assert_eq!(track.len(), 2 + 3 * 2);
        assert!(matches!(
            track[0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(_))
        ));
        assert!(matches!(
            track.last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));

        // Strict onset/offset pairing with deltas 0 and duration.
        for (i, note) in notes().iter().enumerate() {
            let on = &track[1 + i * 2];
            let off = &track[2 + i * 2];
            assert_eq!(on.delta.as_int(), 0);
            assert_eq!(off.delta.as_int(), note.duration);
            match (on.kind, off.kind) {
                (
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { key: k1, .. },
                        ..
                    },
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOff { key: k2, .. },
                        ..
                    },
                ) => {
                    assert_eq!(k1.as_int(), note.pitch);
                    assert_eq!(k2.as_int(), note.pitch);
                }
                other => panic!("unexpected events: {other:?}"),
            }
        }
    }

    #[test]
    fn test_encode_writes_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melody.mid");

        SmfEncoder::default().encode(&notes(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let parsed = Smf::parse(&bytes).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.header.format, Format::SingleTrack);
    }
}
