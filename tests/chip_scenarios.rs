//! End-to-end behaviour of the chip through its host ports.

use anyhow::Result;
use multipcm::multipcm::constants::TL_SHIFT;
use multipcm::multipcm::{EnvelopeState, SampleFormat};
use multipcm::{ChipState, MultiPcm, SampleMetadata, StereoFrame};

/// Clock giving an output rate of exactly 44100 Hz.
const CLOCK: u32 = 9_878_400;

const DATA: usize = 0x1000;

/// Sample headers used by the tests:
/// - 0: 8-bit ramp, loop 10, end 100, instant attack, slow release
/// - 1: 12-bit, four known samples repeating, end 4
/// - 5: header with every field distinct
/// - 6: 8-bit constant 0x40, loop 0, end 0x7ff, instant attack and release
fn fixture_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x4000];

    let mut header = |index: usize, bytes: [u8; 12]| {
        rom[index * 12..index * 12 + 12].copy_from_slice(&bytes);
    };
    header(0, [0x00, 0x10, 0x00, 0x00, 0x0a, 0xff, 0x9b, 0x00, 0xf0, 0x00, 0x04, 0x00]);
    header(1, [0x80, 0x12, 0x00, 0x00, 0x00, 0xff, 0xfb, 0x00, 0xf0, 0x00, 0x04, 0x00]);
    header(5, [0x81, 0x23, 0x45, 0x01, 0x20, 0xfc, 0x17, 0x1a, 0xb6, 0x7c, 0x38, 0x05]);
    header(6, [0x00, 0x20, 0x00, 0x00, 0x00, 0xf8, 0x00, 0x00, 0xf0, 0x00, 0x0f, 0x00]);

    for i in 0..100 {
        rom[DATA + i] = (i * 2) as u8;
    }
    rom[0x1200..0x1206].copy_from_slice(&[0x12, 0x53, 0x45, 0x78, 0xc9, 0xab]);
    for byte in &mut rom[0x2000..0x2800] {
        *byte = 0x40;
    }
    rom
}

fn chip() -> MultiPcm<Vec<u8>> {
    MultiPcm::new(CLOCK, fixture_rom())
}

/// Unity pitch, direct total level 0, then sample select and key on.
fn play(chip: &mut MultiPcm<Vec<u8>>, code: u8, sample: u8, pan: u8) {
    chip.write_voice_register(code, 0, pan << 4);
    chip.write_voice_register(code, 3, 0x10);
    chip.write_voice_register(code, 2, 0x00);
    chip.write_voice_register(code, 1, sample);
    chip.write_voice_register(code, 5, 0x01);
    chip.write_voice_register(code, 4, 0x80);
}

fn voice_offset(chip: &MultiPcm<Vec<u8>>, index: usize) -> u32 {
    chip.voice(index).map(|v| v.offset).unwrap_or_default()
}

#[test]
fn test_determinism() {
    let run = || {
        let mut chip = chip();
        play(&mut chip, 0, 0, 0);
        play(&mut chip, 9, 6, 3);
        chip.write_voice_register(9, 6, 0x3d);
        chip.write_voice_register(9, 7, 0x05);
        let mut frames = chip.generate_frames(2000);
        chip.write_voice_register(0, 4, 0x00);
        frames.extend(chip.generate_frames(2000));
        frames
    };

    let first = run();
    assert!(first.iter().any(|f| *f != StereoFrame::SILENCE));
    assert_eq!(first, run());
}

#[test]
fn test_sample_select_reads_header_five() {
    let mut chip = chip();
    chip.write_port(1, 0x00);
    chip.write_port(2, 0x02);
    chip.write_port(0, 0x00);
    chip.write_port(2, 0x01);
    chip.write_port(0, 0x05);

    let rom = fixture_rom();
    let header: [u8; 12] = rom[60..72].try_into().unwrap();
    let expected = SampleMetadata::from_header(&header);

    let voice = chip.voice(0).unwrap();
    assert_eq!(voice.sample, expected);
    assert_eq!(voice.sample.start, 0x01_2345);
    assert_eq!(voice.sample.format, SampleFormat::Linear12);
    assert_eq!(voice.sample.loop_start, 0x0120);
    assert_eq!(voice.sample.end, 0xffff - 0xfc17);
    assert_eq!(voice.sample.attack_reg, 0xb);
    assert_eq!(voice.sample.decay1_reg, 0x6);
    assert_eq!(voice.sample.decay2_reg, 0xc);
    assert_eq!(voice.sample.decay_level, 0x7);
    assert_eq!(voice.sample.release_reg, 0x8);
    assert_eq!(voice.sample.key_rate_scale, 0x3);

    assert_eq!(voice.base, 0x01_2345);
    assert_eq!(voice.format, SampleFormat::Linear12);
    assert_eq!(voice.regs[6], 0x1a);
    assert_eq!(voice.regs[7], 0x05);
    assert!(!voice.playing);
}

#[test]
fn test_loop_wrap_after_hundred_ticks() {
    let mut chip = chip();
    play(&mut chip, 0, 0, 0);
    assert_eq!(chip.voice(0).unwrap().step, 1 << TL_SHIFT);

    for tick in 1..=100u32 {
        chip.clock();
        if tick < 100 {
            assert_eq!(voice_offset(&chip, 0), tick << TL_SHIFT);
        }
    }
    assert_eq!(voice_offset(&chip, 0), 10 << TL_SHIFT);

    chip.clock();
    assert_eq!(voice_offset(&chip, 0), 11 << TL_SHIFT);
}

#[test]
fn test_total_level_ramp_stops_at_destination() {
    let mut chip = chip();
    play(&mut chip, 0, 6, 0);
    assert_eq!(chip.voice(0).unwrap().total_level, 0);

    chip.write_voice_register(0, 5, 50 << 1);
    let step = chip.voice(0).unwrap().total_level_step;
    assert_eq!(step, chip.tables().total_level_raise());

    let mut previous = 0;
    for _ in 0..5000 {
        chip.clock();
        let level = chip.voice(0).unwrap().total_level;
        assert!(level >= previous);
        assert!(level >> TL_SHIFT <= 50);
        previous = level;
    }
    let voice = chip.voice(0).unwrap();
    assert_eq!(voice.total_level >> TL_SHIFT, 50);
    assert!(voice.total_level - (50 << TL_SHIFT) < step);
}

#[test]
fn test_total_level_ramp_down() {
    let mut chip = chip();
    play(&mut chip, 0, 6, 0);
    chip.write_voice_register(0, 5, (0x40 << 1) | 1);
    chip.write_voice_register(0, 5, 0x10 << 1);

    let mut previous = chip.voice(0).unwrap().total_level;
    for _ in 0..5000 {
        chip.clock();
        let level = chip.voice(0).unwrap().total_level;
        assert!(level <= previous);
        assert!(level >> TL_SHIFT >= 0x10);
        previous = level;
    }
    assert_eq!(previous >> TL_SHIFT, 0x10);
}

#[test]
fn test_packed12_playback_feeds_interpolator() {
    let mut chip = chip();
    play(&mut chip, 0, 1, 0);
    assert_eq!(chip.voice(0).unwrap().format, SampleFormat::Linear12);

    let expected = [0x1230, 0x4550, 0x7890, 0xabc0u16 as i16 as i32];
    for value in expected {
        chip.clock();
        assert_eq!(chip.voice(0).unwrap().prev_sample, value);
    }
    // End 4, loop 0: back at the start of the group.
    assert_eq!(voice_offset(&chip, 0), 0);
}

#[test]
fn test_pan_centre_and_mute() {
    let mut centre = chip();
    play(&mut centre, 0, 6, 0x0);
    let frames = centre.generate_frames(64);
    assert!(frames[2..].iter().all(|f| f.left == f.right && f.left > 0));

    let mut muted = chip();
    play(&mut muted, 0, 6, 0x8);
    assert!(muted.generate_frames(64).iter().all(|f| *f == StereoFrame::SILENCE));
    // The voice still runs.
    assert_eq!(voice_offset(&muted, 0), 64 << TL_SHIFT);
}

#[test]
fn test_pan_sides_mirror() {
    for pan in 1..8u8 {
        let mut left_cut = chip();
        play(&mut left_cut, 0, 6, pan);
        let mut right_cut = chip();
        play(&mut right_cut, 0, 6, 16 - pan);

        for (a, b) in left_cut.generate_frames(32).iter().zip(right_cut.generate_frames(32).iter()) {
            assert_eq!(a.left, b.right);
            assert_eq!(a.right, b.left);
            assert!(a.left <= a.right);
        }
    }
}

#[test]
fn test_retrigger_resets_regardless_of_state() {
    let mut chip = chip();
    play(&mut chip, 0, 0, 0);
    chip.generate_frames(57);
    chip.write_voice_register(0, 4, 0x00);
    chip.generate_frames(10);
    assert_eq!(chip.voice(0).unwrap().envelope_state(), EnvelopeState::Release);

    chip.write_voice_register(0, 4, 0x80);
    let voice = chip.voice(0).unwrap();
    assert_eq!(voice.offset, 0);
    assert_eq!(voice.prev_sample, 0);
    assert_eq!(voice.envelope.state, EnvelopeState::Attack);
    assert_eq!(voice.envelope.volume, 0);

    chip.generate_frames(33);
    chip.write_voice_register(0, 1, 6);
    let voice = chip.voice(0).unwrap();
    assert!(voice.playing);
    assert_eq!(voice.offset, 0);
    assert_eq!(voice.prev_sample, 0);
    assert_eq!(voice.envelope.state, EnvelopeState::Attack);
    assert_eq!(voice.base, 0x2000);
}

#[test]
fn test_release_runs_to_silence_and_stops() {
    let mut chip = chip();
    play(&mut chip, 0, 0, 0);
    chip.generate_frames(20);
    chip.write_voice_register(0, 4, 0x00);

    let mut previous = chip.voice(0).unwrap().envelope.volume;
    let mut ticks = 0;
    while chip.voice(0).unwrap().playing {
        chip.clock();
        let volume = chip.voice(0).unwrap().envelope.volume;
        assert!(volume <= previous && volume >= 0);
        previous = volume;
        ticks += 1;
        assert!(ticks < 2_000_000, "release never finished");
    }
    assert_eq!(chip.bank().active_voices(), 0);
    assert_eq!(chip.clock(), StereoFrame::SILENCE);
}

#[test]
fn test_instant_release_stops_at_key_off() {
    let mut chip = chip();
    play(&mut chip, 0, 6, 0);
    chip.generate_frames(5);
    chip.write_voice_register(0, 4, 0x00);
    assert!(!chip.voice(0).unwrap().playing);
}

#[test]
fn test_invalid_voice_codes_are_noops() {
    let mut chip = chip();
    let before = chip.save_state();
    for code in [0x07u8, 0x0f, 0x17, 0x1f] {
        for reg in 0..8 {
            chip.write_voice_register(code, reg, 0x80 | reg);
        }
    }
    let after = chip.save_state();
    assert_eq!(after.voices, before.voices);
    assert_eq!(after.selected_voice, None);
    assert_eq!(chip.bank().active_voices(), 0);
}

#[test]
fn test_voice_code_groups() {
    let mut chip = chip();
    for code in (0..32u8).filter(|c| c & 7 != 7) {
        chip.write_voice_register(code, 4, 0x80);
    }
    assert_eq!(chip.bank().active_voices(), 28);
}

#[test]
fn test_vibrato_changes_progress() {
    let mut plain = chip();
    play(&mut plain, 0, 6, 0);
    let mut vibrato = chip();
    play(&mut vibrato, 0, 6, 0);
    vibrato.write_voice_register(0, 6, 0x3f);

    plain.generate_frames(1500);
    vibrato.generate_frames(1500);
    assert_eq!(voice_offset(&plain, 0), 1500 << TL_SHIFT);
    assert_ne!(voice_offset(&vibrato, 0), voice_offset(&plain, 0));
}

#[test]
fn test_tremolo_only_attenuates() {
    let mut plain = chip();
    play(&mut plain, 0, 6, 0);
    let mut tremolo = chip();
    play(&mut tremolo, 0, 6, 0);
    // Fastest LFO, vibrato off.
    tremolo.write_voice_register(0, 6, 0x38);
    tremolo.write_voice_register(0, 7, 0x07);
    assert_eq!(tremolo.voice(0).unwrap().amplitude_lfo.depth(), 7);

    let a = plain.generate_frames(3000);
    let b = tremolo.generate_frames(3000);
    assert!(a.iter().zip(&b).all(|(p, t)| t.left <= p.left));
    assert!(a.iter().zip(&b).any(|(p, t)| t.left < p.left));
}

#[test]
fn test_clock_change_keeps_running_voice() {
    let mut chip = chip();
    play(&mut chip, 0, 6, 0);
    chip.generate_frames(10);
    chip.set_clock(CLOCK / 2);
    assert_eq!(chip.sample_rate(), 22_050.0);
    chip.generate_frames(10);
    assert_eq!(voice_offset(&chip, 0), 20 << TL_SHIFT);

    // New pitch writes use the new table.
    chip.write_voice_register(0, 3, 0x10);
    assert_eq!(chip.voice(0).unwrap().step, 1 << TL_SHIFT);
}

#[test]
fn test_snapshot_roundtrip_through_json() -> Result<()> {
    let mut chip = chip();
    play(&mut chip, 0, 0, 2);
    play(&mut chip, 12, 6, 11);
    chip.write_voice_register(12, 6, 0x2c);
    chip.generate_frames(777);

    let json = serde_json::to_string(&chip.save_state())?;
    let expected = chip.generate_frames(1000);

    let state: ChipState = serde_json::from_str(&json)?;
    let mut restored = MultiPcm::new(CLOCK, fixture_rom());
    restored.restore_state(&state)?;
    assert_eq!(restored.generate_frames(1000), expected);
    Ok(())
}

#[test]
fn test_out_of_range_rom_reads_are_silent() {
    // Header 0 points far beyond a tiny ROM.
    let mut rom = vec![0u8; 12];
    rom.copy_from_slice(&[0x3f, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0xf0, 0x00, 0x00, 0x00]);
    let mut chip = MultiPcm::new(CLOCK, rom);
    chip.write_voice_register(0, 1, 0);
    chip.write_voice_register(0, 4, 0x80);
    assert!(chip.generate_frames(100).iter().all(|f| *f == StereoFrame::SILENCE));
}
