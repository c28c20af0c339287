//! Property-based tests across every effect kind.
//!
//! Uses proptest to verify the invariants the chain relies on: finite
//! output for in-range input under arbitrary valid parameters, bounded
//! output, bypass identity, and reset returning an effect to its
//! fresh-constructed behaviour.

use proptest::prelude::*;

use cadenza_effects::{
    Bitcrusher, Chorus, Compressor, Distortion, EffectChain, EffectKind, EffectSlot, FilterEffect,
    FormantFilter, LadderFilter, MultiTapDelay, Phaser, Reverb,
};

const SR: f32 = 48000.0;

/// Number of distinct effect constructors covered below.
const NUM_KINDS: usize = 10;

/// Build effect `kind_idx` with three normalized [0, 1] parameter values
/// spread across its main controls (setters clamp to valid ranges).
fn build_effect(kind_idx: usize, p: [f32; 3]) -> EffectKind {
    match kind_idx % NUM_KINDS {
        0 => {
            let mut e = FilterEffect::new(SR);
            e.set_cutoff(20.0 + p[0] * 18_000.0);
            e.set_resonance(p[1]);
            e.set_mix(p[2]);
            EffectKind::Filter(e)
        }
        1 => {
            let mut e = LadderFilter::new(SR);
            e.set_cutoff(20.0 + p[0] * 18_000.0);
            e.set_resonance(p[1]);
            e.set_mix(p[2]);
            EffectKind::Ladder(e)
        }
        2 => {
            let mut e = FormantFilter::new(SR);
            e.set_vowel(p[0] * 4.0);
            e.set_mix(p[1]);
            EffectKind::Formant(e)
        }
        3 => {
            let mut e = MultiTapDelay::new(SR, 0.5);
            e.add_tap(0.01 + p[0] * 0.4, p[1] * 0.9, p[2]);
            e.add_tap(0.05 + p[1] * 0.3, p[2] * 0.9, p[0]);
            EffectKind::Delay(e)
        }
        4 => {
            let mut e = Reverb::new(SR);
            e.set_room_size(p[0]);
            e.set_damping(p[1]);
            e.set_width(p[2]);
            EffectKind::Reverb(e)
        }
        5 => {
            let mut e = Distortion::new(SR);
            e.set_drive(0.1 + p[0] * 10.0);
            e.set_tone(500.0 + p[1] * 15_000.0);
            e.set_mix(p[2]);
            EffectKind::Distortion(e)
        }
        6 => {
            let mut e = Compressor::new(SR);
            e.set_threshold(-40.0 + p[0] * 40.0);
            e.set_ratio(1.0 + p[1] * 19.0);
            e.set_mix(p[2]);
            EffectKind::Compressor(e)
        }
        7 => {
            let mut e = Chorus::new(SR, 1 + (p[0] * 7.0) as usize);
            e.set_rate(0.1 + p[1] * 5.0);
            e.set_depth(p[2] * 0.01);
            EffectKind::Chorus(e)
        }
        8 => {
            let mut e = Phaser::new(SR, 1 + (p[0] * 11.0) as usize);
            e.set_feedback(p[1] * 0.95);
            e.set_depth(p[2]);
            EffectKind::Phaser(e)
        }
        _ => {
            let mut e = Bitcrusher::new(SR);
            e.set_reduction(1 + (p[0] * 15.0) as u32);
            e.set_bit_depth(1 + (p[1] * 15.0) as u32);
            e.set_mix(p[2]);
            EffectKind::Bitcrusher(e)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every effect produces finite output for finite in-range input
    /// under arbitrary valid parameters.
    #[test]
    fn all_effects_finite_output(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform3(0.0f32..=1.0f32),
        kind_idx in 0usize..NUM_KINDS,
    ) {
        let mut effect = build_effect(kind_idx, params);
        let mut left = [0.0f32; 32];
        let mut right = [0.0f32; 32];

        for _ in 0..8 {
            left.copy_from_slice(&input);
            right.copy_from_slice(&input);
            effect.process_block(&mut left, &mut right);
            for (&l, &r) in left.iter().zip(right.iter()) {
                prop_assert!(
                    l.is_finite() && r.is_finite(),
                    "kind {} produced non-finite output", kind_idx
                );
            }
        }
    }

    /// Output stays within a generous bound. Fully undamped resonances
    /// can ring well past unity when driven with noise, so the bound is
    /// loose; the point is that nothing runs away to infinity.
    #[test]
    fn all_effects_bounded_output(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform3(0.0f32..=1.0f32),
        kind_idx in 0usize..NUM_KINDS,
    ) {
        let mut effect = build_effect(kind_idx, params);
        let mut left = [0.0f32; 32];
        let mut right = [0.0f32; 32];

        for _ in 0..32 {
            left.copy_from_slice(&input);
            right.copy_from_slice(&input);
            effect.process_block(&mut left, &mut right);
            for (&l, &r) in left.iter().zip(right.iter()) {
                prop_assert!(l.abs() <= 100.0 && r.abs() <= 100.0,
                    "kind {} output out of bounds: {} / {}", kind_idx, l, r);
            }
        }
    }

    /// A bypassed slot leaves the block bitwise unchanged regardless of
    /// the effect and its state.
    #[test]
    fn bypass_is_bitwise_identity(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform3(0.0f32..=1.0f32),
        kind_idx in 0usize..NUM_KINDS,
    ) {
        let mut chain = EffectChain::new(SR);
        chain.push(EffectSlot::new(build_effect(kind_idx, params))).unwrap();

        // Build up internal state first.
        let mut left = input;
        let mut right = input;
        chain.process_block(&mut left, &mut right);

        chain.set_bypass(0, true);
        let mut left = input;
        let mut right = input;
        chain.process_block(&mut left, &mut right);
        prop_assert_eq!(left, input);
        prop_assert_eq!(right, input);
    }

    /// After reset, an effect reproduces the output of a freshly built
    /// effect with the same parameters.
    #[test]
    fn reset_restores_fresh_behaviour(
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        params in prop::array::uniform3(0.0f32..=1.0f32),
        kind_idx in 0usize..NUM_KINDS,
    ) {
        let mut used = EffectChain::new(SR);
        used.push(EffectSlot::new(build_effect(kind_idx, params))).unwrap();

        let mut left = input;
        let mut right = input;
        used.process_block(&mut left, &mut right);
        used.reset();

        let mut fresh = EffectChain::new(SR);
        fresh.push(EffectSlot::new(build_effect(kind_idx, params))).unwrap();

        let mut l_used = input;
        let mut r_used = input;
        used.process_block(&mut l_used, &mut r_used);

        let mut l_fresh = input;
        let mut r_fresh = input;
        fresh.process_block(&mut l_fresh, &mut r_fresh);

        for i in 0..32 {
            prop_assert!(
                (l_used[i] - l_fresh[i]).abs() < 1e-5,
                "kind {} diverged after reset at {}: {} vs {}",
                kind_idx, i, l_used[i], l_fresh[i]
            );
            prop_assert!((r_used[i] - r_fresh[i]).abs() < 1e-5);
        }
    }
}
