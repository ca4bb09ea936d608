#[cfg(feature = "arbitrary")]
mod fuzz {
    use arbitrary::{Arbitrary, Unstructured};
    use chat_replay::{
        simulate, PlaybackConfig, PlaybackEvent, ReplayError, ResourceLimiter, ScriptPolicy,
        ScriptRaw, ScriptStore,
    };

    fn fill_deterministic(buf: &mut [u8], seed: u64) {
        let mut state = seed;
        for byte in buf.iter_mut() {
            // xorshift64*
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            state = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
            *byte = (state & 0xFF) as u8;
        }
    }

    /// Points every message at an existing participant so the script can load.
    fn repair_senders(script: &mut ScriptRaw) {
        let ids: Vec<String> = script.participants.iter().map(|p| p.id.clone()).collect();
        if ids.is_empty() {
            script.messages.clear();
            return;
        }
        for (index, message) in script.messages.iter_mut().enumerate() {
            message.sender_id = ids[index % ids.len()].clone();
        }
    }

    fn check_invariants(store: &ScriptStore) {
        let trace = simulate(store, &PlaybackConfig::default()).expect("validated script plays");
        assert_eq!(trace.final_state.displayed.as_slice(), store.messages());

        let mut revealed = 0usize;
        let mut typing: Option<usize> = None;
        let mut last_at = 0u64;
        for entry in &trace.entries {
            assert!(entry.at_ms >= last_at);
            last_at = entry.at_ms;
            match &entry.event {
                PlaybackEvent::TypingStarted { index, .. } => {
                    assert!(typing.is_none());
                    assert!(!store.sender_of(*index).unwrap().is_self);
                    typing = Some(*index);
                }
                PlaybackEvent::TypingStopped { index, .. } => {
                    assert_eq!(typing.take(), Some(*index));
                }
                PlaybackEvent::MessageRevealed { index, .. } => {
                    assert!(typing.is_none());
                    assert_eq!(*index, revealed);
                    revealed += 1;
                }
                PlaybackEvent::Finished { revealed: total } => {
                    assert_eq!(*total, store.len());
                }
                _ => {}
            }
        }
        assert_eq!(revealed, store.len());
    }

    #[test]
    fn fuzz_load_and_play_raw_scripts() {
        let mut raw_data = [0u8; 1024 * 16];
        let policy = ScriptPolicy {
            clamp_negative_delays: true,
            ..ScriptPolicy::default()
        };

        for i in 0..128u64 {
            fill_deterministic(&mut raw_data, 0xC4A7_5EEDu64 ^ i);
            let mut u = Unstructured::new(&raw_data);
            let Ok(mut script) = ScriptRaw::arbitrary(&mut u) else {
                continue;
            };

            // Raw arbitrary input must never panic the loader.
            match ScriptStore::load(script.clone(), &policy, ResourceLimiter::default()) {
                Ok(store) => check_invariants(&store),
                Err(ReplayError::UnknownSender { .. })
                | Err(ReplayError::InvalidScript(_))
                | Err(ReplayError::ResourceLimit(_)) => {}
                Err(other) => panic!("unexpected load error: {other:?}"),
            }

            repair_senders(&mut script);
            if let Ok(store) = ScriptStore::load(script, &policy, ResourceLimiter::default()) {
                check_invariants(&store);
            }
        }
    }
}
