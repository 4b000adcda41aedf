//! Destination backpressure: the engine holds and retries without losing
//! or duplicating a word.

use machine_framegrab::{Framegrab, MachineConfig};
use sim_core::{Observable, Tickable, Value};

fn small_config() -> MachineConfig {
    MachineConfig {
        base_address: 0,
        total_words: 16,
        burst_length: 4,
        width: 8,
        height: 8,
        pixel_clock_hz: 25_000_000,
    }
}

fn make_machine() -> Framegrab {
    let mut machine = Framegrab::new(&small_config()).expect("valid config");
    machine.framebuffer_mut().fill_test_pattern();
    machine
}

fn assert_full_frame_in_region_zero(machine: &Framegrab) {
    for word in 0..16u32 {
        let expected = fb_burst_writer::pack_pixels(machine.framebuffer().word(word));
        assert_eq!(
            machine.memory().read_word(word * 8),
            expected,
            "destination word {word} lost or duplicated under backpressure"
        );
    }
}

#[test]
fn two_cycle_stall_at_word_five_holds_all_state() {
    let mut machine = make_machine();
    machine.memory_mut().stall_after_words(5, 2);

    machine.start_transfer();
    // Start cycle + five write cycles.
    for _ in 0..6 {
        machine.tick();
    }
    assert_eq!(machine.memory().words_accepted(), 5);

    // Two wait cycles: the word counter holds at 5, nothing is accepted.
    for wait_cycle in 0..2 {
        machine.tick();
        assert_eq!(
            machine.query("engine.word_count"),
            Some(Value::U32(5)),
            "word counter must hold during wait cycle {wait_cycle}"
        );
        assert_eq!(
            machine.memory().words_accepted(),
            5,
            "no word accepted during wait cycle {wait_cycle}"
        );
        assert!(!machine.done());
    }

    // Resume: the transfer still completes with exactly 16 writes in
    // 18 write-attempt cycles (16 writes + 2 stalls).
    let mut ticks = 8u64;
    while !machine.done() {
        machine.tick();
        ticks += 1;
        assert!(ticks < 64, "transfer failed to resume after the stall");
    }
    assert_eq!(ticks, 20, "start + 18 write-attempt cycles + done");
    assert_eq!(machine.memory().words_accepted(), 16);
    assert_eq!(machine.memory().bursts_accepted(), 4);
    assert_full_frame_in_region_zero(&machine);
}

#[test]
fn scattered_stalls_never_lose_or_duplicate_words() {
    let mut machine = make_machine();
    machine.memory_mut().stall_after_words(1, 3);
    machine.memory_mut().stall_after_words(7, 1);
    machine.memory_mut().stall_after_words(12, 5);

    let ticks = machine.run_transfer().expect("transfer completes");
    assert_eq!(
        ticks,
        18 + 9,
        "every stall cycle delays completion by exactly one tick"
    );
    assert_eq!(machine.memory().words_accepted(), 16);
    assert_eq!(machine.memory().bursts_accepted(), 4);
    assert_full_frame_in_region_zero(&machine);
}

#[test]
fn stall_spanning_a_burst_boundary_keeps_the_ack_cadence() {
    let mut machine = make_machine();
    // Stall right before the final word of the first burst.
    machine.memory_mut().stall_after_words(3, 4);

    let ticks = machine.run_transfer().expect("transfer completes");
    assert_eq!(ticks, 18 + 4);
    assert_eq!(
        machine.memory().bursts_accepted(),
        4,
        "the delayed burst must still be accepted exactly once"
    );
    assert_full_frame_in_region_zero(&machine);
}
