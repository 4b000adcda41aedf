//! Double buffering: the swap bit steers whole transfers (and, because it
//! is sampled live, even individual bursts) between two disjoint regions.

use machine_framegrab::capture::region_pixels;
use machine_framegrab::{Framegrab, MachineConfig};
use sim_core::Tickable;

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

fn packed_word(machine: &Framegrab, word: u32) -> u64 {
    fb_burst_writer::pack_pixels(machine.framebuffer().word(word))
}

#[test]
fn swap_selects_disjoint_regions() {
    let mut machine = make_machine();

    machine.set_swap(false);
    machine.run_transfer().expect("first transfer");

    // Region 1 untouched by the first transfer.
    assert!(
        machine.buffer_bytes(true).iter().all(|b| *b == 0),
        "transfer with swap=0 must not touch region 1"
    );

    machine.set_swap(true);
    machine.run_transfer().expect("second transfer");

    // Identical content lands in both regions, offset by one region size.
    let lo: Vec<u8> = machine.buffer_bytes(false).to_vec();
    let hi: Vec<u8> = machine.buffer_bytes(true).to_vec();
    assert_eq!(lo, hi, "identical transfers must produce identical regions");
    assert_eq!(lo.len() as u32, machine.config().region_bytes());
}

#[test]
fn second_transfer_leaves_the_displayed_region_alone() {
    let mut machine = make_machine();
    machine.run_transfer().expect("transfer to region 0");
    let displayed: Vec<u8> = machine.buffer_bytes(false).to_vec();

    // New frame arrives in the frame buffer; write it to the back buffer.
    for word in 0..16 {
        machine.framebuffer_mut().write_word(word, 0xA5A5_A5A5);
    }
    machine.set_swap(true);
    machine.run_transfer().expect("transfer to region 1");

    assert_eq!(
        machine.buffer_bytes(false),
        displayed.as_slice(),
        "writing the back buffer must not disturb the displayed region"
    );
    assert_eq!(
        machine.memory().read_word(machine.region_base(true)),
        fb_burst_writer::pack_pixels(0xA5A5_A5A5)
    );
}

#[test]
fn swap_is_sampled_live_within_a_transfer() {
    let mut machine = make_machine();
    let region_base_hi = machine.region_base(true);

    machine.set_swap(false);
    machine.start_transfer();
    // Start cycle + the first two bursts (8 writes).
    for _ in 0..9 {
        machine.tick();
    }
    assert_eq!(machine.memory().words_accepted(), 8);

    // Flip the selector mid-transfer: the remaining bursts steer to
    // region 1 immediately.
    machine.set_swap(true);
    while !machine.done() {
        machine.tick();
    }

    // Bursts 0-1 in region 0, bursts 2-3 in region 1, at their burst slots.
    for word in 0..8u32 {
        assert_eq!(
            machine.memory().read_word(word * 8),
            packed_word(&machine, word),
            "word {word} should be in region 0"
        );
    }
    for word in 8..16u32 {
        assert_eq!(
            machine.memory().read_word(region_base_hi + word * 8),
            packed_word(&machine, word),
            "word {word} should be at its burst slot in region 1"
        );
    }
    // The vacated slots of each region stay empty.
    for word in 8..16u32 {
        assert_eq!(machine.memory().read_word(word * 8), 0);
    }
    for word in 0..8u32 {
        assert_eq!(machine.memory().read_word(region_base_hi + word * 8), 0);
    }
}

#[test]
fn captured_pixels_round_trip_from_both_regions() {
    let mut machine = make_machine();
    machine.run_transfer().expect("transfer to region 0");
    machine.set_swap(true);
    machine.run_transfer().expect("transfer to region 1");

    for selector in [false, true] {
        let pixels = region_pixels(&machine, selector);
        assert_eq!(pixels.len(), 64);
        for (i, pixel) in pixels.iter().enumerate() {
            assert_eq!(
                *pixel, i as u8,
                "pixel {i} corrupted in region {}",
                u8::from(selector)
            );
        }
    }
}
