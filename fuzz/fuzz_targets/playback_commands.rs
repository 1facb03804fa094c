#![no_main]

use jamdeck::core::Player;
use jamdeck::model::{PlaybackPolicy, Track};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut player = Player::new();
    let len = data.len() % 32;
    player.add_tracks((0..len).map(|idx| Track::new(format!("{idx}"), format!("track_{idx}.mp3"))));
    let mut policy = PlaybackPolicy::default();

    for byte in data {
        match byte % 12 {
            0 => policy.repeat = !policy.repeat,
            1 => policy.loop_queue = !policy.loop_queue,
            2 => player.play_first_song(),
            3 => player.next_track(),
            4 => player.previous_track(),
            5 => player.song_ended(&policy),
            6 => {
                player.add_track(Track::new(format!("{byte}"), format!("extra_{byte}.mp3")));
            }
            7 => {
                if let Some(track) = player.playing_track().cloned() {
                    player.remove_track(&track);
                }
            }
            8 => {
                player.shuffle_queue();
            }
            9 => {
                player.empty_queue();
            }
            10 => player.restart(),
            _ => player.load(Track::new(format!("{}", byte / 12), format!("track_{}.mp3", byte / 12))),
        }

        if let Some(index) = player.current_index() {
            assert!(index < player.queue().len());
        }
    }
});
