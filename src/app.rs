use crate::audio::{NullWidget, PlaybackWidget};
use crate::config;
use crate::core::QueueAction;
use crate::model::{ServerProfile, Track};
use crate::remote::{Catalog, LogScrobbler, OfflineCatalog, Scrobbler};
use crate::session::Session;
use crate::subsonic::SubsonicClient;
use anyhow::Result;
use std::io::{BufRead, Write};
use std::rc::Rc;

#[derive(Debug, Default, Clone)]
pub struct AppStartupOptions {
    pub server: Option<ServerProfile>,
}

pub fn run_with_startup(options: AppStartupOptions) -> Result<()> {
    let settings = config::load_settings()?;
    let server = options.server.clone().or_else(|| settings.server.clone());

    let catalog: Rc<dyn Catalog>;
    let scrobbler: Box<dyn Scrobbler>;
    match &server {
        Some(profile) => {
            tracing::info!(endpoint = %profile.endpoint, "using subsonic server");
            let client = Rc::new(SubsonicClient::new(profile.clone()));
            catalog = client.clone();
            scrobbler = Box::new(client);
        }
        None => {
            tracing::info!("no server configured, running offline");
            catalog = Rc::new(OfflineCatalog);
            scrobbler = Box::new(LogScrobbler);
        }
    }

    let mut session = Session::new(settings, NullWidget::new(), catalog, scrobbler);
    if let Some(profile) = options.server {
        session.use_server(profile);
    }
    let stdin = std::io::stdin();
    let mut out = std::io::stdout();

    writeln!(out, "jamdeck ready, type help for commands")?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !run_command(&mut session, &line) {
            break;
        }
        session.pump_widget();
        writeln!(out, "{}", session.status)?;
        out.flush()?;
    }

    session.save_on_exit()
}

/// Executes one command line. Returns false when the session should end.
pub fn run_command(session: &mut Session<NullWidget>, raw: &str) -> bool {
    let input = raw.trim();
    if input.is_empty() {
        session.set_status("No command");
        return true;
    }

    let mut command_split = input.splitn(2, char::is_whitespace);
    let command = command_split.next().unwrap_or_default();
    let rest = command_split.next().unwrap_or("").trim();

    match command {
        "help" => session.set_status(
            "Commands: add <id> <url> [title] | play|load|remove <id> | clear | shuffle | first | next | prev | restart | progress <percent> | end | random [add|play] [genre] [folder] | repeat|loop|autoplay <on|off> | queue | now | save | quit",
        ),
        "add" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let (Some(id), Some(url)) = (parts.next(), parts.next()) else {
                session.set_status("Usage: add <id> <url> [title]");
                return true;
            };
            let mut track = Track::new(id, url);
            if let Some(title) = parts.next().map(str::trim).filter(|title| !title.is_empty()) {
                track.title = title.to_string();
            }
            session.act(|player| {
                player.add_track(track);
            });
            let len = session.player.queue().len();
            session.set_status(&format!("Queued, {len} track(s) in queue"));
        }
        "play" | "load" | "remove" => {
            let Some(track) = queued_track(session, rest) else {
                session.set_status(&format!("Track not in queue: {rest}"));
                return true;
            };
            match command {
                "play" => session.act(|player| player.play(track)),
                "load" => session.act(|player| player.load(track)),
                _ => session.act(|player| {
                    player.remove_track(&track);
                }),
            }
            describe_now_playing(session);
        }
        "clear" => {
            session.act(|player| {
                player.empty_queue();
            });
            session.set_status("Queue emptied");
        }
        "shuffle" => {
            session.act(|player| {
                player.shuffle_queue();
            });
            session.set_status("Queue shuffled");
        }
        "first" => {
            session.act(|player| player.play_first_song());
            describe_now_playing(session);
        }
        "next" => {
            session.act(|player| player.next_track());
            describe_now_playing(session);
        }
        "prev" => {
            session.act(|player| player.previous_track());
            describe_now_playing(session);
        }
        "restart" => {
            session.act(|player| player.restart());
            describe_now_playing(session);
        }
        "progress" => match rest.parse::<f64>() {
            Ok(percent) => {
                session.surface.widget_mut().progress_to(percent);
                session.set_status(&format!("Progress {percent:.0}%"));
            }
            Err(_) => session.set_status("Usage: progress <percent>"),
        },
        "end" => {
            session.surface.widget_mut().finish();
            session.pump_widget();
            describe_now_playing(session);
        }
        "random" => {
            let mut parts = rest.split_whitespace();
            let action = match parts.next() {
                Some("add") => QueueAction::Add,
                Some("play") | None => QueueAction::Play,
                Some(_) => {
                    session.set_status("Usage: random [add|play] [genre] [folder]");
                    return true;
                }
            };
            let genre = parts.next();
            let folder = parts.next();
            session.random_songs(action, genre, folder);
        }
        "repeat" | "loop" | "autoplay" => {
            let enabled = match rest {
                "on" => true,
                "off" => false,
                _ => {
                    session.set_status(&format!("Usage: {command} <on|off>"));
                    return true;
                }
            };
            match command {
                "repeat" => session.settings.repeat = enabled,
                "loop" => session.settings.loop_queue = enabled,
                _ => session.settings.auto_play = enabled,
            }
            session.set_status(&format!("{command}: {rest}"));
        }
        "queue" => {
            let current = session.player.current_index();
            let listing = session
                .player
                .queue()
                .tracks()
                .iter()
                .enumerate()
                .map(|(index, track)| {
                    let marker = if Some(index) == current { ">" } else { " " };
                    format!("{marker}{index}: {} [{}]", track.label(), track.id)
                })
                .collect::<Vec<_>>();
            if listing.is_empty() {
                session.set_status("Queue is empty");
            } else {
                session.set_status(&listing.join("\n"));
            }
        }
        "now" => describe_now_playing(session),
        "save" => {
            if let Err(err) = session.save() {
                session.set_status(&format!("save error: {err:#}"));
            }
        }
        "quit" | "exit" => return false,
        _ => session.set_status("Unknown command. Use help"),
    }
    true
}

fn queued_track<W>(session: &Session<W>, id: &str) -> Option<Track> {
    let queue = session.player.queue();
    queue
        .position_by_id(id)
        .and_then(|index| queue.get(index))
        .cloned()
}

fn describe_now_playing<W: PlaybackWidget>(session: &mut Session<W>) {
    let status = match session.player.playing_track() {
        Some(track) => {
            let position = session
                .player
                .current_index()
                .map(|index| format!("{}/{}", index + 1, session.player.queue().len()))
                .unwrap_or_else(|| String::from("not queued"));
            format!("Now playing: {} ({position})", track.label())
        }
        None => String::from("Nothing playing"),
    };
    session.set_status(&status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Settings;

    fn session() -> Session<NullWidget> {
        Session::new(
            Settings::default(),
            NullWidget::new(),
            Rc::new(OfflineCatalog),
            Box::new(LogScrobbler),
        )
    }

    #[test]
    fn add_then_first_plays_the_first_track() {
        let mut session = session();
        assert!(run_command(&mut session, "add 1 http://media/1.mp3 Opening Theme"));
        assert!(run_command(&mut session, "add 2 http://media/2.mp3"));

        run_command(&mut session, "first");

        assert_eq!(session.status, "Now playing: Opening Theme (1/2)");
        assert_eq!(session.surface.widget().media(), Some("http://media/1.mp3"));
    }

    #[test]
    fn end_with_loop_wraps_to_the_start() {
        let mut session = session();
        run_command(&mut session, "add 1 http://media/1.mp3");
        run_command(&mut session, "add 2 http://media/2.mp3");
        run_command(&mut session, "play 2");
        run_command(&mut session, "loop on");
        assert!(session.settings.loop_queue);

        run_command(&mut session, "end");

        assert_eq!(session.player.current_index(), Some(0));
        assert_eq!(session.status, "Now playing: 1 (1/2)");
    }

    #[test]
    fn unknown_track_and_bad_usage_are_reported() {
        let mut session = session();
        run_command(&mut session, "play nope");
        assert_eq!(session.status, "Track not in queue: nope");

        run_command(&mut session, "repeat maybe");
        assert_eq!(session.status, "Usage: repeat <on|off>");

        run_command(&mut session, "add onlyid");
        assert_eq!(session.status, "Usage: add <id> <url> [title]");
    }

    #[test]
    fn queue_listing_marks_current_track() {
        let mut session = session();
        run_command(&mut session, "add 1 http://media/1.mp3");
        run_command(&mut session, "add 2 http://media/2.mp3");
        run_command(&mut session, "next");

        run_command(&mut session, "queue");

        assert_eq!(session.status, ">0: 1 [1]\n 1: 2 [2]");
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut session = session();
        assert!(!run_command(&mut session, "quit"));
    }
}
