/// Interactive player commands read from stdin
use lyra_playback::{AudioEngine, PlaybackOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    Next,
    Previous,
    Shuffle,
    Repeat,
    Stop,
    Seek(f64),
    Select(usize),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  p         play/pause
  n         next track
  b         previous track (restarts the track after 3s)
  s         toggle shuffle
  r         cycle repeat (off -> all -> one)
  x         stop
  seek N    jump to N seconds
  go N      play queue position N
  i         show now playing
  h         this help
  q         quit";

/// Parse one input line. Unknown input yields `None`.
pub fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let arg = words.next();

    let command = match (head, arg) {
        ("p" | "play" | "pause", None) => Command::TogglePlay,
        ("n" | "next", None) => Command::Next,
        ("b" | "back" | "prev", None) => Command::Previous,
        ("s" | "shuffle", None) => Command::Shuffle,
        ("r" | "repeat", None) => Command::Repeat,
        ("x" | "stop", None) => Command::Stop,
        ("seek", Some(seconds)) => Command::Seek(seconds.parse().ok().filter(|s: &f64| s.is_finite())?),
        ("go", Some(index)) => Command::Select(index.parse().ok()?),
        ("i" | "info", None) => Command::Status,
        ("h" | "help" | "?", None) => Command::Help,
        ("q" | "quit" | "exit", None) => Command::Quit,
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(command)
}

/// Apply a command to the player
pub async fn apply<E>(player: &PlaybackOrchestrator<E>, command: Command)
where
    E: AudioEngine + ?Sized,
{
    match command {
        Command::TogglePlay => player.toggle_play_pause().await,
        Command::Next => player.next().await,
        Command::Previous => player.previous().await,
        Command::Shuffle => player.toggle_shuffle().await,
        Command::Repeat => player.cycle_repeat_mode().await,
        Command::Stop => player.stop().await,
        Command::Seek(seconds) => player.seek_to(seconds).await,
        Command::Select(index) => player.select_track(index).await,
        Command::Status | Command::Help | Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letters() {
        assert_eq!(parse("p"), Some(Command::TogglePlay));
        assert_eq!(parse(" n "), Some(Command::Next));
        assert_eq!(parse("b"), Some(Command::Previous));
        assert_eq!(parse("s"), Some(Command::Shuffle));
        assert_eq!(parse("r"), Some(Command::Repeat));
        assert_eq!(parse("q"), Some(Command::Quit));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(parse("seek 42.5"), Some(Command::Seek(42.5)));
        assert_eq!(parse("go 3"), Some(Command::Select(3)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("seek"), None);
        assert_eq!(parse("seek abc"), None);
        assert_eq!(parse("seek NaN"), None);
        assert_eq!(parse("go -1"), None);
        assert_eq!(parse("n 2"), None);
        assert_eq!(parse("dance"), None);
    }
}
