use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Терминалы в порядке предпочтения при автоопределении
const KNOWN_TERMINALS: &[&str] = &[
    "roxterm",
    "sakura",
    "hyper",
    "alacritty",
    "terminator",
    "termite",
    "gnome-terminal",
    "konsole",
    "xfce4-terminal",
    "lxterminal",
    "mate-terminal",
    "kitty",
    "yakuake",
    "tilix",
    "guake",
    "eterm",
    "st",
    "urxvt",
    "wezterm",
    "xterm",
    "x-terminal-emulator",
];

pub const FALLBACK_TERMINAL: &str = "alacritty";

/// Определить терминал: $TERMINAL, затем первый найденный в PATH
pub fn guess_terminal() -> Option<String> {
    if let Ok(terminal) = env::var("TERMINAL") {
        if !terminal.trim().is_empty() && find_in_path(terminal.trim(), env::var_os("PATH").as_deref()) {
            info!("Терминал из $TERMINAL: {}", terminal);
            return Some(terminal.trim().to_string());
        }
    }

    guess_from(KNOWN_TERMINALS, env::var_os("PATH").as_deref())
}

fn guess_from(candidates: &[&str], path: Option<&std::ffi::OsStr>) -> Option<String> {
    for candidate in candidates {
        if find_in_path(candidate, path) {
            debug!("Найден терминал: {}", candidate);
            return Some(candidate.to_string());
        }
    }
    None
}

fn find_in_path(program: &str, path: Option<&std::ffi::OsStr>) -> bool {
    if program.contains('/') {
        return Path::new(program).is_file();
    }

    let Some(path) = path else {
        return false;
    };

    env::split_paths(path).any(|dir| dir.join(program).is_file())
}
