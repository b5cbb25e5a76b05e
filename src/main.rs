use std::{io, panic};

use anyhow::Result;
use ratatui::crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use kubeconsole::{app::App, cmd::Command, config::Config, logging::Logger, signal::signal_handler};

macro_rules! enable_raw_mode {
    () => {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
    };
}

macro_rules! disable_raw_mode {
    () => {
        execute!(io::stdout(), LeaveAlternateScreen, Show)?;
        disable_raw_mode()?;
    };
}

fn set_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();

        eprintln!("\x1b[31mPanic! disable raw mode\x1b[39m");

        default_hook(info);
    }));
}

fn main() -> Result<()> {
    let mut cmd = Command::init();

    if let Some(subcommand) = cmd.subcommand.take() {
        return subcommand.run();
    }

    let config = Config::load(cmd.config_load_option()?)?;

    if cmd.logging {
        Logger::init(config.logging.path.clone())?;
    }

    set_panic_hook();

    signal_handler()?;

    enable_raw_mode!();

    let result = App::run(cmd, config);

    disable_raw_mode!();

    result
}
