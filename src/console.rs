//! Terminal adapters: a renderer that reports frames and line-based navigation input
//!
//! Stand-ins for a real drawing surface and gesture handling, enough to drive
//! the pipeline from a shell.

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use log::{debug, info};
use std::io::{BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::core::{FrameController, Navigation, Phase};
use crate::entities::Renderer;

/// How long the loop waits for input before applying background results
const TICK: Duration = Duration::from_millis(50);

/// Prints every frame it is asked to show.
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn play_clip(&mut self, path: &Path) {
        info!("Playing clip: {}", path.display());
        let _ = writeln!(self.out, "[clip]  {}", path.display());
    }

    fn draw_still(&mut self, path: &Path) {
        info!("Displaying image: {}", path.display());
        match image::image_dimensions(path) {
            Ok((w, h)) => {
                let _ = writeln!(self.out, "[still] {} ({}x{})", path.display(), w, h);
            }
            Err(e) => {
                debug!("No dimensions for {}: {}", path.display(), e);
                let _ = writeln!(self.out, "[still] {}", path.display());
            }
        }
    }
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Navigate(Navigation),
    /// Print cursor position and cache counters
    Status,
    /// Retry a failed manifest fetch
    Reload,
    Quit,
}

/// Map an input line to a command; unknown input is `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "l" | "next" | ">" => Some(Command::Navigate(Navigation::Next)),
        "p" | "h" | "prev" | "previous" | "<" => Some(Command::Navigate(Navigation::Previous)),
        "s" | "status" => Some(Command::Status),
        "r" | "reload" => Some(Command::Reload),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Read commands from `input` on a background thread.
///
/// The channel closes at end of input.
pub fn spawn_input<R: BufRead + Send + 'static>(input: R) -> Receiver<Command> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("unknown command {:?} (n/p/s/r/q)", line.trim()),
            }
        }
    });
    rx
}

/// Foreground loop: apply worker results, route commands, until quit or EOF.
pub fn run(controller: &mut FrameController, commands: Receiver<Command>) {
    controller.start();
    loop {
        controller.poll();
        match commands.recv_timeout(TICK) {
            Ok(Command::Navigate(nav)) => controller.navigate(nav),
            Ok(Command::Status) => print_status(controller),
            Ok(Command::Reload) => {
                if !controller.start() {
                    println!("manifest already loaded");
                }
            }
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    // Anything already finished is applied before leaving
    controller.poll();
}

fn print_status(controller: &FrameController) {
    let stats = controller.store().stats();
    match (controller.phase(), controller.index(), controller.current()) {
        (Phase::Ready, Some(index), Some(id)) => {
            println!("frame {}/{}: {}", index + 1, controller.manifest().len(), id)
        }
        (phase, _, _) => println!("no frame ({:?})", phase),
    }
    println!(
        "cache: {} hit(s), {} miss(es), {} download(s), {} failure(s)",
        stats.hits(),
        stats.misses(),
        stats.downloads(),
        stats.failures()
    );
}
