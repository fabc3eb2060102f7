//! The read-eval-print loop.

use std::io::Write;

use anyhow::Result;
use party_core::{GameEvent, PhaseId};
use runtime::{HostHandle, Subscription};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::command::ReplCommand;

const HELP: &str = "\
commands:
  modules                   list registered modules
  activate <id> [phase]     activate a module
  screen                    render the current screen
  state                     print module, phase, and store
  deactivate                leave the active module
  quit                      exit
  <action> [json]           dispatch an action, e.g. add_player {\"name\": \"Ana\"}";

/// Drives a host from line-based input.
pub struct Repl {
    handle: HostHandle,
    _printer: Subscription,
}

impl Repl {
    /// Subscribes an event printer to the host's bus.
    pub fn new(handle: HostHandle) -> Self {
        let printer = handle
            .event_bus()
            .subscribe_fn("stdout-printer", print_event);
        Self {
            handle,
            _printer: printer,
        }
    }

    /// Processes lines until `quit` or end of input.
    pub async fn run<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        prompt();

        while let Some(line) = lines.next_line().await? {
            match ReplCommand::parse(&line) {
                Ok(Some(ReplCommand::Quit)) => break,
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command).await {
                        println!("error: {e:#}");
                    }
                }
                Ok(None) => {}
                Err(e) => println!("error: {e}"),
            }
            prompt();
        }

        debug!("input closed");
        Ok(())
    }

    async fn execute(&self, command: ReplCommand) -> Result<()> {
        match command {
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Modules => {
                for module in self.handle.registry().list() {
                    let locales = module
                        .translations()
                        .map(|t| t.locales().collect::<Vec<_>>().join(","))
                        .unwrap_or_else(|| "-".to_owned());
                    let theme = module
                        .theme_extensions()
                        .map(|theme| {
                            let tokens: Vec<_> = theme.iter().map(|(token, _)| token).collect();
                            tokens.join(",")
                        })
                        .unwrap_or_else(|| "-".to_owned());
                    println!(
                        "{}  (entry: {}, locales: {locales}, theme: {theme}, store: {})",
                        module.id(),
                        module.entry_phase(),
                        module.capabilities().store
                    );
                }
            }
            ReplCommand::Activate { module, phase } => {
                let snapshot = self
                    .handle
                    .activate(module, phase.map(PhaseId::from))
                    .await?;
                println!("active: {} @ {}", snapshot.module_id, snapshot.phase);
                println!("{}", self.handle.render().await?);
            }
            ReplCommand::Screen => println!("{}", self.handle.render().await?),
            ReplCommand::State => match self.handle.snapshot().await? {
                Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                None => println!("no active module"),
            },
            ReplCommand::Deactivate => {
                let snapshot = self.handle.deactivate().await?;
                println!("left {}", snapshot.module_id);
            }
            ReplCommand::Dispatch { action, payload } => {
                let outcome = self.handle.dispatch(action, payload).await?;
                if !outcome.transition.is_self_loop() || !outcome.chained.is_empty() {
                    println!("{}", self.handle.render().await?);
                }
            }
            ReplCommand::Quit => {}
        }
        Ok(())
    }
}

fn print_event(event: &GameEvent) {
    match serde_json::to_string(event) {
        Ok(json) => println!("event {json}"),
        Err(e) => warn!(error = %e, kind = %event.kind(), "failed to serialize event"),
    }
}

fn prompt() {
    print!("> ");
    if let Err(e) = std::io::stdout().flush() {
        debug!(error = %e, "failed to flush prompt");
    }
}
