//! Cooperative VM/observer pairing for step-by-step execution.
//!
//! The VM runs on its own `std::thread`; it is the producer of a `log`
//! channel (batches of [`trace::LogEvent`], one batch per suspension) and
//! the consumer of a `cmd` channel ([`trace::Command`]). Both channels are
//! bounded `sync_channel`s of the small capacity the source's goroutine
//! pair used — every send blocks until the other side is ready, so no
//! unbounded trace backlog can build up while the observer is slow.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::JoinHandle;

use super::{DispatchOutcome, InputKind, Machine};
use crate::symbols::{AssignmentRecord, Symbol};
use crate::vm::trace::{Command, LogEvent};

const QUEUE_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimState {
    Initial,
    Ready,
    Input(InputKind),
    Infinite,
    Error,
    Exit,
}

pub struct AnimatorHandle {
    pub commands: SyncSender<Command>,
    pub log: Receiver<Vec<LogEvent>>,
    pub join: JoinHandle<()>,
}

/// Spawns the VM task. `steps` is the per-window instruction budget handed
/// to the dispatch loop between suspensions.
pub fn spawn(
    code: Vec<i64>,
    program_text: String,
    symbols: Vec<Symbol>,
    assignments: Vec<AssignmentRecord>,
    steps: usize,
) -> AnimatorHandle {
    let (cmd_tx, cmd_rx) = sync_channel::<Command>(QUEUE_CAPACITY);
    let (log_tx, log_rx) = sync_channel::<Vec<LogEvent>>(QUEUE_CAPACITY);

    let join = std::thread::spawn(move || {
        run_vm_task(code, program_text, symbols, assignments, steps, cmd_rx, log_tx);
    });

    AnimatorHandle { commands: cmd_tx, log: log_rx, join }
}

fn run_vm_task(
    code: Vec<i64>,
    program_text: String,
    symbols: Vec<Symbol>,
    assignments: Vec<AssignmentRecord>,
    steps: usize,
    cmd_rx: Receiver<Command>,
    log_tx: SyncSender<Vec<LogEvent>>,
) {
    let mut machine = Machine::new(code);
    let mut state = AnimState::Initial;

    loop {
        let Ok(cmd) = cmd_rx.recv() else { return };

        if matches!(cmd, Command::Terminate) {
            return;
        }

        let mut buf = Vec::new();
        state = match (state, cmd) {
            (AnimState::Initial, Command::Handshake) => {
                buf.push(LogEvent::Program(program_text.clone()));
                buf.push(LogEvent::Symbols(symbols.clone()));
                buf.push(LogEvent::Assignments(assignments.clone()));
                AnimState::Ready
            }
            (AnimState::Ready, Command::Restart) => run_until_wait(&mut machine, steps, &mut buf),
            (AnimState::Input(kind), Command::Input(text)) => {
                machine.supply_input(kind, &text);
                run_until_wait(&mut machine, steps, &mut buf)
            }
            (AnimState::Infinite, Command::Continue) => {
                machine.reset_budget();
                run_until_wait(&mut machine, steps, &mut buf)
            }
            (AnimState::Error, Command::Continue) => run_until_wait(&mut machine, steps, &mut buf),
            (AnimState::Error, Command::Restart)
            | (AnimState::Exit, Command::Restart)
            | (AnimState::Input(_), Command::Restart)
            | (AnimState::Infinite, Command::Restart) => {
                machine.restart();
                run_until_wait(&mut machine, steps, &mut buf)
            }
            (other, _) => {
                buf.push(LogEvent::RuntimeError("Unknown user respond".into()));
                other
            }
        };

        if log_tx.send(buf).is_err() {
            return;
        }
        // Exit state still waits for an explicit X/R per the protocol; the
        // loop simply continues to the next recv() above.
    }
}

fn run_until_wait(machine: &mut Machine, steps: usize, buf: &mut Vec<LogEvent>) -> AnimState {
    let outcome = machine.dispatch_common(steps, &mut |event| buf.push(event));
    match outcome {
        DispatchOutcome::BudgetExhausted => {
            buf.push(LogEvent::BudgetExhausted);
            AnimState::Infinite
        }
        DispatchOutcome::NeedsInput(kind) => AnimState::Input(kind),
        DispatchOutcome::RuntimeError(_) => AnimState::Error,
        DispatchOutcome::Exited => AnimState::Exit,
    }
}
