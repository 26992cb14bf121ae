//! Command records for composite widgets.
//!
//! Server-side mutations on command-oriented widgets (grid, tree, toolbar,
//! dialog) are expressed as [`Command`] records that the client-side adapter
//! applies to its DOM fragment. On the polling transport commands accumulate
//! in a per-widget FIFO and the next poll drains one per tick (an intentional
//! throttle); on the push transport they are emitted immediately. Draining a
//! command consumes it, so a command is never replayed on a later poll.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A server-originated imperative message: `{cmd, arg0, arg1, …}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Command verb, e.g. `ADD-RECORD`, `OPEN-NODE`, `HIDE-COLUMN`.
    pub cmd: &'static str,
    /// Positional arguments, serialized as `arg0`, `arg1`, ...
    pub args: Vec<Value>,
}

impl Command {
    /// Create a command without arguments.
    pub fn new(cmd: &'static str) -> Self {
        Self {
            cmd,
            args: Vec::new(),
        }
    }

    /// Append a positional argument (builder).
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Serialize as the wire fields: `cmd` plus `arg0..argN`.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("cmd".to_owned(), Value::String(self.cmd.to_owned()));
        for (index, arg) in self.args.iter().enumerate() {
            map.insert(format!("arg{index}"), arg.clone());
        }
        map
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// A shared per-widget command FIFO.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    queue: Arc<Mutex<VecDeque<Command>>>,
}

impl CommandQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a command at the back.
    pub fn push(&self, command: Command) {
        self.queue
            .lock()
            .expect("command queue poisoned")
            .push_back(command);
    }

    /// Dequeue the oldest command. Dequeuing is the acknowledge step: a
    /// popped command is gone and cannot replay.
    pub fn pop(&self) -> Option<Command> {
        self.queue
            .lock()
            .expect("command queue poisoned")
            .pop_front()
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.queue.lock().expect("command queue poisoned").len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ===========================================================================
// Tests
// ===========================================================================
