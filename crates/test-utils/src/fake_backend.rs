use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use runflight::errors::ProcessError;
use runflight::exec::{ExitStatus, ProcessBackend, ProcessHandle};

/// A fake process backend that:
/// - records how many processes were "spawned"
/// - either completes each process immediately with a preset result, or
///   hands the test a [`SpawnControl`] so the test decides when and how
///   the process terminates.
pub struct FakeProcessBackend {
    mode: Mode,
    spawns: Arc<AtomicUsize>,
}

enum Mode {
    /// Every process resolves immediately with this result.
    Auto(Result<ExitStatus, ProcessError>),
    /// Every spawn fails outright with this error.
    SpawnError(ProcessError),
    /// Every process waits until the test settles its [`SpawnControl`].
    Manual(mpsc::UnboundedSender<SpawnControl>),
}

/// Test-side handle for one fake process instance.
pub struct SpawnControl {
    /// The command the coordinator asked to run.
    pub command: String,
    /// Send the process's terminal event. Dropping the sender instead
    /// makes the fake process report a `Terminated` error.
    pub exit: oneshot::Sender<Result<ExitStatus, ProcessError>>,
    killed: Arc<AtomicBool>,
}

impl SpawnControl {
    /// Whether the coordinator killed this process before it finished.
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

impl FakeProcessBackend {
    /// Backend whose processes all succeed immediately.
    pub fn succeeding() -> Self {
        Self::auto(Ok(ExitStatus::Code(0)))
    }

    /// Backend whose processes all exit with `code` immediately.
    pub fn exiting_with(code: i32) -> Self {
        Self::auto(Ok(ExitStatus::Code(code)))
    }

    /// Backend with a fixed immediate result for every process.
    pub fn auto(result: Result<ExitStatus, ProcessError>) -> Self {
        Self {
            mode: Mode::Auto(result),
            spawns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backend whose spawns fail outright.
    pub fn spawn_failing() -> Self {
        Self {
            mode: Mode::SpawnError(ProcessError::io(
                "spawning fake process",
                std::io::Error::other("spawn refused by test backend"),
            )),
            spawns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backend whose processes wait for the test to settle them.
    ///
    /// The receiver yields one [`SpawnControl`] per spawn, in spawn
    /// order.
    pub fn manual() -> (Self, mpsc::UnboundedReceiver<SpawnControl>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                mode: Mode::Manual(tx),
                spawns: Arc::new(AtomicUsize::new(0)),
            },
            rx,
        )
    }

    /// Number of spawn attempts so far (including failed ones).
    pub fn spawn_count(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn spawn(&self, command: &str) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        debug!(command, "fake backend spawn");

        let killed = Arc::new(AtomicBool::new(false));
        let exit = match &self.mode {
            Mode::Auto(result) => ExitSource::Ready(Some(result.clone())),
            Mode::SpawnError(err) => return Err(err.clone()),
            Mode::Manual(tx) => {
                let (exit_tx, exit_rx) = oneshot::channel();
                let control = SpawnControl {
                    command: command.to_string(),
                    exit: exit_tx,
                    killed: Arc::clone(&killed),
                };

                if tx.send(control).is_err() {
                    return Err(ProcessError::io(
                        "handing fake process to test",
                        std::io::Error::other("control receiver dropped"),
                    ));
                }

                ExitSource::Pending(exit_rx)
            }
        };

        Ok(Box::new(FakeHandle {
            exit,
            killed,
            finished: false,
        }))
    }
}

enum ExitSource {
    Ready(Option<Result<ExitStatus, ProcessError>>),
    Pending(oneshot::Receiver<Result<ExitStatus, ProcessError>>),
}

struct FakeHandle {
    exit: ExitSource,
    killed: Arc<AtomicBool>,
    finished: bool,
}

impl ProcessHandle for FakeHandle {
    fn wait(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<ExitStatus, ProcessError>> + Send + '_>> {
        Box::pin(async move {
            let result = match &mut self.exit {
                ExitSource::Ready(result) => result.take().unwrap_or(Err(ProcessError::Terminated)),
                ExitSource::Pending(rx) => match (&mut *rx).await {
                    Ok(result) => result,
                    Err(_) => Err(ProcessError::Terminated),
                },
            };

            self.finished = true;
            result
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            // Idempotent: a finished process is already dead.
            if !self.finished {
                self.killed.store(true, Ordering::SeqCst);
            }
        })
    }
}
