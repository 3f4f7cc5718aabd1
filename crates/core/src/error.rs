use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::sync::Once;

/// Errors that can occur during test discovery
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Introspection error: {0}")]
    IntrospectionError(String),

    #[error("Marker metadata error: {0}")]
    MetadataError(String),

    #[error("Builder type '{builder}' could not be created or does not implement TestCaseBuilder: {reason}")]
    BuilderConstruction { builder: String, reason: String },

    #[error("Type '{0}' was not found in the test assembly")]
    TypeNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, Error>;

/// A runtime fault raised while discovering a single method.
///
/// Builders and trait discoverers are user code, so a fault is either an
/// error they returned or a panic that unwound out of them.
#[derive(Debug)]
pub enum Fault {
    Error(anyhow::Error),
    Panic {
        message: String,
        /// `file:line:column` of the panic, when the panic hook saw it
        location: Option<String>,
        /// Present when backtraces are enabled (`RUST_BACKTRACE`)
        backtrace: Option<String>,
    },
}

/// Where the last panic raised inside [`catch_fault`] on this thread happened
struct PanicSite {
    location: String,
    backtrace: Option<String>,
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static PANIC_HOOK_INIT: Once = Once::new();

/// Chain a hook in front of the current one that records the panic site
/// while a fault boundary is active on the panicking thread.
fn install_panic_hook() {
    PANIC_HOOK_INIT.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if CAPTURING.with(Cell::get) {
                let location = panic_info
                    .location()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let backtrace = Backtrace::capture();
                let backtrace = (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string());
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(PanicSite { location, backtrace }));
            }
            default_hook(panic_info);
        }));
    });
}

impl Fault {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        let site = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        Fault::Panic {
            message,
            location: site.as_ref().map(|s| s.location.clone()),
            backtrace: site.and_then(|s| s.backtrace),
        }
    }

    /// Full fault detail: the error's cause chain, or the panic message and
    /// location, followed by a backtrace when one was captured.
    pub fn detail(&self) -> String {
        match self {
            Fault::Error(err) => format!("{err:?}"),
            Fault::Panic {
                message,
                location,
                backtrace,
            } => {
                let mut detail = match location {
                    Some(location) => format!("panicked at {location}: {message}"),
                    None => format!("panicked: {message}"),
                };
                if let Some(backtrace) = backtrace {
                    detail.push_str("\n\nStack backtrace:\n");
                    detail.push_str(backtrace);
                }
                detail
            }
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(err) => write!(f, "{err:#}"),
            Fault::Panic { message, .. } => write!(f, "panicked: {message}"),
        }
    }
}

impl From<anyhow::Error> for Fault {
    fn from(err: anyhow::Error) -> Self {
        Fault::Error(err)
    }
}

/// Run `f`, turning both a returned error and a panic into a [`Fault`].
pub(crate) fn catch_fault<T>(f: impl FnOnce() -> anyhow::Result<T>) -> std::result::Result<T, Fault> {
    install_panic_hook();
    LAST_PANIC.with(|slot| slot.borrow_mut().take());
    let outer = CAPTURING.with(|capturing| capturing.replace(true));
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    CAPTURING.with(|capturing| capturing.set(outer));

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Fault::Error(err)),
        Err(payload) => Err(Fault::from_panic(payload)),
    }
}
