//! Initialization gate: editing stays disabled until the converter is loaded.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::convert::{ConvertError, Converter};
use crate::editing::EditError;

type LoadResult = Result<Box<dyn Converter>, ConvertError>;

/// Lifecycle of the converter. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Ready,
    Failed(String),
}

pub struct InitGate {
    state: GateState,
    converter: Option<Box<dyn Converter>>,
    pending: Option<Receiver<LoadResult>>,
}

impl InitGate {
    /// Starts loading the converter on a background thread. The gate starts
    /// out `Loading`; call [`poll`](Self::poll) or [`wait`](Self::wait) to
    /// pick up the result.
    pub fn initialize<F, C>(loader: F) -> Self
    where
        F: FnOnce() -> Result<C, ConvertError> + Send + 'static,
        C: Converter + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("dictionary-loader".to_string())
            .spawn(move || {
                let result = loader().map(|c| Box::new(c) as Box<dyn Converter>);
                // The gate may have been dropped already; nobody is left to tell.
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => Self {
                state: GateState::Loading,
                converter: None,
                pending: Some(rx),
            },
            Err(e) => {
                log::error!("Failed to start dictionary loader: {e}");
                Self::failed(format!("could not start dictionary loader: {e}"))
            }
        }
    }

    /// A gate that is already open.
    pub fn ready(converter: impl Converter + 'static) -> Self {
        Self {
            state: GateState::Ready,
            converter: Some(Box::new(converter)),
            pending: None,
        }
    }

    /// A gate that failed to open.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: GateState::Failed(message.into()),
            converter: None,
            pending: None,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_editable(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Picks up the loader result without blocking.
    pub fn poll(&mut self) -> &GateState {
        let received = match &self.pending {
            Some(rx) => rx.try_recv(),
            None => return &self.state,
        };
        match received {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.abandon(),
        }
        &self.state
    }

    /// Blocks until the loader reports.
    pub fn wait(&mut self) -> &GateState {
        let received = match &self.pending {
            Some(rx) => rx.recv(),
            None => return &self.state,
        };
        match received {
            Ok(result) => self.finish(result),
            Err(_) => self.abandon(),
        }
        &self.state
    }

    /// The converter, or why it cannot be used yet. Never blocks.
    pub fn converter(&self) -> Result<&dyn Converter, EditError> {
        match (&self.state, &self.converter) {
            (GateState::Ready, Some(converter)) => Ok(&**converter),
            (GateState::Failed(message), _) => {
                Err(EditError::ConverterUnavailable(message.clone()))
            }
            _ => Err(EditError::NotReady),
        }
    }

    fn finish(&mut self, result: LoadResult) {
        self.pending = None;
        match result {
            Ok(converter) => {
                log::info!("Converter ready");
                self.converter = Some(converter);
                self.state = GateState::Ready;
            }
            Err(e) => {
                log::error!("Converter initialization failed: {e}");
                self.state = GateState::Failed(e.to_string());
            }
        }
    }

    fn abandon(&mut self) {
        self.pending = None;
        log::error!("Dictionary loader stopped without reporting");
        self.state = GateState::Failed("dictionary loader stopped unexpectedly".to_string());
    }
}

impl std::fmt::Debug for InitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitGate")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DictionaryConverter;
    use crate::tests::serve_once;
    use std::path::PathBuf;
    use std::sync::mpsc::sync_channel;

    fn dictionary() -> Result<DictionaryConverter, ConvertError> {
        DictionaryConverter::from_entries([("漢字", "かんじ")])
    }

    #[test]
    fn loading_then_ready() {
        let (release_tx, release_rx) = sync_channel::<()>(0);
        let mut gate = InitGate::initialize(move || {
            release_rx.recv().ok();
            dictionary()
        });

        assert_eq!(gate.poll(), &GateState::Loading);
        assert!(!gate.is_editable());
        assert!(matches!(gate.converter(), Err(EditError::NotReady)));

        release_tx.send(()).unwrap();
        assert_eq!(gate.wait(), &GateState::Ready);
        assert!(gate.is_editable());
        assert!(gate.converter().is_ok());
    }

    #[test]
    fn loader_error_fails_the_gate() {
        let mut gate = InitGate::initialize(|| {
            DictionaryConverter::load(PathBuf::from("/no/such/dictionary.tsv"))
        });

        let state = gate.wait().clone();
        assert!(matches!(state, GateState::Failed(ref msg) if msg.contains("dictionary.tsv")));
        assert!(matches!(
            gate.converter(),
            Err(EditError::ConverterUnavailable(_))
        ));
    }

    #[test]
    fn failed_fetch_fails_the_gate() {
        let url = serve_once("500 Internal Server Error", "");
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        let mut gate =
            InitGate::initialize(move || DictionaryConverter::fetch_with(&client, &url));

        assert!(matches!(gate.wait(), GateState::Failed(msg) if msg.contains("basic.tsv")));
        assert!(!gate.is_editable());
    }

    /// Holds only where panics unwind, as in the test profile.
    #[test]
    fn panicking_loader_fails_the_gate() {
        let mut gate = InitGate::initialize(|| -> Result<DictionaryConverter, ConvertError> {
            panic!("analyzer exploded")
        });
        assert!(matches!(gate.wait(), GateState::Failed(_)));
    }

    #[test]
    fn terminal_states_do_not_change() {
        let mut gate = InitGate::failed("no dictionary");
        assert_eq!(gate.poll(), &GateState::Failed("no dictionary".to_string()));
        assert_eq!(gate.wait(), &GateState::Failed("no dictionary".to_string()));

        let mut ready = InitGate::ready(dictionary().unwrap());
        assert_eq!(ready.wait(), &GateState::Ready);
    }
}
