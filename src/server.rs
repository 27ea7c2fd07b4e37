//! Client sessions and the TCP server running them.
//!
//! A session reads a phase code, serves it and waits for the next one:
//!
//! | Code | Phase   | Client sends  | Server answers                              |
//! |------|---------|---------------|---------------------------------------------|
//! | 0    | train   | table name    | `OK`                                        |
//! | 1    | persist |               | `OK`                                        |
//! | 2    | load    | table name    | `OK`                                        |
//! | 3    | predict | branch indexes| (`QUERY`, branches)*, then `OK` and a number |
//! | < 0  | end     |               |                                             |
//!
//! Any failure of a phase is answered with its message instead and the
//! session goes on. Trees are stored as `<model_dir>/<table>.dmp`.
use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror_no_std::Error;

use crate::{
    protocol::{OK, QUERY},
    table::validate_table_name,
    Channel, FramedChannel, Logger, Message, PredictError, ProtocolError, RegTreeError,
    RegressionTree, ServerSettings, TableSource, TrainingSet, TreeSettings, WalkState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Train,
    Persist,
    Load,
    Predict,
    End,
    Unknown(i32),
}

impl From<i32> for Phase {
    fn from(code: i32) -> Self {
        match code {
            0 => Phase::Train,
            1 => Phase::Persist,
            2 => Phase::Load,
            3 => Phase::Predict,
            code if code < 0 => Phase::End,
            code => Phase::Unknown(code),
        }
    }
}

/// Conversation with one client.
///
/// The session owns the tree it trained or loaded, and the name of the table
/// it comes from.
pub struct Session<'a, C, S: ?Sized> {
    channel: C,
    source: &'a S,
    model_dir: PathBuf,
    tree_settings: TreeSettings,
    logger: Logger,
    tree: Option<RegressionTree>,
    table: Option<String>,
}

impl<'a, C, S> Session<'a, C, S>
where
    C: Channel,
    S: TableSource + ?Sized,
{
    pub fn new(
        channel: C,
        source: &'a S,
        model_dir: impl Into<PathBuf>,
        tree_settings: TreeSettings,
        logger: Logger,
    ) -> Self {
        Self {
            channel,
            source,
            model_dir: model_dir.into(),
            tree_settings,
            logger,
            tree: None,
            table: None,
        }
    }

    pub fn tree(&self) -> Option<&RegressionTree> {
        self.tree.as_ref()
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Serves phases until the client ends the session or goes away.
    ///
    /// Channel failures end the session. Their message is sent to the client
    /// when the channel still works.
    pub fn run(&mut self) -> Result<(), ProtocolError> {
        match self.serve_phases() {
            Ok(()) | Err(ProtocolError::Disconnected) => Ok(()),
            Err(ProtocolError::Io(error)) => Err(ProtocolError::Io(error)),
            Err(error) => {
                let _ = self.channel.send_text(&error.to_string());
                Err(error)
            }
        }
    }

    fn serve_phases(&mut self) -> Result<(), ProtocolError> {
        loop {
            let code = self.channel.receive_int()?;
            let outcome = match Phase::from(code) {
                Phase::Train => self.train(),
                Phase::Persist => self.persist(),
                Phase::Load => self.load(),
                Phase::Predict => self.predict(),
                Phase::End => return Ok(()),
                Phase::Unknown(code) => {
                    self.logger.warn(format_args!("unknown phase {code}"));
                    self.channel.send_text(&format!("unknown phase {code}"))?;
                    continue;
                }
            };
            match outcome {
                Ok(()) => {}
                Err(RegTreeError::Protocol(error)) => return Err(error),
                Err(error) => {
                    self.logger.warn(format_args!("phase {code} failed: {error}"));
                    self.channel.send_text(&error.to_string())?;
                }
            }
        }
    }

    fn train(&mut self) -> Result<(), RegTreeError> {
        let table = self.channel.receive_text()?;
        validate_table_name(&table)?;
        self.logger.info(format_args!("learning a tree from `{table}`"));
        let mut training_set = TrainingSet::from_source(self.source, &table)?;
        let tree = RegressionTree::learn_with(&mut training_set, &self.tree_settings);
        self.logger.debug(format_args!(
            "{} examples, {} nodes",
            training_set.len(),
            tree.number_of_nodes()
        ));
        self.tree = Some(tree);
        self.table = Some(table);
        self.channel.send_text(OK)?;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), RegTreeError> {
        let (Some(tree), Some(table)) = (&self.tree, &self.table) else {
            return Err(PredictError::NotFitted.into());
        };
        let path = tree_path(&self.model_dir, table);
        self.logger
            .info(format_args!("saving the tree to {}", path.display()));
        tree.save(&path)?;
        self.channel.send_text(OK)?;
        Ok(())
    }

    fn load(&mut self) -> Result<(), RegTreeError> {
        let table = self.channel.receive_text()?;
        validate_table_name(&table)?;
        let path = tree_path(&self.model_dir, &table);
        self.logger
            .info(format_args!("loading the tree from {}", path.display()));
        self.tree = Some(RegressionTree::load(&path)?);
        self.table = Some(table);
        self.channel.send_text(OK)?;
        Ok(())
    }

    fn predict(&mut self) -> Result<(), RegTreeError> {
        let tree = self.tree.as_ref().ok_or(PredictError::NotFitted)?;
        let mut walk = tree.walk();
        loop {
            match walk.state() {
                WalkState::AwaitingChoice(split) => {
                    self.channel.send_text(QUERY)?;
                    self.channel.send_text(&split.query())?;
                    let answer = self.channel.receive_int()?;
                    self.logger.debug(format_args!("branch {answer} chosen"));
                    walk.choose(answer)?;
                }
                WalkState::Answer(value) => {
                    self.channel.send_text(OK)?;
                    self.channel.send(Message::Number(value))?;
                    return Ok(());
                }
            }
        }
    }
}

fn tree_path(model_dir: &Path, table: &str) -> PathBuf {
    model_dir.join(format!("{table}.dmp"))
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot start the session pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Accepts clients and runs each session on a bounded pool of threads.
pub struct Server<S> {
    listener: TcpListener,
    pool: ThreadPool,
    source: Arc<S>,
    settings: ServerSettings,
    logger: Logger,
    sessions: AtomicUsize,
}

impl<S> Server<S>
where
    S: TableSource + Send + Sync + 'static,
{
    pub fn bind(settings: ServerSettings, source: S) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((settings.address, settings.port))?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.max_sessions)
            .thread_name(|i| format!("regtree-session-{i}"))
            .build()?;
        let logger = Logger::new(settings.verbosity);
        Ok(Self {
            listener,
            pool,
            source: Arc::new(source),
            settings,
            logger,
            sessions: AtomicUsize::new(0),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of sessions started so far.
    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::Relaxed)
    }

    /// Accepts clients forever.
    pub fn serve(&self) -> Result<(), ServerError> {
        self.logger
            .info(format_args!("listening on {}", self.local_addr()?));
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(error) => self
                    .logger
                    .warn(format_args!("failed to accept a client: {error}")),
            }
        }
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream) {
        let id = self.sessions.fetch_add(1, Ordering::Relaxed);
        let logger = self.logger.scoped(format!("session {id}"));
        let source = Arc::clone(&self.source);
        let model_dir = self.settings.model_dir.clone();
        let tree_settings = self.settings.tree;
        self.pool.spawn(move || {
            match stream.peer_addr() {
                Ok(peer) => logger.info(format_args!("started for {peer}")),
                Err(_) => logger.info(format_args!("started")),
            }
            if let Err(error) = stream.set_nodelay(true) {
                logger.warn(format_args!("cannot disable Nagle's algorithm: {error}"));
            }
            let mut session = Session::new(
                FramedChannel::new(stream),
                &*source,
                model_dir,
                tree_settings,
                logger.clone(),
            );
            match session.run() {
                Ok(()) => logger.info(format_args!("closed")),
                Err(error) => logger.warn(format_args!("closed on error: {error}")),
            }
        });
    }
}
