//! Folder navigation.
//!
//! [`Navigator`] is the pure path-stack state machine: every transition
//! returns a [`ListingTicket`] naming what to list, stamped with a
//! generation. [`Browser`] drives it against a session, running each
//! listing on its own task and dropping replies whose generation is no
//! longer current.

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::entry::RemoteEntry;
use crate::error::BrowseError;
use crate::filter::MimeFilter;
use crate::listing::{self, folder_query, my_drive_query, shared_query};
use crate::query::Query;
use crate::session::DriveSession;

/// Named top-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    MyDrive,
    Shared,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    MyDrive,
    Shared,
    Folder(String),
}

impl Location {
    pub fn is_root(&self) -> bool {
        !matches!(self, Location::Folder(_))
    }

    /// The listing query for this location. The type filter only narrows the
    /// root collections; folder contents are listed unrestricted.
    pub fn query(&self, filter: &MimeFilter) -> Query {
        match self {
            Location::MyDrive => my_drive_query(filter),
            Location::Shared => shared_query(filter),
            Location::Folder(id) => folder_query(id),
        }
    }
}

impl From<Root> for Location {
    fn from(root: Root) -> Self {
        match root {
            Root::MyDrive => Location::MyDrive,
            Root::Shared => Location::Shared,
        }
    }
}

/// Lists the contents of `location`.
pub async fn list_location(
    session: &DriveSession,
    location: &Location,
    filter: &MimeFilter,
) -> Result<Vec<RemoteEntry>, BrowseError> {
    listing::list(session, &location.query(filter)).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    pub generation: u64,
    pub location: Location,
}

impl ListingTicket {
    pub fn at_root(&self) -> bool {
        self.location.is_root()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Load(ListingTicket),
    /// The last location was popped; the caller should close the browser.
    Exit,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Location>,
    generation: u64,
}

impl Navigator {
    pub fn start(root: Root) -> (Self, ListingTicket) {
        let mut navigator = Self {
            stack: vec![root.into()],
            generation: 0,
        };
        let ticket = navigator.issue(root.into());
        (navigator, ticket)
    }

    pub fn current(&self) -> Option<&Location> {
        self.stack.last()
    }

    pub fn path(&self) -> &[Location] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn at_root(&self) -> bool {
        self.current().is_some_and(Location::is_root)
    }

    pub fn is_exited(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens `entry` if it is an actionable folder.
    pub fn enter(&mut self, entry: &RemoteEntry) -> Result<ListingTicket, BrowseError> {
        let entry = entry.actionable()?;
        if !entry.is_folder() {
            return Err(BrowseError::NotAFolder {
                id: entry.id.clone(),
            });
        }
        self.enter_folder(entry.id.clone())
    }

    pub fn enter_folder(
        &mut self,
        folder_id: impl Into<String>,
    ) -> Result<ListingTicket, BrowseError> {
        if self.is_exited() {
            return Err(BrowseError::Exited);
        }
        let location = Location::Folder(folder_id.into());
        self.stack.push(location.clone());
        Ok(self.issue(location))
    }

    pub fn go_back(&mut self) -> Transition {
        self.stack.pop();
        match self.stack.last().cloned() {
            Some(location) => Transition::Load(self.issue(location)),
            None => {
                // A reply still in flight must go stale.
                self.generation += 1;
                Transition::Exit
            }
        }
    }

    pub fn jump_to(&mut self, root: Root) -> ListingTicket {
        self.stack.clear();
        self.stack.push(root.into());
        self.issue(root.into())
    }

    pub fn reload(&mut self) -> Option<ListingTicket> {
        let location = self.stack.last().cloned()?;
        Some(self.issue(location))
    }

    pub fn is_current(&self, ticket: &ListingTicket) -> bool {
        ticket.generation == self.generation
    }

    fn issue(&mut self, location: Location) -> ListingTicket {
        self.generation += 1;
        ListingTicket {
            generation: self.generation,
            location,
        }
    }
}

#[derive(Debug)]
pub struct ListingView {
    pub location: Location,
    pub entries: Vec<RemoteEntry>,
    /// Whether a "go up" affordance makes sense for this view.
    pub at_root: bool,
}

#[derive(Debug)]
pub enum BrowserEvent {
    Listing(ListingView),
    Failed {
        location: Location,
        error: BrowseError,
    },
}

struct Reply {
    ticket: ListingTicket,
    result: Result<Vec<RemoteEntry>, BrowseError>,
}

struct InFlight {
    ticket: ListingTicket,
    cancel: CancellationToken,
    /// `None` once the task has been seen to finish.
    task: Option<JoinHandle<()>>,
}

enum Wake {
    Reply(Reply),
    TaskExit(Result<(), JoinError>),
}

// Resolves when the listing task ends; never resolves once it has.
async fn task_exit(task: &mut Option<JoinHandle<()>>) -> Result<(), JoinError> {
    let Some(handle) = task.as_mut() else {
        return std::future::pending().await;
    };
    let joined = handle.await;
    *task = None;
    joined
}

/// Drives a [`Navigator`] against a session.
///
/// Must be used from within a tokio runtime. Only the owner mutates the
/// path stack; listings run on spawned tasks and report back over a channel.
pub struct Browser {
    session: DriveSession,
    filter: MimeFilter,
    navigator: Navigator,
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies_rx: mpsc::UnboundedReceiver<Reply>,
    in_flight: Option<InFlight>,
}

impl Browser {
    pub fn open(session: DriveSession, root: Root, filter: MimeFilter) -> Self {
        let (navigator, ticket) = Navigator::start(root);
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let mut browser = Self {
            session,
            filter,
            navigator,
            replies_tx,
            replies_rx,
            in_flight: None,
        };
        browser.dispatch(ticket);
        browser
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn enter(&mut self, entry: &RemoteEntry) -> Result<(), BrowseError> {
        let ticket = self.navigator.enter(entry)?;
        self.dispatch(ticket);
        Ok(())
    }

    pub fn enter_folder(&mut self, folder_id: impl Into<String>) -> Result<(), BrowseError> {
        let ticket = self.navigator.enter_folder(folder_id)?;
        self.dispatch(ticket);
        Ok(())
    }

    /// Returns `false` when the browser has exited; nothing is listed then.
    pub fn go_back(&mut self) -> bool {
        match self.navigator.go_back() {
            Transition::Load(ticket) => {
                self.dispatch(ticket);
                true
            }
            Transition::Exit => {
                self.cancel_in_flight();
                false
            }
        }
    }

    pub fn jump_to(&mut self, root: Root) {
        let ticket = self.navigator.jump_to(root);
        self.dispatch(ticket);
    }

    pub fn reload(&mut self) {
        if let Some(ticket) = self.navigator.reload() {
            self.dispatch(ticket);
        }
    }

    /// Waits for the outcome of the current listing. Replies to locations
    /// the user has since left are discarded. `None` when nothing is pending.
    ///
    /// A listing task that dies without replying is reported as
    /// [`BrowseError::TaskFailed`] for its location.
    pub async fn next_event(&mut self) -> Option<BrowserEvent> {
        loop {
            let in_flight = self.in_flight.as_mut()?;
            let wake = tokio::select! {
                biased;
                reply = self.replies_rx.recv() => Wake::Reply(reply?),
                joined = task_exit(&mut in_flight.task) => Wake::TaskExit(joined),
            };
            let reply = match wake {
                Wake::Reply(reply) => reply,
                // Finished normally; its reply is already queued.
                Wake::TaskExit(Ok(())) => continue,
                Wake::TaskExit(Err(err)) => {
                    let in_flight = self.in_flight.take()?;
                    warn!(
                        generation = in_flight.ticket.generation,
                        error = %err,
                        "listing task died without replying"
                    );
                    return Some(BrowserEvent::Failed {
                        location: in_flight.ticket.location,
                        error: BrowseError::TaskFailed(err.to_string()),
                    });
                }
            };
            if !self.navigator.is_current(&reply.ticket) {
                debug!(
                    generation = reply.ticket.generation,
                    current = self.navigator.generation(),
                    "dropping stale listing reply"
                );
                continue;
            }
            self.in_flight = None;
            let location = reply.ticket.location;
            return Some(match reply.result {
                Ok(entries) => BrowserEvent::Listing(ListingView {
                    at_root: location.is_root(),
                    location,
                    entries,
                }),
                Err(error) => BrowserEvent::Failed { location, error },
            });
        }
    }

    fn dispatch(&mut self, ticket: ListingTicket) {
        self.cancel_in_flight();
        let cancel = self.session.cancellation().child_token();
        let session = self.session.clone();
        let query = ticket.location.query(&self.filter);
        let replies = self.replies_tx.clone();
        let task_ticket = ticket.clone();
        let task_cancel = cancel.clone();
        debug!(
            generation = ticket.generation,
            location = ?ticket.location,
            "dispatching listing"
        );
        let task = tokio::spawn(async move {
            let result = listing::list_until_cancelled(&session, &query, &task_cancel).await;
            let _ = replies.send(Reply {
                ticket: task_ticket,
                result,
            });
        });
        self.in_flight = Some(InFlight {
            ticket,
            cancel,
            task: Some(task),
        });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(
                generation = in_flight.ticket.generation,
                "cancelling superseded listing"
            );
            in_flight.cancel.cancel();
        }
    }
}
