
pub mod credentials;
pub mod subscription;

pub(crate) mod relay;
pub(crate) mod timer;
pub(crate) mod transaction;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use credentials::Credentials;
use relay::Relay;
use stun::attributes::*;
use stun::error_code::*;
use stun::fingerprint::*;
use stun::message::*;
use stun::textattrs::*;
use stun::xoraddr::*;
use subscription::{Indication, Subscriber, SubscriptionTable, Watch};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use transaction::{Reply, Transaction, TransactionKind, TransactionMap};

use crate::error::*;
use crate::proto::{Data, Lifetime, PeerAddress, RelayedAddress, RequestedTransport, PROTO_UDP};

/// Client-side permission lifetime. Permissions expire five minutes
/// after the last acknowledged CREATE-PERMISSION.
pub(crate) const PERMISSION_LIFETIME: Duration = Duration::from_secs(5 * 60);

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
const MAX_DATAGRAM_SIZE: usize = u16::MAX as usize;
const COMMAND_QUEUE_SIZE: usize = 64;
const EVENT_QUEUE_SIZE: usize = 256;

/// SessionConfig is a bag of config parameters for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// STUN/TURN server endpoint. Datagrams from any other source are
    /// dropped.
    pub server: SocketAddr,
    /// Long-term credential user identifier. Required, together with
    /// `secret`, for authenticated operations.
    pub username: Option<String>,
    /// Long-term secret.
    pub secret: Option<String>,
    /// Per-transaction deadline.
    pub timeout: Duration,
    /// SOFTWARE attribute value attached to outgoing requests when set.
    pub software: Option<String>,
}

impl SessionConfig {
    pub fn new(server: SocketAddr) -> Self {
        SessionConfig {
            server,
            username: None,
            secret: None,
            timeout: DEFAULT_TIMEOUT,
            software: None,
        }
    }
}

/// Timers owned by the session loop, tagged with the state they guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    Transaction(TransactionId),
    Allocation,
    Permission(IpAddr),
}

/// Inbound events serialized through the session queue, alongside
/// caller commands: decoded datagrams, timer fires and subscriber
/// deaths all go through here.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Datagram { data: Vec<u8>, from: SocketAddr },
    SocketClosed,
    Timer { kind: TimerKind, seq: u64 },
    SubscriberDown { id: u64 },
}

enum Command {
    Bind {
        reply: oneshot::Sender<Result<SocketAddr>>,
    },
    Persist,
    Allocate {
        reply: oneshot::Sender<Result<SocketAddr>>,
    },
    Refresh {
        reply: oneshot::Sender<Result<()>>,
    },
    CreatePermission {
        peers: Vec<IpAddr>,
        reply: oneshot::Sender<Result<()>>,
    },
    Send {
        peer: SocketAddr,
        data: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    Subscribe {
        subscriber: Subscriber,
        peer: IpAddr,
        reply: oneshot::Sender<Result<()>>,
    },
    Unsubscribe {
        subscriber_id: u64,
        peer: IpAddr,
        reply: oneshot::Sender<Result<()>>,
    },
    Close {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Session is a STUN/TURN client over a single UDP socket.
///
/// The handle is cheaply cloneable; all clones drive the same
/// single-threaded event loop, which owns the socket, the transaction
/// table, the relay state and every timer. Operations that wait for a
/// network response suspend the caller without blocking the loop.
#[derive(Clone)]
pub struct Session {
    cmd_tx: mpsc::Sender<Command>,
}

impl Session {
    /// Opens the UDP socket on a system-allocated port and starts the
    /// session loop.
    pub async fn new(config: SessionConfig) -> Result<Self> {
        let local = if config.server.is_ipv4() {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        } else {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
        };
        let socket = Arc::new(UdpSocket::bind(local).await?);

        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        let read_cancel = CancellationToken::new();
        spawn_read_loop(Arc::clone(&socket), event_tx.clone(), read_cancel.clone());

        let internal = SessionInternal {
            socket,
            server: config.server,
            credentials: Credentials::initial(config.username, config.secret),
            software: config
                .software
                .map(|s| Software::new(ATTR_SOFTWARE, s)),
            timeout: config.timeout,
            transactions: TransactionMap::new(),
            relay: Relay::default(),
            subscriptions: SubscriptionTable::new(),
            event_tx,
            read_cancel,
        };
        tokio::spawn(internal.run(cmd_rx, event_rx));

        Ok(Session { cmd_tx })
    }

    /// Discovers the reflexive candidate via a binding request.
    pub async fn bind(&self) -> Result<SocketAddr> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Bind { reply }, rx).await
    }

    /// Fire-and-forget binding indication keeping the NAT binding open.
    pub async fn persist(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Persist)
            .await
            .map_err(|_| Error::ErrClosed)
    }

    /// Requests a relayed transport address. When an allocation is
    /// already active its address is returned without network I/O.
    pub async fn allocate(&self) -> Result<SocketAddr> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Allocate { reply }, rx).await
    }

    /// Refreshes the active allocation.
    pub async fn refresh(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Refresh { reply }, rx).await
    }

    /// Installs permissions for one or more peer IPs.
    pub async fn create_permission(&self, peers: Vec<IpAddr>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::CreatePermission { peers, reply }, rx).await
    }

    /// Relays `data` to `peer` through the allocation via a send
    /// indication. Requires an acked permission for the peer's IP.
    pub async fn send_to(&self, data: &[u8], peer: SocketAddr) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Send {
                peer,
                data: data.to_vec(),
                reply,
            },
            rx,
        )
        .await
    }

    /// Subscribes `subscriber` to data indications from `peer`.
    pub async fn subscribe(&self, subscriber: &Subscriber, peer: IpAddr) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Subscribe {
                subscriber: subscriber.clone(),
                peer,
                reply,
            },
            rx,
        )
        .await
    }

    /// Removes one (peer, subscriber) pair. A no-op when absent.
    pub async fn unsubscribe(&self, subscriber: &Subscriber, peer: IpAddr) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Unsubscribe {
                subscriber_id: subscriber.id(),
                peer,
                reply,
            },
            rx,
        )
        .await
    }

    /// Terminates the session loop, failing outstanding transactions.
    pub async fn close(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Close { reply }, rx).await
    }

    async fn call<T>(&self, cmd: Command, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.cmd_tx.send(cmd).await.map_err(|_| Error::ErrClosed)?;
        rx.await.map_err(|_| Error::ErrClosed)?
    }
}

fn spawn_read_loop(
    socket: Arc<UdpSocket>,
    events: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                result = socket.recv_from(&mut buf) => match result {
                    Ok((n, from)) => {
                        log::trace!("received {n} bytes of udp from {from}");
                        if events
                            .send(SessionEvent::Datagram {
                                data: buf[..n].to_vec(),
                                from,
                            })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(err) => {
                        log::warn!("socket read failed: {err}");
                        let _ = events.send(SessionEvent::SocketClosed).await;
                        break;
                    }
                },
            }
        }
    });
}

struct SessionInternal {
    socket: Arc<UdpSocket>,
    server: SocketAddr,
    credentials: Credentials,
    software: Option<Software>,
    timeout: Duration,
    transactions: TransactionMap,
    relay: Relay,
    subscriptions: SubscriptionTable,
    event_tx: mpsc::Sender<SessionEvent>,
    read_cancel: CancellationToken,
}

impl SessionInternal {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<Command>,
        mut event_rx: mpsc::Receiver<SessionEvent>,
    ) {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Close { reply }) => {
                        let _ = reply.send(Ok(()));
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                    // every Session handle is gone
                    None => break,
                },
                event = event_rx.recv() => match event {
                    Some(SessionEvent::SocketClosed) => {
                        log::warn!("socket closed, terminating session");
                        break;
                    }
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.read_cancel.cancel();
        self.transactions.fail_all(|| Error::ErrClosed);
        self.relay.clear();
        log::debug!("session loop exited");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Bind { reply } => {
                self.send_request(
                    BINDING_REQUEST,
                    vec![],
                    false,
                    TransactionKind::Binding,
                    Reply::Addr(reply),
                )
                .await;
            }
            Command::Persist => self.send_persist_indication().await,
            Command::Allocate { reply } => {
                // an active allocation short-circuits: no packet is sent
                if let Some(addr) = self.relay.relayed_addr {
                    let _ = reply.send(Ok(addr));
                    return;
                }
                self.send_request(
                    MessageType::new(METHOD_ALLOCATE, CLASS_REQUEST),
                    vec![Box::new(RequestedTransport(PROTO_UDP))],
                    true,
                    TransactionKind::Allocate,
                    Reply::Addr(reply),
                )
                .await;
            }
            Command::Refresh { reply } => {
                if !self.relay.is_active() {
                    let _ = reply.send(Err(Error::ErrNoAllocation));
                    return;
                }
                self.send_request(
                    MessageType::new(METHOD_REFRESH, CLASS_REQUEST),
                    vec![],
                    true,
                    TransactionKind::Refresh,
                    Reply::Unit(reply),
                )
                .await;
            }
            Command::CreatePermission { peers, reply } => {
                if peers.is_empty() {
                    let _ = reply.send(Err(Error::ErrNoPeerAddresses));
                    return;
                }
                if !self.relay.is_active() {
                    let _ = reply.send(Err(Error::ErrNoAllocation));
                    return;
                }
                let setters = peers
                    .iter()
                    .map(|ip| Box::new(PeerAddress { ip: *ip, port: 0 }) as Box<dyn Setter>)
                    .collect();
                if let Some(id) = self
                    .send_request(
                        MessageType::new(METHOD_CREATE_PERMISSION, CLASS_REQUEST),
                        setters,
                        true,
                        TransactionKind::CreatePermission {
                            peers: peers.clone(),
                        },
                        Reply::Unit(reply),
                    )
                    .await
                {
                    for ip in &peers {
                        self.relay.install_permission(*ip, id);
                    }
                }
            }
            Command::Send { peer, data, reply } => {
                let _ = reply.send(self.send_indication(peer, data).await);
            }
            Command::Subscribe {
                subscriber,
                peer,
                reply,
            } => {
                self.subscribe(subscriber, peer);
                let _ = reply.send(Ok(()));
            }
            Command::Unsubscribe {
                subscriber_id,
                peer,
                reply,
            } => {
                self.subscriptions.remove(peer, subscriber_id);
                let _ = reply.send(Ok(()));
            }
            // handled in run()
            Command::Close { .. } => {}
        }
    }

    /// Builds and sends a request, registering the transaction with its
    /// deadline. `turn` attaches credentials (when promoted) and the
    /// fingerprint, the way TURN requests are sent; binding requests go
    /// out bare. Returns the transaction id once the packet is on the
    /// wire.
    async fn send_request(
        &mut self,
        typ: MessageType,
        extra: Vec<Box<dyn Setter>>,
        turn: bool,
        kind: TransactionKind,
        reply: Reply,
    ) -> Option<TransactionId> {
        let id = self.transactions.new_id();

        let mut setters: Vec<Box<dyn Setter>> = vec![Box::new(id), Box::new(typ)];
        if let Some(software) = &self.software {
            setters.push(Box::new(software.clone()));
        }
        setters.extend(extra);
        if turn {
            if let Credentials::Final {
                username,
                realm,
                nonce,
                ..
            } = &self.credentials
            {
                setters.push(Box::new(Username::new(ATTR_USERNAME, username.clone())));
                setters.push(Box::new(Realm::new(ATTR_REALM, realm.clone())));
                setters.push(Box::new(Nonce::new(ATTR_NONCE, nonce.clone())));
                if let Some(integrity) = self.credentials.integrity() {
                    setters.push(Box::new(integrity));
                }
            }
            setters.push(Box::new(FINGERPRINT));
        }

        let mut msg = Message::new();
        if let Err(err) = msg.build(&setters) {
            reply.fail(err.into());
            return None;
        }

        log::trace!("sending {} transaction {} to {}", msg.typ, id, self.server);
        if let Err(err) = self.socket.send_to(&msg.raw, self.server).await {
            reply.fail(err.into());
            return None;
        }

        let timer = timer::schedule(
            self.event_tx.clone(),
            self.timeout,
            TimerKind::Transaction(id),
        );
        self.transactions.insert(
            id,
            Transaction {
                kind,
                reply,
                timer,
                sent_at: Instant::now(),
            },
        );
        Some(id)
    }

    async fn send_persist_indication(&mut self) {
        let mut setters: Vec<Box<dyn Setter>> =
            vec![Box::new(TransactionId::new()), Box::new(BINDING_INDICATION)];
        if let Some(software) = &self.software {
            setters.push(Box::new(software.clone()));
        }

        let mut msg = Message::new();
        if msg.build(&setters).is_err() {
            return;
        }
        if let Err(err) = self.socket.send_to(&msg.raw, self.server).await {
            log::debug!("persist indication failed: {err}");
        }
    }

    /// Relays data via a send indication. Fire-and-forget once the
    /// local permission checks pass.
    async fn send_indication(&mut self, peer: SocketAddr, data: Vec<u8>) -> Result<()> {
        if !self.relay.is_active() {
            return Err(Error::ErrNoAllocation);
        }
        if !self.relay.has_acked_permission(peer.ip()) {
            return Err(Error::ErrNoPermission);
        }

        let mut msg = Message::new();
        msg.build(&[
            Box::new(TransactionId::new()),
            Box::new(MessageType::new(METHOD_SEND, CLASS_INDICATION)),
            Box::new(PeerAddress::from(peer)),
            Box::new(Data(data)),
            Box::new(FINGERPRINT),
        ])?;

        self.socket.send_to(&msg.raw, self.server).await?;
        Ok(())
    }

    fn subscribe(&mut self, subscriber: Subscriber, peer: IpAddr) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.event_tx.clone();
        let sender = subscriber.sender().clone();
        let id = subscriber.id();

        // watch subscriber liveness; its death unsubscribes it everywhere
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = sender.closed() => {
                    let _ = events.send(SessionEvent::SubscriberDown { id }).await;
                }
            }
        });

        self.subscriptions.insert(peer, subscriber, Watch::new(token));
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Datagram { data, from } => self.handle_datagram(data, from),
            SessionEvent::Timer { kind, seq } => self.handle_timer(kind, seq),
            SessionEvent::SubscriberDown { id } => {
                log::debug!("subscriber {id} went away, unsubscribing");
                self.subscriptions.remove_subscriber(id);
            }
            // handled in run()
            SessionEvent::SocketClosed => {}
        }
    }

    fn handle_timer(&mut self, kind: TimerKind, seq: u64) {
        match kind {
            TimerKind::Transaction(id) => {
                let current = self
                    .transactions
                    .get(&id)
                    .map(|tr| tr.timer.seq() == seq)
                    .unwrap_or(false);
                if !current {
                    return;
                }
                if let Some(tr) = self.transactions.remove(&id) {
                    log::debug!("transaction {id} timed out");
                    tr.reply.fail(Error::ErrTimeout);
                }
            }
            TimerKind::Allocation => {
                let current = self
                    .relay
                    .timer
                    .as_ref()
                    .map(|t| t.seq() == seq)
                    .unwrap_or(false);
                if current {
                    log::debug!("allocation lifetime expired");
                    self.relay.clear();
                }
            }
            TimerKind::Permission(ip) => {
                if self.relay.expire_permission(ip, seq) {
                    log::debug!("permission for {ip} expired");
                }
            }
        }
    }

    /// Demultiplexes one inbound datagram. Protocol errors drop the
    /// datagram and never tear down the session.
    fn handle_datagram(&mut self, data: Vec<u8>, from: SocketAddr) {
        if from != self.server {
            log::trace!("dropping datagram from unexpected source {from}");
            return;
        }
        if !is_message(&data) {
            log::trace!("dropping non-STUN datagram from {from}");
            return;
        }

        let mut msg = Message::new();
        if let Err(err) = msg.write(&data) {
            log::debug!("dropping undecodable datagram: {err}");
            return;
        }

        if msg.typ.class == CLASS_INDICATION {
            if msg.typ.method == METHOD_DATA {
                self.handle_data_indication(&msg);
            }
            return;
        }
        if msg.typ.class == CLASS_REQUEST {
            log::debug!("dropping unexpected request {msg}");
            return;
        }

        self.handle_response(msg);
    }

    fn handle_data_indication(&mut self, msg: &Message) {
        let mut peer = PeerAddress::default();
        let mut data = Data::default();
        if peer.get_from(msg).is_err() || data.get_from(msg).is_err() {
            log::debug!("dropping malformed data indication {msg}");
            return;
        }

        let from = SocketAddr::new(peer.ip, peer.port);
        log::debug!("data indication from {from}, {} bytes", data.0.len());
        self.subscriptions.dispatch(peer.ip, &Indication { from, data: data.0 });
    }

    fn handle_response(&mut self, mut msg: Message) {
        // Verify integrity when we hold signing material. A mismatch
        // drops the datagram; the transaction stays pending until its
        // deadline.
        if msg.contains(ATTR_MESSAGE_INTEGRITY) {
            if let Some(integrity) = self.credentials.integrity() {
                if let Err(err) = integrity.check(&mut msg) {
                    log::debug!("dropping response with bad integrity: {err}");
                    return;
                }
            }
        }

        let Some(tr) = self.transactions.remove(&msg.transaction_id) else {
            // silently discard
            log::debug!("no transaction for {msg}");
            return;
        };
        tr.timer.cancel();
        log::trace!(
            "transaction {} completed in {:?}",
            msg.transaction_id,
            tr.sent_at.elapsed()
        );

        match tr.kind {
            TransactionKind::Binding => self.on_binding_response(&msg, tr.reply),
            TransactionKind::Allocate => self.on_allocate_response(&msg, tr.reply),
            TransactionKind::Refresh => self.on_refresh_response(&msg, tr.reply),
            TransactionKind::CreatePermission { .. } => {
                self.on_create_permission_response(&msg, tr.reply)
            }
        }
    }

    fn on_binding_response(&mut self, msg: &Message, reply: Reply) {
        let Reply::Addr(tx) = reply else { return };

        if msg.typ.class != CLASS_SUCCESS_RESPONSE {
            let _ = tx.send(Err(self.response_error(msg)));
            return;
        }

        let mut reflexive = XorMappedAddress::default();
        let result = match reflexive.get_from(msg) {
            Ok(()) => Ok(SocketAddr::new(reflexive.ip, reflexive.port)),
            Err(err) => Err(err.into()),
        };
        let _ = tx.send(result);
    }

    fn on_allocate_response(&mut self, msg: &Message, reply: Reply) {
        let Reply::Addr(tx) = reply else { return };

        if msg.typ.class != CLASS_SUCCESS_RESPONSE {
            let _ = tx.send(Err(self.response_error(msg)));
            return;
        }

        let mut relayed = RelayedAddress::default();
        let mut lifetime = Lifetime::default();
        if let Err(err) = relayed.get_from(msg).and_then(|_| lifetime.get_from(msg)) {
            let _ = tx.send(Err(err.into()));
            return;
        }

        let addr = SocketAddr::new(relayed.ip, relayed.port);
        let timer = timer::schedule(self.event_tx.clone(), lifetime.0, TimerKind::Allocation);
        self.relay.activate(addr, lifetime.0, timer);
        log::debug!("allocation active at {addr}, lifetime {lifetime}");

        let _ = tx.send(Ok(addr));
    }

    fn on_refresh_response(&mut self, msg: &Message, reply: Reply) {
        let Reply::Unit(tx) = reply else { return };

        if msg.typ.class != CLASS_SUCCESS_RESPONSE {
            let _ = tx.send(Err(self.response_error(msg)));
            return;
        }

        let mut lifetime = Lifetime::default();
        if let Err(err) = lifetime.get_from(msg) {
            let _ = tx.send(Err(err.into()));
            return;
        }

        if lifetime.0.is_zero() {
            // a zero lifetime deallocates, same as expiry
            log::debug!("refresh returned lifetime 0, allocation released");
            self.relay.clear();
        } else {
            let timer = timer::schedule(self.event_tx.clone(), lifetime.0, TimerKind::Allocation);
            self.relay.refresh(lifetime.0, timer);
            log::debug!("allocation refreshed, lifetime {lifetime}");
        }

        let _ = tx.send(Ok(()));
    }

    fn on_create_permission_response(&mut self, msg: &Message, reply: Reply) {
        let Reply::Unit(tx) = reply else { return };

        if msg.typ.class != CLASS_SUCCESS_RESPONSE {
            let _ = tx.send(Err(self.response_error(msg)));
            return;
        }

        let event_tx = self.event_tx.clone();
        let acked = self.relay.ack_permissions(msg.transaction_id, |ip| {
            timer::schedule(
                event_tx.clone(),
                PERMISSION_LIFETIME,
                TimerKind::Permission(ip),
            )
        });
        log::debug!("permissions acked for {acked:?}");

        let _ = tx.send(Ok(()));
    }

    /// Maps an error response to the caller-visible error, evolving the
    /// credentials on an authentication challenge. The caller observes
    /// `unauthorized`/`stale-nonce` and retries with the promoted
    /// credentials.
    fn response_error(&mut self, msg: &Message) -> Error {
        let mut code = ErrorCodeAttribute::default();
        if code.get_from(msg).is_err() {
            return Error::ErrUnexpectedResponse;
        }
        let reason = String::from_utf8(code.reason.clone()).unwrap_or_default();

        match code.code {
            CODE_UNAUTHORIZED => {
                let realm = Realm::get_from_as(msg, ATTR_REALM);
                let nonce = Nonce::get_from_as(msg, ATTR_NONCE);
                if let (Ok(realm), Ok(nonce)) = (realm, nonce) {
                    if let Some(promoted) = self.credentials.promote(realm.text, nonce.text) {
                        log::debug!("401, credentials promoted with fresh realm and nonce");
                        self.credentials = promoted;
                        return Error::ErrUnauthorized;
                    }
                }
                Error::ErrServer {
                    code: CODE_UNAUTHORIZED.0,
                    reason,
                }
            }
            CODE_STALE_NONCE => {
                // the realm is ours already; the server may not resend it
                let realm = Realm::get_from_as(msg, ATTR_REALM)
                    .map(|r| r.text)
                    .ok()
                    .or_else(|| self.credentials.realm().map(str::to_owned));
                let nonce = Nonce::get_from_as(msg, ATTR_NONCE);
                if let (Some(realm), Ok(nonce)) = (realm, nonce) {
                    if let Some(promoted) = self.credentials.promote(realm, nonce.text) {
                        log::debug!("438, credentials re-promoted with fresh nonce");
                        self.credentials = promoted;
                        return Error::ErrStaleNonce;
                    }
                }
                Error::ErrServer {
                    code: CODE_STALE_NONCE.0,
                    reason,
                }
            }
            other => Error::ErrServer {
                code: other.0,
                reason,
            },
        }
    }
}
