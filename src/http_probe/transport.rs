use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::header::{HOST, USER_AGENT};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::task::{JoinHandle, JoinSet};
use tokio_native_tls::TlsConnector as TokioTlsConnector;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{
    NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts,
};
use url::{Host, Position, Url};

use super::timestamps::{PhaseEvent, PhaseTimestamps};
use crate::config::CheckConfig;
use crate::errors::TransportError;

/// Timeout of a single TCP connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a pending connection attempt is given before the next address is
/// dialled alongside it.
pub const FALLBACK_DELAY: Duration = Duration::from_millis(300);

const USER_AGENT_VALUE: &str = concat!("http-perf/", env!("CARGO_PKG_VERSION"));

/// Carries one GET request to its target and reports the lifecycle events it
/// passes through.
pub trait Transport {
    /// Send a GET request for `url` and resolve with the response status code
    /// once the response head has arrived. Every lifecycle event is recorded in
    /// `timestamps`, possibly from another task or thread.
    fn send(
        &self,
        url: &Url,
        timestamps: Arc<PhaseTimestamps>,
    ) -> impl Future<Output = Result<u16, TransportError>>;
}

/// How target host names are turned into addresses.
pub enum Resolver {
    /// The operating system resolver (`getaddrinfo`).
    System,
    /// A dedicated resolver querying the configured name servers.
    NameServers(TokioAsyncResolver),
}

impl Resolver {
    async fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, TransportError> {
        let dns_error = |source: crate::errors::BoxError| TransportError::Dns {
            host: host.to_string(),
            source,
        };
        match self {
            Resolver::System => tokio::net::lookup_host((host, port))
                .await
                .map(|addrs| addrs.collect())
                .map_err(|e| dns_error(e.into())),
            Resolver::NameServers(resolver) => {
                let lookup = resolver
                    .lookup_ip(host)
                    .await
                    .map_err(|e| dns_error(e.into()))?;
                Ok(lookup.iter().map(|ip| SocketAddr::new(ip, port)).collect())
            }
        }
    }
}

/// Setup a DNS resolver for the given name servers.
/// With no name servers the system resolver is used. Otherwise a
/// `TokioAsyncResolver` is created that queries only the given servers, with 2
/// attempts and a 2 second timeout per attempt. Caching is pointless for a
/// single lookup and is switched off.
pub fn setup_resolver(dns_servers: &[IpAddr]) -> Resolver {
    if dns_servers.is_empty() {
        return Resolver::System;
    }

    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_secs(2);
    opts.cache_size = 0;

    let mut name_servers = NameServerConfigGroup::new();

    for ip in dns_servers {
        name_servers.push(NameServerConfig {
            socket_addr: (*ip, 53).into(),
            protocol: Protocol::Udp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Resolver::NameServers(TokioAsyncResolver::tokio(resolver_config, opts))
}

/// Setup a TLS connector. Certificate and host name verification are disabled
/// when `insecure` is set.
pub fn setup_tls_connector(insecure: bool) -> Result<TokioTlsConnector, native_tls::Error> {
    let mut builder = native_tls::TlsConnector::builder();
    builder
        .danger_accept_invalid_certs(insecure)
        .danger_accept_invalid_hostnames(insecure);
    let connector = builder.build()?;
    Ok(TokioTlsConnector::from(connector))
}

/// The real transport: resolves, connects, optionally negotiates TLS and then
/// speaks HTTP/1.1 with hyper over the resulting stream.
pub struct HyperTransport {
    resolver: Resolver,
    tls: TokioTlsConnector,
    tls_timeout: Duration,
    connect_timeout: Duration,
    fallback_delay: Duration,
}

impl HyperTransport {
    pub fn from_config(config: &CheckConfig) -> Result<Self, TransportError> {
        let tls =
            setup_tls_connector(config.insecure_skip_verify).map_err(TransportError::TlsSetup)?;
        Ok(Self {
            resolver: setup_resolver(&config.dns_servers),
            tls,
            tls_timeout: config.tls_timeout(),
            connect_timeout: CONNECT_TIMEOUT,
            fallback_delay: FALLBACK_DELAY,
        })
    }

    async fn resolve(
        &self,
        url: &Url,
        port: u16,
        timestamps: &PhaseTimestamps,
    ) -> Result<Vec<SocketAddr>, TransportError> {
        let domain = match url.host() {
            Some(Host::Ipv4(ip)) => return Ok(vec![SocketAddr::new(ip.into(), port)]),
            Some(Host::Ipv6(ip)) => return Ok(vec![SocketAddr::new(ip.into(), port)]),
            Some(Host::Domain(domain)) => domain,
            None => {
                return Err(TransportError::NoAddresses {
                    host: url.to_string(),
                });
            }
        };

        timestamps.record(PhaseEvent::DnsStart);
        let addrs = self.resolver.lookup(domain, port).await?;
        timestamps.record(PhaseEvent::DnsDone);

        if addrs.is_empty() {
            return Err(TransportError::NoAddresses {
                host: domain.to_string(),
            });
        }
        log::debug!("{domain} resolved to {addrs:?}");
        Ok(addrs)
    }

    /// Dial the addresses with staggered starts and keep the first connection.
    ///
    /// The next address is dialled as soon as the previous attempt fails, or
    /// after [`FALLBACK_DELAY`] while it is still pending. Address families
    /// alternate, so an unreachable IPv6 route cannot hold up IPv4.
    async fn connect(
        &self,
        addrs: &[SocketAddr],
        timestamps: &PhaseTimestamps,
    ) -> Result<TcpStream, TransportError> {
        let mut remaining = interleave_families(addrs).into_iter();
        let mut attempts = JoinSet::new();
        let mut last_error = None;

        timestamps.record(PhaseEvent::ConnectStart);
        if let Some(addr) = remaining.next() {
            attempts.spawn(dial(addr, self.connect_timeout));
        }

        while !attempts.is_empty() {
            let finished = if remaining.len() > 0 {
                tokio::select! {
                    finished = attempts.join_next() => finished,
                    _ = tokio::time::sleep(self.fallback_delay) => None,
                }
            } else {
                attempts.join_next().await
            };

            match finished {
                Some(Ok(Ok(stream))) => {
                    timestamps.record(PhaseEvent::ConnectDone);
                    return Ok(stream);
                }
                Some(Ok(Err(error))) => {
                    log::debug!("{error}");
                    last_error = Some(error);
                }
                Some(Err(err)) => log::debug!("connect attempt aborted: {err}"),
                None => {}
            }

            if let Some(addr) = remaining.next() {
                attempts.spawn(dial(addr, self.connect_timeout));
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError::NoAddresses {
            host: String::new(),
        }))
    }

    async fn handshake(
        &self,
        host: &str,
        stream: TcpStream,
        timestamps: &PhaseTimestamps,
    ) -> Result<tokio_native_tls::TlsStream<TcpStream>, TransportError> {
        timestamps.record(PhaseEvent::TlsStart);
        let stream = tokio::time::timeout(self.tls_timeout, self.tls.connect(host, stream))
            .await
            .map_err(|_| TransportError::TlsTimeout {
                host: host.to_string(),
                timeout: self.tls_timeout,
            })?
            .map_err(|source| TransportError::Tls {
                host: host.to_string(),
                source,
            })?;
        timestamps.record(PhaseEvent::TlsDone);
        Ok(stream)
    }
}

impl Transport for HyperTransport {
    async fn send(
        &self,
        url: &Url,
        timestamps: Arc<PhaseTimestamps>,
    ) -> Result<u16, TransportError> {
        let port = url.port_or_known_default().unwrap_or(80);
        let addrs = self.resolve(url, port, &timestamps).await?;
        let stream = self.connect(&addrs, &timestamps).await?;

        if url.scheme() == "https" {
            let stream = self.handshake(&tls_host(url), stream, &timestamps).await?;
            exchange(url, stream, timestamps).await
        } else {
            exchange(url, stream, timestamps).await
        }
    }
}

async fn dial(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, TransportError> {
    log::debug!("connecting to {addr}");
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            log::debug!("connected to {addr}");
            Ok(stream)
        }
        Ok(Err(source)) => Err(TransportError::Connect { addr, source }),
        Err(_) => Err(TransportError::ConnectTimeout { addr, timeout }),
    }
}

/// Reorder `addrs` so the two address families alternate, starting with the
/// family of the first address. Order within a family is kept.
fn interleave_families(addrs: &[SocketAddr]) -> Vec<SocketAddr> {
    let Some(first) = addrs.first() else {
        return Vec::new();
    };
    let (primary, fallback): (Vec<SocketAddr>, Vec<SocketAddr>) = addrs
        .iter()
        .copied()
        .partition(|addr| addr.is_ipv4() == first.is_ipv4());

    let mut ordered = Vec::with_capacity(addrs.len());
    let mut fallback = fallback.into_iter();
    for addr in primary {
        ordered.push(addr);
        ordered.extend(fallback.next());
    }
    ordered.extend(fallback);
    ordered
}

fn tls_host(url: &Url) -> String {
    match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => String::new(),
    }
}

/// Aborts the connection task when the exchange is finished or abandoned.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn exchange<S>(
    url: &Url,
    stream: S,
    timestamps: Arc<PhaseTimestamps>,
) -> Result<u16, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(FirstByteStream::new(stream, Arc::clone(&timestamps)));
    let (mut sender, connection) = hyper::client::conn::http1::handshake(io).await?;
    let _connection = AbortOnDrop(tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::debug!("connection closed: {err}");
        }
    }));
    timestamps.record(PhaseEvent::GotConnection);

    let response = sender.send_request(build_request(url)?).await?;
    let status = response.status().as_u16();
    log::debug!("{url} answered with {status}");

    // The body is released unread; only the response head is timed.
    drop(response);
    Ok(status)
}

fn build_request(url: &Url) -> Result<Request<Empty<Bytes>>, TransportError> {
    let path = &url[Position::BeforePath..Position::AfterQuery];
    let authority = &url[Position::BeforeHost..Position::AfterPort];

    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, authority)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .body(Empty::new())
        .map_err(|e| TransportError::Request(e.into()))
}

/// A stream that records [`PhaseEvent::FirstResponseByte`] on the first read
/// that yields data. Requests are written before anything is read, so the first
/// byte read is the first byte of the response.
pub struct FirstByteStream<S> {
    inner: S,
    timestamps: Arc<PhaseTimestamps>,
}

impl<S> FirstByteStream<S> {
    pub fn new(inner: S, timestamps: Arc<PhaseTimestamps>) -> Self {
        Self { inner, timestamps }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for FirstByteStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) && buf.filled().len() > before {
            this.timestamps.record(PhaseEvent::FirstResponseByte);
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for FirstByteStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
