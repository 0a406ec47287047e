//! subscriber - the handset-side mirror of the registration state machine
//!
//! The sequence is linear and self-driving once started; each step is
//! triggered purely by the previously received frame.

use anyhow::{Result, anyhow, bail, ensure};
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::sync::Mutex;
use async_std::task::JoinHandle;
use async_std::{fs, future};
use nas::{
    AuthenticationRequest, AuthenticationResponse, DataRequest, DataResponse, LocationReport,
    MessageType, MobileIdentity, NasMessage, RegistrationRequest, SecuredMessage,
    SecurityCapabilities, SecurityModeCommand, SessionEstablishmentAccept,
    SessionEstablishmentRequest, decode_message,
};
use ngap::{recv_frame, send_frame};
use security::SimKey;
use slog::{Logger, debug, info, o, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UeState {
    Deregistered,
    RegistrationInitiated,
    Authentication,
    SecurityMode,
    Registered,
}

#[derive(Clone, Debug)]
pub struct UeConfig {
    pub bind_addr: SocketAddr,
    pub sim_key: SimKey,
    /// File holding the protected value sent in the location report.
    pub location_file: String,
    pub identity: MobileIdentity,
    pub requested: SecurityCapabilities,
    pub session_type: u8,
    pub data_target: String,
    pub idle_timeout: Duration,
}

/// The subscriber service: listens for a radio-leg connection and drives one
/// handshake per accepted connection.
pub struct Ue {
    logger: Logger,
    local_addr: SocketAddr,
    server_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Ue {
    pub async fn start(config: UeConfig, logger: Logger) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(&logger, "Listen for radio connections on {}", local_addr);

        let ue = Self {
            logger: logger.clone(),
            local_addr,
            server_task: Arc::new(Mutex::new(None)),
        };
        let task = async_std::task::spawn(Self::serve(Arc::new(config), logger, listener));
        *ue.server_task.lock().await = Some(task);
        Ok(ue)
    }

    async fn serve(config: Arc<UeConfig>, logger: Logger, listener: TcpListener) {
        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            match stream {
                Ok(stream) => {
                    let conn_id = rand::random::<u32>();
                    let logger = logger.new(o!("conn" => conn_id));
                    let config = config.clone();
                    async_std::task::spawn(async move {
                        match run_handshake(stream, &config, &logger).await {
                            Ok(payload) => {
                                info!(logger, "Handshake complete, {} data bytes", payload.len())
                            }
                            Err(e) => warn!(logger, "Handshake failed: {e}"),
                        }
                    });
                }
                Err(e) => warn!(logger, "Accept failed - {e}"),
            }
        }
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        if let Some(task) = self.server_task.lock().await.take() {
            task.cancel().await;
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Drive one full handshake over an accepted connection, returning the data
/// payload received at the end.
pub async fn run_handshake(
    stream: TcpStream,
    config: &UeConfig,
    logger: &Logger,
) -> Result<Vec<u8>> {
    SubscriberStateMachine {
        stream,
        config,
        logger,
        state: UeState::Deregistered,
        integrity: 0,
        ciphering: 0,
        session_id: None,
    }
    .run()
    .await
}

struct SubscriberStateMachine<'a> {
    stream: TcpStream,
    config: &'a UeConfig,
    logger: &'a Logger,
    state: UeState,
    integrity: u8,
    ciphering: u8,
    session_id: Option<u8>,
}

impl SubscriberStateMachine<'_> {
    async fn run(mut self) -> Result<Vec<u8>> {
        self.send_registration_request().await?;
        loop {
            let frame = future::timeout(self.config.idle_timeout, recv_frame(&mut &self.stream))
                .await
                .map_err(|_| anyhow!("idle timeout waiting for a frame"))??;
            let pdu = SecuredMessage::decode(&frame)?;
            match pdu.message_type {
                MessageType::AuthenticationRequest => {
                    self.handle_authentication_request(&pdu).await?
                }
                MessageType::SecurityModeCommand => {
                    self.handle_security_mode_command(&pdu).await?
                }
                MessageType::SessionEstablishmentAccept => self.handle_session_accept(&pdu).await?,
                MessageType::DataResponse => return self.handle_data_response(&pdu),
                other => bail!("unexpected downlink message type {other:?}"),
            }
        }
    }

    async fn send_registration_request(&mut self) -> Result<()> {
        let request = RegistrationRequest {
            identity: self.config.identity,
            requested: self.config.requested,
        };
        debug!(self.logger, "<< RegistrationRequest");
        self.send(&SecuredMessage::plain(&request)?).await?;
        self.state = UeState::RegistrationInitiated;
        Ok(())
    }

    async fn handle_authentication_request(&mut self, pdu: &SecuredMessage) -> Result<()> {
        debug!(self.logger, ">> AuthenticationRequest");
        ensure!(
            self.state == UeState::RegistrationInitiated,
            "authentication request in state {:?}",
            self.state
        );
        let request: AuthenticationRequest = decode_message(&pdu.payload)?;

        // Mutual authentication: the network must answer its own challenge
        // before we answer ours.
        let expected =
            security::compute_mac(security::AUTH_ALG, &request.auth_challenge, &self.config.sim_key);
        if request.auth_token != expected {
            bail!("cannot authenticate network");
        }

        let res = security::compute_mac(security::AUTH_ALG, &request.challenge, &self.config.sim_key);
        debug!(self.logger, "<< AuthenticationResponse");
        self.send(&SecuredMessage::plain(&AuthenticationResponse { res })?)
            .await?;
        self.state = UeState::Authentication;
        Ok(())
    }

    async fn handle_security_mode_command(&mut self, pdu: &SecuredMessage) -> Result<()> {
        debug!(self.logger, ">> SecurityModeCommand");
        ensure!(
            self.state == UeState::Authentication,
            "security mode command in state {:?}",
            self.state
        );
        let command: SecurityModeCommand = decode_message(&pdu.payload)?;
        if command.replayed != self.config.requested {
            warn!(
                self.logger,
                "Network replayed capabilities differing from our offer"
            );
        }

        // The dictated algorithms are adopted as commanded.
        self.integrity = command.integrity;
        self.ciphering = command.ciphering;
        self.state = UeState::SecurityMode;

        let location = read_protected_value(&self.config.location_file).await?;
        debug!(self.logger, "<< LocationReport");
        self.send_protected(&LocationReport { location }).await?;

        debug!(self.logger, "<< SessionEstablishmentRequest");
        self.send_protected(&SessionEstablishmentRequest {
            session_id: 0,
            session_type: self.config.session_type,
        })
        .await
    }

    async fn handle_session_accept(&mut self, pdu: &SecuredMessage) -> Result<()> {
        debug!(self.logger, ">> SessionEstablishmentAccept");
        ensure!(
            self.state == UeState::SecurityMode,
            "session establishment accept in state {:?}",
            self.state
        );
        let body = self.open(pdu)?;
        let accept: SessionEstablishmentAccept = decode_message(&body)?;
        info!(
            self.logger,
            "Session {} established, address {:02x?}", accept.session_id, accept.address
        );
        self.session_id = Some(accept.session_id);
        self.state = UeState::Registered;

        debug!(self.logger, "<< DataRequest");
        self.send_protected(&DataRequest {
            session_id: accept.session_id,
            target: self.config.data_target.clone().into_bytes(),
        })
        .await
    }

    fn handle_data_response(&mut self, pdu: &SecuredMessage) -> Result<Vec<u8>> {
        debug!(self.logger, ">> DataResponse");
        ensure!(
            self.state == UeState::Registered,
            "data response in state {:?}",
            self.state
        );
        let body = self.open(pdu)?;
        let response: DataResponse = decode_message(&body)?;
        ensure!(
            Some(response.session_id) == self.session_id,
            "data response for unknown session {}",
            response.session_id
        );
        info!(self.logger, "Received {} data bytes", response.payload.len());
        Ok(response.payload)
    }

    fn open(&self, pdu: &SecuredMessage) -> Result<Vec<u8>> {
        Ok(pdu.open(self.integrity, self.ciphering, &self.config.sim_key)?)
    }

    async fn send_protected<M: NasMessage>(&mut self, m: &M) -> Result<()> {
        let pdu = SecuredMessage::protect(m, self.integrity, self.ciphering, &self.config.sim_key)?;
        self.send(&pdu).await
    }

    async fn send(&mut self, pdu: &SecuredMessage) -> Result<()> {
        send_frame(&mut &self.stream, &pdu.encode()).await?;
        Ok(())
    }
}

/// The protected value is re-read for every handshake so the administrative
/// channel can update it between sessions.  Last non-empty line wins.
async fn read_protected_value(path: &str) -> Result<String> {
    let contents = fs::read_to_string(path).await?;
    last_line(&contents).ok_or_else(|| anyhow!("protected value file {path} is empty"))
}

fn last_line(contents: &str) -> Option<String> {
    contents
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
}
