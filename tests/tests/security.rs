//! Negative paths: every invalid message is terminal for the connection and
//! the core gives no structured error back, it just closes.

use aircell_tests::{MockRan, framework::*};
use nas::{
    AuthenticationRequest, AuthenticationResponse, LocationReport, MessageType, SecuredMessage,
    SecurityCapabilities, SessionEstablishmentRequest, decode_message, encode_message,
};

#[async_std::test]
async fn tampered_mac_aborts_the_connection() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 1,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    ran.perform_ng_setup().await?;
    ran.register_and_authenticate(caps).await?;

    let mut pdu = ran.protect(
        &LocationReport {
            location: "Anywhere".to_string(),
        },
        caps,
    )?;
    pdu.mac[0] ^= 0x01;
    ran.send_uplink(&pdu).await?;
    ran.expect_connection_closed().await?;

    amf.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn session_establishment_before_authentication_is_rejected() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 1,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    ran.perform_ng_setup().await?;
    ran.send_registration(caps).await?;

    // Take the authentication request (which carries the context id) but
    // skip straight to session establishment.
    let pdu = ran.recv_downlink().await?;
    assert_eq!(pdu.message_type, MessageType::AuthenticationRequest);

    let pdu = ran.protect(
        &SessionEstablishmentRequest {
            session_id: 0,
            session_type: 0,
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;
    ran.expect_connection_closed().await?;

    amf.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn wrong_challenge_response_is_rejected() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 1,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    ran.perform_ng_setup().await?;
    ran.send_registration(caps).await?;

    let pdu = ran.recv_downlink().await?;
    let request: AuthenticationRequest = decode_message(&pdu.payload)?;

    // Answer the wrong challenge.
    let res = security::compute_mac(security::AUTH_ALG, &request.auth_challenge, &TEST_KEY);
    ran.send_uplink(&SecuredMessage::plain(&AuthenticationResponse { res })?)
        .await?;
    ran.expect_connection_closed().await?;

    amf.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn null_integrity_is_rejected() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 0,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    ran.perform_ng_setup().await?;

    // The core adopts the null offer as given...
    let command = ran.register_and_authenticate(caps).await?;
    assert_eq!(command.integrity, 0);

    // ...but any message claiming protection under it must fail.
    let pdu = ran.protect(
        &LocationReport {
            location: "Anywhere".to_string(),
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;
    ran.expect_connection_closed().await?;

    amf.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn unknown_integrity_algorithm_is_rejected() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 7,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    ran.perform_ng_setup().await?;

    let command = ran.register_and_authenticate(caps).await?;
    assert_eq!(command.integrity, 7);

    // No MAC can even be computed for index 7; send one of zeros.
    let pdu = SecuredMessage {
        security: true,
        mac: [0; 8],
        message_type: MessageType::LocationReport,
        payload: encode_message(&LocationReport {
            location: "Anywhere".to_string(),
        })?,
    };
    ran.send_uplink(&pdu).await?;
    ran.expect_connection_closed().await?;

    amf.graceful_shutdown().await;
    Ok(())
}
