use aircell_tests::{MockRan, framework::*};
use nas::{
    DataRequest, DataResponse, LocationReport, LocationReportRequest, LocationReportResponse,
    MessageType, SecurityCapabilities, SessionEstablishmentAccept, SessionEstablishmentRequest,
    decode_message,
};

#[async_std::test]
async fn attach_and_transfer_data() -> anyhow::Result<()> {
    let (amf, dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 1,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;

    // RAN connects to the core.
    let setup = ran.perform_ng_setup().await?;
    assert_eq!(setup.amf_name, "AIRCELL-AMF");
    assert_eq!(setup.plmn, 0x00ff10);

    // Subscriber registers and authenticates; the core adopts the offer.
    let command = ran.register_and_authenticate(caps).await?;
    assert_eq!(command.integrity, 1);
    assert_eq!(command.ciphering, 0);
    assert_eq!(command.replayed, caps);

    // Secured location report, then session establishment.
    let pdu = ran.protect(
        &LocationReport {
            location: "TestCity".to_string(),
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;

    let pdu = ran.protect(
        &SessionEstablishmentRequest {
            session_id: 1,
            session_type: 0,
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;
    let accept_pdu = ran.recv_downlink().await?;
    assert_eq!(
        accept_pdu.message_type,
        MessageType::SessionEstablishmentAccept
    );
    let accept: SessionEstablishmentAccept = decode_message(&ran.open(&accept_pdu, caps)?)?;
    assert_eq!(accept.session_id, 1);
    assert_eq!(accept.address, vec![10, 0, 0, 1]);

    // Data round trip through the mock data network.
    let pdu = ran.protect(
        &DataRequest {
            session_id: 1,
            target: dn.url("motd").into_bytes(),
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;
    let data_pdu = ran.recv_downlink().await?;
    assert_eq!(data_pdu.message_type, MessageType::DataResponse);
    let response: DataResponse = decode_message(&ran.open(&data_pdu, caps)?)?;
    assert_eq!(response.session_id, 1);
    assert_eq!(response.payload, dn.expected_response());
    assert_eq!(dn.requested_selectors().await, vec!["motd".to_string()]);

    // The core recorded exactly the one reported location.
    let pdu = ran.protect(&LocationReportRequest {}, caps)?;
    ran.send_uplink(&pdu).await?;
    let report_pdu = ran.recv_downlink().await?;
    let report: LocationReportResponse = decode_message(&ran.open(&report_pdu, caps)?)?;
    assert_eq!(report.locations, vec!["TestCity".to_string()]);

    amf.graceful_shutdown().await;
    Ok(())
}

#[async_std::test]
async fn attach_with_ciphering() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 1,
        integrity: 4,
    };
    let mut ran = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;

    ran.perform_ng_setup().await?;
    let command = ran.register_and_authenticate(caps).await?;
    assert_eq!(command.integrity, 4);
    assert_eq!(command.ciphering, 1);

    let pdu = ran.protect(
        &SessionEstablishmentRequest {
            session_id: 3,
            session_type: 1,
        },
        caps,
    )?;
    ran.send_uplink(&pdu).await?;
    let accept_pdu = ran.recv_downlink().await?;
    let accept: SessionEstablishmentAccept = decode_message(&ran.open(&accept_pdu, caps)?)?;
    assert_eq!(accept.session_id, 3);
    assert_eq!(accept.address, vec![0xff, 0x00, 0x00, 0xff]);

    amf.graceful_shutdown().await;
    Ok(())
}
