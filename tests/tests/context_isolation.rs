use aircell_tests::{MockRan, framework::*};
use nas::{
    LocationReport, LocationReportRequest, LocationReportResponse, SecurityCapabilities,
    decode_message,
};

/// Subscriber state is scoped to its connection: locations reported on one
/// connection are gone once it closes.
#[async_std::test]
async fn contexts_die_with_their_connection() -> anyhow::Result<()> {
    let (amf, _dn, logger) = init().await?;
    let caps = SecurityCapabilities {
        ciphering: 0,
        integrity: 2,
    };

    let mut first = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    first.perform_ng_setup().await?;
    first.register_and_authenticate(caps).await?;
    let pdu = first.protect(
        &LocationReport {
            location: "CityA".to_string(),
        },
        caps,
    )?;
    first.send_uplink(&pdu).await?;
    drop(first);

    let mut second = MockRan::connect(amf.local_addr(), TEST_KEY, &logger).await?;
    second.perform_ng_setup().await?;
    second.register_and_authenticate(caps).await?;
    let pdu = second.protect(&LocationReportRequest {}, caps)?;
    second.send_uplink(&pdu).await?;
    let report_pdu = second.recv_downlink().await?;
    let report: LocationReportResponse = decode_message(&second.open(&report_pdu, caps)?)?;
    assert!(report.locations.is_empty());

    amf.graceful_shutdown().await;
    Ok(())
}
