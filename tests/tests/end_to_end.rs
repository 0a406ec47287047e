use aircell_tests::framework::*;
use async_std::future;
use gnb::{Gnb, GnbConfig};
use nas::{MobileIdentity, SecurityCapabilities};
use slog::o;
use std::time::Duration;
use ue::{Ue, UeConfig};

/// Full run with the real relay and subscriber: UE registers through the
/// gNB, reports its location, establishes a session and fetches data.
#[async_std::test]
async fn attach_via_relay_and_subscriber() -> anyhow::Result<()> {
    let (amf, dn, logger) = init().await?;

    // Seed the protected value the way the administrative channel would.
    let location_file = std::env::temp_dir().join(format!(
        "aircell-test-location-{}.data",
        std::process::id()
    ));
    async_std::fs::write(&location_file, "TestCity\n").await?;

    let ue = Ue::start(
        UeConfig {
            bind_addr: "127.0.0.1:0".parse()?,
            sim_key: TEST_KEY,
            location_file: location_file.to_string_lossy().to_string(),
            identity: MobileIdentity {
                mcc: 1,
                mnc: 1,
                msin: 628_301_234_567,
            },
            requested: SecurityCapabilities {
                ciphering: 1,
                integrity: 2,
            },
            session_type: 0,
            data_target: dn.url("flagstore"),
            idle_timeout: Duration::from_secs(10),
        },
        logger.new(o!("ue" => 1)),
    )
    .await?;

    let gnb = Gnb::new(
        GnbConfig {
            core_addr: amf.local_addr().to_string(),
            ue_addr: ue.local_addr().to_string(),
            ran_id: 1,
            tac: 1,
            plmn: 0x00ff10,
        },
        logger.new(o!("gnb" => 1)),
    );

    // The relay returns once the paired session has run to completion.
    future::timeout(Duration::from_secs(30), gnb.run()).await??;

    // The subscriber's data request made it all the way to the data network.
    assert_eq!(
        dn.requested_selectors().await,
        vec!["flagstore".to_string()]
    );

    ue.graceful_shutdown().await;
    amf.graceful_shutdown().await;
    async_std::fs::remove_file(&location_file).await?;
    Ok(())
}
