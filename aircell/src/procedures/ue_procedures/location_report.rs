//! location_report - record reported locations and answer queries for them

use super::{HandlerApi, UeProcedure};
use anyhow::Result;
use derive_deref::{Deref, DerefMut};
use nas::{LocationReport, LocationReportResponse};
use slog::info;

#[derive(Deref, DerefMut)]
pub struct LocationReportProcedure<'a, A: HandlerApi>(UeProcedure<'a, A>);

impl<'a, A: HandlerApi> LocationReportProcedure<'a, A> {
    pub fn new(inner: UeProcedure<'a, A>) -> Self {
        LocationReportProcedure(inner)
    }

    /// Append the reported location.  No reply.
    pub fn report(mut self, report: LocationReport) {
        info!(
            self.logger,
            "Location report for {}: {}", self.ue.amf_ue_id, report.location
        );
        self.ue.locations.push(report.location);
    }

    pub async fn query(self) -> Result<()> {
        self.log_message(">> LocationReportRequest");
        let response = LocationReportResponse {
            locations: self.ue.locations.clone(),
        };
        let pdu = self.protect(&response)?;
        self.log_message("<< LocationReportResponse");
        self.send_downlink(&pdu).await
    }
}
