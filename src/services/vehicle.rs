//! Vehicle entry/exit lookup from the monthly access history.

// self
use crate::{_prelude::*, client::Client};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyAccessHistory {
	monthly_parking_history_list: Vec<MonthlyParkingHistory>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyParkingHistory {
	visit_car_use_history_report_list: Vec<VisitCarUseHistory>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitCarUseHistory {
	car_no: String,
	#[serde(default)]
	in_datetime: Option<String>,
	is_exit: bool,
	#[serde(default)]
	out_datetime: Option<String>,
}

/// Whether a vehicle is currently on the premises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
	/// The vehicle entered and has not exited.
	In,
	/// The vehicle has exited.
	Out,
}

/// Entry/exit record derived from the most recent report for a plate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VehicleAccess {
	/// Entry timestamp as reported upstream.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub in_time: Option<String>,
	/// Exit timestamp as reported upstream.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub out_time: Option<String>,
	/// Current entry/exit status.
	pub status: AccessStatus,
}

impl Client {
	/// Looks up entry/exit status per plate from
	/// `/pc/monthly-access-history`, optionally filtered to a single plate.
	///
	/// Reports arrive newest first; the first report seen for a plate wins
	/// and older repeats are ignored.
	pub async fn vehicle_access(
		&self,
		car_no: Option<&str>,
	) -> Result<BTreeMap<String, VehicleAccess>> {
		let history: MonthlyAccessHistory =
			self.fetch_document(Method::GET, "/pc/monthly-access-history", None).await?;
		let mut access = BTreeMap::new();

		for month in history.monthly_parking_history_list {
			for report in month.visit_car_use_history_report_list {
				if car_no.is_some_and(|plate| plate != report.car_no.as_str()) {
					continue;
				}

				let record = VehicleAccess {
					in_time: report.in_datetime,
					out_time: report.out_datetime,
					status: if report.is_exit { AccessStatus::Out } else { AccessStatus::In },
				};

				access.entry(report.car_no).or_insert(record);
			}
		}

		Ok(access)
	}
}
