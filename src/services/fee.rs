//! Management-fee lookup.

// self
use crate::{_prelude::*, client::Client};

#[derive(Debug, Deserialize)]
struct FeeDetail {
	fee: FeeBody,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeBody {
	current_fee: i64,
	details: Vec<FeeItem>,
	month: u8,
	year: i32,
}
#[derive(Debug, Deserialize)]
struct FeeItem {
	name: String,
	value: i64,
}

/// Latest management-fee summary with a per-item breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeeSummary {
	/// Per-item amounts keyed by item name.
	pub details: BTreeMap<String, i64>,
	/// Total fee for the billing period.
	pub fee: i64,
	/// Billing month (1-12).
	pub month: u8,
	/// Billing year.
	pub year: i32,
}

impl Client {
	/// Fetches the most recent management fee from `/fee/detail`.
	pub async fn fee_detail(&self) -> Result<FeeSummary> {
		let detail: FeeDetail = self.fetch_document(Method::GET, "/fee/detail", None).await?;
		let fee = detail.fee;

		Ok(FeeSummary {
			details: fee.details.into_iter().map(|item| (item.name, item.value)).collect(),
			fee: fee.current_fee,
			month: fee.month,
			year: fee.year,
		})
	}
}
