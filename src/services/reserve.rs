//! Visitor-parking reservations: upcoming-visit listing and new bookings.

// crates.io
use time::{
	Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};
// self
use crate::{_prelude::*, client::Client};

/// Upstream date layout (`2025.01.31`).
const VISIT_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year].[month].[day]");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservePage {
	reserve_list: Vec<ReserveEntry>,
	total_pages: u32,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveEntry {
	car_no: String,
	visit_date: String,
}

/// Inclusive range of consecutive reserved days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
	/// First reserved day.
	pub from: Date,
	/// Last reserved day.
	pub to: Date,
}

/// New visitor-parking booking for [`Client::reserve_visit`].
#[derive(Clone, Debug)]
pub struct VisitReservation {
	/// Visitor's plate number.
	pub car_no: String,
	/// Number of days the reservation covers.
	pub days: u32,
	/// Contact phone number.
	pub phone: String,
	/// Purpose of the visit.
	pub purpose: String,
	/// Visit date formatted as `YYYY.MM.DD`.
	pub visit_date: String,
}

impl Client {
	/// Lists upcoming reservations per plate, compacted into day ranges.
	///
	/// Walks every page of `/pc/reserves`, keeps strictly-future visit dates,
	/// and merges consecutive days into inclusive ranges. Entries whose date
	/// fails to parse are skipped rather than failing the whole listing.
	pub async fn visit_reservations(&self) -> Result<BTreeMap<String, Vec<DateRange>>> {
		let today = OffsetDateTime::now_utc().date();
		let mut dates_by_plate: BTreeMap<String, Vec<Date>> = BTreeMap::new();
		let mut page = 0;
		let mut total_pages = 1;

		loop {
			page += 1;

			let listing: ReservePage = self
				.fetch_document(Method::GET, &format!("/pc/reserves?pg={page}"), None)
				.await?;

			if page == 1 {
				total_pages = listing.total_pages.max(1);
			}

			for entry in listing.reserve_list {
				let Ok(visit) = Date::parse(&entry.visit_date, VISIT_DATE_FORMAT) else {
					continue;
				};

				if visit > today {
					dates_by_plate.entry(entry.car_no).or_default().push(visit);
				}
			}

			if page >= total_pages {
				break;
			}
		}

		Ok(dates_by_plate
			.into_iter()
			.map(|(plate, mut dates)| {
				dates.sort_unstable();
				dates.dedup();

				(plate, compact_ranges(&dates))
			})
			.collect())
	}

	/// Books visitor parking via `/pc/reserve/`.
	///
	/// Failures propagate; whether to swallow them is the caller's call.
	pub async fn reserve_visit(&self, reservation: &VisitReservation) -> Result<()> {
		let body = serde_json::json!({
			"visitDate": reservation.visit_date,
			"purpose": reservation.purpose,
			"carNo": reservation.car_no,
			"days": reservation.days,
			"phone": reservation.phone,
		});

		self.request(Method::POST, "/pc/reserve/", Some(&body)).await?;

		Ok(())
	}
}

/// Merges sorted, de-duplicated days into inclusive ranges, splitting where
/// the gap between neighbors exceeds one day.
fn compact_ranges(dates: &[Date]) -> Vec<DateRange> {
	let mut ranges = Vec::new();
	let Some((&first, rest)) = dates.split_first() else {
		return ranges;
	};
	let mut start = first;
	let mut previous = first;

	for &date in rest {
		if (date - previous).whole_days() > 1 {
			ranges.push(DateRange { from: start, to: previous });

			start = date;
		}

		previous = date;
	}

	ranges.push(DateRange { from: start, to: previous });

	ranges
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	#[test]
	fn compact_ranges_merges_consecutive_days() {
		let dates = [
			date!(2025 - 01 - 01),
			date!(2025 - 01 - 02),
			date!(2025 - 01 - 03),
			date!(2025 - 01 - 05),
			date!(2025 - 01 - 09),
			date!(2025 - 01 - 10),
		];

		assert_eq!(compact_ranges(&dates), vec![
			DateRange { from: date!(2025 - 01 - 01), to: date!(2025 - 01 - 03) },
			DateRange { from: date!(2025 - 01 - 05), to: date!(2025 - 01 - 05) },
			DateRange { from: date!(2025 - 01 - 09), to: date!(2025 - 01 - 10) },
		]);
	}

	#[test]
	fn compact_ranges_handles_empty_and_single_inputs() {
		assert!(compact_ranges(&[]).is_empty());
		assert_eq!(compact_ranges(&[date!(2025 - 06 - 15)]), vec![DateRange {
			from: date!(2025 - 06 - 15),
			to: date!(2025 - 06 - 15),
		}]);
	}

	#[test]
	fn visit_dates_parse_the_upstream_layout() {
		let parsed = Date::parse("2025.01.31", VISIT_DATE_FORMAT)
			.expect("Upstream date layout should parse.");

		assert_eq!(parsed, date!(2025 - 01 - 31));
		assert!(Date::parse("2025-01-31", VISIT_DATE_FORMAT).is_err());
	}
}
