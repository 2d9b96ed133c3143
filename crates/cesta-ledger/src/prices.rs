//! Per-market price history.
//!
//! Each (product, market) pair keeps at most one record per calendar day; a
//! second observation on the same day replaces the first. Days are cut on the
//! store's configured [`DayBoundary`](cesta_core::DayBoundary).

use cesta_core::day::{format_rfc3339, parse_rfc3339};
use cesta_core::error::ensure_positive_price;
use cesta_core::{CestaError, CheapestPrice, PriceRecord, ProductPriceInfo};
use cesta_store::Store;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use time::OffsetDateTime;

pub struct PriceLedger<'a> {
    store: &'a mut Store,
}

/// Records for one product, most recent first. Stable for equal or
/// unparseable dates, which sort last.
fn newest_first<'r>(records: impl Iterator<Item = &'r PriceRecord>) -> Vec<&'r PriceRecord> {
    let mut sorted: Vec<&PriceRecord> = records.collect();
    sorted.sort_by_cached_key(|r| Reverse(parse_rfc3339(&r.date)));
    sorted
}

impl<'a> PriceLedger<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Record a price observed now.
    pub fn record(
        &mut self,
        product_id: &str,
        market_id: &str,
        market_name: &str,
        price: Decimal,
    ) -> Result<PriceRecord, CestaError> {
        self.record_at(product_id, market_id, market_name, price, OffsetDateTime::now_utc())
    }

    /// Record a price observed at `at`, replacing any record for the same
    /// product and market on the same calendar day.
    pub fn record_at(
        &mut self,
        product_id: &str,
        market_id: &str,
        market_name: &str,
        price: Decimal,
        at: OffsetDateTime,
    ) -> Result<PriceRecord, CestaError> {
        if product_id.trim().is_empty() {
            return Err(CestaError::EmptyIdentifier("product id"));
        }
        if market_id.trim().is_empty() {
            return Err(CestaError::EmptyIdentifier("market id"));
        }
        ensure_positive_price(price)?;

        let record = PriceRecord {
            product_id: product_id.to_string(),
            market_id: market_id.to_string(),
            market_name: market_name.to_string(),
            price,
            date: format_rfc3339(at),
        };
        let boundary = self.store.day_boundary();
        let replaced = self.store.update_price_history(|history| {
            let before = history.len();
            history.retain(|r| {
                !(r.product_id == record.product_id
                    && r.market_id == record.market_id
                    && boundary.same_day(&r.date, at))
            });
            let replaced = before - history.len();
            history.push(record.clone());
            replaced
        });
        tracing::debug!(
            product_id = %record.product_id,
            market_id = %record.market_id,
            price = %record.price,
            replaced,
            "price recorded"
        );
        Ok(record)
    }

    /// Last price seen in `current_market_id` and the cheapest price seen anywhere.
    ///
    /// The last price is the head of the product's history, newest first,
    /// filtered to the current market. The cheapest price comes from the
    /// history in insertion order, so ties go to the earliest recorded entry.
    pub fn price_info(&self, product_id: &str, current_market_id: &str) -> ProductPriceInfo {
        let for_product = || {
            self.store
                .price_history()
                .iter()
                .filter(move |r| r.product_id == product_id)
        };

        let by_date = newest_first(for_product());
        let last_here = by_date.iter().find(|r| r.market_id == current_market_id);

        // `min_by_key` keeps the first of several equal minimums.
        let cheapest = for_product().min_by_key(|r| r.price);

        ProductPriceInfo {
            last_price_in_current_market: last_here.map(|r| r.price),
            last_price_date_in_current_market: last_here.map(|r| r.date.clone()),
            cheapest_price_overall: cheapest.map(|r| CheapestPrice {
                price: r.price,
                market_name: r.market_name.clone(),
            }),
        }
    }

    /// All records for a product, most recent first.
    pub fn history(&self, product_id: &str) -> Vec<&PriceRecord> {
        newest_first(
            self.store
                .price_history()
                .iter()
                .filter(|r| r.product_id == product_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cesta_core::DayBoundary;
    use cesta_store::StorePaths;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn at(s: &str) -> OffsetDateTime {
        parse_rfc3339(s).unwrap()
    }

    fn store() -> (tempfile::TempDir, Store) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open_at(tmp.path());
        (tmp, store)
    }

    #[test]
    fn same_day_record_replaces_previous() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger
            .record_at("111", "mkt_a", "A", dec("5.00"), at("2026-03-01T09:00:00Z"))
            .unwrap();
        ledger
            .record_at("111", "mkt_a", "A", dec("4.80"), at("2026-03-01T12:00:00Z"))
            .unwrap();
        ledger
            .record_at("111", "mkt_a", "A", dec("4.50"), at("2026-03-01T18:00:00Z"))
            .unwrap();
        let history = ledger.history("111");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, dec("4.50"));
    }

    #[test]
    fn different_days_and_markets_are_kept() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger
            .record_at("111", "mkt_a", "A", dec("5.00"), at("2026-03-01T09:00:00Z"))
            .unwrap();
        ledger
            .record_at("111", "mkt_a", "A", dec("4.90"), at("2026-03-02T09:00:00Z"))
            .unwrap();
        ledger
            .record_at("111", "mkt_b", "B", dec("4.70"), at("2026-03-02T10:00:00Z"))
            .unwrap();
        ledger
            .record_at("222", "mkt_a", "A", dec("1.00"), at("2026-03-02T10:00:00Z"))
            .unwrap();
        assert_eq!(ledger.history("111").len(), 3);
        assert_eq!(ledger.history("222").len(), 1);
    }

    #[test]
    fn day_cut_follows_configured_offset() {
        let tmp = tempfile::tempdir().unwrap();
        let instants = ["2026-03-01T23:30:00Z", "2026-03-02T01:00:00Z"];

        let mut utc = Store::open_with(StorePaths::discover(tmp.path().join("utc")), DayBoundary::UTC);
        let mut ledger = PriceLedger::new(&mut utc);
        for (i, ts) in instants.iter().enumerate() {
            ledger
                .record_at("111", "mkt_a", "A", Decimal::from(i + 1), at(ts))
                .unwrap();
        }
        assert_eq!(ledger.history("111").len(), 2);

        let brt = DayBoundary::parse("-03:00").unwrap();
        let mut local = Store::open_with(StorePaths::discover(tmp.path().join("brt")), brt);
        let mut ledger = PriceLedger::new(&mut local);
        for (i, ts) in instants.iter().enumerate() {
            ledger
                .record_at("111", "mkt_a", "A", Decimal::from(i + 1), at(ts))
                .unwrap();
        }
        let history = ledger.history("111");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, Decimal::from(2));
    }

    #[test]
    fn record_validates_before_writing() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        assert!(matches!(
            ledger.record("111", "mkt_a", "A", Decimal::ZERO),
            Err(CestaError::NonPositivePrice(_))
        ));
        assert!(matches!(
            ledger.record(" ", "mkt_a", "A", dec("1")),
            Err(CestaError::EmptyIdentifier("product id"))
        ));
        assert!(matches!(
            ledger.record("111", "", "A", dec("1")),
            Err(CestaError::EmptyIdentifier("market id"))
        ));
        assert!(store.price_history().is_empty());
    }

    #[test]
    fn no_history_gives_empty_info() {
        let (_tmp, mut store) = store();
        let ledger = PriceLedger::new(&mut store);
        assert_eq!(ledger.price_info("111", "mkt_a"), ProductPriceInfo::default());
    }

    #[test]
    fn milk_scenario() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger.record("111", "A", "A", dec("5.00")).unwrap();
        ledger.record("111", "A", "A", dec("4.50")).unwrap();

        let info = ledger.price_info("111", "A");
        assert_eq!(info.last_price_in_current_market, Some(dec("4.50")));
        assert!(info.last_price_date_in_current_market.is_some());

        ledger.record("111", "B", "B", dec("3.00")).unwrap();
        let info = ledger.price_info("111", "A");
        assert_eq!(info.last_price_in_current_market, Some(dec("4.50")));
        assert_eq!(
            info.cheapest_price_overall,
            Some(CheapestPrice {
                price: dec("3.00"),
                market_name: "B".into(),
            })
        );
        assert!(info.cheaper_elsewhere("A").is_some());
    }

    #[test]
    fn last_price_is_most_recent_not_last_inserted() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger
            .record_at("111", "mkt_a", "A", dec("6.00"), at("2026-03-05T09:00:00Z"))
            .unwrap();
        // Backfilled older observation, inserted later.
        ledger
            .record_at("111", "mkt_a", "A", dec("5.00"), at("2026-03-01T09:00:00Z"))
            .unwrap();
        let info = ledger.price_info("111", "mkt_a");
        assert_eq!(info.last_price_in_current_market, Some(dec("6.00")));
        assert_eq!(
            info.last_price_date_in_current_market.as_deref(),
            Some("2026-03-05T09:00:00Z")
        );
    }

    #[test]
    fn last_price_ignores_other_markets() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger
            .record_at("111", "mkt_b", "B", dec("3.00"), at("2026-03-05T09:00:00Z"))
            .unwrap();
        let info = ledger.price_info("111", "mkt_a");
        assert_eq!(info.last_price_in_current_market, None);
        assert_eq!(info.last_price_date_in_current_market, None);
        assert_eq!(info.cheapest_price_overall.unwrap().market_name, "B");
    }

    #[test]
    fn cheapest_tie_goes_to_first_inserted() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        ledger
            .record_at("111", "mkt_b", "B", dec("3.00"), at("2026-03-01T09:00:00Z"))
            .unwrap();
        ledger
            .record_at("111", "mkt_c", "C", dec("3.0"), at("2026-03-04T09:00:00Z"))
            .unwrap();
        let info = ledger.price_info("111", "mkt_a");
        assert_eq!(info.cheapest_price_overall.unwrap().market_name, "B");
    }

    #[test]
    fn cheapest_is_a_lower_bound_and_one_of_the_records() {
        let (_tmp, mut store) = store();
        let mut ledger = PriceLedger::new(&mut store);
        let observations = [
            ("mkt_a", "A", "7.25", "2026-03-01T09:00:00Z"),
            ("mkt_b", "B", "6.99", "2026-03-02T09:00:00Z"),
            ("mkt_c", "C", "8.10", "2026-03-03T09:00:00Z"),
            ("mkt_a", "A", "6.50", "2026-03-04T09:00:00Z"),
            ("mkt_b", "B", "9.00", "2026-03-05T09:00:00Z"),
        ];
        for (id, name, price, ts) in observations {
            ledger.record_at("111", id, name, dec(price), at(ts)).unwrap();
        }
        let cheapest = ledger.price_info("111", "mkt_b").cheapest_price_overall.unwrap();
        let history = ledger.history("111");
        assert!(history.iter().all(|r| cheapest.price <= r.price));
        assert!(history
            .iter()
            .any(|r| r.price == cheapest.price && r.market_name == cheapest.market_name));
        assert_eq!(cheapest.price, dec("6.50"));
    }

    #[test]
    fn history_sorts_newest_first_with_bad_dates_last() {
        let (_tmp, mut store) = store();
        store.update_price_history(|h| {
            for (price, date) in [
                ("1", "garbage"),
                ("2", "2026-03-01T09:00:00Z"),
                ("3", "2026-03-03T09:00:00Z"),
            ] {
                h.push(PriceRecord {
                    product_id: "111".into(),
                    market_id: "mkt_a".into(),
                    market_name: "A".into(),
                    price: dec(price),
                    date: date.into(),
                });
            }
        });
        let ledger = PriceLedger::new(&mut store);
        let prices: Vec<Decimal> = ledger.history("111").iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![dec("3"), dec("2"), dec("1")]);
    }

    #[test]
    fn history_persists() {
        let (tmp, mut store) = store();
        PriceLedger::new(&mut store)
            .record("111", "mkt_a", "A", dec("2.00"))
            .unwrap();
        let mut reopened = Store::open_at(tmp.path());
        assert_eq!(PriceLedger::new(&mut reopened).history("111").len(), 1);
    }
}
