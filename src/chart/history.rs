use chrono::{DateTime, Utc};

use crate::chart::scale::{LinearScale, Margin};
use crate::chart::{line_path, Chart, Primitive};
use crate::data::types::{Bet, Market, Point};

/// Time-series of the market probability, one vertex per bet, extended to
/// `now` at the current probability. Drawn without axes.
pub fn probability_history_chart(
    market: &Market,
    bets: &[Bet],
    width: f64,
    height: f64,
    now: DateTime<Utc>,
    color: &str,
) -> Chart {
    let mut points: Vec<Point> = bets
        .iter()
        .filter(|b| b.market_id == market.id)
        .map(|b| Point::new(b.created_time.timestamp_millis() as f64, b.prob_after))
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));

    // Chart starts at the first bet, or at market creation before any trading
    let start = points
        .first()
        .map(|p| p.x)
        .unwrap_or(market.created_time.timestamp_millis() as f64);
    let end = points
        .last()
        .map(|p| p.x)
        .unwrap_or(start)
        .max(now.timestamp_millis() as f64);

    if points.is_empty() {
        points.push(Point::new(start, market.probability));
    }
    points.push(Point::new(end, market.probability));

    let margin = Margin::default();
    let (inner_w, inner_h) = margin.inner(width, height);
    let x = LinearScale::new((start, end), (0.0, inner_w));
    let y = LinearScale::new((0.0, 1.0), (inner_h, 0.0));

    let primitives = line_path(&points, |p| x.apply(p.x), |p| y.apply(p.y))
        .map(|d| Primitive::Path {
            d,
            stroke: color.to_string(),
        })
        .into_iter()
        .collect();

    Chart {
        width,
        height,
        margin,
        primitives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Creator, Side};
    use chrono::Duration;

    fn market(created_time: DateTime<Utc>) -> Market {
        Market {
            id: "m1".to_string(),
            slug: "m1".to_string(),
            question: "Q?".to_string(),
            creator: Creator {
                id: "u1".to_string(),
                username: "alice".to_string(),
                name: "Alice".to_string(),
            },
            created_time,
            close_time: None,
            probability: 0.25,
            state: None,
            cover_image_url: None,
            description: None,
            group_slugs: Vec::new(),
            resolution: None,
        }
    }

    fn bet(market_id: &str, at: DateTime<Utc>, prob_after: f64) -> Bet {
        Bet {
            id: format!("b-{}", at.timestamp_millis()),
            market_id: market_id.to_string(),
            created_time: at,
            prob_before: 0.5,
            prob_after,
            outcome: Side::Yes,
            amount: 1.0,
        }
    }

    #[test]
    fn test_path_spans_first_bet_to_now() {
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let m = market(t0 - Duration::days(1));
        let bets = vec![
            bet("m1", t0 + Duration::hours(1), 0.75),
            bet("m1", t0, 0.5),
            bet("other", t0 - Duration::days(5), 0.9),
        ];

        let chart = probability_history_chart(&m, &bets, 100.0, 100.0, t0 + Duration::hours(2), "white");
        let d: Vec<&str> = chart.paths().collect();
        assert_eq!(d, vec!["M0,50L50,25L100,75"]);
    }

    #[test]
    fn test_no_bets_draws_flat_line_from_creation() {
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let m = market(t0);
        let chart = probability_history_chart(&m, &[], 200.0, 100.0, t0 + Duration::days(1), "white");
        let d: Vec<&str> = chart.paths().collect();
        assert_eq!(d, vec!["M0,75L200,75"]);
    }
}
