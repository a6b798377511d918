use crate::data::types::Market;

pub fn contract_path(market: &Market) -> String {
    format!("/{}/{}", market.creator.username, market.slug)
}

/// Absolute link copied by the "Copy link" button.
pub fn contract_url(domain: &str, market: &Market) -> String {
    format!("https://{}{}", domain, contract_path(market))
}

pub fn group_path(slug: &str) -> String {
    format!("/group/{}", slug)
}

pub fn group_url(domain: &str, slug: &str) -> String {
    format!("https://{}{}", domain, group_path(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Creator;
    use chrono::Utc;

    #[test]
    fn test_contract_links() {
        let market = Market {
            id: "m1".to_string(),
            slug: "will-it-rain-tomorrow".to_string(),
            question: "Will it rain tomorrow?".to_string(),
            creator: Creator {
                id: "u1".to_string(),
                username: "alice".to_string(),
                name: "Alice".to_string(),
            },
            created_time: Utc::now(),
            close_time: None,
            probability: 0.5,
            state: None,
            cover_image_url: None,
            description: None,
            group_slugs: Vec::new(),
            resolution: None,
        };

        assert_eq!(contract_path(&market), "/alice/will-it-rain-tomorrow");
        assert_eq!(
            contract_url("manifold.markets", &market),
            "https://manifold.markets/alice/will-it-rain-tomorrow"
        );
    }

    #[test]
    fn test_group_links() {
        assert_eq!(group_path("science"), "/group/science");
        assert_eq!(group_url("manifold.markets", "science"), "https://manifold.markets/group/science");
    }
}
