//! Keyword-matched canned answers.

use super::{Assistant, AssistantError};

const STOCK_ANSWER: &str = "Based on the current inventory data, you have 157 products in stock across all categories. The category with the highest stock is 'Electronics' with 42 items.";
const SALES_ANSWER: &str = "Your total sales for the current month are $24,580. This is a 12% increase compared to the same period last month.";
const LOW_STOCK_ANSWER: &str = "There are currently 8 products that are below their minimum stock levels. The most critical is 'Wireless Headphones' with only 2 units remaining (minimum: 10).";
const DEFAULT_ANSWER: &str = "I'm your inventory assistant. You can ask me questions about your products, stock levels, sales, and more. For now my capabilities are limited, but I'll be able to provide more detailed information in future updates.";

/// Offline assistant with fixed answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAssistant;

impl SimulatedAssistant {
    /// Pick the canned answer for `query`. First matching rule wins.
    #[must_use]
    pub fn reply(query: &str) -> &'static str {
        let q = query.to_lowercase();
        if q.contains("product") && q.contains("stock") {
            STOCK_ANSWER
        } else if q.contains("sales") {
            SALES_ANSWER
        } else if q.contains("low stock") {
            LOW_STOCK_ANSWER
        } else {
            DEFAULT_ANSWER
        }
    }
}

#[async_trait::async_trait]
impl Assistant for SimulatedAssistant {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn answer(&self, query: &str) -> Result<String, AssistantError> {
        Ok(Self::reply(query).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(SimulatedAssistant::reply("Which PRODUCTS are in stock?"), STOCK_ANSWER);
        assert_eq!(SimulatedAssistant::reply("product low stock"), STOCK_ANSWER);
        assert_eq!(SimulatedAssistant::reply("sales this month"), SALES_ANSWER);
        assert_eq!(SimulatedAssistant::reply("anything at low stock?"), LOW_STOCK_ANSWER);
        assert_eq!(SimulatedAssistant::reply("hello"), DEFAULT_ANSWER);
    }

    #[tokio::test]
    async fn test_answer_never_fails() {
        let answer = SimulatedAssistant.answer("sales?").await.unwrap();
        assert_eq!(answer, SALES_ANSWER);
    }
}
