//! Per-call payload sent to the upstream recommendation endpoint.

use serde::Serialize;

use crate::chaos::random_below;

const MAX_CALORIES_PER_SLICE: u64 = 1000;
const MAX_TOPPINGS: u64 = 10;
const MIN_TOPPINGS: u64 = 2;

/// JSON body of the upstream POST. Built fresh for every call and discarded after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub max_calories_per_slice: u64,
    pub must_be_vegetarian: bool,
    pub excluded_ingredients: Vec<String>,
    pub excluded_tools: Vec<String>,
    pub max_number_of_toppings: u64,
    pub min_number_of_toppings: u64,
}

impl RecommendationRequest {
    /// Draw every bounded field from the shared secure random source.
    pub fn random() -> Self {
        Self {
            max_calories_per_slice: random_below(MAX_CALORIES_PER_SLICE),
            must_be_vegetarian: random_below(2) == 1,
            excluded_ingredients: Vec::new(),
            excluded_tools: Vec::new(),
            max_number_of_toppings: random_below(MAX_TOPPINGS),
            min_number_of_toppings: random_below(MIN_TOPPINGS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_fields_respect_bounds() {
        for _ in 0..200 {
            let req = RecommendationRequest::random();
            assert!(req.max_calories_per_slice < MAX_CALORIES_PER_SLICE);
            assert!(req.max_number_of_toppings < MAX_TOPPINGS);
            assert!(req.min_number_of_toppings < MIN_TOPPINGS);
            assert!(req.excluded_ingredients.is_empty());
            assert!(req.excluded_tools.is_empty());
        }
    }

    #[test]
    fn serializes_six_camel_case_fields() {
        let value = serde_json::to_value(RecommendationRequest::random()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "excludedIngredients",
                "excludedTools",
                "maxCaloriesPerSlice",
                "maxNumberOfToppings",
                "minNumberOfToppings",
                "mustBeVegetarian",
            ]
        );
        assert!(obj["mustBeVegetarian"].is_boolean());
        assert_eq!(obj["excludedTools"], serde_json::json!([]));
    }
}
